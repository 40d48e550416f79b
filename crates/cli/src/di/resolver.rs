use dnscache_domain::Config;
use dnscache_infrastructure::dns::{CachingResolver, ResolverBuilder};
use tracing::{debug, info};

pub fn build_resolver(config: &Config) -> anyhow::Result<CachingResolver> {
    let resolver = ResolverBuilder::new(config.resolver.clone())
        .on_cache_miss(|key| debug!(key, "Cache miss"))
        .on_change(|key, values| info!(key, addresses = ?values, "Resolved addresses changed"))
        .build()?;
    Ok(resolver)
}
