use dnscache_domain::ResolverStats;
use serde::Serialize;
use std::net::IpAddr;

#[derive(Debug, Serialize)]
pub struct LookupOutput<'a> {
    pub query: &'a str,
    pub kind: &'static str,
    pub answers: Vec<String>,
    pub elapsed_us: u64,
}

#[derive(Debug, Serialize)]
pub struct DialOutput<'a> {
    pub address: &'a str,
    pub local: String,
    pub peer: String,
    pub elapsed_us: u64,
}

#[derive(Debug, Serialize)]
pub struct StatsOutput {
    #[serde(flatten)]
    pub stats: ResolverStats,
    pub hit_rate: f64,
}

pub struct Printer {
    json: bool,
}

impl Printer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn lookup(&self, out: &LookupOutput<'_>) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(out)?);
            return Ok(());
        }
        println!("{} {} ({}us)", out.kind, out.query, out.elapsed_us);
        for answer in &out.answers {
            println!("  {}", answer);
        }
        Ok(())
    }

    pub fn dial(&self, out: &DialOutput<'_>) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(out)?);
        } else {
            println!(
                "connected {} -> {} via {} ({}us)",
                out.local, out.peer, out.address, out.elapsed_us
            );
        }
        Ok(())
    }

    pub fn stats(&self, stats: ResolverStats) -> anyhow::Result<()> {
        let out = StatsOutput {
            stats,
            hit_rate: stats.hit_rate(),
        };
        if self.json {
            println!("{}", serde_json::to_string(&out)?);
        } else {
            println!(
                "cache: {} hits, {} misses ({:.1}% hit rate)",
                out.stats.cache_hits, out.stats.cache_misses, out.hit_rate
            );
        }
        Ok(())
    }
}

pub fn render_ips(ips: &[IpAddr]) -> Vec<String> {
    ips.iter().map(IpAddr::to_string).collect()
}
