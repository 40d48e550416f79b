use std::fmt;
use std::sync::Arc;

pub type MissHook = Arc<dyn Fn(&str) + Send + Sync>;
pub type ChangeHook = Arc<dyn Fn(&str, &[String]) + Send + Sync>;

/// Callbacks handed to collaborators.
///
/// `on_cache_miss` runs synchronously, once per real upstream fetch, before
/// the fetch starts. `on_change` runs on a spawned task whenever a fetch
/// returns a set of values different from the cached one.
#[derive(Clone, Default)]
pub struct LookupHooks {
    pub on_cache_miss: Option<MissHook>,
    pub on_change: Option<ChangeHook>,
}

impl LookupHooks {
    pub fn cache_miss(&self, key: &str) {
        if let Some(hook) = &self.on_cache_miss {
            hook(key);
        }
    }
}

impl fmt::Debug for LookupHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupHooks")
            .field("on_cache_miss", &self.on_cache_miss.is_some())
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}
