use dnscache_domain::ResolveError;

/// Observer attached to a [`LookupContext`](crate::LookupContext), told about
/// every real upstream fetch made on behalf of that context.
pub trait LookupTrace: Send + Sync {
    fn fetch_started(&self, _key: &str) {}

    fn fetch_finished(&self, _key: &str, _result: Result<&[String], &ResolveError>) {}
}
