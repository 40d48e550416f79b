use dnscache_domain::ResolveError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::ports::LookupTrace;

/// Cancellable call context threaded through every lookup and dial.
///
/// Carries a cancellation token, an optional deadline and an optional trace
/// observer. Cloning shares the token: canceling any clone cancels all of them.
#[derive(Clone, Default)]
pub struct LookupContext {
    token: CancellationToken,
    deadline: Option<Instant>,
    trace: Option<Arc<dyn LookupTrace>>,
}

impl LookupContext {
    /// A context that is never canceled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().deadline(Instant::now() + timeout)
    }

    /// Tightens the deadline; a later deadline than the current one is ignored.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn with_trace(mut self, trace: Arc<dyn LookupTrace>) -> Self {
        self.trace = Some(trace);
        self
    }

    /// A fresh context sharing nothing with `self`: canceling the parent does
    /// not cancel it, and it carries neither the deadline nor the trace.
    pub fn detached(&self) -> Self {
        Self::background()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn trace(&self) -> Option<&Arc<dyn LookupTrace>> {
        self.trace.as_ref()
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// The context's own failure, if it is already done.
    pub fn err(&self) -> Option<ResolveError> {
        if self.token.is_cancelled() {
            return Some(ResolveError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ResolveError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Drives `fut` until it completes or the context is done, whichever
    /// comes first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, ResolveError>
    where
        F: Future<Output = Result<T, ResolveError>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ResolveError::Canceled),
            _ = expired => Err(ResolveError::DeadlineExceeded),
            result = fut => result,
        }
    }
}

impl fmt::Debug for LookupContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupContext")
            .field("canceled", &self.token.is_cancelled())
            .field("deadline", &self.deadline)
            .field("traced", &self.trace.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_earlier_deadline_wins() {
        let now = Instant::now();
        let ctx = LookupContext::background()
            .deadline(now + Duration::from_secs(1))
            .deadline(now + Duration::from_secs(10));
        assert!(ctx.remaining().unwrap() <= Duration::from_secs(1));
    }

    #[test]
    fn test_clones_share_cancellation() {
        let ctx = LookupContext::background();
        let clone = ctx.clone();
        clone.cancel();
        assert_eq!(ctx.err(), Some(ResolveError::Canceled));
    }
}
