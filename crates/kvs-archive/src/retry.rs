use std::{future::Future, time::Duration};

use crate::{
    error::ArchiveResult, Bytes, FragmentPage, FragmentSource, ListFragmentsRequest, MediaSource,
};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure.
    pub retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 0,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32) -> Self {
        Self {
            retries,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = max_delay;
        self
    }

    /// Exponential backoff, capped at `max_delay`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    async fn run<T, F, Fut>(&self, what: &str, mut call: F) -> ArchiveResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ArchiveResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_transient() && attempt < self.retries => {
                    let delay = self.delay(attempt);
                    attempt += 1;
                    log::warn!(
                        "{what} failed, retry {attempt}/{} in {delay:?}: {e}",
                        self.retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Retries transient failures of the wrapped source.
///
/// Each page request is retried on its own, with the same selector or token,
/// so the listing protocol above it is unchanged. Permanent failures are
/// returned at once.
pub struct RetryingSource<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> RetryingSource<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S> FragmentSource for RetryingSource<S>
where
    S: FragmentSource + Sync,
{
    async fn list_fragments(&self, request: ListFragmentsRequest) -> ArchiveResult<FragmentPage> {
        self.policy
            .run("ListFragments", move || self.inner.list_fragments(request.clone()))
            .await
    }
}

impl<S> MediaSource for RetryingSource<S>
where
    S: MediaSource + Sync,
{
    async fn get_media_for_fragment_list(
        &self,
        stream_name: &str,
        fragments: &[String],
    ) -> ArchiveResult<Bytes> {
        self.policy
            .run("GetMediaForFragmentList", move || {
                self.inner.get_media_for_fragment_list(stream_name, fragments)
            })
            .await
    }
}
