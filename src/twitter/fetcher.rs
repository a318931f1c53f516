use super::{ContinuationToken, PageLimits, PageRequest, RawPage, TimelineSource, UserId};
use crate::error::TwitterError;
use tracing::debug;

/// Fetches single timeline pages, applying the endpoint's page size floor.
pub struct PageFetcher<'a, S: ?Sized> {
    source: &'a S,
    limits: PageLimits,
}

impl<'a, S: TimelineSource + ?Sized> PageFetcher<'a, S> {
    pub fn new(source: &'a S, limits: PageLimits) -> Self {
        Self { source, limits }
    }

    pub fn limits(&self) -> PageLimits {
        self.limits
    }

    /// Fetch one page. Sizes under the endpoint minimum are raised to it
    /// rather than rejected, so callers may receive more rows than asked for.
    pub async fn fetch(
        &self,
        user_id: &UserId,
        page_size: usize,
        token: Option<ContinuationToken>,
    ) -> Result<RawPage, TwitterError> {
        let max_results = page_size.max(self.limits.min);
        if max_results != page_size {
            debug!(
                requested = page_size,
                sent = max_results,
                "page size raised to endpoint minimum"
            );
        }

        let request = PageRequest {
            user_id: user_id.clone(),
            max_results,
            pagination_token: token,
        };
        let page = self.source.list_tweets(&request).await?;

        debug!(
            rows = page.tweets.len(),
            has_next = page.next_token.is_some(),
            "fetched page"
        );
        Ok(page)
    }

    /// Fetch the page after `token`. A missing token means the previous
    /// page was the last one, reported as [`TwitterError::Exhausted`] with
    /// the caller's `fetched`/`requested` counts, without touching the network.
    pub async fn resume(
        &self,
        user_id: &UserId,
        page_size: usize,
        token: Option<ContinuationToken>,
        fetched: usize,
        requested: usize,
    ) -> Result<RawPage, TwitterError> {
        let token = token.ok_or(TwitterError::Exhausted { fetched, requested })?;
        self.fetch(user_id, page_size, Some(token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSource {
        requests: Mutex<Vec<PageRequest>>,
    }

    #[async_trait]
    impl TimelineSource for RecordingSource {
        async fn lookup_user(&self, _handle: &str) -> Result<UserId, TwitterError> {
            Ok(UserId::new("1"))
        }

        async fn list_tweets(&self, request: &PageRequest) -> Result<RawPage, TwitterError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(RawPage::default())
        }
    }

    #[tokio::test]
    async fn test_fetch_raises_small_page_to_minimum() {
        let source = RecordingSource::default();
        let fetcher = PageFetcher::new(&source, PageLimits::default());

        fetcher.fetch(&UserId::new("1"), 3, None).await.unwrap();

        let requests = source.requests.lock().unwrap();
        assert_eq!(requests[0].max_results, 5);
        assert!(requests[0].pagination_token.is_none());
    }

    #[tokio::test]
    async fn test_fetch_keeps_size_within_bounds() {
        let source = RecordingSource::default();
        let fetcher = PageFetcher::new(&source, PageLimits::default());

        fetcher.fetch(&UserId::new("1"), 7, None).await.unwrap();

        assert_eq!(source.requests.lock().unwrap()[0].max_results, 7);
    }

    #[tokio::test]
    async fn test_resume_passes_token() {
        let source = RecordingSource::default();
        let fetcher = PageFetcher::new(&source, PageLimits::default());

        fetcher
            .resume(&UserId::new("1"), 10, Some(ContinuationToken::new("T1")), 10, 20)
            .await
            .unwrap();

        assert_eq!(
            source.requests.lock().unwrap()[0].pagination_token,
            Some(ContinuationToken::new("T1"))
        );
    }

    #[tokio::test]
    async fn test_resume_without_token_is_exhausted() {
        let source = RecordingSource::default();
        let fetcher = PageFetcher::new(&source, PageLimits::default());

        let result = fetcher.resume(&UserId::new("1"), 10, None, 12, 25).await;

        assert!(matches!(
            result,
            Err(TwitterError::Exhausted {
                fetched: 12,
                requested: 25
            })
        ));
        assert!(source.requests.lock().unwrap().is_empty());
    }
}
