//! Walks a user's timeline page by page until the requested number of
//! tweets has been collected or the timeline runs out.

use crate::error::TwitterError;
use crate::twitter::fetcher::PageFetcher;
use crate::twitter::normalize::{normalize, Record};
use crate::twitter::{PageLimits, TimelineSource, UserId};
use tracing::info;

/// Rows collected by one run, newest first.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<Record>,
    /// Number of timeline requests issued.
    pub pages: usize,
    /// True if the timeline ended before the requested total.
    pub exhausted: bool,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub struct Accumulator<'a, S: ?Sized> {
    fetcher: PageFetcher<'a, S>,
}

impl<'a, S: TimelineSource + ?Sized> Accumulator<'a, S> {
    pub fn new(source: &'a S, limits: PageLimits) -> Self {
        Self {
            fetcher: PageFetcher::new(source, limits),
        }
    }

    /// Collect roughly `requested` tweets for `user_id`.
    ///
    /// Pages are fetched strictly in sequence since each request carries the
    /// token from the one before. The countdown is decremented by the size
    /// asked for, not the rows received, so the result can overshoot by up
    /// to one page when the endpoint minimum kicks in.
    pub async fn collect(&self, user_id: &UserId, requested: usize) -> Result<Dataset, TwitterError> {
        let max = self.fetcher.limits().max;

        if requested <= max {
            let page = self.fetcher.fetch(user_id, requested, None).await?;
            let records = normalize(page.tweets)?;
            let exhausted = records.len() < requested && page.next_token.is_none();
            info!(rows = records.len(), exhausted, "fetched single page");
            return Ok(Dataset {
                records,
                pages: 1,
                exhausted,
            });
        }

        let page = self.fetcher.fetch(user_id, max, None).await?;
        let mut dataset = Dataset {
            records: normalize(page.tweets)?,
            pages: 1,
            exhausted: false,
        };
        let mut token = page.next_token;
        let mut remaining = requested - max;
        info!(page = 1, rows = dataset.len(), remaining, "fetched page");

        while remaining > 0 {
            let page_size = remaining.min(max);

            let page = match self
                .fetcher
                .resume(user_id, page_size, token.take(), dataset.len(), requested)
                .await
            {
                Ok(page) => page,
                Err(e @ TwitterError::Exhausted { .. }) => {
                    info!("{}", e);
                    dataset.exhausted = true;
                    break;
                }
                Err(e) => return Err(e),
            };
            dataset.pages += 1;

            dataset.records.extend(normalize(page.tweets)?);
            token = page.next_token;
            remaining -= page_size;

            info!(
                page = dataset.pages,
                rows = dataset.len(),
                remaining,
                "fetched page"
            );
        }

        Ok(dataset)
    }
}
