pub mod client;
pub mod fetcher;
pub mod normalize;

use crate::error::TwitterError;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

/// Opaque account identifier returned by the username lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque `next_token` handed out with a page; only meaningful for the next request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Page size bounds enforced by the timeline endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub min: usize,
    pub max: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self { min: 5, max: 10 }
    }
}

/// One timeline request. Built fresh for every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub user_id: UserId,
    pub max_results: usize,
    pub pagination_token: Option<ContinuationToken>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicMetrics {
    pub retweet_count: Option<u64>,
    pub reply_count: Option<u64>,
    pub like_count: Option<u64>,
    pub quote_count: Option<u64>,
}

/// A tweet exactly as the API returned it. Every field is optional here so
/// that a missing one surfaces as a named error from the normalizer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTweet {
    pub id: Option<String>,
    pub text: Option<String>,
    pub created_at: Option<String>,
    pub public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Clone, Default)]
pub struct RawPage {
    pub tweets: Vec<RawTweet>,
    pub next_token: Option<ContinuationToken>,
}

/// The two timeline endpoints the exporter talks to.
#[async_trait]
pub trait TimelineSource: Send + Sync {
    async fn lookup_user(&self, handle: &str) -> Result<UserId, TwitterError>;

    async fn list_tweets(&self, request: &PageRequest) -> Result<RawPage, TwitterError>;
}
