use super::{ContinuationToken, PageRequest, RawPage, RawTweet, TimelineSource, UserId};
use crate::config::TwitterConfig;
use crate::error::TwitterError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const TWEET_FIELDS: &str = "created_at,public_metrics";

pub struct TwitterClient {
    api_base: String,
    token: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ApiProblem {
    title: Option<String>,
    detail: Option<String>,
}

impl ApiProblem {
    fn describe(&self) -> String {
        self.detail
            .clone()
            .or_else(|| self.title.clone())
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    data: Option<UserData>,
    #[serde(default)]
    errors: Vec<ApiProblem>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TimelineResponse {
    data: Option<Vec<RawTweet>>,
    meta: Option<TimelineMeta>,
    #[serde(default)]
    errors: Vec<ApiProblem>,
}

#[derive(Debug, Deserialize)]
struct TimelineMeta {
    next_token: Option<ContinuationToken>,
}

/// Body shape of a non-2xx response from the v2 API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    title: Option<String>,
    detail: Option<String>,
    #[serde(default)]
    errors: Vec<ApiProblem>,
}

impl TwitterClient {
    pub fn new(
        api_base: impl Into<String>,
        token: String,
        timeout: Option<Duration>,
    ) -> Result<Self, TwitterError> {
        let mut builder = reqwest::Client::builder().user_agent("tweetsheet");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
            client: builder.build()?,
        })
    }

    /// Build a client from config, reading the bearer token from the
    /// environment variable the config names.
    pub fn from_config(config: &TwitterConfig) -> Result<Self, TwitterError> {
        let token = std::env::var(&config.bearer_token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| TwitterError::MissingToken(config.bearer_token_env.clone()))?;

        Self::new(
            config.api_base.clone(),
            token,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String, TwitterError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TwitterError::Status {
                status,
                message: error_message(&body),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl TimelineSource for TwitterClient {
    async fn lookup_user(&self, handle: &str) -> Result<UserId, TwitterError> {
        let url = format!(
            "{}/users/by/username/{}",
            self.api_base,
            urlencoding::encode(handle)
        );
        debug!(%url, "looking up user");

        let body = self.get(&url, &[]).await?;
        parse_user(handle, &body)
    }

    async fn list_tweets(&self, request: &PageRequest) -> Result<RawPage, TwitterError> {
        let url = format!("{}/users/{}/tweets", self.api_base, request.user_id);
        let query = timeline_query(request);

        let body = self.get(&url, &query).await?;
        parse_timeline(&body)
    }
}

/// Query parameters for one timeline page. The token is omitted entirely
/// on the first page so the API starts from the newest tweet.
fn timeline_query(request: &PageRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("tweet.fields", TWEET_FIELDS.to_string()),
        ("max_results", request.max_results.to_string()),
    ];
    if let Some(token) = &request.pagination_token {
        query.push(("pagination_token", token.as_str().to_string()));
    }
    query
}

fn parse_user(handle: &str, body: &str) -> Result<UserId, TwitterError> {
    let response: UserResponse = serde_json::from_str(body)?;

    match response.data {
        Some(user) => Ok(UserId::new(user.id)),
        None => Err(TwitterError::UnknownUser {
            handle: handle.to_string(),
            detail: response
                .errors
                .first()
                .map(ApiProblem::describe)
                .unwrap_or_else(|| "not found".to_string()),
        }),
    }
}

/// A body with `errors` and no `data` is a refusal, not an empty timeline;
/// an empty timeline has neither.
fn parse_timeline(body: &str) -> Result<RawPage, TwitterError> {
    let response: TimelineResponse = serde_json::from_str(body)?;

    if response.data.is_none() {
        if let Some(problem) = response.errors.first() {
            return Err(TwitterError::Refused {
                detail: problem.describe(),
            });
        }
    }

    for problem in &response.errors {
        warn!(problem = %problem.describe(), "timeline response carried an error");
    }

    Ok(RawPage {
        tweets: response.data.unwrap_or_default(),
        next_token: response.meta.and_then(|m| m.next_token),
    })
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => err
            .detail
            .or(err.title)
            .or_else(|| err.errors.first().map(ApiProblem::describe))
            .unwrap_or_else(|| body.trim().to_string()),
        Err(_) => body.trim().to_string(),
    }
}
