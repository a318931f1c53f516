use super::RawTweet;
use crate::error::TwitterError;
use serde::Serialize;

/// One flattened output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub id: String,
    pub text: String,
    pub created_at: String,
    pub retweet: u64,
    pub reply: u64,
    pub like: u64,
    pub quote: u64,
}

impl Record {
    /// Column names, in the order [`Record::to_row`] emits values.
    pub const HEADER: [&'static str; 7] = [
        "id",
        "text",
        "created_at",
        "retweet",
        "reply",
        "like",
        "quote",
    ];

    pub fn to_row(&self) -> Vec<serde_json::Value> {
        vec![
            self.id.clone().into(),
            self.text.clone().into(),
            self.created_at.clone().into(),
            self.retweet.into(),
            self.reply.into(),
            self.like.into(),
            self.quote.into(),
        ]
    }
}

/// Flatten a page of tweets, lifting the `public_metrics` counters to
/// top-level columns. Fails on the first tweet missing a field; no partial
/// page is returned.
pub fn normalize(tweets: Vec<RawTweet>) -> Result<Vec<Record>, TwitterError> {
    tweets.into_iter().map(normalize_tweet).collect()
}

fn normalize_tweet(tweet: RawTweet) -> Result<Record, TwitterError> {
    let id = tweet.id.ok_or_else(|| TwitterError::MalformedRecord {
        id: "<unknown>".to_string(),
        field: "id",
    })?;
    let missing = |field| TwitterError::MalformedRecord {
        id: id.clone(),
        field,
    };

    let text = tweet.text.ok_or_else(|| missing("text"))?;
    let created_at = tweet.created_at.ok_or_else(|| missing("created_at"))?;
    let metrics = tweet.public_metrics.ok_or_else(|| missing("public_metrics"))?;

    Ok(Record {
        retweet: metrics
            .retweet_count
            .ok_or_else(|| missing("public_metrics.retweet_count"))?,
        reply: metrics
            .reply_count
            .ok_or_else(|| missing("public_metrics.reply_count"))?,
        like: metrics
            .like_count
            .ok_or_else(|| missing("public_metrics.like_count"))?,
        quote: metrics
            .quote_count
            .ok_or_else(|| missing("public_metrics.quote_count"))?,
        text,
        created_at,
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twitter::PublicMetrics;

    fn raw(id: &str, likes: u64) -> RawTweet {
        RawTweet {
            id: Some(id.to_string()),
            text: Some(format!("tweet {}", id)),
            created_at: Some("2023-06-15T14:30:22.000Z".to_string()),
            public_metrics: Some(PublicMetrics {
                retweet_count: Some(1),
                reply_count: Some(2),
                like_count: Some(likes),
                quote_count: Some(0),
            }),
        }
    }

    #[test]
    fn test_normalize_flattens_metrics() {
        let records = normalize(vec![raw("1", 42)]).unwrap();
        assert_eq!(
            records,
            vec![Record {
                id: "1".to_string(),
                text: "tweet 1".to_string(),
                created_at: "2023-06-15T14:30:22.000Z".to_string(),
                retweet: 1,
                reply: 2,
                like: 42,
                quote: 0,
            }]
        );
    }

    #[test]
    fn test_normalize_preserves_order() {
        let records = normalize(vec![raw("3", 0), raw("1", 0), raw("2", 0)]).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_normalize_from_api_json_ignores_extra_fields() {
        let tweet: RawTweet = serde_json::from_str(
            r#"{"id":"5","text":"hi","created_at":"2024-01-01T00:00:00.000Z",
                "edit_history_tweet_ids":["5"],
                "public_metrics":{"retweet_count":3,"reply_count":4,"like_count":5,"quote_count":6,"impression_count":900}}"#,
        )
        .unwrap();
        let record = normalize(vec![tweet]).unwrap().remove(0);
        assert_eq!((record.retweet, record.reply, record.like, record.quote), (3, 4, 5, 6));
    }

    #[test]
    fn test_normalize_missing_metrics_fails() {
        let mut tweet = raw("7", 0);
        tweet.public_metrics = None;
        match normalize(vec![raw("6", 0), tweet]) {
            Err(TwitterError::MalformedRecord { id, field }) => {
                assert_eq!(id, "7");
                assert_eq!(field, "public_metrics");
            }
            other => panic!("expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_missing_counter_fails() {
        let mut tweet = raw("8", 0);
        tweet.public_metrics = Some(PublicMetrics {
            like_count: None,
            ..tweet.public_metrics.unwrap()
        });
        assert!(matches!(
            normalize(vec![tweet]),
            Err(TwitterError::MalformedRecord { field: "public_metrics.like_count", .. })
        ));
    }

    #[test]
    fn test_normalize_missing_id_fails() {
        let mut tweet = raw("9", 0);
        tweet.id = None;
        assert!(matches!(
            normalize(vec![tweet]),
            Err(TwitterError::MalformedRecord { field: "id", .. })
        ));
    }

    #[test]
    fn test_row_matches_header() {
        let record = normalize(vec![raw("1", 9)]).unwrap().remove(0);
        let row = record.to_row();
        assert_eq!(row.len(), Record::HEADER.len());
        assert_eq!(row[0], serde_json::json!("1"));
        assert_eq!(row[5], serde_json::json!(9));
    }
}
