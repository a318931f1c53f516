//! Service-account authorization: sign a JWT with the account's private key
//! and trade it for a short-lived OAuth access token.

use crate::error::SheetsError;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The fields of a downloaded service-account JSON key that signing needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: Option<String>,
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, SheetsError> {
        let credentials_error = |reason: String| SheetsError::Credentials {
            path: path.display().to_string(),
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| credentials_error(e.to_string()))?;
        let key: Self =
            serde_json::from_str(&content).map_err(|e| credentials_error(e.to_string()))?;

        if let Some(other) = key.key_type.as_deref().filter(|t| *t != "service_account") {
            return Err(credentials_error(format!(
                "expected a service_account key, found {}",
                other
            )));
        }
        Ok(key)
    }

    /// Signed RS256 assertion valid for one hour from `now` (unix seconds).
    fn sign_assertion(&self, now: i64) -> Result<String, SheetsError> {
        let claims = Claims {
            iss: self.client_email.clone(),
            scope: SPREADSHEETS_SCOPE.to_string(),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }

    pub async fn access_token(&self, client: &reqwest::Client) -> Result<String, SheetsError> {
        let assertion = self.sign_assertion(chrono::Utc::now().timestamp())?;
        debug!(account = %self.client_email, "requesting access token");

        let response = client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SheetsError::Status {
                status: response.status(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TEST_KEY: &str = include_str!("testdata/test_key.pem");
    const TEST_PUBLIC_KEY: &str = include_str!("testdata/test_key.pub.pem");

    fn key_json(key_type: &str) -> String {
        serde_json::json!({
            "type": key_type,
            "project_id": "tweetsheet-test",
            "private_key_id": "abc123",
            "private_key": TEST_KEY,
            "client_email": "exporter@tweetsheet-test.iam.gserviceaccount.com",
            "token_uri": "https://oauth2.googleapis.com/token",
        })
        .to_string()
    }

    fn write_key(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_from_file() {
        let file = write_key(&key_json("service_account"));
        let key = ServiceAccountKey::from_file(file.path()).unwrap();
        assert_eq!(
            key.client_email,
            "exporter@tweetsheet-test.iam.gserviceaccount.com"
        );
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn test_from_file_rejects_other_key_types() {
        let file = write_key(&key_json("authorized_user"));
        assert!(matches!(
            ServiceAccountKey::from_file(file.path()),
            Err(SheetsError::Credentials { .. })
        ));
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ServiceAccountKey::from_file(&dir.path().join("missing.json")),
            Err(SheetsError::Credentials { .. })
        ));
    }

    #[test]
    fn test_default_token_uri() {
        let key: ServiceAccountKey = serde_json::from_str(
            r#"{"client_email":"a@b.iam.gserviceaccount.com","private_key":"x"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn test_sign_assertion_claims() {
        let file = write_key(&key_json("service_account"));
        let key = ServiceAccountKey::from_file(file.path()).unwrap();
        let now = chrono::Utc::now().timestamp();

        let assertion = key.sign_assertion(now).unwrap();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&["https://oauth2.googleapis.com/token"]);
        let decoded = decode::<Claims>(
            &assertion,
            &DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap(),
            &validation,
        )
        .unwrap();

        assert_eq!(decoded.claims.iss, key.client_email);
        assert_eq!(decoded.claims.scope, SPREADSHEETS_SCOPE);
        assert_eq!(decoded.claims.iat, now);
        assert_eq!(decoded.claims.exp, now + 3600);
    }

    #[test]
    fn test_sign_assertion_bad_pem() {
        let key = ServiceAccountKey {
            key_type: None,
            client_email: "a@b".to_string(),
            private_key: "not a pem".to_string(),
            token_uri: default_token_uri(),
        };
        assert!(matches!(key.sign_assertion(0), Err(SheetsError::Signing(_))));
    }
}
