use super::auth::ServiceAccountKey;
use super::SheetPublisher;
use crate::config::SheetsConfig;
use crate::error::SheetsError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

pub struct GoogleSheetsClient {
    api_base: String,
    spreadsheet_id: String,
    worksheet: String,
    access_token: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    range: String,
    major_dimension: &'static str,
    values: &'a [Vec<Value>],
}

impl GoogleSheetsClient {
    /// Authorize with the configured service-account key and bind to one
    /// worksheet of one spreadsheet.
    pub async fn connect(config: &SheetsConfig) -> Result<Self, SheetsError> {
        let key = ServiceAccountKey::from_file(&config.key_file)?;
        let client = reqwest::Client::new();
        let access_token = key.access_token(&client).await?;
        info!(account = %key.client_email, "authorized with Google Sheets");

        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            worksheet: config.worksheet.clone(),
            access_token,
            client,
        })
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}",
            self.api_base,
            urlencoding::encode(&self.spreadsheet_id),
            urlencoding::encode(range)
        )
    }

    async fn check(response: reqwest::Response) -> Result<(), SheetsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(SheetsError::Status {
            status,
            message: response.text().await.unwrap_or_default(),
        })
    }
}

/// Quote a worksheet name for A1 notation when it is not a bare identifier.
fn quote_sheet_name(name: &str) -> String {
    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

fn a1_range(worksheet: &str, cell: &str) -> String {
    format!("{}!{}", quote_sheet_name(worksheet), cell)
}

#[async_trait]
impl SheetPublisher for GoogleSheetsClient {
    async fn clear(&self) -> Result<(), SheetsError> {
        let url = format!("{}:clear", self.values_url(&quote_sheet_name(&self.worksheet)));
        info!(worksheet = %self.worksheet, "clearing worksheet");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        Self::check(response).await
    }

    async fn update(&self, top_left: &str, rows: &[Vec<Value>]) -> Result<(), SheetsError> {
        let range = a1_range(&self.worksheet, top_left);
        let body = ValueRange {
            range: range.clone(),
            major_dimension: "ROWS",
            values: rows,
        };
        info!(%range, rows = rows.len(), "writing rows");

        let response = self
            .client
            .put(self.values_url(&range))
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&body)
            .send()
            .await?;
        Self::check(response).await
    }
}
