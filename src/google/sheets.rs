use super::auth::TokenProvider;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Google Sheets v4 `spreadsheets.values` client for one spreadsheet
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: reqwest::Client,
    auth: Arc<TokenProvider>,
    spreadsheet_id: String,
    api_url: String,
}

impl SheetsClient {
    pub fn new(
        client: reqwest::Client,
        auth: Arc<TokenProvider>,
        spreadsheet_id: &str,
        api_url: &str,
    ) -> Self {
        Self {
            client,
            auth,
            spreadsheet_id: spreadsheet_id.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.api_url, self.spreadsheet_id, range
        )
    }

    /// Read `range` (A1 notation); cells are returned as strings
    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let token = self.auth.access_token().await?;

        let response = self
            .client
            .get(self.values_url(range))
            .bearer_auth(token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to send request to Sheets API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Sheets API error reading {} ({}): {}", range, status, body);
        }

        let range_values: ValueRange = response
            .json()
            .await
            .context("Failed to parse Sheets API response")?;

        Ok(range_values
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    /// Append rows after the last row of `range` with `valueInputOption=RAW`
    pub async fn append_row(&self, range: &str, row: Vec<String>) -> Result<()> {
        let token = self.auth.access_token().await?;

        let body = ValueRange {
            values: vec![row.into_iter().map(serde_json::Value::String).collect()],
        };

        let response = self
            .client
            .post(format!("{}:append", self.values_url(range)))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to send request to Sheets API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Sheets API error appending to {} ({}): {}", range, status, body);
        }

        Ok(())
    }
}

fn cell_to_string(cell: serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
