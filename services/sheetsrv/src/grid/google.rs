//! Google Sheets REST v4 client
//!
//! Three calls against `spreadsheets.values`: read the A..M range, overwrite
//! one row range, and append with `INSERT_ROWS`. Values are written RAW so
//! cell text lands verbatim.

use async_trait::async_trait;
use errors::{SummitError, SummitResult};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::token::{build_http_client, TokenSource};
use super::{ensure_data_position, GridClient, GridRow, FIRST_DATA_ROW};
use crate::config::GridConfig;

/// Body of `values.get`
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Body of `values.update` / `values.append`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeWrite<'a> {
    major_dimension: &'static str,
    values: [&'a [String]; 1],
}

impl<'a> ValueRangeWrite<'a> {
    fn single_row(cells: &'a [String]) -> Self {
        Self {
            major_dimension: "ROWS",
            values: [cells],
        }
    }
}

/// Cell as text; numbers and booleans come through when the sheet is read
/// unformatted
fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub struct GoogleSheetsClient {
    http: Client,
    api_base: Url,
    spreadsheet_id: String,
    sheet_name: String,
    tokens: TokenSource,
}

impl GoogleSheetsClient {
    pub fn new(
        http: Client,
        api_base: &str,
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        tokens: TokenSource,
    ) -> SummitResult<Self> {
        let api_base = Url::parse(api_base).map_err(|e| SummitError::InvalidConfig {
            field: "grid.api_base".to_string(),
            reason: e.to_string(),
        })?;
        if api_base.cannot_be_a_base() {
            return Err(SummitError::InvalidConfig {
                field: "grid.api_base".to_string(),
                reason: "not a base URL".to_string(),
            });
        }

        Ok(Self {
            http,
            api_base,
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            tokens,
        })
    }

    /// Build from configuration, including the HTTP client and credentials
    pub fn from_config(config: &GridConfig) -> SummitResult<Self> {
        let http = build_http_client(config.request_timeout)?;
        let tokens = TokenSource::from_config(config, http.clone())?;
        debug!("Sheets client using {}", tokens.kind());
        Self::new(
            http,
            &config.api_base,
            &config.spreadsheet_id,
            &config.sheet_name,
            tokens,
        )
    }

    /// Sheet name as used in A1 notation; quoted unless purely alphanumeric
    fn sheet_ref(&self) -> String {
        if !self.sheet_name.is_empty()
            && self
                .sheet_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.sheet_name.clone()
        } else {
            format!("'{}'", self.sheet_name.replace('\'', "''"))
        }
    }

    fn columns_range(&self) -> String {
        format!("{}!A:M", self.sheet_ref())
    }

    fn row_range(&self, position: u32) -> String {
        format!("{}!A{}:M{}", self.sheet_ref(), position, position)
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}{suffix}`
    fn values_url(&self, range: &str, suffix: &str) -> SummitResult<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| SummitError::Internal("API base cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values"])
            .push(&format!("{}{}", range, suffix));
        Ok(url)
    }

    async fn check(response: Response) -> SummitResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Sheets API returned {}: {}", status, body);
        Err(SummitError::GridApi {
            status: status.as_u16(),
            message: extract_error_message(&body),
        })
    }
}

/// Google wraps errors as `{"error": {"message": ...}}`
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl GridClient for GoogleSheetsClient {
    async fn read_all(&self) -> SummitResult<Vec<GridRow>> {
        let url = self.values_url(&self.columns_range(), "")?;
        let token = self.tokens.access_token().await?;

        let response = self.http.get(url).bearer_auth(token).send().await?;
        let range: ValueRange = Self::check(response).await?.json().await?;

        // Row 1 is the header
        let rows: Vec<GridRow> = range
            .values
            .into_iter()
            .skip(1)
            .enumerate()
            .map(|(i, cells)| GridRow {
                position: i as u32 + FIRST_DATA_ROW,
                cells: cells.into_iter().map(cell_text).collect(),
            })
            .collect();

        debug!("Read {} data rows from {}", rows.len(), self.describe());
        Ok(rows)
    }

    async fn update_row(&self, position: u32, cells: &[String]) -> SummitResult<()> {
        ensure_data_position(position)?;

        let mut url = self.values_url(&self.row_range(position), "")?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let token = self.tokens.access_token().await?;

        let response = self
            .http
            .put(url)
            .bearer_auth(token)
            .json(&ValueRangeWrite::single_row(cells))
            .send()
            .await?;
        Self::check(response).await?;

        debug!("Updated row {} in {}", position, self.describe());
        Ok(())
    }

    async fn append_row(&self, cells: &[String]) -> SummitResult<()> {
        let mut url = self.values_url(&self.columns_range(), ":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        let token = self.tokens.access_token().await?;

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&ValueRangeWrite::single_row(cells))
            .send()
            .await?;
        Self::check(response).await?;

        debug!("Appended row to {}", self.describe());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("sheet {}/{}", self.spreadsheet_id, self.sheet_name)
    }
}
