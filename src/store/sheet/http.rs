use anyhow::Context;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};

use super::row::COLUMNS;
use super::SheetBackend;
use crate::store::error::{Result, StoreError};

/// Sheet backend talking to a Google Sheets style `values` API.
pub struct SheetsHttpBackend {
    base_url: Url,
    sheet_id: String,
    tab: String,
    access_token: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl SheetsHttpBackend {
    pub fn new(
        api_url: &str,
        sheet_id: String,
        tab: String,
        access_token: String,
    ) -> anyhow::Result<Self> {
        let base_url =
            Url::parse(api_url).with_context(|| format!("invalid sheets api url: {api_url}"))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "sheets api url cannot be used as a base: {api_url}"
        );

        Ok(Self {
            base_url,
            sheet_id,
            tab,
            access_token,
            client: reqwest::Client::new(),
        })
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}[:{action}]`
    fn values_url(&self, range: &str, action: Option<&str>) -> Result<Url> {
        let last = match action {
            Some(action) => format!("{range}:{action}"),
            None => range.to_string(),
        };

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Backend("sheets api url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", &self.sheet_id, "values", &last]);
        Ok(url)
    }
}

#[async_trait]
impl SheetBackend for SheetsHttpBackend {
    async fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(&full_range(&self.tab), None)?;

        let data: ValueRange = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&[("majorDimension", "ROWS")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(data
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn append_row(&self, row: Vec<String>) -> Result<()> {
        let url = self.values_url(&full_range(&self.tab), Some("append"))?;

        self.client
            .post(url)
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({ "majorDimension": "ROWS", "values": [row] }))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn write_row(&self, position: usize, row: Vec<String>) -> Result<()> {
        let range = row_range(&self.tab, position);
        let url = self.values_url(&range, None)?;

        self.client
            .put(url)
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "majorDimension": "ROWS", "values": [row] }))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn clear_row(&self, position: usize) -> Result<()> {
        let url = self.values_url(&row_range(&self.tab, position), Some("clear"))?;

        self.client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&json!({}))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Spreadsheet column letters for a 1-based column number (1 = A, 27 = AA).
pub fn column_letter(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(b'A' + rem as u8);
        column = (column - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn last_column() -> String {
    column_letter(COLUMNS.len())
}

pub fn full_range(tab: &str) -> String {
    format!("{tab}!A:{}", last_column())
}

/// A1 range covering the row at 0-based `position`.
pub fn row_range(tab: &str, position: usize) -> String {
    let n = position + 1;
    format!("{tab}!A{n}:{}{n}", last_column())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> SheetsHttpBackend {
        SheetsHttpBackend::new(
            "https://sheets.googleapis.com",
            "sheet123".to_string(),
            "Bookings".to_string(),
            "token".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(49), "AW");
        assert_eq!(column_letter(0), "");
    }

    #[test]
    fn test_ranges_span_every_column() {
        assert_eq!(full_range("Bookings"), "Bookings!A:AW");
        assert_eq!(row_range("Bookings", 0), "Bookings!A1:AW1");
        assert_eq!(row_range("Bookings", 6), "Bookings!A7:AW7");
    }

    #[test]
    fn test_values_url() {
        let b = backend();

        let read = b.values_url("Bookings!A:AW", None).unwrap();
        assert_eq!(read.host_str(), Some("sheets.googleapis.com"));
        assert!(read
            .path()
            .ends_with("/v4/spreadsheets/sheet123/values/Bookings!A:AW"));

        let append = b.values_url("Bookings!A:AW", Some("append")).unwrap();
        assert!(append.path().ends_with("/values/Bookings!A:AW:append"));
    }

    #[test]
    fn test_base_url_with_path_prefix() {
        let b = SheetsHttpBackend::new(
            "http://localhost:8080/proxy/",
            "s".to_string(),
            "Tab".to_string(),
            "t".to_string(),
        )
        .unwrap();
        let url = b.values_url("Tab!A1:AW1", Some("clear")).unwrap();
        assert_eq!(url.path(), "/proxy/v4/spreadsheets/s/values/Tab!A1:AW1:clear");
    }

    #[test]
    fn test_rejects_bad_url() {
        assert!(SheetsHttpBackend::new("not a url", String::new(), String::new(), String::new())
            .is_err());
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(json!("x")), "x");
        assert_eq!(cell_text(json!(3)), "3");
        assert_eq!(cell_text(Value::Null), "");
    }
}
