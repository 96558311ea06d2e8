//! Spreadsheet access: A1 range addresses, the report's sheet layout, the
//! `SheetStore` seam and its Google Sheets implementation.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::http;
use crate::types::Chamber;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// Convert a 1-based column number to letters (1 -> A, 27 -> AA)
pub fn column_letters(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Convert column letters to a 1-based column number
pub fn column_number(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0u32, |acc, c| {
        let c = c.to_ascii_uppercase();
        if !c.is_ascii_uppercase() {
            return None;
        }
        acc.checked_mul(26)?.checked_add(c as u32 - 'A' as u32 + 1)
    })
}

/// One corner of a range; either part may be open (`A`, `2`, `C2`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub col: Option<u32>,
    pub row: Option<u32>,
}

impl CellRef {
    pub fn new(col: Option<u32>, row: Option<u32>) -> Self {
        Self { col, row }
    }

    fn parse(s: &str) -> Result<Self> {
        let split = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
        let (letters, digits) = s.split_at(split);
        let col = if letters.is_empty() {
            None
        } else {
            Some(column_number(letters).ok_or_else(|| Error::Range(s.to_string()))?)
        };
        let row = if digits.is_empty() {
            None
        } else {
            Some(digits.parse().map_err(|_| Error::Range(s.to_string()))?)
        };
        if col.is_none() && row.is_none() {
            return Err(Error::Range(s.to_string()));
        }
        Ok(Self { col, row })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = self.col {
            f.write_str(&column_letters(col))?;
        }
        if let Some(row) = self.row {
            write!(f, "{}", row)?;
        }
        Ok(())
    }
}

/// An A1-style address such as `Senate!C2:F2` or `'My Tab'!A6:A`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub sheet: String,
    pub start: CellRef,
    pub end: Option<CellRef>,
}

impl A1Range {
    pub fn new(sheet: impl Into<String>, start: CellRef, end: Option<CellRef>) -> Self {
        Self {
            sheet: sheet.into(),
            start,
            end,
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let (sheet, cells) = s
            .rsplit_once('!')
            .ok_or_else(|| Error::Range(format!("missing sheet name in '{}'", s)))?;
        let sheet = match sheet.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
            Some(quoted) => quoted.replace("''", "'"),
            None => sheet.to_string(),
        };
        let (start, end) = match cells.split_once(':') {
            Some((start, end)) => (CellRef::parse(start)?, Some(CellRef::parse(end)?)),
            None => (CellRef::parse(cells)?, None),
        };
        Ok(Self { sheet, start, end })
    }

    /// Same columns, different rows
    pub fn with_rows(&self, start_row: u32, end_row: Option<u32>) -> Self {
        Self {
            sheet: self.sheet.clone(),
            start: CellRef::new(self.start.col, Some(start_row)),
            end: Some(CellRef::new(
                self.end.and_then(|e| e.col).or(self.start.col),
                end_row,
            )),
        }
    }

    /// Top-left cell as 0-based (row, column) grid indexes
    pub fn origin(&self) -> Result<(u32, u32)> {
        match (self.start.row, self.start.col) {
            (Some(row), Some(col)) if row > 0 && col > 0 => Ok((row - 1, col - 1)),
            _ => Err(Error::Range(format!("range '{}' has no top-left cell", self))),
        }
    }
}

impl fmt::Display for A1Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            write!(f, "{}!{}", self.sheet, self.start)?;
        } else {
            write!(f, "'{}'!{}", self.sheet.replace('\'', "''"), self.start)?;
        }
        if let Some(end) = self.end {
            write!(f, ":{}", end)?;
        }
        Ok(())
    }
}

/// Where each part of a chamber's report lives on its tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub label_row: u32,
    pub status_row: u32,
    pub committee_row: u32,
    pub first_legislator_row: u32,
    pub district_col: u32,
    pub name_col: u32,
    pub first_bill_col: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            label_row: 2,
            status_row: 3,
            committee_row: 4,
            first_legislator_row: 6,
            district_col: 1,
            name_col: 2,
            first_bill_col: 3,
        }
    }
}

impl SheetLayout {
    fn legislator_column(&self, chamber: Chamber, col: u32) -> A1Range {
        A1Range::new(
            chamber.sheet_name(),
            CellRef::new(Some(col), Some(self.first_legislator_row)),
            Some(CellRef::new(Some(col), None)),
        )
    }

    /// `Senate!A6:A`
    pub fn district_range(&self, chamber: Chamber) -> A1Range {
        self.legislator_column(chamber, self.district_col)
    }

    /// `Senate!B6:B`
    pub fn name_range(&self, chamber: Chamber) -> A1Range {
        self.legislator_column(chamber, self.name_col)
    }

    /// `Senate!C2:2`
    pub fn bill_label_range(&self, chamber: Chamber) -> A1Range {
        A1Range::new(
            chamber.sheet_name(),
            CellRef::new(Some(self.first_bill_col), Some(self.label_row)),
            Some(CellRef::new(None, Some(self.label_row))),
        )
    }

    /// Status row under the columns the label range actually covers
    pub fn status_range(&self, labels: &A1Range) -> A1Range {
        labels.with_rows(self.status_row, Some(self.status_row))
    }

    pub fn committee_range(&self, labels: &A1Range) -> A1Range {
        labels.with_rows(self.committee_row, Some(self.committee_row))
    }

    /// Role block: label columns, legislator rows to the bottom of the tab
    pub fn role_range(&self, labels: &A1Range) -> A1Range {
        labels.with_rows(self.first_legislator_row, None)
    }
}

/// Values of a range as returned by the spreadsheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    pub range: String,
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

impl ValueRange {
    /// First cell of every row, blank for empty rows
    pub fn first_column(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|row| row.first().cloned().unwrap_or_default())
            .collect()
    }

    pub fn first_row(&self) -> Vec<String> {
        self.values.first().cloned().unwrap_or_default()
    }
}

/// A text cell carrying a hyperlink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkCell {
    pub text: String,
    pub url: String,
}

/// Rectangular read/write access to a spreadsheet
#[async_trait]
pub trait SheetStore: Send + Sync {
    async fn read_range(&self, range: &A1Range) -> Result<ValueRange>;

    /// Replace the contents of `range` with row-major `values`
    async fn write_range(&self, range: &A1Range, values: Vec<Vec<String>>) -> Result<()>;

    /// Write linked text cells down one column, starting at the range's top-left cell
    async fn write_links(&self, range: &A1Range, cells: Vec<LinkCell>) -> Result<()>;
}

/// Turn per-bill columns into sheet rows; short columns are padded with blanks
pub fn transpose(columns: &[Vec<String>]) -> Vec<Vec<String>> {
    let height = columns.iter().map(Vec::len).max().unwrap_or(0);
    (0..height)
        .map(|row| {
            columns
                .iter()
                .map(|col| col.get(row).cloned().unwrap_or_default())
                .collect()
        })
        .collect()
}

/// Read-modify-write of whole columns: the range is read first to learn the
/// extent the sheet actually addresses, then overwritten in place.
pub async fn write_columns<T: SheetStore + ?Sized>(
    store: &T,
    range: &A1Range,
    columns: &[Vec<String>],
) -> Result<()> {
    if columns.is_empty() {
        return Ok(());
    }
    let current = store.read_range(range).await?;
    let target = if current.range.is_empty() {
        range.clone()
    } else {
        A1Range::parse(&current.range)?
    };
    let rows = transpose(columns);
    tracing::debug!(
        range = %target,
        rows = rows.len(),
        columns = columns.len(),
        "writing columns"
    );
    store.write_range(&target, rows).await
}

/// Google Sheets v4 REST client
pub struct SheetsClient {
    client: Client,
    config: Config,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

impl SheetsClient {
    pub fn new(config: Config) -> Result<Self> {
        config.require_sheets()?;
        let client = http::build_client(&config.http)?;
        Ok(Self { client, config })
    }

    fn url(&self, tail: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.sheets.base_url)
            .map_err(|e| Error::Config(format!("Invalid sheets.base_url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config("sheets.base_url cannot be a base".to_string()))?
            .pop_if_empty()
            .push("spreadsheets")
            .extend(tail);
        Ok(url)
    }

    fn token(&self) -> &str {
        &self.config.sheets.access_token
    }

    /// Numeric id of a tab, needed by cell-level updates
    async fn sheet_id(&self, title: &str) -> Result<i64> {
        let url = self.url(&[self.config.sheets.spreadsheet_id.as_str()])?;
        let response = http::send_with_retry(&self.config.http, "spreadsheets.get", || {
            self.client
                .get(url.clone())
                .bearer_auth(self.token())
                .query(&[("fields", "sheets.properties")])
        })
        .await?;
        let meta: SpreadsheetMeta = serde_json::from_str(&response.text().await?)?;
        meta.sheets
            .into_iter()
            .find(|s| s.properties.title == title)
            .map(|s| s.properties.sheet_id)
            .ok_or_else(|| Error::Sheet(format!("no tab named '{}'", title)))
    }
}

#[async_trait]
impl SheetStore for SheetsClient {
    async fn read_range(&self, range: &A1Range) -> Result<ValueRange> {
        let address = range.to_string();
        let url = self.url(&[
            self.config.sheets.spreadsheet_id.as_str(),
            "values",
            address.as_str(),
        ])?;
        let response = http::send_with_retry(&self.config.http, "values.get", || {
            self.client.get(url.clone()).bearer_auth(self.token())
        })
        .await?;
        Ok(serde_json::from_str(&response.text().await?)?)
    }

    async fn write_range(&self, range: &A1Range, values: Vec<Vec<String>>) -> Result<()> {
        let address = range.to_string();
        let url = self.url(&[
            self.config.sheets.spreadsheet_id.as_str(),
            "values",
            address.as_str(),
        ])?;
        let body = json!({
            "range": address,
            "majorDimension": "ROWS",
            "values": values,
        });
        http::send_with_retry(&self.config.http, "values.update", || {
            self.client
                .put(url.clone())
                .bearer_auth(self.token())
                .query(&[("valueInputOption", "RAW")])
                .json(&body)
        })
        .await?;
        tracing::info!(range = %address, "updated range");
        Ok(())
    }

    async fn write_links(&self, range: &A1Range, cells: Vec<LinkCell>) -> Result<()> {
        if cells.is_empty() {
            return Ok(());
        }
        let (row_index, column_index) = range.origin()?;
        let sheet_id = self.sheet_id(&range.sheet).await?;
        let rows: Vec<serde_json::Value> = cells
            .iter()
            .map(|cell| {
                json!({
                    "values": [{
                        "userEnteredValue": { "stringValue": cell.text },
                        "textFormatRuns": [{
                            "startIndex": 0,
                            "format": { "link": { "uri": cell.url } },
                        }],
                    }]
                })
            })
            .collect();
        let body = json!({
            "requests": [{
                "updateCells": {
                    "start": {
                        "sheetId": sheet_id,
                        "rowIndex": row_index,
                        "columnIndex": column_index,
                    },
                    "rows": rows,
                    "fields": "userEnteredValue,textFormatRuns",
                }
            }]
        });
        let batch = format!("{}:batchUpdate", self.config.sheets.spreadsheet_id);
        let url = self.url(&[batch.as_str()])?;
        http::send_with_retry(&self.config.http, "spreadsheets.batchUpdate", || {
            self.client
                .post(url.clone())
                .bearer_auth(self.token())
                .json(&body)
        })
        .await?;
        tracing::info!(range = %range, cells = cells.len(), "updated linked cells");
        Ok(())
    }
}
