//! Spreadsheet service client over HTTP
//!
//! Spreadsheets are located by name through the Drive files listing, the
//! worksheet title is confirmed against the spreadsheet metadata, and rows
//! are written with the `values:append` endpoint.

use super::{CellValue, RemoteStore, Worksheet};
use crate::config::StoreConfig;
use crate::error::{ConnectionError, WriteError};
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
const DRIVE_BASE_URL: &str = "https://www.googleapis.com";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

// RAW stores cells as sent; the sheet never re-parses amounts or dates
const APPEND_QUERY: [(&str, &str); 2] = [
    ("valueInputOption", "RAW"),
    ("insertDataOption", "INSERT_ROWS"),
];

pub struct SheetsApiStore {
    client: Client,
    token: String,
    sheets_base: String,
    drive_base: String,
}

impl SheetsApiStore {
    pub fn new(token: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ConnectionError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConnectionError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            token: token.into(),
            sheets_base: SHEETS_BASE_URL.to_string(),
            drive_base: DRIVE_BASE_URL.to_string(),
        })
    }

    /// Build from configuration, reading the bearer token from the environment
    pub fn from_config(config: &StoreConfig) -> Result<Self, ConnectionError> {
        let token = std::env::var(&config.token_env).map_err(|_| {
            ConnectionError::Auth(format!("environment variable {} is not set", config.token_env))
        })?;

        let mut store = Self::new(token, config.timeout_secs.map(Duration::from_secs))?;
        if let Some(base) = &config.sheets_base_url {
            store.sheets_base = base.trim_end_matches('/').to_string();
        }
        if let Some(base) = &config.drive_base_url {
            store.drive_base = base.trim_end_matches('/').to_string();
        }
        Ok(store)
    }

    fn find_spreadsheet_id(&self, name: &str) -> Result<String, ConnectionError> {
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            escape_query_literal(name),
            SPREADSHEET_MIME
        );
        let response = self
            .client
            .get(format!("{}/drive/v3/files", self.drive_base))
            .bearer_auth(&self.token)
            .query(&[("q", query.as_str()), ("fields", "files(id,name)")])
            .send()
            .map_err(|e| ConnectionError::Transport(e.to_string()))?;
        let response = check_connect_status(response)?;

        let listing: FileList = response
            .json()
            .map_err(|e| ConnectionError::Transport(e.to_string()))?;
        listing
            .files
            .into_iter()
            .find(|f| f.name == name)
            .map(|f| f.id)
            .ok_or_else(|| ConnectionError::SpreadsheetNotFound(name.to_string()))
    }

    fn worksheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>, ConnectionError> {
        let response = self
            .client
            .get(format!("{}/v4/spreadsheets/{}", self.sheets_base, spreadsheet_id))
            .bearer_auth(&self.token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .map_err(|e| ConnectionError::Transport(e.to_string()))?;
        let response = check_connect_status(response)?;

        let meta: SpreadsheetMeta = response
            .json()
            .map_err(|e| ConnectionError::Transport(e.to_string()))?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }
}

impl RemoteStore for SheetsApiStore {
    fn open(&self, spreadsheet: &str, worksheet: &str) -> Result<Arc<dyn Worksheet>, ConnectionError> {
        let spreadsheet_id = self.find_spreadsheet_id(spreadsheet)?;
        let titles = self.worksheet_titles(&spreadsheet_id)?;
        if !titles.iter().any(|t| t == worksheet) {
            return Err(ConnectionError::WorksheetNotFound {
                spreadsheet: spreadsheet.to_string(),
                worksheet: worksheet.to_string(),
            });
        }

        let append_url = append_url(&self.sheets_base, &spreadsheet_id, worksheet)
            .map_err(ConnectionError::Transport)?;
        debug!(%append_url, "resolved worksheet");

        Ok(Arc::new(SheetsWorksheet {
            client: self.client.clone(),
            token: self.token.clone(),
            title: worksheet.to_string(),
            append_url,
        }))
    }
}

struct SheetsWorksheet {
    client: Client,
    token: String,
    title: String,
    append_url: Url,
}

impl Worksheet for SheetsWorksheet {
    fn title(&self) -> &str {
        &self.title
    }

    fn append_row(&self, row: &[CellValue]) -> Result<(), WriteError> {
        let response = append_request(&self.client, self.append_url.clone(), &self.token, row)
            .send()
            .map_err(|e| WriteError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(WriteError::Rejected {
            status: status.as_u16(),
            message: error_message(response),
        })
    }
}

/// `{base}/v4/spreadsheets/{id}/values/'{title}'!A1:append`
fn append_url(base: &str, spreadsheet_id: &str, title: &str) -> Result<Url, String> {
    let mut url = Url::parse(&format!("{}/v4/spreadsheets/{}", base, spreadsheet_id))
        .map_err(|e| e.to_string())?;
    let range = format!("'{}'!A1:append", title.replace('\'', "''"));
    url.path_segments_mut()
        .map_err(|_| format!("cannot append path segments to {}", base))?
        .extend(["values", range.as_str()]);
    Ok(url)
}

fn append_request(client: &Client, url: Url, token: &str, row: &[CellValue]) -> RequestBuilder {
    client
        .post(url)
        .bearer_auth(token)
        .query(&APPEND_QUERY)
        .json(&json!({ "values": [row] }))
}

fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn check_connect_status(response: Response) -> Result<Response, ConnectionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = error_message(response);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ConnectionError::Auth(message)),
        StatusCode::NOT_FOUND => Err(ConnectionError::SpreadsheetNotFound(message)),
        _ => Err(ConnectionError::Transport(format!("{}: {}", status, message))),
    }
}

fn error_message(response: Response) -> String {
    let status = response.status();
    match response.json::<ApiErrorBody>() {
        Ok(body) => body.error.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_string(),
    }
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}
