//! Blocking Jira Cloud REST client.
//!
//! Authenticates with HTTP basic auth (account e-mail + API token). Every
//! call is sequential; the importer depends on each creation finishing
//! before the next one references its key.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::models::{
    CreateIssueRequest, CreatedIssue, EpicIssuesRequest, ErrorCollection, Issue, SearchResponse,
};
use crate::config::JiraCredentials;
use crate::{HierarchyError, Result};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Page size requested from the search endpoint.
pub const SEARCH_PAGE_SIZE: u32 = 100;

const SEARCH_PATH: &str = "/rest/api/2/search";
const ISSUE_PATH: &str = "/rest/api/2/issue";

/// Jira REST client bound to one site.
#[derive(Clone)]
pub struct JiraClient {
    client: Client,
    base_url: String,
    user: String,
    api_token: String,
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl JiraClient {
    /// Create a client for the given site.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the HTTP client cannot be built.
    pub fn new(credentials: &JiraCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(concat!("jira_hierarchy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(transport)?;

        Ok(Self {
            client,
            base_url: credentials.base_url.trim_end_matches('/').to_string(),
            user: credentials.user.clone(),
            api_token: credentials.api_token.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a JQL search and return every matching issue, following pages
    /// until the reported total or an empty page.
    ///
    /// # Errors
    ///
    /// Returns the first failing page's error.
    pub fn search_all(&self, jql: &str, fields: &[&str]) -> Result<Vec<Issue>> {
        let fields = fields.join(",");
        let mut issues = Vec::new();
        let mut start_at: u32 = 0;

        loop {
            let start = start_at.to_string();
            let page_size = SEARCH_PAGE_SIZE.to_string();
            let query = [
                ("jql", jql),
                ("startAt", start.as_str()),
                ("maxResults", page_size.as_str()),
                ("fields", fields.as_str()),
            ];
            let page: SearchResponse = self.get(SEARCH_PATH, &query)?;
            let received = u32::try_from(page.issues.len()).unwrap_or(u32::MAX);
            debug!(
                jql,
                start_at = page.start_at,
                page_size = page.max_results,
                received,
                total = page.total,
                "Search page"
            );
            issues.extend(page.issues);

            // The server may cap pages below SEARCH_PAGE_SIZE; only `total` ends the walk.
            start_at = start_at.saturating_add(received);
            if received == 0 || start_at >= page.total {
                break;
            }
        }

        Ok(issues)
    }

    /// Create one issue and return its key.
    ///
    /// # Errors
    ///
    /// Returns `Api` with Jira's error messages if the create is rejected.
    pub fn create_issue(&self, request: &CreateIssueRequest) -> Result<CreatedIssue> {
        self.post(ISSUE_PATH, request)
    }

    /// Move issues into an Epic through the agile API.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown Epic, otherwise `Api`.
    pub fn add_issues_to_epic(&self, epic_key: &str, issue_keys: &[String]) -> Result<()> {
        let path = format!("/rest/agile/1.0/epic/{epic_key}/issue");
        let body = EpicIssuesRequest { issues: issue_keys };
        self.post_empty(&path, &body)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.user, Some(&self.api_token))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Make an authenticated GET request.
    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, "GET request");

        let response = self
            .authed(self.client.get(&url))
            .query(query)
            .send()
            .map_err(transport)?;
        handle_response(response)
    }

    /// Make an authenticated POST request with a JSON body.
    fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let url = self.url(path);
        debug!(url = %url, "POST request");

        let response = self
            .authed(self.client.post(&url))
            .json(body)
            .send()
            .map_err(transport)?;
        handle_response(response)
    }

    /// Make an authenticated POST request that returns no body.
    fn post_empty<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.url(path);
        debug!(url = %url, "POST request (empty response)");

        let response = self
            .authed(self.client.post(&url))
            .json(body)
            .send()
            .map_err(transport)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let text = response.text().unwrap_or_default();
            Err(status_error(status, &text))
        }
    }
}

/// Parse a JSON body or turn the status into an error.
fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let text = response.text().map_err(transport)?;

    if status.is_success() {
        serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, "Failed to parse response");
            HierarchyError::Json(e)
        })
    } else {
        Err(status_error(status, &text))
    }
}

fn status_error(status: StatusCode, body: &str) -> HierarchyError {
    let message = error_message(body);
    if status == StatusCode::NOT_FOUND {
        HierarchyError::NotFound(message)
    } else {
        HierarchyError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Prefer Jira's structured error list; fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorCollection>(body)
        .ok()
        .and_then(|errors| errors.summary())
        .unwrap_or_else(|| body.trim().to_string())
}

fn transport(err: reqwest::Error) -> HierarchyError {
    HierarchyError::Transport(err.to_string())
}
