//! Jira REST client implementing the tracker traits.
//!
//! Speaks the v2 REST API with Basic auth. The connector validates
//! credentials against `/serverInfo` before handing out a client, so a
//! bad base URL or token fails the whole sync up front as a connection
//! error instead of midway through as a fetch error.

use async_trait::async_trait;
use base64::Engine as _;
use chrono::NaiveDate;
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::TrackerConfig;
use crate::error::AppError;
use crate::services::tracker::{RemoteEpic, RemoteProject, Tracker, TrackerConnector};

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connector holding (possibly absent) tracker credentials.
///
/// Credentials are optional so the service can boot without them; every
/// `connect` call then fails cleanly until they are provided.
pub struct JiraConnector {
    config: Option<TrackerConfig>,
}

impl JiraConnector {
    pub fn new(config: Option<TrackerConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TrackerConnector for JiraConnector {
    async fn connect(&self) -> Result<Box<dyn Tracker>, AppError> {
        let Some(config) = &self.config else {
            return Err(AppError::connection(
                "Tracker credentials are not configured",
            ));
        };

        let client = JiraClient::new(config)?;
        client.server_info().await?;
        Ok(Box::new(client))
    }
}

/// Connected Jira REST client.
pub struct JiraClient {
    client: Client,
    base_url: String,
}

/// Build the JQL query selecting a project's epics, newest first.
fn epics_jql(project_key: &str) -> String {
    format!(
        "project = \"{}\" AND issuetype = Epic ORDER BY created DESC",
        project_key
    )
}

impl JiraClient {
    /// Create a new client with Basic auth headers installed.
    pub fn new(config: &TrackerConfig) -> Result<Self, AppError> {
        let mut headers = header::HeaderMap::new();

        let credentials = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", config.username, config.api_token));
        let auth_value = header::HeaderValue::from_str(&format!("Basic {}", credentials))
            .map_err(|_| AppError::connection("Invalid characters in tracker credentials"))?;
        headers.insert(header::AUTHORIZATION, auth_value);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Get the base URL for API requests.
    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/2{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Credential handshake. Any failure here counts as a connection error.
    pub async fn server_info(&self) -> Result<(), AppError> {
        let url = self.api_url("/serverInfo");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::connection(format!("Failed to connect to tracker: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::connection(format!(
                "Tracker handshake failed with status {}",
                response.status().as_u16()
            )));
        }

        Ok(())
    }

    /// Decode a successful response or turn the error body into a fetch error.
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T, AppError> {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| AppError::fetch(format!("Failed to parse tracker response: {}", e)))
        } else {
            let status_code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            // Jira reports errors as {"errorMessages": ["..."], "errors": {...}}
            let body_message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| {
                    v.get("errorMessages")
                        .and_then(|m| m.as_array())
                        .and_then(|a| a.first())
                        .and_then(|m| m.as_str())
                        .map(String::from)
                });

            let message = match body_message {
                Some(msg) => msg,
                None => format!("Request failed ({}): {}", status_code, body),
            };

            Err(AppError::fetch(message))
        }
    }
}

#[async_trait]
impl Tracker for JiraClient {
    async fn get_project(&self, key: &str) -> Result<RemoteProject, AppError> {
        let url = self.api_url(&format!("/project/{}", urlencoding::encode(key)));
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::not_found_with_key(
                format!("tracker project '{}'", key),
                key,
            ));
        }

        let project: ProjectBean = self.handle_response(response).await?;
        Ok(RemoteProject {
            key: project.key,
            name: project.name,
            description: project.description,
        })
    }

    async fn search_epics(
        &self,
        project_key: &str,
        max_results: u32,
    ) -> Result<Vec<RemoteEpic>, AppError> {
        let url = self.api_url("/search");
        let jql = epics_jql(project_key);
        let max_results = max_results.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("jql", jql.as_str()),
                ("maxResults", max_results.as_str()),
                ("fields", "summary,description,duedate,status"),
            ])
            .send()
            .await?;

        let results: SearchResponse = self.handle_response(response).await?;
        Ok(results
            .issues
            .into_iter()
            .map(|issue| RemoteEpic {
                key: issue.key,
                summary: issue.fields.summary,
                description: issue.fields.description,
                due_date: issue.fields.duedate,
                status_name: issue.fields.status.name,
            })
            .collect())
    }
}

/// Project payload from GET /project/{key}.
#[derive(Debug, Deserialize)]
struct ProjectBean {
    key: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
}

/// Search payload from GET /search.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    issues: Vec<IssueBean>,
}

#[derive(Debug, Deserialize)]
struct IssueBean {
    key: String,
    fields: IssueFields,
}

#[derive(Debug, Deserialize)]
struct IssueFields {
    summary: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    duedate: Option<NaiveDate>,
    status: StatusBean,
}

#[derive(Debug, Deserialize)]
struct StatusBean {
    name: String,
}
