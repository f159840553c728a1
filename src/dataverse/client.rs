// src/dataverse/client.rs

use std::sync::Arc;

use reqwest::{Client, Response, StatusCode};
use serde_json::{Map, Value};

use crate::{auth::TokenProvider, common::error::AppError};

use super::query::QueryOptions;

const API_SEGMENT: &str = "api/data";

/// Thin transport over the Dataverse Web API: bearer auth on every call,
/// OData v4 headers, JSON in and out. All business mapping lives above this.
#[derive(Clone)]
pub struct DataverseClient {
    http: Client,
    base_url: String,
    api_version: String,
    tokens: Arc<dyn TokenProvider>,
}

impl DataverseClient {
    pub fn new(base_url: impl Into<String>, api_version: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_version: api_version.into(),
            tokens,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}/{}", self.base_url, API_SEGMENT, self.api_version, path)
    }

    /// GET an entity set. Requests formatted-value annotations so optionset
    /// labels and lookup names arrive alongside the raw codes.
    pub async fn get_list(&self, path: &str, options: &QueryOptions) -> Result<Vec<Map<String, Value>>, AppError> {
        let body = self.get(path, options).await?;
        let rows = body
            .get("value")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(rows
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect())
    }

    pub async fn get(&self, path: &str, options: &QueryOptions) -> Result<Value, AppError> {
        let token = self.tokens.get_token().await?;
        let response = self
            .http
            .get(self.url(path))
            .query(&options.to_pairs())
            .bearer_auth(&token)
            .header("Accept", "application/json")
            .header("OData-MaxVersion", "4.0")
            .header("OData-Version", "4.0")
            .header("Prefer", "odata.include-annotations=\"*\"")
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// POST a new row; Dataverse returns the assigned id in the
    /// `OData-EntityId` header as `.../entityset(<guid>)`.
    pub async fn post(&self, path: &str, body: &Map<String, Value>) -> Result<String, AppError> {
        let token = self.tokens.get_token().await?;
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&token)
            .header("Accept", "application/json")
            .header("OData-MaxVersion", "4.0")
            .header("OData-Version", "4.0")
            .json(body)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let entity_id = response
            .headers()
            .get("OData-EntityId")
            .and_then(|v| v.to_str().ok())
            .map(extract_guid)
            .unwrap_or_default();
        Ok(entity_id)
    }

    pub async fn patch(&self, path: &str, body: &Map<String, Value>) -> Result<(), AppError> {
        let token = self.tokens.get_token().await?;
        let response = self
            .http
            .patch(self.url(path))
            .bearer_auth(&token)
            .header("Accept", "application/json")
            .header("OData-MaxVersion", "4.0")
            .header("OData-Version", "4.0")
            // Never upsert: a PATCH against a missing row must fail loudly.
            .header("If-Match", "*")
            .json(body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn check(response: Response) -> Result<Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, %message, "dataverse call failed");
        Err(AppError::Api {
            status: status.as_u16(),
            message: summarize_error(status, &message),
        })
    }
}

/// Pull the GUID out of `https://…/entityset(00000000-…)`. A header that
/// does not carry a well-formed GUID comes back verbatim so the caller can
/// log it.
fn extract_guid(entity_id_header: &str) -> String {
    entity_id_header
        .rsplit_once('(')
        .and_then(|(_, rest)| rest.strip_suffix(')'))
        .and_then(|raw| uuid::Uuid::parse_str(raw).ok())
        .map(|guid| guid.to_string())
        .unwrap_or_else(|| entity_id_header.to_string())
}

/// Dataverse error bodies nest the human message under error.message; fall
/// back to the raw body (truncated) when that shape is absent.
fn summarize_error(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        if let Some(message) = parsed
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
        {
            return message.to_string();
        }
    }
    let mut summary = body.chars().take(200).collect::<String>();
    if summary.is_empty() {
        summary = status.to_string();
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guid_is_extracted_from_entity_id_header() {
        let header =
            "https://org.crm5.dynamics.com/api/data/v9.2/crdfd_potentialcustomers(0a1b2c3d-1111-2222-3333-444455556666)";
        assert_eq!(extract_guid(header), "0a1b2c3d-1111-2222-3333-444455556666");
    }

    #[test]
    fn error_summary_prefers_odata_message() {
        let body = r#"{"error":{"code":"0x80040217","message":"Entity does not exist"}}"#;
        assert_eq!(
            summarize_error(StatusCode::NOT_FOUND, body),
            "Entity does not exist"
        );
    }

    #[test]
    fn error_summary_falls_back_to_status() {
        assert_eq!(
            summarize_error(StatusCode::BAD_GATEWAY, ""),
            "502 Bad Gateway"
        );
    }
}
