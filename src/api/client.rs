use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;

use crate::action::Operation;
use crate::api::Service;
use crate::api::endpoint::{Body, request_for};
use crate::credentials::ApiContext;

const API_KEY_HEADER: &str = "X-Jsmon-Key";

// Shape of the service's error responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct JsmonClient {
    http_client: Client,
    context: ApiContext,
}

impl JsmonClient {
    pub fn new(context: ApiContext) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(concat!("jsmon-cli/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(JsmonClient {
            http_client,
            context,
        })
    }
}

#[async_trait]
impl Service for JsmonClient {
    async fn execute(&self, operation: &Operation) -> Result<Value> {
        let request = request_for(operation);
        let url = format!(
            "{}{}",
            self.context.base_url.trim_end_matches('/'),
            request.path
        );

        log::debug!("{} {}", request.method, url);

        let mut builder = self
            .http_client
            .request(request.method, &url)
            .header(API_KEY_HEADER, &self.context.api_key)
            .query(&request.query);

        builder = match request.body {
            Body::Empty => builder,
            Body::Json(body) => builder.json(&body),
            Body::File { path, headers } => {
                let bytes = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| String::from("upload"));

                let mut form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
                for header in headers {
                    form = form.text("headers", header);
                }
                builder.multipart(form)
            }
        };

        let resp = builder
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = resp.status();
        parse_response(&url, status, resp.text().await)
    }
}

/// Turn a response status and body into the printed value.
fn parse_response<E>(
    url: &str,
    status: StatusCode,
    body: std::result::Result<String, E>,
) -> Result<Value>
where
    E: std::error::Error + Send + Sync + 'static,
{
    let text = body.with_context(|| format!("Failed to read response body from {}", url))?;

    if !status.is_success() {
        let reason = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => body.message,
            Err(_) => text.trim().to_string(),
        };
        bail!("Unexpected status code from {}: {} {}", url, status, reason);
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    // Some endpoints answer with plain text.
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> JsmonClient {
        JsmonClient::new(ApiContext::new("test-key", server.base_url())).unwrap()
    }

    #[tokio::test]
    async fn test_execute_sends_key_and_body() {
        let mock_server = MockServer::start_async().await;

        let mock = mock_server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v2/getIps")
                    .header("X-Jsmon-Key", "test-key")
                    .json_body(json!({ "domains": ["a.com", "b.com"] }));
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!({ "ips": ["10.0.0.1"] }));
            })
            .await;

        let result = client_for(&mock_server)
            .execute(&Operation::Ips {
                domains: vec!["a.com".to_string(), "b.com".to_string()],
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result, json!({ "ips": ["10.0.0.1"] }));
    }

    #[tokio::test]
    async fn test_execute_sends_query() {
        let mock_server = MockServer::start_async().await;

        let mock = mock_server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v2/searchAllUrls")
                    .query_param("size", "25");
                then.status(200).body("[]");
            })
            .await;

        let result = client_for(&mock_server)
            .execute(&Operation::ViewUrls { size: 25 })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result, json!([]));
    }

    #[tokio::test]
    async fn test_execute_fails_on_error_status() {
        let mock_server = MockServer::start_async().await;

        mock_server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v2/usage");
                then.status(401).body("invalid api key");
            })
            .await;

        let err = client_for(&mock_server)
            .execute(&Operation::Profile)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("401"), "got: {}", err);
    }

    #[tokio::test]
    async fn test_execute_reports_error_message() {
        let mock_server = MockServer::start_async().await;

        mock_server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v2/getDomains");
                then.status(403)
                    .header("Content-Type", "application/json")
                    .json_body(json!({ "message": "quota exceeded" }));
            })
            .await;

        let err = client_for(&mock_server)
            .execute(&Operation::Domains)
            .await
            .unwrap_err();

        let err = err.to_string();
        assert!(err.contains("403"), "got: {}", err);
        assert!(err.ends_with("quota exceeded"), "got: {}", err);
    }

    #[test]
    fn test_unreadable_body_is_an_error() {
        let body: std::result::Result<String, std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed",
        ));

        let err = parse_response("http://api/v2/viewFiles", StatusCode::OK, body).unwrap_err();

        assert!(err.to_string().contains("Failed to read response body"), "got: {}", err);
    }

    #[test]
    fn test_empty_body_is_null() {
        let body: std::result::Result<String, std::io::Error> = Ok(" \n".to_string());

        let value = parse_response("http://api/v2/usage", StatusCode::OK, body).unwrap();

        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_result_id_is_sent_as_query() {
        let mock_server = MockServer::start_async().await;

        let mock = mock_server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v2/getResultByFileId")
                    .query_param("fileId", "../usage");
                then.status(200).json_body(json!({ "fileId": "../usage" }));
            })
            .await;

        let result = client_for(&mock_server)
            .execute(&Operation::ResultByFileId {
                id: "../usage".to_string(),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result, json!({ "fileId": "../usage" }));
    }

    #[tokio::test]
    async fn test_execute_keeps_plain_text_responses() {
        let mock_server = MockServer::start_async().await;

        mock_server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v2/stopCron");
                then.status(200).body("cron stopped");
            })
            .await;

        let result = client_for(&mock_server)
            .execute(&Operation::Cron(crate::action::CronJob::Stop))
            .await
            .unwrap();

        assert_eq!(result, Value::String("cron stopped".to_string()));
    }

    #[tokio::test]
    async fn test_upload_file_reports_missing_file() {
        let mock_server = MockServer::start_async().await;

        let err = client_for(&mock_server)
            .execute(&Operation::UploadFile {
                path: "/nonexistent/jsmon/app.js".into(),
                headers: Default::default(),
            })
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to read"), "got: {}", err);
    }
}
