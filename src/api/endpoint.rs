use std::path::PathBuf;

use reqwest::Method;
use serde_json::{Value, json};

use crate::action::{CronJob, Operation};

pub const API_PREFIX: &str = "/api/v2";

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    File { path: PathBuf, headers: Vec<String> },
}

/// HTTP request an operation translates to, relative to the base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Body,
}

impl ApiRequest {
    fn get(path: &str) -> Self {
        ApiRequest {
            method: Method::GET,
            path: format!("{}{}", API_PREFIX, path),
            query: Vec::new(),
            body: Body::Empty,
        }
    }

    fn post(path: &str, body: Value) -> Self {
        ApiRequest {
            method: Method::POST,
            path: format!("{}{}", API_PREFIX, path),
            query: Vec::new(),
            body: Body::Json(body),
        }
    }

    fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

pub fn request_for(operation: &Operation) -> ApiRequest {
    match operation {
        Operation::ScanFile { file_id } => {
            ApiRequest::post("/scanFile", json!({ "fileId": file_id }))
        }
        Operation::UploadFile { path, headers } => ApiRequest {
            method: Method::POST,
            path: format!("{}/uploadFile", API_PREFIX),
            query: Vec::new(),
            body: Body::File {
                path: path.clone(),
                headers: headers.as_slice().to_vec(),
            },
        },
        Operation::UploadUrl { url, headers } => ApiRequest::post(
            "/uploadUrl",
            json!({ "url": url, "customHeaders": headers.as_slice() }),
        ),
        Operation::RescanUrl { scan_id } => {
            ApiRequest::post("/rescanUrl", json!({ "scanId": scan_id }))
        }
        Operation::ViewUrls { size } => ApiRequest::get("/searchAllUrls").query("size", size),
        Operation::ViewFiles => ApiRequest::get("/viewFiles"),
        Operation::ScannerData => ApiRequest::get("/getScannerResults"),
        Operation::RescanDomain { domain } => {
            ApiRequest::post("/rescanDomain", json!({ "domain": domain }))
        }
        Operation::TotalAnalysisData => ApiRequest::get("/getTotalAnalysisData"),
        Operation::SearchUrlsByDomain { domain } => {
            ApiRequest::get("/searchUrlsByDomain").query("domain", domain)
        }
        Operation::ChangedUrls => ApiRequest::get("/urlsMultipleResponse"),
        Operation::Emails { domains } => domains_request("/getEmails", domains),
        Operation::S3Domains { domains } => domains_request("/getS3Domains", domains),
        Operation::Ips { domains } => domains_request("/getIps", domains),
        Operation::GqlOps { domains } => domains_request("/getGqlOps", domains),
        Operation::DomainUrls { domains } => domains_request("/getDomainUrls", domains),
        Operation::ApiPaths { domains } => domains_request("/getApiPaths", domains),
        Operation::ResultByJsmonId { id } => {
            ApiRequest::get("/getResultByJsmonId").query("jsmonId", id)
        }
        Operation::ResultByFileId { id } => {
            ApiRequest::get("/getResultByFileId").query("fileId", id)
        }
        Operation::ReverseSearch { field, value } => ApiRequest::get("/reverseSearchResults")
            .query("field", field)
            .query("value", value),
        Operation::ScanDomain { domain, words } => {
            ApiRequest::post("/scanDomain", json!({ "domain": domain, "words": words }))
        }
        Operation::Profile => ApiRequest::get("/usage"),
        Operation::AutomationData { domain, size } => ApiRequest::get("/getAllAutomationResults")
            .query("domain", domain)
            .query("size", size),
        Operation::Domains => ApiRequest::get("/getDomains"),
        Operation::Cron(job) => cron_request(job),
    }
}

fn domains_request(path: &str, domains: &[String]) -> ApiRequest {
    ApiRequest::post(path, json!({ "domains": domains }))
}

fn cron_request(job: &CronJob) -> ApiRequest {
    match job {
        CronJob::Start {
            notifications,
            time,
            types,
        } => ApiRequest::post(
            "/startCron",
            json!({
                "notificationChannel": notifications,
                "time": time,
                "vulnerabilitiesType": types,
            }),
        ),
        CronJob::Update {
            notifications,
            time,
            types,
        } => {
            let mut body = serde_json::Map::new();
            if !notifications.is_empty() {
                body.insert("notificationChannel".to_string(), json!(notifications));
            }
            if let Some(time) = time {
                body.insert("time".to_string(), json!(time));
            }
            if !types.is_empty() {
                body.insert("vulnerabilitiesType".to_string(), json!(types));
            }
            ApiRequest {
                method: Method::PUT,
                ..ApiRequest::post("/updateCron", Value::Object(body))
            }
        }
        CronJob::Stop => ApiRequest::post("/stopCron", json!({})),
    }
}
