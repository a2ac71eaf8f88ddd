use std::path::PathBuf;

use thiserror::Error;

use crate::flags::FlagState;
use crate::input::{DomainList, HeaderList, parse_domains, present};

/// Usage section an action or parameter is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    General,
    Cron,
    More,
}

/// A remote call together with its normalized arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ScanFile { file_id: String },
    UploadFile { path: PathBuf, headers: HeaderList },
    UploadUrl { url: String, headers: HeaderList },
    RescanUrl { scan_id: String },
    ViewUrls { size: u32 },
    ViewFiles,
    ScannerData,
    RescanDomain { domain: String },
    TotalAnalysisData,
    SearchUrlsByDomain { domain: String },
    ChangedUrls,
    Emails { domains: DomainList },
    S3Domains { domains: DomainList },
    Ips { domains: DomainList },
    GqlOps { domains: DomainList },
    DomainUrls { domains: DomainList },
    ApiPaths { domains: DomainList },
    ResultByJsmonId { id: String },
    ResultByFileId { id: String },
    ReverseSearch { field: String, value: String },
    ScanDomain { domain: String, words: Vec<String> },
    Profile,
    AutomationData { domain: String, size: u32 },
    Domains,
    Cron(CronJob),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CronJob {
    Start {
        notifications: Vec<String>,
        time: i64,
        types: Vec<String>,
    },
    Update {
        notifications: Vec<String>,
        time: Option<i64>,
        types: Vec<String>,
    },
    Stop,
}

/// Input problems caught before anything is sent.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ActionError {
    #[error("invalid -reverseSearchResults value '{0}': expected field=value")]
    MalformedReverseSearch(String),

    #[error("-{0} needs at least one domain")]
    EmptyList(&'static str),

    #[error("unknown -cron command '{0}': expected start, stop or update")]
    UnknownCron(String),

    #[error("-cron {command} requires {missing}")]
    CronMissing {
        command: &'static str,
        missing: &'static str,
    },
}

/// One entry of the dispatch table.
pub struct Action {
    pub flag: &'static str,
    pub value: Option<&'static str>,
    pub help: &'static str,
    pub section: Section,
    pub applies: fn(&FlagState) -> bool,
    pub build: fn(&FlagState) -> Result<Operation, ActionError>,
}

/// A flag that only feeds arguments to an action.
pub struct Parameter {
    pub flag: &'static str,
    pub value: Option<&'static str>,
    pub help: &'static str,
    pub section: Section,
}

/// All actions, in the order they are tried.
pub fn actions() -> Vec<Action> {
    vec![
        Action {
            flag: "scanFile",
            value: Some("<fileId>"),
            help: "File ID to scan",
            section: Section::General,
            applies: |f| present(&f.scan_file).is_some(),
            build: |f| {
                Ok(Operation::ScanFile {
                    file_id: required(&f.scan_file),
                })
            },
        },
        Action {
            flag: "uploadFile",
            value: Some("<filePath>"),
            help: "Path to local file to upload for scanning",
            section: Section::General,
            applies: |f| present(&f.upload_file).is_some(),
            build: |f| {
                Ok(Operation::UploadFile {
                    path: PathBuf::from(required(&f.upload_file)),
                    headers: headers(f),
                })
            },
        },
        Action {
            flag: "uploadUrl",
            value: Some("<url>"),
            help: "URL to upload for scanning",
            section: Section::General,
            applies: |f| present(&f.upload_url).is_some(),
            build: |f| {
                Ok(Operation::UploadUrl {
                    url: required(&f.upload_url),
                    headers: headers(f),
                })
            },
        },
        Action {
            flag: "scanUrl",
            value: Some("<url|scanId>"),
            help: "URL or scan ID to rescan",
            section: Section::General,
            applies: |f| present(&f.scan_url).is_some(),
            build: |f| {
                Ok(Operation::RescanUrl {
                    scan_id: required(&f.scan_url),
                })
            },
        },
        Action {
            flag: "urls",
            value: None,
            help: "View all URLs (see -urlSize)",
            section: Section::General,
            applies: |f| f.urls,
            build: |f| Ok(Operation::ViewUrls { size: f.url_size }),
        },
        Action {
            flag: "files",
            value: None,
            help: "View all uploaded files",
            section: Section::General,
            applies: |f| f.files,
            build: |_| Ok(Operation::ViewFiles),
        },
        Action {
            flag: "getScannerData",
            value: None,
            help: "Get scanner results",
            section: Section::General,
            applies: |f| f.get_scanner_data,
            build: |_| Ok(Operation::ScannerData),
        },
        Action {
            flag: "rescanDomain",
            value: Some("<domain>"),
            help: "Rescan all URLs of a domain",
            section: Section::General,
            applies: |f| present(&f.rescan_domain).is_some(),
            build: |f| {
                Ok(Operation::RescanDomain {
                    domain: required(&f.rescan_domain),
                })
            },
        },
        Action {
            flag: "totalAnalysisData",
            value: None,
            help: "Get total analysis counts for the account",
            section: Section::General,
            applies: |f| f.total_analysis_data,
            build: |_| Ok(Operation::TotalAnalysisData),
        },
        Action {
            flag: "searchUrlsByDomain",
            value: Some("<domain>"),
            help: "Search URLs belonging to a domain",
            section: Section::General,
            applies: |f| present(&f.search_urls_by_domain).is_some(),
            build: |f| {
                Ok(Operation::SearchUrlsByDomain {
                    domain: required(&f.search_urls_by_domain),
                })
            },
        },
        Action {
            flag: "changedUrls",
            value: None,
            help: "List URLs whose response changed between scans",
            section: Section::General,
            applies: |f| f.changed_urls,
            build: |_| Ok(Operation::ChangedUrls),
        },
        Action {
            flag: "getEmails",
            value: Some("<d1,d2,...>"),
            help: "Get emails found for the given domains",
            section: Section::General,
            applies: |f| present(&f.get_emails).is_some(),
            build: |f| {
                Ok(Operation::Emails {
                    domains: domain_list("getEmails", &f.get_emails)?,
                })
            },
        },
        Action {
            flag: "getS3Domains",
            value: Some("<d1,d2,...>"),
            help: "Get S3 buckets found for the given domains",
            section: Section::General,
            applies: |f| present(&f.get_s3_domains).is_some(),
            build: |f| {
                Ok(Operation::S3Domains {
                    domains: domain_list("getS3Domains", &f.get_s3_domains)?,
                })
            },
        },
        Action {
            flag: "getIps",
            value: Some("<d1,d2,...>"),
            help: "Get IP addresses found for the given domains",
            section: Section::General,
            applies: |f| present(&f.get_ips).is_some(),
            build: |f| {
                Ok(Operation::Ips {
                    domains: domain_list("getIps", &f.get_ips)?,
                })
            },
        },
        Action {
            flag: "getGqlOps",
            value: Some("<d1,d2,...>"),
            help: "Get GraphQL operations found for the given domains",
            section: Section::General,
            applies: |f| present(&f.get_gql_ops).is_some(),
            build: |f| {
                Ok(Operation::GqlOps {
                    domains: domain_list("getGqlOps", &f.get_gql_ops)?,
                })
            },
        },
        Action {
            flag: "getDomainUrls",
            value: Some("<d1,d2,...>"),
            help: "Get URLs found for the given domains",
            section: Section::General,
            applies: |f| present(&f.get_domain_urls).is_some(),
            build: |f| {
                Ok(Operation::DomainUrls {
                    domains: domain_list("getDomainUrls", &f.get_domain_urls)?,
                })
            },
        },
        Action {
            flag: "getApiPaths",
            value: Some("<d1,d2,...>"),
            help: "Get API paths found for the given domains",
            section: Section::General,
            applies: |f| present(&f.get_api_paths).is_some(),
            build: |f| {
                Ok(Operation::ApiPaths {
                    domains: domain_list("getApiPaths", &f.get_api_paths)?,
                })
            },
        },
        Action {
            flag: "getResultByJsmonId",
            value: Some("<jsmonId>"),
            help: "Get scan result by jsmon ID",
            section: Section::General,
            applies: |f| present(&f.get_result_by_jsmon_id).is_some(),
            build: |f| {
                Ok(Operation::ResultByJsmonId {
                    id: required(&f.get_result_by_jsmon_id),
                })
            },
        },
        Action {
            flag: "getResultByFileId",
            value: Some("<fileId>"),
            help: "Get scan result by file ID",
            section: Section::General,
            applies: |f| present(&f.get_result_by_file_id).is_some(),
            build: |f| {
                Ok(Operation::ResultByFileId {
                    id: required(&f.get_result_by_file_id),
                })
            },
        },
        Action {
            flag: "reverseSearchResults",
            value: Some("<field=value>"),
            help: "Reverse search results, e.g. emails=admin@example.com",
            section: Section::General,
            applies: |f| present(&f.reverse_search_results).is_some(),
            build: |f| {
                let (field, value) = parse_reverse_search(&required(&f.reverse_search_results))?;
                Ok(Operation::ReverseSearch { field, value })
            },
        },
        Action {
            flag: "scanDomain",
            value: Some("<domain>"),
            help: "Scan a domain (see -words)",
            section: Section::General,
            applies: |f| present(&f.scan_domain).is_some(),
            build: |f| {
                Ok(Operation::ScanDomain {
                    domain: required(&f.scan_domain),
                    words: f.words.as_deref().map(parse_domains).unwrap_or_default(),
                })
            },
        },
        Action {
            flag: "usage",
            value: None,
            help: "View account profile and usage",
            section: Section::General,
            applies: |f| f.usage,
            build: |_| Ok(Operation::Profile),
        },
        Action {
            flag: "getAutomationData",
            value: Some("<domain>"),
            help: "Get automation results for a domain (see -size)",
            section: Section::General,
            applies: |f| present(&f.get_automation_data).is_some(),
            build: |f| {
                Ok(Operation::AutomationData {
                    domain: required(&f.get_automation_data),
                    size: f.size,
                })
            },
        },
        Action {
            flag: "getDomains",
            value: None,
            help: "List all domains in the account",
            section: Section::General,
            applies: |f| f.get_domains,
            build: |_| Ok(Operation::Domains),
        },
        Action {
            flag: "cron",
            value: Some("<start|stop|update>"),
            help: "Start, stop or update the scheduled scan job",
            section: Section::Cron,
            applies: |f| present(&f.cron).is_some(),
            build: cron_job,
        },
    ]
}

/// Flags that shape an action's arguments without selecting one.
pub fn parameters() -> Vec<Parameter> {
    vec![
        Parameter {
            flag: "apikey",
            value: Some("<XXXXXX-XXXX-XXXX-XXXX-XXXXXX>"),
            help: "API key for authentication",
            section: Section::General,
        },
        Parameter {
            flag: "urlSize",
            value: Some("<int>"),
            help: "Number of URLs to fetch (default 10)",
            section: Section::General,
        },
        Parameter {
            flag: "words",
            value: Some("<w1,w2,...>"),
            help: "Extra words to use with -scanDomain",
            section: Section::General,
        },
        Parameter {
            flag: "size",
            value: Some("<int>"),
            help: "Number of results to fetch (default 10000)",
            section: Section::General,
        },
        Parameter {
            flag: "notifications",
            value: Some("<c1,c2,...>"),
            help: "Set cronjob notification channels",
            section: Section::Cron,
        },
        Parameter {
            flag: "time",
            value: Some("<int64>"),
            help: "Set cronjob interval in seconds",
            section: Section::Cron,
        },
        Parameter {
            flag: "type",
            value: Some("<t1,t2,...>"),
            help: "Set cronjob scan types",
            section: Section::Cron,
        },
        Parameter {
            flag: "H",
            value: Some("<Key: Value>"),
            help: "Custom headers for requests (can repeat)",
            section: Section::More,
        },
        Parameter {
            flag: "h",
            value: None,
            help: "Show this help",
            section: Section::More,
        },
    ]
}

/// Split a `field=value` query on its first `=`.
pub fn parse_reverse_search(raw: &str) -> Result<(String, String), ActionError> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ActionError::MalformedReverseSearch(raw.to_string())),
    }
}

// Only called from builders whose predicate already saw a value.
fn required(value: &Option<String>) -> String {
    present(value).unwrap_or_default().to_string()
}

fn headers(flags: &FlagState) -> HeaderList {
    flags.headers.iter().cloned().collect()
}

fn domain_list(flag: &'static str, value: &Option<String>) -> Result<DomainList, ActionError> {
    let domains = parse_domains(value.as_deref().unwrap_or_default());
    if domains.is_empty() {
        return Err(ActionError::EmptyList(flag));
    }
    Ok(domains)
}

fn cron_job(flags: &FlagState) -> Result<Operation, ActionError> {
    let list = |value: &Option<String>| value.as_deref().map(parse_domains).unwrap_or_default();
    let notifications = list(&flags.notifications);
    let types = list(&flags.cron_type);
    let time = flags.time.filter(|t| *t > 0);

    let job = match required(&flags.cron).to_lowercase().as_str() {
        "start" => {
            if notifications.is_empty() {
                return Err(ActionError::CronMissing {
                    command: "start",
                    missing: "-notifications",
                });
            }
            let Some(time) = time else {
                return Err(ActionError::CronMissing {
                    command: "start",
                    missing: "a positive -time",
                });
            };
            if types.is_empty() {
                return Err(ActionError::CronMissing {
                    command: "start",
                    missing: "-type",
                });
            }
            CronJob::Start {
                notifications,
                time,
                types,
            }
        }
        "update" => {
            if notifications.is_empty() && time.is_none() && types.is_empty() {
                return Err(ActionError::CronMissing {
                    command: "update",
                    missing: "-notifications, -time or -type",
                });
            }
            CronJob::Update {
                notifications,
                time,
                types,
            }
        }
        "stop" => CronJob::Stop,
        other => return Err(ActionError::UnknownCron(other.to_string())),
    };

    Ok(Operation::Cron(job))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(flags: &FlagState) -> Result<Operation, ActionError> {
        let action = actions()
            .into_iter()
            .find(|action| (action.applies)(flags))
            .expect("some action should apply");
        (action.build)(flags)
    }

    #[test]
    fn test_flag_names_are_unique_and_parseable() {
        let mut names: Vec<&str> = actions().iter().map(|a| a.flag).collect();
        names.extend(parameters().iter().map(|p| p.flag));
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total, "flag declared twice");

        for action in actions() {
            let arg = format!("-{}", action.flag);
            let mut argv = vec!["jsmon", arg.as_str()];
            if action.value.is_some() {
                argv.push("value");
            }
            assert!(
                FlagState::from_args(argv).is_ok(),
                "-{} is not a parseable flag",
                action.flag
            );
        }
    }

    #[test]
    fn test_reverse_search_splits_on_first_equals() {
        assert_eq!(
            parse_reverse_search("domain=example.com"),
            Ok(("domain".to_string(), "example.com".to_string()))
        );
        assert_eq!(
            parse_reverse_search("domain=a=b"),
            Ok(("domain".to_string(), "a=b".to_string()))
        );
    }

    #[test]
    fn test_reverse_search_without_equals_is_an_error() {
        assert_eq!(
            parse_reverse_search("noequals"),
            Err(ActionError::MalformedReverseSearch("noequals".to_string()))
        );
        assert!(parse_reverse_search("=value").is_err());
    }

    #[test]
    fn test_list_actions_are_normalized() {
        let flags = FlagState {
            get_ips: Some(" a.com, b.com ,,a.com".to_string()),
            ..Default::default()
        };

        assert_eq!(
            build(&flags),
            Ok(Operation::Ips {
                domains: vec!["a.com".to_string(), "b.com".to_string()]
            })
        );
    }

    #[test]
    fn test_list_action_with_only_separators_is_an_error() {
        let flags = FlagState {
            get_emails: Some(" , ".to_string()),
            ..Default::default()
        };

        assert_eq!(build(&flags), Err(ActionError::EmptyList("getEmails")));
    }

    #[test]
    fn test_single_value_actions_are_trimmed() {
        let flags = FlagState {
            get_result_by_file_id: Some("  f-1 \t".to_string()),
            ..Default::default()
        };

        assert_eq!(
            build(&flags),
            Ok(Operation::ResultByFileId {
                id: "f-1".to_string()
            })
        );
    }

    #[test]
    fn test_scan_domain_takes_words() {
        let flags = FlagState {
            scan_domain: Some("example.com".to_string()),
            words: Some("admin, api".to_string()),
            ..Default::default()
        };

        assert_eq!(
            build(&flags),
            Ok(Operation::ScanDomain {
                domain: "example.com".to_string(),
                words: vec!["admin".to_string(), "api".to_string()],
            })
        );
    }

    #[test]
    fn test_upload_url_carries_headers() {
        let flags = FlagState {
            upload_url: Some("https://example.com/app.js".to_string()),
            headers: vec!["A: 1".to_string(), "B: 2".to_string()],
            ..Default::default()
        };

        assert_eq!(
            build(&flags),
            Ok(Operation::UploadUrl {
                url: "https://example.com/app.js".to_string(),
                headers: ["A: 1", "B: 2"].into_iter().collect(),
            })
        );
    }

    #[test]
    fn test_automation_data_uses_size() {
        let flags = FlagState {
            get_automation_data: Some("example.com".to_string()),
            size: 50,
            ..Default::default()
        };

        assert_eq!(
            build(&flags),
            Ok(Operation::AutomationData {
                domain: "example.com".to_string(),
                size: 50
            })
        );
    }

    #[test]
    fn test_cron_start_requires_all_settings() {
        let mut flags = FlagState {
            cron: Some("start".to_string()),
            notifications: Some("slack".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build(&flags),
            Err(ActionError::CronMissing {
                command: "start",
                missing: "a positive -time"
            })
        );

        flags.time = Some(3600);
        flags.cron_type = Some("URLs, JS".to_string());
        assert_eq!(
            build(&flags),
            Ok(Operation::Cron(CronJob::Start {
                notifications: vec!["slack".to_string()],
                time: 3600,
                types: vec!["URLs".to_string(), "JS".to_string()],
            }))
        );
    }

    #[test]
    fn test_cron_update_and_stop() {
        let update = FlagState {
            cron: Some("update".to_string()),
            time: Some(60),
            ..Default::default()
        };
        assert_eq!(
            build(&update),
            Ok(Operation::Cron(CronJob::Update {
                notifications: vec![],
                time: Some(60),
                types: vec![],
            }))
        );

        let stop = FlagState {
            cron: Some("STOP".to_string()),
            ..Default::default()
        };
        assert_eq!(build(&stop), Ok(Operation::Cron(CronJob::Stop)));

        let unknown = FlagState {
            cron: Some("pause".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build(&unknown),
            Err(ActionError::UnknownCron("pause".to_string()))
        );
    }
}
