use clap::{CommandFactory, Parser};

/// Every flag understood by the command line.
///
/// Flags keep the camelCase names users already type (`-scanFile`,
/// `-getEmails`). Parsing goes through [`FlagState::from_args`], which accepts
/// both the single-dash and double-dash spelling.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "jsmon", version, about, disable_help_flag = true)]
pub struct FlagState {
    #[arg(long = "apikey", value_name = "KEY")]
    pub api_key: Option<String>,

    #[arg(long = "scanFile", value_name = "FILE_ID")]
    pub scan_file: Option<String>,

    #[arg(long = "uploadFile", value_name = "PATH")]
    pub upload_file: Option<String>,

    #[arg(long = "uploadUrl", value_name = "URL")]
    pub upload_url: Option<String>,

    #[arg(long = "scanUrl", value_name = "URL")]
    pub scan_url: Option<String>,

    #[arg(long = "urls")]
    pub urls: bool,

    #[arg(long = "urlSize", value_name = "N", default_value_t = 10)]
    pub url_size: u32,

    #[arg(long = "files")]
    pub files: bool,

    #[arg(long = "getScannerData")]
    pub get_scanner_data: bool,

    #[arg(long = "rescanDomain", value_name = "DOMAIN")]
    pub rescan_domain: Option<String>,

    #[arg(long = "totalAnalysisData")]
    pub total_analysis_data: bool,

    #[arg(long = "searchUrlsByDomain", value_name = "DOMAIN")]
    pub search_urls_by_domain: Option<String>,

    #[arg(long = "changedUrls")]
    pub changed_urls: bool,

    #[arg(long = "getEmails", value_name = "DOMAINS")]
    pub get_emails: Option<String>,

    #[arg(long = "getS3Domains", value_name = "DOMAINS")]
    pub get_s3_domains: Option<String>,

    #[arg(long = "getIps", value_name = "DOMAINS")]
    pub get_ips: Option<String>,

    #[arg(long = "getGqlOps", value_name = "DOMAINS")]
    pub get_gql_ops: Option<String>,

    #[arg(long = "getDomainUrls", value_name = "DOMAINS")]
    pub get_domain_urls: Option<String>,

    #[arg(long = "getApiPaths", value_name = "DOMAINS")]
    pub get_api_paths: Option<String>,

    #[arg(long = "getResultByJsmonId", value_name = "ID")]
    pub get_result_by_jsmon_id: Option<String>,

    #[arg(long = "getResultByFileId", value_name = "ID")]
    pub get_result_by_file_id: Option<String>,

    #[arg(long = "reverseSearchResults", value_name = "FIELD=VALUE")]
    pub reverse_search_results: Option<String>,

    #[arg(long = "scanDomain", value_name = "DOMAIN")]
    pub scan_domain: Option<String>,

    #[arg(long = "words", value_name = "WORDS")]
    pub words: Option<String>,

    #[arg(long = "usage")]
    pub usage: bool,

    #[arg(long = "getAutomationData", value_name = "DOMAIN")]
    pub get_automation_data: Option<String>,

    #[arg(long = "size", value_name = "N", default_value_t = 10000)]
    pub size: u32,

    #[arg(long = "getDomains")]
    pub get_domains: bool,

    #[arg(long = "cron", value_name = "start|stop|update")]
    pub cron: Option<String>,

    #[arg(long = "notifications", value_name = "CHANNELS")]
    pub notifications: Option<String>,

    #[arg(long = "time", value_name = "SECONDS")]
    pub time: Option<i64>,

    #[arg(long = "type", value_name = "TYPES")]
    pub cron_type: Option<String>,

    #[arg(short = 'H', value_name = "Key: Value", allow_hyphen_values = true)]
    pub headers: Vec<String>,

    #[arg(short = 'h', long = "help")]
    pub help: bool,
}

impl FlagState {
    /// Parse a raw argument vector (program name first).
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        FlagState::try_parse_from(normalize_args(args))
    }
}

/// Rewrite `-scanFile` style arguments into the `--scanFile` form.
///
/// Only tokens naming a known long flag are touched. The value following a
/// flag that takes one, and everything after `--`, pass through unchanged.
pub fn normalize_args(args: Vec<String>) -> Vec<String> {
    let command = FlagState::command();
    let mut longs: Vec<(&str, bool)> = Vec::new();
    let mut value_shorts: Vec<char> = Vec::new();
    for arg in command.get_arguments() {
        let takes_value = arg.get_action().takes_values();
        if let Some(long) = arg.get_long() {
            longs.push((long, takes_value));
        }
        if let Some(short) = arg.get_short().filter(|_| takes_value) {
            value_shorts.push(short);
        }
    }
    let long_takes_value = |name: &str| {
        longs
            .iter()
            .find(|(long, _)| *long == name)
            .map(|(_, takes_value)| *takes_value)
    };

    let mut normalized = Vec::with_capacity(args.len());
    let mut args = args.into_iter();
    normalized.extend(args.next());

    let mut value_next = false;
    let mut terminated = false;
    for arg in args {
        if terminated || value_next {
            value_next = false;
            normalized.push(arg);
            continue;
        }
        if arg == "--" {
            terminated = true;
            normalized.push(arg);
            continue;
        }

        let (dashes, rest) = if let Some(rest) = arg.strip_prefix("--") {
            ("--", rest)
        } else if let Some(rest) = arg.strip_prefix('-') {
            ("-", rest)
        } else {
            normalized.push(arg);
            continue;
        };
        let (name, inline_value) = match rest.split_once('=') {
            Some((name, _)) => (name, true),
            None => (rest, false),
        };

        if let Some(takes_value) = long_takes_value(name).filter(|_| name.len() > 1) {
            value_next = takes_value && !inline_value;
            let rewritten = if dashes == "-" { format!("-{}", arg) } else { arg };
            normalized.push(rewritten);
            continue;
        }

        let mut chars = rest.chars();
        if let (Some(short), None, "-") = (chars.next(), chars.next(), dashes) {
            value_next = value_shorts.contains(&short);
        }
        normalized.push(arg);
    }

    normalized
}
