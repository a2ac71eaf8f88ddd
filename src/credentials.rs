use std::env;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.jsmon.sh";
pub const API_KEY_ENV: &str = "JSMON_API_KEY";
pub const API_URL_ENV: &str = "JSMON_API_URL";

/// Credential and endpoint every remote call is made with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiContext {
    pub api_key: String,
    pub base_url: String,
}

impl ApiContext {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        ApiContext {
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Use `JSMON_API_URL` as the base URL when set.
    pub fn from_env(api_key: impl Into<String>) -> Self {
        let base_url = env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        ApiContext::new(api_key, base_url)
    }
}

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("no API key found in {0}")]
    NotFound(String),

    #[error("API key in {path} is empty")]
    Empty { path: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A place a previously saved API key can be loaded from.
pub trait KeySource {
    fn name(&self) -> String;
    fn load(&self) -> Result<String, CredentialError>;
}

/// The `JSMON_API_KEY` environment variable.
pub struct EnvKey;

impl KeySource for EnvKey {
    fn name(&self) -> String {
        format!("${}", API_KEY_ENV)
    }

    fn load(&self) -> Result<String, CredentialError> {
        match env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(CredentialError::NotFound(self.name())),
        }
    }
}

/// Plain text key saved at `~/.jsmon/credentials`.
pub struct CredentialsFile {
    path: PathBuf,
}

impl CredentialsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CredentialsFile { path: path.into() }
    }

    /// The file under the user's home directory, if one is known.
    pub fn default_location() -> Option<Self> {
        let home = dirs::home_dir()?;
        Some(CredentialsFile::new(home.join(".jsmon").join("credentials")))
    }
}

impl KeySource for CredentialsFile {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<String, CredentialError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                CredentialError::NotFound(self.name())
            } else {
                CredentialError::Io {
                    path: self.name(),
                    source,
                }
            }
        })?;

        let key = contents.trim();
        if key.is_empty() {
            return Err(CredentialError::Empty { path: self.name() });
        }

        Ok(key.to_string())
    }
}

/// Default lookup chain used when `-apikey` is absent.
pub fn default_sources() -> Vec<Box<dyn KeySource>> {
    let mut sources: Vec<Box<dyn KeySource>> = vec![Box::new(EnvKey)];
    match CredentialsFile::default_location() {
        Some(file) => sources.push(Box::new(file)),
        None => log::warn!("Could not determine home directory; skipping saved credentials"),
    }
    sources
}

/// Resolve the API key for this run.
///
/// A non-empty explicit key is used as is. Otherwise each source is tried in
/// order and the first usable key wins. A source that exists but cannot be
/// used is reported over one that is simply absent; when every source is
/// absent the error names all of them.
pub fn resolve_api_key(
    explicit: Option<&str>,
    sources: &[Box<dyn KeySource>],
) -> Result<String, CredentialError> {
    if let Some(key) = explicit.filter(|key| !key.is_empty()) {
        log::debug!("Using API key from -apikey");
        return Ok(key.to_string());
    }

    let mut tried = vec![String::from("-apikey")];
    let mut unusable = None;
    for source in sources {
        match source.load() {
            Ok(key) => {
                log::debug!("Loaded API key from {}", source.name());
                return Ok(key);
            }
            Err(CredentialError::NotFound(name)) => tried.push(name),
            Err(e) => {
                log::trace!("{}", e);
                unusable.get_or_insert(e);
            }
        }
    }

    Err(unusable.unwrap_or_else(|| CredentialError::NotFound(tried.join(", "))))
}
