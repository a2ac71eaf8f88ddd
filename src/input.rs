/// Comma separated flag values after normalization.
pub type DomainList = Vec<String>;

/// Split a comma separated flag value into trimmed entries.
///
/// Blank entries are dropped and repeated entries keep only their first
/// occurrence, so an empty input yields an empty list.
pub fn parse_domains(raw: &str) -> DomainList {
    let mut domains: DomainList = Vec::new();

    for domain in raw.split(',').map(str::trim) {
        if domain.is_empty() || domains.iter().any(|seen| seen == domain) {
            continue;
        }
        domains.push(domain.to_string());
    }

    domains
}

/// Raw `-H` values in the order they were given.
///
/// The shape of each entry is not checked here; the service receives the
/// list verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList(Vec<String>);

impl HeaderList {
    pub fn new() -> Self {
        HeaderList(Vec::new())
    }

    pub fn push(&mut self, header: impl Into<String>) {
        self.0.push(header.into());
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for HeaderList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut headers = HeaderList::new();
        for header in iter {
            headers.push(header);
        }
        headers
    }
}

/// Trimmed flag value, or `None` when the flag is missing or blank.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
