use std::time::Duration;

/// Browser User-Agent sent on every request. PyPI rejects obvious
/// non-browser agents on the search endpoint.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0";

/// Project-page URL used when a package is built without an explicit
/// link; `{name}` is replaced with the package name.
pub const DEFAULT_LINK_FORMAT: &str = "https://pypi.org/project/{name}";

/// Display format used by `released_date_str` when the caller does not
/// supply one.
pub const DEFAULT_DATE_FORMAT: &str = "%d-%-m-%Y";

/// Search configuration.
///
/// `Default` points at pypi.org; tests aim `api_url` and
/// `github_api_url` at a local stub instead.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base search endpoint, e.g. `https://pypi.org/search/`.
    pub api_url: String,
    /// Number of result pages to fetch per query.
    pub pages: u32,
    /// Sort key advertised to callers (`name`, `version` or `released`).
    /// The core emits results in page order; sorting is the caller's job.
    pub sort_by: String,
    /// Date format used when rendering release dates for display.
    pub date_format: String,
    /// Base URL of the GitHub REST API, used by the enricher.
    pub github_api_url: String,
    /// Per-request timeout. `None` leaves the HTTP client's default.
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: "https://pypi.org/search/".to_string(),
            pages: 2,
            sort_by: "name".to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            github_api_url: "https://api.github.com".to_string(),
            timeout: None,
        }
    }
}
