use std::fmt::Write;

use chrono::{DateTime, FixedOffset};

use crate::config::{DEFAULT_DATE_FORMAT, DEFAULT_LINK_FORMAT};
use crate::error::{Error, Result};

/// One package matched by the search.
#[derive(Debug, Clone)]
pub struct Package {
    /// Name as displayed by the index.
    pub name: String,
    /// Version taken from the package's own detail page (the snippet's
    /// version text is unreliable), or `"Unknown"`.
    pub version: String,
    /// Raw ISO-8601 release timestamp from the snippet.
    pub released: String,
    /// Whitespace-normalized description.
    pub description: String,
    /// Project page URL.
    pub link: String,
    /// Parsed form of `released`.
    pub released_date: DateTime<FixedOffset>,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub github_link: String,
    /// True once `set_gh_info` has run; distinguishes "not looked up"
    /// from "looked up, zero stats".
    pub info_set: bool,
}

impl Package {
    /// Build a package from scraped fields.
    ///
    /// `link: None` falls back to the templated project-page URL built
    /// from `name`. Fails if `released` is not an ISO-8601 timestamp
    /// with timezone.
    pub fn new(
        name: String,
        version: String,
        released: String,
        description: String,
        link: Option<String>,
    ) -> Result<Self> {
        let released_date = DateTime::parse_from_str(&released, "%Y-%m-%dT%H:%M:%S%z")
            .map_err(|source| Error::InvalidTimestamp {
                value: released.clone(),
                source,
            })?;
        let link = link.unwrap_or_else(|| DEFAULT_LINK_FORMAT.replace("{name}", &name));

        Ok(Package {
            name,
            version,
            released,
            description,
            link,
            released_date,
            stars: 0,
            forks: 0,
            watchers: 0,
            github_link: String::new(),
            info_set: false,
        })
    }

    /// Render the release date with the given strftime format, or the
    /// crate default when `None`. A format string chrono cannot
    /// interpret also falls back to the default.
    pub fn released_date_str(&self, format: Option<&str>) -> String {
        let format = format.unwrap_or(DEFAULT_DATE_FORMAT);
        let mut rendered = String::new();
        if write!(rendered, "{}", self.released_date.format(format)).is_err() {
            rendered.clear();
            let _ = write!(rendered, "{}", self.released_date.format(DEFAULT_DATE_FORMAT));
        }
        rendered
    }

    /// Apply repo stats in one shot. Enrichment fields are either all
    /// default or all set together; callers only invoke this for a
    /// successful lookup.
    pub fn set_gh_info(&mut self, info: &RepoInfo) {
        self.stars = info.stars;
        self.forks = info.forks;
        self.watchers = info.watchers;
        self.github_link = info.github_link.clone();
        self.info_set = true;
    }
}

/// Repo stats from one GitHub API call. `set` is false for every
/// non-success outcome (bad auth, rate limit, not found, bad JSON).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoInfo {
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub github_link: String,
    pub set: bool,
}

/// Basic-auth credentials for the GitHub API. The CLI reads these from
/// `GITHUB_USERNAME` / `GITHUBAPITOKEN`; library callers build them
/// however they like.
#[derive(Debug, Clone)]
pub struct GithubAuth {
    pub username: String,
    pub token: String,
}

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Emit verbose diagnostics for this call.
    pub debug: bool,
    /// Enrich each package with GitHub repo stats.
    pub extra: bool,
    /// Credentials for the GitHub API; anonymous when `None`.
    pub auth: Option<GithubAuth>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_package(link: Option<String>) -> Package {
        Package::new(
            "foo".to_string(),
            "1.0".to_string(),
            "2023-05-01T00:00:00+00:00".to_string(),
            "A test package".to_string(),
            link,
        )
        .expect("valid timestamp")
    }

    #[test]
    fn released_date_renders_with_custom_format() {
        let pack = sample_package(None);
        assert_eq!(pack.released_date_str(Some("%Y-%m-%d")), "2023-05-01");
    }

    #[test]
    fn released_date_default_format_is_day_month_year() {
        let pack = sample_package(None);
        assert_eq!(pack.released_date_str(None), "01-5-2023");
    }

    #[test]
    fn unknown_format_directive_falls_back_to_default() {
        let pack = sample_package(None);
        assert_eq!(pack.released_date_str(Some("%!")), "01-5-2023");
    }

    #[test]
    fn pypi_style_offset_without_colon_parses() {
        let pack = Package::new(
            "bar".to_string(),
            "2.0".to_string(),
            "2024-05-29T15:40:33+0000".to_string(),
            String::new(),
            None,
        )
        .expect("valid timestamp");
        assert_eq!(pack.released_date_str(Some("%H:%M")), "15:40");
    }

    #[test]
    fn missing_link_falls_back_to_project_page() {
        let pack = sample_package(None);
        assert_eq!(pack.link, "https://pypi.org/project/foo");
    }

    #[test]
    fn explicit_link_is_kept() {
        let pack = sample_package(Some("https://example.org/foo/".to_string()));
        assert_eq!(pack.link, "https://example.org/foo/");
    }

    #[test]
    fn bad_timestamp_is_rejected() {
        let err = Package::new(
            "foo".to_string(),
            "1.0".to_string(),
            "May 1st 2023".to_string(),
            String::new(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidTimestamp { .. }));
    }

    #[test]
    fn set_gh_info_sets_all_fields_together() {
        let mut pack = sample_package(None);
        assert_eq!(pack.stars, 0);
        assert_eq!(pack.forks, 0);
        assert_eq!(pack.watchers, 0);
        assert_eq!(pack.github_link, "");
        assert!(!pack.info_set);

        pack.set_gh_info(&RepoInfo {
            stars: 12,
            forks: 3,
            watchers: 12,
            github_link: "https://github.com/foo/foo".to_string(),
            set: true,
        });

        assert_eq!(pack.stars, 12);
        assert_eq!(pack.forks, 3);
        assert_eq!(pack.watchers, 12);
        assert_eq!(pack.github_link, "https://github.com/foo/foo");
        assert!(pack.info_set);
    }
}
