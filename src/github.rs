//! Optional enrichment: resolve a package's homepage link from its
//! detail page and, when it points at GitHub, look up star/fork/watcher
//! counts through the REST API.
//!
//! Enrichment never fails a search. Every API-side problem (bad
//! credentials, rate limit, missing repo, malformed payload) maps to an
//! unset [`RepoInfo`] and a log line.

use std::sync::LazyLock;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::error::Result;
use crate::types::{GithubAuth, RepoInfo};

/// Primary slot for the homepage link on a package detail page. A
/// positional heuristic: the page carries no stable attribute marking
/// "homepage" vs "issue tracker", so the slot is addressed by structure.
static HOMEPAGE_PRIMARY_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        ".vertical-tabs__tabs > div:nth-child(3) > ul:nth-child(4) > li:nth-child(1) > a:nth-child(1)",
    )
    .expect("hardcoded selector is valid")
});

/// Alternate slot, consulted when the primary slot holds an
/// issue-tracker link.
static HOMEPAGE_FALLBACK_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        ".vertical-tabs__tabs > div:nth-child(2) > ul:nth-child(2) > li:nth-child(2) > a:nth-child(1)",
    )
    .expect("hardcoded selector is valid")
});

/// Links resolved from a package's detail page. `github` has any
/// trailing `/tags` segment stripped; `homepage` is the link as found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLinks {
    pub github: String,
    pub homepage: String,
}

#[derive(Debug, Deserialize)]
struct RepoStats {
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    watchers_count: u64,
}

/// Locate the homepage link on a package detail page, keeping only
/// GitHub-hosted repos.
///
/// Fallback rules, in order: take the primary slot's link; if it
/// contains `issues`, take the alternate slot's link instead; if either
/// lookup comes up empty, or the resolved link is not on GitHub, the
/// package is not enrichable.
pub fn resolve_links(client: &Client, detail_url: &str) -> Result<Option<RepoLinks>> {
    let body = client.get(detail_url).send()?.text()?;
    Ok(resolve_links_in(&body, detail_url))
}

fn resolve_links_in(body: &str, detail_url: &str) -> Option<RepoLinks> {
    let document = Html::parse_document(body);
    let primary = document
        .select(&HOMEPAGE_PRIMARY_SEL)
        .next()
        .and_then(|el| el.value().attr("href"));

    let homepage = match primary {
        Some(href) if href.contains("issues") => document
            .select(&HOMEPAGE_FALLBACK_SEL)
            .next()
            .and_then(|el| el.value().attr("href")),
        other => other,
    };

    let homepage = match homepage {
        Some(href) => href,
        None => {
            warn!("homepage link not found on {}", detail_url);
            return None;
        }
    };

    if !homepage.contains("github") {
        return None;
    }

    let github = homepage.strip_suffix("/tags").unwrap_or(homepage);
    Some(RepoLinks {
        github: github.to_string(),
        homepage: homepage.to_string(),
    })
}

/// `{owner}/{repo}` segment of a GitHub repo URL.
fn repo_path(repo_url: &str) -> Option<&str> {
    repo_url
        .split_once("github.com/")
        .map(|(_, path)| path.trim_end_matches('/'))
}

/// Look up repo stats for a GitHub URL via `GET {api_base}/repos/{owner}/{repo}`,
/// with basic auth when credentials are supplied.
pub fn fetch_repo_info(
    client: &Client,
    api_base: &str,
    repo_url: &str,
    auth: Option<&GithubAuth>,
    debug: bool,
) -> Result<RepoInfo> {
    let path = match repo_path(repo_url) {
        Some(path) => path,
        None => {
            error!("no github.com/ segment in repo link {}", repo_url);
            return Ok(RepoInfo::default());
        }
    };

    let api_url = format!("{}/repos/{}", api_base, path);
    let mut request = client.get(&api_url);
    if let Some(auth) = auth {
        request = request.basic_auth(&auth.username, Some(&auth.token));
    }
    let response = request.send()?;
    let status = response.status();
    if debug {
        debug!("GET {} -> {}", api_url, status);
    }
    let body = response.text()?;
    Ok(map_repo_response(status, &body, repo_url, debug))
}

fn map_repo_response(status: StatusCode, body: &str, repo_url: &str, debug: bool) -> RepoInfo {
    match status {
        StatusCode::OK => match serde_json::from_str::<RepoStats>(body) {
            Ok(stats) => RepoInfo {
                stars: stats.stargazers_count,
                forks: stats.forks_count,
                watchers: stats.watchers_count,
                github_link: repo_url.to_string(),
                set: true,
            },
            Err(err) => {
                error!("bad stats payload for {}: {}", repo_url, err);
                RepoInfo::default()
            }
        },
        StatusCode::UNAUTHORIZED => {
            if debug {
                error!("bad GitHub credentials looking up {}", repo_url);
            }
            RepoInfo::default()
        }
        StatusCode::FORBIDDEN => {
            if debug {
                warn!("GitHub API rate limit exceeded looking up {}", repo_url);
            }
            RepoInfo::default()
        }
        StatusCode::NOT_FOUND => {
            if debug {
                warn!("GitHub repo {} not found", repo_url);
            }
            RepoInfo::default()
        }
        other => {
            warn!("unexpected GitHub API status {} for {}", other, repo_url);
            RepoInfo::default()
        }
    }
}

/// Full enrichment step for one package: resolve its homepage link and,
/// when it is GitHub-hosted, fetch the repo stats. `Ok(None)` means the
/// package has no GitHub homepage; the returned [`RepoInfo`] carries
/// `set: false` when the lookup soft-failed.
pub fn enrich(
    client: &Client,
    api_base: &str,
    detail_url: &str,
    auth: Option<&GithubAuth>,
    debug: bool,
) -> Result<Option<RepoInfo>> {
    let links = match resolve_links(client, detail_url)? {
        Some(links) => links,
        None => return Ok(None),
    };
    let info = fetch_repo_info(client, api_base, &links.github, auth, debug)?;
    Ok(Some(info))
}
