//! Search entry point: challenge negotiation, pagination across result
//! pages, and lazy per-snippet package extraction.

use std::sync::LazyLock;
use std::vec;

use reqwest::blocking::Client;
use reqwest::Url;
use scraper::{Html, Selector};
use tracing::debug;

use crate::config::{Config, USER_AGENT};
use crate::error::{Error, Result};
use crate::types::{Package, SearchOptions};
use crate::{challenge, github};

static SNIPPET_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[class*="package-snippet"]"#).expect("hardcoded selector is valid")
});

static NAME_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"span[class*="package-snippet__name"]"#)
        .expect("hardcoded selector is valid")
});

static CREATED_TIME_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"span[class*="package-snippet__created"] time"#)
        .expect("hardcoded selector is valid")
});

static DESCRIPTION_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"p[class*="package-snippet__description"]"#)
        .expect("hardcoded selector is valid")
});

static VERSION_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1.package-header__name").expect("hardcoded selector is valid")
});

/// Search the index for packages matching `query`.
///
/// Runs the challenge handshake and collects the snippet anchors from
/// `config.pages` result pages up front; the returned [`SearchResults`]
/// then yields one [`Package`] per snippet, fetching each package's
/// detail page (and GitHub stats, with `opts.extra`) only as it is
/// consumed. Stopping early skips the remaining per-package requests.
///
/// The entire exchange, challenge included, rides on one client with a
/// cookie jar; the jar must not be shared across overlapping searches.
pub fn search(query: &str, config: &Config, opts: &SearchOptions) -> Result<SearchResults> {
    let mut builder = Client::builder().user_agent(USER_AGENT).cookie_store(true);
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build()?;

    let base_url =
        Url::parse(&config.api_url).map_err(|_| Error::InvalidUrl(config.api_url.clone()))?;

    challenge::negotiate(&client, config, query, opts.debug)?;

    // Page responses are parsed regardless of HTTP status: a rejected
    // PoW answer shows up as pages with no snippets, not as an error.
    let mut snippets = Vec::new();
    for page in 1..=config.pages {
        let url = format!(
            "{}?q={}&page={}",
            config.api_url,
            urlencoding::encode(query),
            page
        );
        let body = client.get(&url).send()?.text()?;
        snippets.extend(snippets_in(&body));
        if opts.debug {
            debug!("page {}: {} snippets collected for {:?}", page, snippets.len(), query);
        }
    }

    Ok(SearchResults {
        client,
        base_url,
        github_api_url: config.github_api_url.clone(),
        opts: opts.clone(),
        snippets: snippets.into_iter(),
        halted: false,
    })
}

/// Lazily produced sequence of search results.
///
/// Snippets are already in hand; each `next()` performs the snippet's
/// detail-page fetch and optional enrichment. The first yielded error
/// ends the sequence (subsequent calls return `None`).
pub struct SearchResults {
    client: Client,
    base_url: Url,
    github_api_url: String,
    opts: SearchOptions,
    snippets: vec::IntoIter<String>,
    halted: bool,
}

impl SearchResults {
    /// Snippets still to be turned into packages.
    pub fn remaining(&self) -> usize {
        self.snippets.len()
    }

    fn build_package(&self, snippet_html: &str) -> Result<Package> {
        let fields = parse_snippet(snippet_html, &self.base_url)?;

        // The snippet's own version text is unreliable; the detail page
        // is authoritative.
        let detail = self.client.get(&fields.link).send()?.text()?;
        let version = version_from_detail(&detail);

        let mut package = Package::new(
            fields.name,
            version,
            fields.released,
            fields.description,
            Some(fields.link),
        )?;
        if self.opts.debug {
            debug!("extracted {} {} ({})", package.name, package.version, package.link);
        }

        if self.opts.extra {
            let info = github::enrich(
                &self.client,
                &self.github_api_url,
                &package.link,
                self.opts.auth.as_ref(),
                self.opts.debug,
            )?;
            if let Some(info) = info {
                if info.set {
                    package.set_gh_info(&info);
                }
            }
        }

        Ok(package)
    }
}

impl Iterator for SearchResults {
    type Item = Result<Package>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }
        let snippet = self.snippets.next()?;
        match self.build_package(&snippet) {
            Ok(package) => Some(Ok(package)),
            Err(err) => {
                self.halted = true;
                Some(Err(err))
            }
        }
    }
}

/// Serialized snippet anchors from one result page, in document order.
fn snippets_in(body: &str) -> Vec<String> {
    let document = Html::parse_document(body);
    document.select(&SNIPPET_SEL).map(|el| el.html()).collect()
}

#[derive(Debug)]
struct SnippetFields {
    name: String,
    released: String,
    description: String,
    link: String,
}

/// Pull the per-package fields out of one snippet anchor.
fn parse_snippet(snippet_html: &str, base_url: &Url) -> Result<SnippetFields> {
    let fragment = Html::parse_fragment(snippet_html);
    let anchor = fragment
        .select(&SNIPPET_SEL)
        .next()
        .ok_or_else(|| Error::Extraction {
            field: "anchor",
            link: base_url.as_str().to_string(),
        })?;

    let href = anchor.value().attr("href").ok_or_else(|| Error::Extraction {
        field: "href",
        link: base_url.as_str().to_string(),
    })?;
    let link = base_url
        .join(href)
        .map_err(|_| Error::InvalidUrl(href.to_string()))?
        .to_string();

    let name = anchor
        .select(&NAME_SEL)
        .next()
        .map(|el| squish(&el.text().collect::<String>()))
        .ok_or_else(|| Error::Extraction {
            field: "name",
            link: link.clone(),
        })?;

    let released = anchor
        .select(&CREATED_TIME_SEL)
        .next()
        .and_then(|el| el.value().attr("datetime"))
        .map(squish)
        .ok_or_else(|| Error::Extraction {
            field: "released",
            link: link.clone(),
        })?;

    let description = anchor
        .select(&DESCRIPTION_SEL)
        .next()
        .map(|el| squish(&el.text().collect::<String>()))
        .ok_or_else(|| Error::Extraction {
            field: "description",
            link: link.clone(),
        })?;

    Ok(SnippetFields {
        name,
        released,
        description,
        link,
    })
}

/// Authoritative version from a package detail page: the last
/// whitespace-separated token of the header element's text, or
/// `"Unknown"` when the element is missing or empty.
fn version_from_detail(body: &str) -> String {
    let document = Html::parse_document(body);
    document
        .select(&VERSION_SEL)
        .next()
        .and_then(|el| {
            let text = el.text().collect::<String>();
            text.split_whitespace().last().map(str::to_string)
        })
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Collapse whitespace runs to single spaces and trim the ends.
fn squish(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
