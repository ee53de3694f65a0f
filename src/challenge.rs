//! Negotiation of the search endpoint's proof-of-work gate.
//!
//! PyPI fronts `/search/` with an anti-bot challenge: the first response
//! is a stub page referencing a per-session script, the script carries
//! the PoW parameters, and the answer is posted back to unlock the
//! session. All extraction is regex-over-page-text, isolated here so a
//! page format change only ever breaks this module.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::blocking::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::pow;

static SCRIPT_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(.*)/script\.js").expect("hardcoded regex pattern is valid"));

static CHALLENGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"init\(\[\{"ty":"pow","data":\{"base":"(.+?)","hash":"(.+?)","hmac":"(.+?)","expires":"(.+?)"\}\}\], "(.+?)""#,
    )
    .expect("hardcoded regex pattern is valid")
});

/// PoW parameters scraped from the challenge script, plus the session
/// token correlating the challenge to its answer submission. Lives only
/// for the duration of one negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeParams {
    pub base: String,
    pub hash: String,
    pub hmac: String,
    pub expires: String,
    pub token: String,
}

#[derive(Serialize)]
struct PostBack<'a> {
    token: &'a str,
    data: [PowAnswer<'a>; 1],
}

#[derive(Serialize)]
struct PowAnswer<'a> {
    ty: &'static str,
    base: &'a str,
    answer: &'a str,
    hmac: &'a str,
    expires: &'a str,
}

/// Pull the challenge script's path segment out of a gated search page.
pub fn extract_script_path(body: &str) -> Result<String> {
    SCRIPT_PATH_RE
        .captures(body)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| Error::Protocol("no challenge script reference in search page".to_string()))
}

/// Pull the PoW parameters and session token out of the challenge
/// script body.
pub fn extract_challenge(script: &str) -> Result<ChallengeParams> {
    let caps = CHALLENGE_RE
        .captures(script)
        .ok_or_else(|| Error::Protocol("no PoW parameters in challenge script".to_string()))?;
    Ok(ChallengeParams {
        base: caps[1].to_string(),
        hash: caps[2].to_string(),
        hmac: caps[3].to_string(),
        expires: caps[4].to_string(),
        token: caps[5].to_string(),
    })
}

/// Scheme+host+port of the search endpoint, for building the script and
/// post-back URLs.
fn endpoint_origin(api_url: &str) -> Result<String> {
    let url =
        reqwest::Url::parse(api_url).map_err(|_| Error::InvalidUrl(api_url.to_string()))?;
    Ok(url.origin().ascii_serialization())
}

/// Run the challenge handshake and unlock search access for `client`'s
/// session. Returns the gate's path segment.
///
/// Strict request order, each step feeding the next: GET the search page
/// (carrying the query), GET the referenced script, solve the PoW, POST
/// the answer. The post-back response is not validated; its session
/// cookie lands in the client's jar, and a rejected answer surfaces
/// later as result pages with no snippets.
pub fn negotiate(client: &Client, config: &Config, query: &str, debug: bool) -> Result<String> {
    let search_url = format!("{}?q={}", config.api_url, urlencoding::encode(query));
    let body = client.get(&search_url).send()?.text()?;

    let path = extract_script_path(&body)?;
    let origin = endpoint_origin(&config.api_url)?;
    if debug {
        debug!("challenge gate at /{}/", path);
    }

    let script_url = format!("{}/{}/script.js", origin, path);
    let script = client.get(&script_url).send()?.text()?;
    let params = extract_challenge(&script)?;

    let answer = pow::solve(&params.base, &params.hash);
    if debug {
        debug!("solved PoW base={} answer={}", params.base, answer);
    }

    let body = PostBack {
        token: &params.token,
        data: [PowAnswer {
            ty: "pow",
            base: &params.base,
            answer: &answer,
            hmac: &params.hmac,
            expires: &params.expires,
        }],
    };
    client
        .post(format!("{}/{}/fst-post-back", origin, path))
        .json(&body)
        .send()?;

    Ok(path)
}
