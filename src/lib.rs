//! Search PyPI from the command line or from Rust.
//!
//! PyPI's `/search/` endpoint sits behind an anti-bot proof-of-work
//! gate: the first response references a per-session script carrying
//! PoW parameters, and search only serves results once a brute-forced
//! answer has been posted back. This crate runs that handshake, pages
//! through the results, and scrapes each hit into a [`Package`], with
//! optional GitHub star/fork/watcher enrichment.
//!
//! # Example
//!
//! ```no_run
//! use pip_search::{search, Config, SearchOptions};
//!
//! fn main() -> pip_search::Result<()> {
//!     let config = Config::default();
//!     let opts = SearchOptions::default();
//!
//!     for package in search("requests", &config, &opts)? {
//!         let package = package?;
//!         println!("{} {} ({})", package.name, package.version, package.link);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Results come out lazily: the challenge handshake and result-page
//! collection happen inside [`search`], but each package's detail page
//! (one request per result, two with enrichment on) is only fetched as
//! the iterator is consumed. Dropping the iterator early skips the
//! remaining requests; re-running a query repeats the whole handshake.

pub mod challenge;
pub mod config;
pub mod error;
pub mod github;
pub mod pow;
pub mod search;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use search::{search, SearchResults};
pub use types::{GithubAuth, Package, RepoInfo, SearchOptions};
