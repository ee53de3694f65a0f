use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by a search.
///
/// Enrichment never produces an `Error`: GitHub API failures are mapped
/// to a default [`crate::RepoInfo`] and logged, so a package always comes
/// through with zero-value stats rather than killing the search.
#[derive(Debug, Error)]
pub enum Error {
    /// The search or challenge page no longer matches the expected
    /// format. Fatal to the current search; retrying won't help until
    /// the extraction patterns are updated.
    #[error("unexpected page format: {0}")]
    Protocol(String),

    /// An expected element or attribute is missing from a result
    /// snippet. Yielded for the offending package, after which the
    /// result sequence halts.
    #[error("missing `{field}` in search result snippet ({link})")]
    Extraction { field: &'static str, link: String },

    /// Transport-level failure from the HTTP client.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The snippet's release timestamp did not parse as ISO-8601.
    #[error("unparseable release timestamp {value:?}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The configured endpoint or a snippet href could not be parsed
    /// into a URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}
