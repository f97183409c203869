use std::time::Duration;

/// Why a prefetch attempt did not produce a menu.
///
/// Every variant except `Superseded` ends with the entry marked Failed. None of these reach
/// callers of the coordinator; they only ever see `PrefetchStatus`.
#[derive(Debug, thiserror::Error)]
pub enum PrefetchError {
    #[error("start rejected: {0}")]
    TransportRejected(String),
    #[error("job failed: {0}")]
    JobFailed(String),
    #[error("no terminal status within {0:?}")]
    Timeout(Duration),
    /// The worker was disowned; the entry is left as the newer attempt wrote it.
    #[error("superseded by a newer prefetch")]
    Superseded,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
