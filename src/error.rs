use std::time::Duration;

/// Why a single pod's usage could not be fetched. Carried as data, never
/// propagated out of a collection run.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("could not reach the metrics API: {0}")]
    Connection(String),
    #[error("pod metrics not found")]
    NotFound,
    #[error("timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
    #[error("malformed metrics payload: {0}")]
    Malformed(String),
    #[error("metrics API returned {code}: {message}")]
    Api { code: u16, message: String },
}

impl From<kube::Error> for FetchError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(resp) if resp.code == 404 => FetchError::NotFound,
            kube::Error::Api(resp) => FetchError::Api {
                code: resp.code,
                message: resp.message,
            },
            kube::Error::SerdeError(e) => FetchError::Malformed(e.to_string()),
            other => FetchError::Connection(other.to_string()),
        }
    }
}
