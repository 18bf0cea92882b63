/// Why a request to the data endpoint produced no usable payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
    #[error("response from {url} could not be decoded: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Status { url, .. } | FetchError::Network { url, .. } | FetchError::Decode { url, .. } => url,
        }
    }
}
