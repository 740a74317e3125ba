use serde::{Deserialize, Serialize};

/// One page of a paginated listing: `{ "data": [...], "total": n }`.
///
/// `total` counts every matching item across all pages of the query. Extra
/// fields sent by the backend (`page`, `size`, `totalElement`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest<T> {
    pub data: Vec<T>,
    pub total: u64,
}

/// Error body returned by the backend on a failed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

impl ErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outcome of a create or update: exactly one branch is ever populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestResponse<T> {
    Success(T),
    Failure(ErrorMessage),
}

impl<T> RequestResponse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, RequestResponse::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            RequestResponse::Success(value) => Some(value),
            RequestResponse::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ErrorMessage> {
        match self {
            RequestResponse::Success(_) => None,
            RequestResponse::Failure(error) => Some(error),
        }
    }

    pub fn into_result(self) -> Result<T, ErrorMessage> {
        match self {
            RequestResponse::Success(value) => Ok(value),
            RequestResponse::Failure(error) => Err(error),
        }
    }
}
