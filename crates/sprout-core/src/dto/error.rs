use crate::dto::prelude::*;
use std::fmt::{self, Display};

///
/// Error
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    #[must_use]
    pub const fn new(code: ErrorCode, message: String) -> Self {
        Self { code, message }
    }
}

///
/// ErrorCode
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[non_exhaustive]
#[remain::sorted]
pub enum ErrorCode {
    Cancelled,
    Conflict,
    Internal,
    InvalidInput,
    InvariantViolation,
    MissingRequiredAttribute,
    NotAuthenticated,
    SeedFailed,
    StoreRejected,
    Unavailable,
}
