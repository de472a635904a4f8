use crate::{
    InternalError, InternalErrorClass,
    dto::error::{Error, ErrorCode},
    interface::store::StoreErrorKind,
};

impl InternalError {
    /// Public error envelope for this error. The message passes through.
    #[must_use]
    pub fn public(&self) -> Error {
        let code = match self.class() {
            // ---------------------------------------------------------
            // Caller / input
            // ---------------------------------------------------------
            InternalErrorClass::Access => ErrorCode::NotAuthenticated,
            InternalErrorClass::Config | InternalErrorClass::Input => ErrorCode::InvalidInput,
            InternalErrorClass::Domain => ErrorCode::MissingRequiredAttribute,

            // ---------------------------------------------------------
            // Seed lifecycle
            // ---------------------------------------------------------
            InternalErrorClass::Cancelled => ErrorCode::Cancelled,
            InternalErrorClass::Seed => ErrorCode::SeedFailed,

            // ---------------------------------------------------------
            // State / invariants
            // ---------------------------------------------------------
            InternalErrorClass::Invariant => ErrorCode::InvariantViolation,
            InternalErrorClass::Store(kind) => store_code(kind),

            // ---------------------------------------------------------
            // Infrastructure
            // ---------------------------------------------------------
            InternalErrorClass::Infra => ErrorCode::Unavailable,
        };

        Error::new(code, self.message().to_string())
    }
}

const fn store_code(kind: StoreErrorKind) -> ErrorCode {
    match kind {
        StoreErrorKind::AlreadyExists | StoreErrorKind::ConditionFailed => ErrorCode::Conflict,
        StoreErrorKind::Rejected => ErrorCode::StoreRejected,
        StoreErrorKind::SchemaNullabilityViolation { .. } => ErrorCode::InvariantViolation,
        StoreErrorKind::Unavailable => ErrorCode::Unavailable,
        StoreErrorKind::Unclassified => ErrorCode::Internal,
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        err.public()
    }
}

///
/// TESTS
///
