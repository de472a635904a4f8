use crate::interface::store::StoreErrorKind;
use derive_more::Display;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Internal, structured error type.
///
/// This error:
/// - is NOT part of the public API
/// - is NOT stable across versions
/// - may evolve freely
///
/// Every public entry point converts this into the error envelope defined in
/// `dto::error`.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub(crate) struct InternalError {
    class: InternalErrorClass,
    origin: InternalErrorOrigin,
    message: String,
}

impl InternalError {
    pub fn new(
        class: InternalErrorClass,
        origin: InternalErrorOrigin,
        message: impl Into<String>,
    ) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    pub fn access(origin: InternalErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(InternalErrorClass::Access, origin, message)
    }

    pub fn cancelled(origin: InternalErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(InternalErrorClass::Cancelled, origin, message)
    }

    pub fn domain(origin: InternalErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(InternalErrorClass::Domain, origin, message)
    }

    pub fn infra(origin: InternalErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(InternalErrorClass::Infra, origin, message)
    }

    pub fn input(origin: InternalErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(InternalErrorClass::Input, origin, message)
    }

    pub fn invariant(origin: InternalErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(InternalErrorClass::Invariant, origin, message)
    }

    pub fn seed(origin: InternalErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(InternalErrorClass::Seed, origin, message)
    }

    pub fn store(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self::new(
            InternalErrorClass::Store(kind),
            InternalErrorOrigin::Store,
            message,
        )
    }

    pub const fn class(&self) -> InternalErrorClass {
        self.class
    }

    pub const fn origin(&self) -> InternalErrorOrigin {
        self.origin
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

///
/// InternalErrorClass
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub(crate) enum InternalErrorClass {
    Access,
    Cancelled,
    Config,
    Domain,
    Infra,
    Input,
    Invariant,
    Seed,
    #[display("Store({_0})")]
    Store(StoreErrorKind),
}

///
/// InternalErrorOrigin
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub(crate) enum InternalErrorOrigin {
    Api,
    Config,
    Identity,
    Ops,
    Policy,
    Store,
    Workflow,
}
