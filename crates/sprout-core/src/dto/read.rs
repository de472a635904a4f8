use crate::dto::prelude::*;
use derive_more::Display;

///
/// Provenance
/// Which projection produced a read result.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    #[display("full")]
    Full,
    /// Retried without fields that violate the schema on some rows.
    #[display("reduced")]
    Reduced,
}

///
/// ReadResult
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ReadResult<T> {
    pub data: T,
    pub provenance: Provenance,
}

impl<T> ReadResult<T> {
    #[must_use]
    pub const fn full(data: T) -> Self {
        Self {
            data,
            provenance: Provenance::Full,
        }
    }

    #[must_use]
    pub const fn reduced(data: T) -> Self {
        Self {
            data,
            provenance: Provenance::Reduced,
        }
    }

    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self.provenance, Provenance::Reduced)
    }

    pub fn into_inner(self) -> T {
        self.data
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ReadResult<U> {
        ReadResult {
            data: f(self.data),
            provenance: self.provenance,
        }
    }
}
