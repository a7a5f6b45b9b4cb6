use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of the caller, as supplied by the host for every request
///
/// The booking system never authenticates anything itself; the principal is
/// only recorded, e.g. as the owner of an operator.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Textual form of the anonymous principal
    pub const ANONYMOUS: &'static str = "2vxsx-fae";

    /// Create a principal from its textual form
    #[inline]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The principal used when the host did not identify the caller
    #[inline]
    pub fn anonymous() -> Self {
        Self(Self::ANONYMOUS.into())
    }

    /// Get the textual form
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Principal {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
