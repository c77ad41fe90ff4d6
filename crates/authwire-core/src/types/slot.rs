//! Credential slot names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two named credential slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    /// The short-lived access token.
    Access,
    /// The longer-lived refresh token.
    Refresh,
}

impl Slot {
    /// Both slots, in teardown order.
    pub const ALL: [Slot; 2] = [Slot::Access, Slot::Refresh];

    /// The stable name persisted stores key this slot by.
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Access => "access",
            Slot::Refresh => "refresh",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
