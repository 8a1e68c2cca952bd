use std::fmt;

use super::{cursor::Cursor, scope::ScopeKey};

/// Something a list wants the surrounding UI to hear about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A page request failed; the list is untouched and may be retried
    FetchFailed { scope: ScopeKey, error: String },
    /// The backend answered with a non-success envelope code
    ///
    /// The list is treated as exhausted.
    Exhausted { scope: ScopeKey, code: String },
    /// The server reported more pages but no cursor could be derived
    CursorUnavailable { scope: ScopeKey },
    /// A continuation page brought nothing new and left the cursor where it was
    CursorStalled { scope: ScopeKey, cursor: Cursor },
}

impl Notice {
    pub fn scope(&self) -> &ScopeKey {
        match self {
            Notice::FetchFailed { scope, .. }
            | Notice::Exhausted { scope, .. }
            | Notice::CursorUnavailable { scope }
            | Notice::CursorStalled { scope, .. } => scope,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::FetchFailed { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::FetchFailed { scope, error } => {
                write!(f, "[{scope}] failed to load: {error}")
            }
            Notice::Exhausted { scope, code } => {
                write!(f, "[{scope}] no more results (server code {code})")
            }
            Notice::CursorUnavailable { scope } => {
                write!(f, "[{scope}] stopped: next page position unavailable")
            }
            Notice::CursorStalled { scope, cursor } => {
                write!(f, "[{scope}] stopped: cursor {cursor} did not advance")
            }
        }
    }
}
