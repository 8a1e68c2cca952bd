use super::cursor::Cursor;

/// Envelope code the backend uses for a successful response
pub const SUCCESS_CODE: &str = "COMMON200";

/// One normalized page of results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult<T> {
    pub code: String,
    pub items: Vec<T>,
    /// When set, no further page may be requested
    pub is_last_page: bool,
    /// Continuation token reported by the server, if any
    pub next_cursor: Option<Cursor>,
}

impl<T> PageResult<T> {
    /// A successful page
    pub fn success(items: Vec<T>, is_last_page: bool) -> Self {
        Self {
            code: String::from(SUCCESS_CODE),
            items,
            is_last_page,
            next_cursor: None,
        }
    }

    /// Attach the server-reported continuation token
    pub fn with_next_cursor(mut self, cursor: Option<Cursor>) -> Self {
        self.next_cursor = cursor;
        self
    }

    /// A non-success envelope, reported as an exhausted list
    pub fn envelope_failure(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            items: Vec::new(),
            is_last_page: true,
            next_cursor: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}
