//! Accumulated list state
//!
//! This module follows the Elm Architecture pattern:
//! - State changes only through the `update` function
//! - All state transitions are explicitly defined as `Message` variants
//! - Side effects are returned as `Effect` values for the caller to carry out
//!
//! The state knows nothing about networking or deduplication. Pages arrive here
//! already filtered, together with the cursor derived from them.

use crate::domain::{cursor::Cursor, notice::Notice, page::SUCCESS_CODE, scope::ScopeKey};

/// Loading phase of a list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    /// Fetching the first page
    Loading,
    /// Fetching a continuation page
    LoadingMore,
    /// The last fetch failed
    Error,
}

impl Phase {
    pub fn is_fetching(&self) -> bool {
        matches!(self, Phase::Loading | Phase::LoadingMore)
    }
}

/// Permission to perform exactly one page fetch
///
/// A ticket belongs to the generation it was issued in; once the list is reset,
/// results carrying an older ticket are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    cursor: Option<Cursor>,
}

impl FetchTicket {
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Messages that can be sent to update the list state
///
/// Following Elm conventions, messages are named in past tense.
pub enum Message<T> {
    /// More items were requested (scroll trigger or manual)
    LoadRequested,
    /// A page arrived and has been deduplicated
    PageReceived {
        ticket: FetchTicket,
        items: Vec<T>,
        code: String,
        is_last_page: bool,
        next_cursor: Option<Cursor>,
    },
    /// A page request failed
    FetchFailed { ticket: FetchTicket, error: String },
    /// The list was discarded
    Reset,
    /// Loading was switched on or off
    EnabledChanged(bool),
}

/// Side effects requested by `update`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Fetch(FetchTicket),
    Notify(Notice),
}

/// State of one incrementally loaded list
#[derive(Debug, Clone)]
pub struct ListState<T> {
    scope: ScopeKey,
    items: Vec<T>,
    phase: Phase,
    has_more: bool,
    enabled: bool,
    cursor: Option<Cursor>,
    generation: u64,
    in_flight: Option<FetchTicket>,
    last_error: Option<String>,
    pages_loaded: usize,
}

impl<T> ListState<T> {
    pub fn new(scope: ScopeKey) -> Self {
        Self {
            scope,
            items: Vec::new(),
            phase: Phase::Idle,
            has_more: true,
            enabled: true,
            cursor: None,
            generation: 0,
            in_flight: None,
            last_error: None,
            pages_loaded: 0,
        }
    }

    pub fn scope(&self) -> &ScopeKey {
        &self.scope
    }

    /// Move the list to another scope
    ///
    /// Only meaningful right before a `Reset`.
    pub fn set_scope(&mut self, scope: ScopeKey) {
        self.scope = scope;
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Cursor the next page will be requested with
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a result for `ticket` would still be applied
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.in_flight.as_ref() == Some(ticket)
    }

    /// Update the list state based on a message
    pub fn update(&mut self, message: Message<T>) -> Effect {
        match message {
            Message::LoadRequested => {
                if !self.enabled || !self.has_more || self.in_flight.is_some() {
                    return Effect::None;
                }

                let ticket = FetchTicket {
                    generation: self.generation,
                    cursor: self.cursor.clone(),
                };
                self.phase = if self.pages_loaded == 0 {
                    Phase::Loading
                } else {
                    Phase::LoadingMore
                };
                self.in_flight = Some(ticket.clone());
                Effect::Fetch(ticket)
            }
            Message::PageReceived {
                ticket,
                items,
                code,
                is_last_page,
                next_cursor,
            } => {
                if !self.is_current(&ticket) {
                    log::debug!(
                        "Ignoring page for stale generation {} in scope {}",
                        ticket.generation,
                        self.scope
                    );
                    return Effect::None;
                }

                // Nothing new and the same cursor again means the next request would
                // repeat this one.
                let stalled = items.is_empty()
                    && next_cursor.is_some()
                    && next_cursor.as_ref() == ticket.cursor();

                self.in_flight = None;
                self.phase = Phase::Idle;
                self.last_error = None;
                self.pages_loaded += 1;
                self.items.extend(items);
                self.has_more = !is_last_page && next_cursor.is_some() && !stalled;
                if next_cursor.is_some() {
                    self.cursor = next_cursor;
                }

                if code != SUCCESS_CODE {
                    Effect::Notify(Notice::Exhausted {
                        scope: self.scope.clone(),
                        code,
                    })
                } else if stalled && !is_last_page {
                    log::warn!("Cursor stalled in scope {}", self.scope);
                    match ticket.cursor {
                        Some(cursor) => Effect::Notify(Notice::CursorStalled {
                            scope: self.scope.clone(),
                            cursor,
                        }),
                        None => Effect::None,
                    }
                } else if !is_last_page && !self.has_more {
                    Effect::Notify(Notice::CursorUnavailable {
                        scope: self.scope.clone(),
                    })
                } else {
                    Effect::None
                }
            }
            Message::FetchFailed { ticket, error } => {
                if !self.is_current(&ticket) {
                    log::debug!(
                        "Ignoring failure for stale generation {} in scope {}",
                        ticket.generation,
                        self.scope
                    );
                    return Effect::None;
                }

                self.in_flight = None;
                self.phase = Phase::Error;
                self.last_error = Some(error.clone());
                Effect::Notify(Notice::FetchFailed {
                    scope: self.scope.clone(),
                    error,
                })
            }
            Message::Reset => {
                self.items.clear();
                self.phase = Phase::Idle;
                self.has_more = true;
                self.cursor = None;
                self.in_flight = None;
                self.last_error = None;
                self.pages_loaded = 0;
                self.generation += 1;
                Effect::None
            }
            Message::EnabledChanged(enabled) => {
                self.enabled = enabled;
                Effect::None
            }
        }
    }
}
