//! Incremental list controller
//!
//! Drives a [`ListState`] against a [`PageFetcher`]:
//! - at most one page request is in flight per list, whichever handle asks
//! - pages are filtered through the shared [`DedupRegistry`] before being appended
//! - the next cursor is derived from the last item of each raw page
//! - resets bump the list generation, so late answers to older requests are dropped
//!
//! The list lock is never held across a fetch.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::stream::{self, Stream};

use crate::{
    domain::{
        cursor::{Cursor, CursorCodec},
        dedup::DedupRegistry,
        filters::Filters,
        item::PageItem,
        page::PageResult,
        scope::ScopeKey,
    },
    infrastructure::{
        fetcher::{FetchError, PageFetcher},
        notifier::{NoopNotifier, Notifier},
    },
    model::{
        list::{Effect, FetchTicket, ListState, Message, Phase},
        scroll::{LoadStatus, ScrollTrigger, SentinelRect, Viewport},
    },
};

/// What a load request ended up doing
#[derive(Debug)]
pub enum LoadOutcome<T> {
    /// Nothing was requested: already loading, exhausted or disabled
    Skipped,
    /// The list was reset while the request was outstanding; the answer was dropped
    Stale,
    /// A page was applied
    Loaded {
        /// Items in the raw page
        received: usize,
        /// The items this page added to the list
        appended: Vec<T>,
        has_more: bool,
    },
    /// The request failed; the list is unchanged
    Failed(FetchError),
}

impl<T> LoadOutcome<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }

    /// Number of items the page added, zero unless loaded
    pub fn appended_count(&self) -> usize {
        match self {
            LoadOutcome::Loaded { appended, .. } => appended.len(),
            _ => 0,
        }
    }
}

/// Point-in-time copy of a list
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot<T> {
    pub scope: ScopeKey,
    pub filters: Filters,
    pub items: Vec<T>,
    pub phase: Phase,
    pub has_more: bool,
    pub cursor: Option<Cursor>,
    pub last_error: Option<String>,
    pub pages_loaded: usize,
}

struct Session<T> {
    list: ListState<T>,
    filters: Filters,
}

struct Inner<T, F> {
    session: Mutex<Session<T>>,
    fetcher: F,
    registry: DedupRegistry,
    codec: CursorCodec,
    notifier: Arc<dyn Notifier>,
    clear_dedup_on_reset: bool,
}

/// Handle onto an incrementally loaded list
///
/// Clones share the same list.
pub struct IncrementalList<T, F> {
    inner: Arc<Inner<T, F>>,
}

impl<T, F> Clone for IncrementalList<T, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Configures an [`IncrementalList`]
pub struct IncrementalListBuilder<T, F> {
    fetcher: F,
    registry: Option<DedupRegistry>,
    codec: CursorCodec,
    notifier: Arc<dyn Notifier>,
    filters: Filters,
    enabled: bool,
    clear_dedup_on_reset: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> IncrementalListBuilder<T, F>
where
    T: PageItem + Clone + Send + 'static,
    F: PageFetcher<T>,
{
    /// Share a dedup registry with other lists
    pub fn registry(mut self, registry: DedupRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn codec(mut self, codec: CursorCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Filters the first load uses
    pub fn filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Start disabled; loads are ignored until enabled
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether resetting also forgets the scope's delivered identifiers
    ///
    /// On by default; with it off, a reloaded first page is filtered against what was
    /// shown before the reset.
    pub fn clear_dedup_on_reset(mut self, clear: bool) -> Self {
        self.clear_dedup_on_reset = clear;
        self
    }

    pub fn build(self) -> IncrementalList<T, F> {
        let scope = self.fetcher.scope_for(&self.filters);
        let mut list = ListState::new(scope);
        list.update(Message::EnabledChanged(self.enabled));

        IncrementalList {
            inner: Arc::new(Inner {
                session: Mutex::new(Session {
                    list,
                    filters: self.filters,
                }),
                fetcher: self.fetcher,
                registry: self.registry.unwrap_or_default(),
                codec: self.codec,
                notifier: self.notifier,
                clear_dedup_on_reset: self.clear_dedup_on_reset,
            }),
        }
    }
}

impl<T, F> IncrementalList<T, F>
where
    T: PageItem + Clone + Send + 'static,
    F: PageFetcher<T>,
{
    pub fn builder(fetcher: F) -> IncrementalListBuilder<T, F> {
        IncrementalListBuilder {
            fetcher,
            registry: None,
            codec: CursorCodec::default(),
            notifier: Arc::new(NoopNotifier),
            filters: Filters::default(),
            enabled: true,
            clear_dedup_on_reset: true,
            _marker: PhantomData,
        }
    }

    /// A list with default settings and its own registry
    pub fn new(fetcher: F) -> Self {
        Self::builder(fetcher).build()
    }

    fn session(&self) -> MutexGuard<'_, Session<T>> {
        self.inner
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn fetcher(&self) -> &F {
        &self.inner.fetcher
    }

    pub fn registry(&self) -> &DedupRegistry {
        &self.inner.registry
    }

    pub fn scope(&self) -> ScopeKey {
        self.session().list.scope().clone()
    }

    pub fn filters(&self) -> Filters {
        self.session().filters.clone()
    }

    pub fn phase(&self) -> Phase {
        self.session().list.phase()
    }

    pub fn has_more(&self) -> bool {
        self.session().list.has_more()
    }

    pub fn is_in_flight(&self) -> bool {
        self.session().list.is_in_flight()
    }

    pub fn len(&self) -> usize {
        self.session().list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.session().list.is_empty()
    }

    pub fn status(&self) -> LoadStatus {
        let session = self.session();
        LoadStatus {
            has_more: session.list.has_more() && session.list.is_enabled(),
            in_flight: session.list.is_in_flight(),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.session()
            .list
            .update(Message::EnabledChanged(enabled));
    }

    /// Discard the accumulated list
    ///
    /// The next [`Self::load_more`] starts again from the first page. Nothing is
    /// reloaded by this call; see [`Self::refetch`].
    pub fn reset(&self) {
        let mut session = self.session();
        self.reset_locked(&mut session);
    }

    fn reset_locked(&self, session: &mut Session<T>) {
        let scope = session.list.scope().clone();
        session.list.update(Message::Reset);
        if self.inner.clear_dedup_on_reset {
            let forgotten = self.inner.registry.clear(&scope);
            log::debug!("Reset scope {scope}, forgot {forgotten} id(s)");
        }
    }

    /// Request the next page
    ///
    /// A no-op while a request is outstanding or once the list is exhausted.
    pub async fn load_more(&self) -> LoadOutcome<T> {
        match self.begin(None) {
            Some((ticket, filters)) => self.run(ticket, filters).await,
            None => LoadOutcome::Skipped,
        }
    }

    /// Reset and load the first page again as one step
    pub async fn refetch(&self) -> LoadOutcome<T> {
        match self.begin(Some(None)) {
            Some((ticket, filters)) => self.run(ticket, filters).await,
            None => LoadOutcome::Skipped,
        }
    }

    /// Switch to `filters` and load their first page as one step
    ///
    /// The list moves to the scope the fetcher assigns to `filters`; both the old and
    /// the new scope start from a clean dedup set.
    pub async fn reload_with_filters(&self, filters: Filters) -> LoadOutcome<T> {
        match self.begin(Some(Some(filters))) {
            Some((ticket, filters)) => self.run(ticket, filters).await,
            None => LoadOutcome::Skipped,
        }
    }

    /// Take a fetch ticket, optionally restarting first
    ///
    /// `restart` is `None` for a plain continuation, `Some(None)` to restart with the
    /// current filters and `Some(Some(filters))` to restart with new ones.
    fn begin(&self, restart: Option<Option<Filters>>) -> Option<(FetchTicket, Filters)> {
        let mut session = self.session();

        if let Some(new_filters) = restart {
            self.reset_locked(&mut session);
            if let Some(filters) = new_filters {
                let scope = self.inner.fetcher.scope_for(&filters);
                if self.inner.clear_dedup_on_reset {
                    self.inner.registry.clear(&scope);
                }
                log::info!("Switching {} to scope {scope}", session.list.scope());
                session.list.set_scope(scope);
                session.filters = filters;
            }
        }

        match session.list.update(Message::LoadRequested) {
            Effect::Fetch(ticket) => Some((ticket, session.filters.clone())),
            _ => None,
        }
    }

    async fn run(&self, ticket: FetchTicket, filters: Filters) -> LoadOutcome<T> {
        let result = self.inner.fetcher.fetch(ticket.cursor(), &filters).await;
        self.apply(ticket, result)
    }

    fn apply(
        &self,
        ticket: FetchTicket,
        result: Result<PageResult<T>, FetchError>,
    ) -> LoadOutcome<T> {
        let (outcome, effect) = {
            let mut session = self.session();
            if !session.list.is_current(&ticket) {
                log::debug!(
                    "Dropping answer for generation {} in scope {}",
                    ticket.generation(),
                    session.list.scope()
                );
                return LoadOutcome::Stale;
            }

            match result {
                Ok(page) => {
                    let next_cursor = self.inner.codec.derive_from_page(&page.items);
                    let received = page.items.len();
                    let scope = session.list.scope().clone();
                    let fresh = self.inner.registry.filter_page(&scope, page.items);
                    let appended = fresh.clone();

                    let effect = session.list.update(Message::PageReceived {
                        ticket,
                        items: fresh,
                        code: page.code,
                        is_last_page: page.is_last_page,
                        next_cursor,
                    });
                    let has_more = session.list.has_more();
                    log::debug!(
                        "Scope {scope}: received {received}, appended {}, has_more={has_more}",
                        appended.len()
                    );
                    (
                        LoadOutcome::Loaded {
                            received,
                            appended,
                            has_more,
                        },
                        effect,
                    )
                }
                Err(error) => {
                    log::error!("Failed to load page: {error}");
                    let effect = session.list.update(Message::FetchFailed {
                        ticket,
                        error: error.to_string(),
                    });
                    (LoadOutcome::Failed(error), effect)
                }
            }
        };

        if let Effect::Notify(notice) = effect {
            self.inner.notifier.notify(notice);
        }
        outcome
    }

    /// Evaluate a scroll trigger and load the next page if it fires
    pub async fn on_scroll(
        &self,
        trigger: &mut ScrollTrigger,
        viewport: Viewport,
        sentinel: SentinelRect,
    ) -> LoadOutcome<T> {
        if trigger.check(viewport, sentinel, self.status()) {
            self.load_more().await
        } else {
            LoadOutcome::Skipped
        }
    }

    /// Keep loading until the list is exhausted or `max_pages` pages were loaded
    ///
    /// Returns the number of pages applied by this call.
    pub async fn load_all(&self, max_pages: Option<usize>) -> Result<usize, FetchError> {
        let mut pages = 0;
        while max_pages.is_none_or(|max| pages < max) {
            match self.load_more().await {
                LoadOutcome::Loaded { .. } => pages += 1,
                LoadOutcome::Failed(error) => return Err(error),
                LoadOutcome::Skipped | LoadOutcome::Stale => break,
            }
        }
        Ok(pages)
    }

    pub fn items(&self) -> Vec<T> {
        self.session().list.items().to_vec()
    }

    pub fn snapshot(&self) -> ListSnapshot<T> {
        let session = self.session();
        ListSnapshot {
            scope: session.list.scope().clone(),
            filters: session.filters.clone(),
            items: session.list.items().to_vec(),
            phase: session.list.phase(),
            has_more: session.list.has_more(),
            cursor: session.list.cursor().cloned(),
            last_error: session.list.last_error().map(String::from),
            pages_loaded: session.list.pages_loaded(),
        }
    }

    /// Stream of newly appended items, one batch per loaded page
    ///
    /// Ends once the list is exhausted, after yielding the first error, or when a
    /// request is skipped because another handle is loading.
    pub fn pages(&self) -> impl Stream<Item = Result<Vec<T>, FetchError>> {
        stream::unfold(Some(self.clone()), |list| async move {
            let list = list?;
            match list.load_more().await {
                LoadOutcome::Loaded { appended, .. } => Some((Ok(appended), Some(list))),
                LoadOutcome::Failed(error) => Some((Err(error), None)),
                LoadOutcome::Skipped | LoadOutcome::Stale => None,
            }
        })
    }
}
