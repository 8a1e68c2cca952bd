//! Page fetching seam
//!
//! A [`PageFetcher`] performs one network call per page and normalizes whatever the
//! backend returns into a [`PageResult`]. Lists never talk to the network directly.

use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{cursor::Cursor, filters::Filters, page::PageResult, scope::ScopeKey};

/// Errors a page fetch can fail with
///
/// Non-success envelope codes are not errors; they come back as an exhausted page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status: {status} body={body}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response is missing list field `{field}`")]
    MissingListField { field: String },
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("no scripted page left")]
    Exhausted,
}

/// One resource's way of loading a page
#[async_trait]
pub trait PageFetcher<T: Send + 'static>: Send + Sync {
    /// Name of the resource, used as the default scope
    fn resource_name(&self) -> &str;

    /// Scope under which results for `filters` are accumulated
    fn scope_for(&self, filters: &Filters) -> ScopeKey {
        ScopeKey::for_filters(self.resource_name(), filters)
    }

    /// Fetch the page following `cursor`, or the first page if there is none
    async fn fetch(
        &self,
        cursor: Option<&Cursor>,
        filters: &Filters,
    ) -> Result<PageResult<T>, FetchError>;
}

/// A recorded call to an [`InMemoryFetcher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    pub cursor: Option<Cursor>,
    pub filters: Filters,
}

/// Serves scripted pages without touching the network
///
/// Each call pops the next scripted response; every call is recorded.
pub struct InMemoryFetcher<T> {
    name: String,
    responses: Mutex<VecDeque<Result<PageResult<T>, String>>>,
    calls: Mutex<Vec<FetchCall>>,
    delay: Option<Duration>,
    _marker: PhantomData<fn() -> T>,
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> InMemoryFetcher<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            delay: None,
            _marker: PhantomData,
        }
    }

    /// Make every call wait before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a page
    pub fn push_page(&self, page: PageResult<T>) -> &Self {
        lock(&self.responses).push_back(Ok(page));
        self
    }

    /// Queue a transport failure
    pub fn push_error(&self, error: impl Into<String>) -> &Self {
        lock(&self.responses).push_back(Err(error.into()));
        self
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn pending(&self) -> usize {
        lock(&self.responses).len()
    }
}

#[async_trait]
impl<T: Send + 'static> PageFetcher<T> for InMemoryFetcher<T> {
    fn resource_name(&self) -> &str {
        &self.name
    }

    async fn fetch(
        &self,
        cursor: Option<&Cursor>,
        filters: &Filters,
    ) -> Result<PageResult<T>, FetchError> {
        lock(&self.calls).push(FetchCall {
            cursor: cursor.cloned(),
            filters: filters.clone(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = lock(&self.responses).pop_front();
        match response {
            Some(Ok(page)) => Ok(page),
            Some(Err(error)) => Err(FetchError::Unavailable(error)),
            None => Err(FetchError::Exhausted),
        }
    }
}
