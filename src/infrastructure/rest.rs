//! REST page fetcher
//!
//! Talks to the console backend, whose list endpoints answer with an envelope of the form
//! `{ code, message, result: { <listField>: [...], pagination: { last }, nextCursor? } }`.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use super::{
    fetcher::{FetchError, PageFetcher},
    resource::Resource,
};
use crate::domain::{
    cursor::Cursor,
    filters::{FetchMode, Filters},
    page::{PageResult, SUCCESS_CODE},
    scope::ScopeKey,
};

/// Response envelope shared by every endpoint
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: Option<Value>,
}

/// Shared HTTP client for the console backend
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<SecretString>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<SecretString>) -> Self {
        Self::with_http(Client::new(), base_url, token)
    }

    /// Build a client whose requests give up after `timeout`
    pub fn with_timeout(
        base_url: impl Into<String>,
        token: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http(http, base_url, token))
    }

    pub fn with_http(http: Client, base_url: impl Into<String>, token: Option<SecretString>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` with `query` and decode the envelope
    pub async fn get_envelope(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Envelope, FetchError> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.http.get(url).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let res = request.send().await?;
        if res.status().is_success() {
            let bytes = res.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(FetchError::UnexpectedStatus { status, body })
        }
    }
}

/// Fetches pages of one [`Resource`]
pub struct RestFetcher<T> {
    client: ApiClient,
    resource: Resource,
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> RestFetcher<T> {
    pub fn new(client: ApiClient, resource: Resource) -> Self {
        let name = resource.name();
        Self {
            client,
            resource,
            name,
            _marker: PhantomData,
        }
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }
}

/// Build the query string for one page request
///
/// Filters are only forwarded in search mode.
pub fn page_query(cursor: Option<&Cursor>, filters: &Filters) -> Vec<(&'static str, String)> {
    let mut query = match filters.mode() {
        FetchMode::List => Vec::new(),
        FetchMode::Search => filters.query_pairs(),
    };
    if let Some(cursor) = cursor {
        query.push(("cursor", cursor.to_string()));
    }
    query
}

/// Normalize an envelope into a page
///
/// A non-success code yields an exhausted page rather than an error. A missing
/// `pagination.last` flag is read as "last page".
pub fn decode_page<T: DeserializeOwned>(
    envelope: Envelope,
    list_field: &str,
) -> Result<PageResult<T>, FetchError> {
    if envelope.code != SUCCESS_CODE {
        log::warn!(
            "Backend answered {}: {}",
            envelope.code,
            envelope.message
        );
        return Ok(PageResult::envelope_failure(envelope.code));
    }

    let mut result = envelope.result.unwrap_or(Value::Null);
    let items = match result.get_mut(list_field).map(Value::take) {
        Some(Value::Null) => Vec::new(),
        Some(list) => serde_json::from_value(list)?,
        None => {
            return Err(FetchError::MissingListField {
                field: list_field.to_string(),
            })
        }
    };
    let is_last_page = result
        .pointer("/pagination/last")
        .and_then(Value::as_bool)
        .unwrap_or(true);
    let next_cursor = result
        .get("nextCursor")
        .and_then(Value::as_str)
        .filter(|cursor| !cursor.is_empty())
        .map(Cursor::new);

    Ok(PageResult {
        code: envelope.code,
        items,
        is_last_page,
        next_cursor,
    })
}

#[async_trait]
impl<T> PageFetcher<T> for RestFetcher<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn resource_name(&self) -> &str {
        &self.name
    }

    fn scope_for(&self, filters: &Filters) -> ScopeKey {
        self.resource.scope(filters.keyword())
    }

    async fn fetch(
        &self,
        cursor: Option<&Cursor>,
        filters: &Filters,
    ) -> Result<PageResult<T>, FetchError> {
        let endpoint = self.resource.endpoint(filters.mode());
        let query = page_query(cursor, filters);
        tracing::debug!(
            resource = %self.name,
            path = %endpoint.path,
            cursor = ?cursor.map(Cursor::as_str),
            "Fetching page"
        );

        let envelope = self.client.get_envelope(&endpoint.path, &query).await?;
        decode_page(envelope, endpoint.list_field)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn envelope(value: Value) -> Envelope {
        serde_json::from_value(value).expect("envelope")
    }

    #[test]
    fn test_decode_success_page() {
        let page: PageResult<Value> = decode_page(
            envelope(json!({
                "code": "COMMON200",
                "message": "OK",
                "result": {
                    "categoryList": [{ "id": 1 }, { "id": 2 }],
                    "pagination": { "last": false },
                    "nextCursor": "2025-01-01T19:00:00",
                }
            })),
            "categoryList",
        )
        .expect("page");

        assert!(page.is_success());
        assert_eq!(page.items, vec![json!({ "id": 1 }), json!({ "id": 2 })]);
        assert!(!page.is_last_page);
        assert_eq!(page.next_cursor, Some(Cursor::new("2025-01-01T19:00:00")));
    }

    #[test]
    fn test_decode_failure_code_is_exhausted() {
        let page: PageResult<Value> = decode_page(
            envelope(json!({ "code": "COMMON500", "message": "boom", "result": null })),
            "categoryList",
        )
        .expect("page");

        assert!(!page.is_success());
        assert!(page.is_last_page);
        assert!(page.items.is_empty());
        assert_eq!(page.code, "COMMON500");
    }

    #[test]
    fn test_decode_missing_pagination_is_last() {
        let page: PageResult<Value> = decode_page(
            envelope(json!({ "code": "COMMON200", "result": { "fileList": null } })),
            "fileList",
        )
        .expect("page");
        assert!(page.items.is_empty());
        assert!(page.is_last_page);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn test_decode_missing_list_field() {
        let result: Result<PageResult<Value>, _> = decode_page(
            envelope(json!({ "code": "COMMON200", "result": { "historyList": [] } })),
            "fileList",
        );
        assert!(matches!(
            result,
            Err(FetchError::MissingListField { ref field }) if field == "fileList"
        ));
    }

    #[test]
    fn test_decode_bad_items() {
        let result: Result<PageResult<u32>, _> = decode_page(
            envelope(json!({ "code": "COMMON200", "result": { "fileList": ["x"] } })),
            "fileList",
        );
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_page_query_modes() {
        let cursor = Cursor::new("2025-01-01T19:00:00");

        assert!(page_query(None, &Filters::new()).is_empty());
        assert_eq!(
            page_query(Some(&cursor), &Filters::new()),
            vec![("cursor", String::from("2025-01-01T19:00:00"))]
        );
        assert_eq!(
            page_query(Some(&cursor), &Filters::new().with_keyword("urgent")),
            vec![
                ("keyword", String::from("urgent")),
                ("cursor", String::from("2025-01-01T19:00:00")),
            ]
        );
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = ApiClient::new("http://localhost:8080/", None);
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}
