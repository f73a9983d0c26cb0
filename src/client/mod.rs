//! Client for the MyVariant.info annotation service.
//!
//! [`MyVariantClient`] wraps a [`Transport`] with the session's response
//! cache and exposes the service endpoints:
//!
//! | Operation        | Request                              |
//! |------------------|--------------------------------------|
//! | `metadata`       | `GET /metadata`                      |
//! | `get_fields`     | `GET /metadata/fields`               |
//! | `getvariant`     | `GET /variant/{id}`                  |
//! | `getvariants`    | `POST /variant` (batched `ids`)      |
//! | `query`          | `GET /query`                         |
//! | `query_all`      | `GET /query` with `fetch_all=true`   |
//! | `querymany`      | `POST /query` (batched `q`)          |
//!
//! # Example
//!
//! ```
//! use ferro_myvariant::client::{MockTransport, MyVariantClient, QueryOptions};
//! use ferro_myvariant::SessionConfig;
//!
//! let mock = MockTransport::new();
//! mock.push_json(200, r#"{"_id": "chr1:g.35366C>T", "cadd": {"phred": 12.3}}"#);
//!
//! let client = MyVariantClient::with_transport(SessionConfig::default(), mock).unwrap();
//! let hit = client
//!     .getvariant("chr1:g.35366C>T", &QueryOptions::new().fields("cadd.phred"))
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(hit.id(), Some("chr1:g.35366C>T"));
//! ```

#[cfg(feature = "http")]
mod http;
mod mock;
mod options;
mod transport;
mod types;

#[cfg(feature = "http")]
pub use http::{HttpTransport, USER_AGENT};
pub use mock::{MockTransport, RecordedRequest};
pub use options::QueryOptions;
pub use transport::{HttpResponse, Method, Params, Transport};
pub use types::{Hit, QueryResponse, NO_MORE_RESULTS};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::batch::{BatchMode, BatchOutcome, BatchResponse, BatchRunner, QueryInput};
use crate::cache::{CacheStats, CachingTransport};
use crate::config::SessionConfig;
use crate::error::FerroError;
use crate::scroll::{PageFetcher, PageRequest, ScrollStream};

/// Client for one annotation service session.
pub struct MyVariantClient<T> {
    config: SessionConfig,
    transport: CachingTransport<T>,
}

#[cfg(feature = "http")]
impl MyVariantClient<HttpTransport> {
    /// Create a client for the public service with default settings.
    pub fn new() -> Result<Self, FerroError> {
        Self::with_config(SessionConfig::default())
    }

    /// Create a network client from a session configuration.
    pub fn with_config(config: SessionConfig) -> Result<Self, FerroError> {
        let user_agent = config.user_agent.as_deref().unwrap_or(USER_AGENT);
        let transport = HttpTransport::new(config.timeout(), user_agent)?;
        Self::with_transport(config, transport)
    }
}

impl<T> std::fmt::Debug for MyVariantClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MyVariantClient")
            .field("url", &self.config.base_url())
            .field("caching", &self.transport.is_enabled())
            .finish()
    }
}

impl<T: Transport> MyVariantClient<T> {
    /// Create a client over any transport.
    pub fn with_transport(config: SessionConfig, transport: T) -> Result<Self, FerroError> {
        config.validate()?;
        let transport = CachingTransport::new(transport, config.cache.capacity);
        if config.cache.enabled {
            transport.enable(&config.cache.name, &config.cache.methods);
        }
        Ok(Self { config, transport })
    }

    /// Session settings.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Mutable session settings, read again by the next operation.
    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    /// The caching transport in use.
    pub fn transport(&self) -> &CachingTransport<T> {
        &self.transport
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url(), path)
    }

    fn get_json<D: DeserializeOwned>(&self, path: &str, params: &Params) -> Result<D, FerroError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.transport.get(&url, params)?.error_for_status()?;
        Ok(serde_json::from_str(&response.body)?)
    }

    /// Service metadata: sources, versions, and statistics.
    pub fn metadata(&self) -> Result<Value, FerroError> {
        self.get_json("metadata", &[])
    }

    /// Available annotation fields, optionally restricted to names matching
    /// `search`.
    pub fn get_fields(&self, search: Option<&str>) -> Result<Map<String, Value>, FerroError> {
        let params: Vec<(String, String)> = search
            .map(|term| vec![("search".to_string(), term.to_string())])
            .unwrap_or_default();
        self.get_json("metadata/fields", &params)
    }

    /// Look up a single variant by its HGVS id.
    ///
    /// Returns `None` when the service has no record and
    /// `raise_for_status` is off; with it on, a non-2xx status is an error.
    pub fn getvariant(&self, id: &str, opts: &QueryOptions) -> Result<Option<Hit>, FerroError> {
        let url = self.url(&format!("variant/{}", id));
        debug!("GET {}", url);
        let response = self.transport.get(&url, &opts.params())?;
        if !response.is_success() {
            if self.config.raise_for_status {
                return Err(response.status_error());
            }
            debug!("no record for {} (HTTP {})", id, response.status);
            return Ok(None);
        }
        let value: Value = serde_json::from_str(&response.body)?;
        match value {
            Value::Object(map) => Ok(Some(Hit(map))),
            // The service answers some ids with a list of records
            Value::Array(items) => Ok(items
                .into_iter()
                .find_map(|item| match item {
                    Value::Object(map) => Some(Hit(map)),
                    _ => None,
                })),
            _ => Ok(None),
        }
    }

    /// Look up many variants by id, in batches.
    pub fn getvariants<'i>(
        &self,
        ids: impl Into<QueryInput<'i>>,
        opts: &QueryOptions,
    ) -> Result<BatchOutcome, FerroError> {
        let params = opts.params();
        let url = self.url("variant");
        let mut runner = BatchRunner::new(opts.batch_config(&self.config));
        runner.run(BatchMode::Ids, ids.into(), |batch| {
            self.post_batch(&url, "ids", batch, &params)
        })
    }

    /// Run a single search query.
    pub fn query(&self, q: &str, opts: &QueryOptions) -> Result<QueryResponse, FerroError> {
        let mut params = vec![("q".to_string(), q.to_string())];
        params.extend(opts.params());
        self.get_json("query", &params)
    }

    /// Stream every hit of a search query, page by page.
    ///
    /// Page requests bypass the response cache. See [`ScrollStream`] for
    /// how failures end the stream.
    pub fn query_all(&self, q: &str, opts: &QueryOptions) -> ScrollStream<'_, ScrollPages<'_, T>> {
        ScrollStream::new(
            q,
            ScrollPages {
                client: self,
                params: opts.params(),
            },
        )
    }

    /// Search for many terms, in batches.
    ///
    /// Terms that match nothing are reported as missing and terms that
    /// match several records as duplicates, either in the log (verbose) or
    /// in a [`crate::batch::QueryReport`] (`return_all`).
    pub fn querymany<'i>(
        &self,
        terms: impl Into<QueryInput<'i>>,
        opts: &QueryOptions,
    ) -> Result<BatchOutcome, FerroError> {
        let params = opts.params();
        let url = self.url("query");
        let mut runner = BatchRunner::new(opts.batch_config(&self.config));
        runner.run(BatchMode::Terms, terms.into(), |batch| {
            self.post_batch(&url, "q", batch, &params)
        })
    }

    fn post_batch(
        &self,
        url: &str,
        key: &str,
        batch: &[String],
        params: &Params,
    ) -> Result<BatchResponse, FerroError> {
        let mut form = Vec::with_capacity(params.len() + 1);
        form.push((key.to_string(), batch.join(",")));
        form.extend(params.iter().cloned());

        let response = self.transport.post(url, &form)?.error_for_status()?;
        Ok(BatchResponse {
            from_cache: response.from_cache,
            body: response.body,
        })
    }

    /// Cache responses of this session under `name`.
    pub fn set_caching(&self, name: Option<&str>) {
        let name = name.unwrap_or(self.config.cache.name.as_str());
        self.transport.enable(name, &self.config.cache.methods);
    }

    /// Stop caching responses.
    pub fn stop_caching(&self) {
        self.transport.disable();
    }

    /// Drop all cached responses.
    pub fn clear_cache(&self) {
        self.transport.clear();
    }

    /// Response cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.transport.stats()
    }
}

/// Page fetcher behind [`MyVariantClient::query_all`].
pub struct ScrollPages<'c, T> {
    client: &'c MyVariantClient<T>,
    params: Vec<(String, String)>,
}

impl<T: Transport> PageFetcher for ScrollPages<'_, T> {
    fn fetch_page(&mut self, request: PageRequest<'_>) -> Result<QueryResponse, FerroError> {
        let mut params = match request {
            PageRequest::Initial(q) => vec![("q".to_string(), q.to_string())],
            PageRequest::Continue(cursor) => vec![("scroll_id".to_string(), cursor.to_string())],
        };
        params.push(("fetch_all".to_string(), "true".to_string()));
        params.extend(self.params.iter().cloned());

        let url = self.client.url("query");
        let response = {
            let _uncached = self.client.transport.suspend();
            self.client.transport.get(&url, &params)?
        };

        if !response.is_success() {
            // The exhausted-cursor sentinel may come with an error status
            if let Ok(page) = serde_json::from_str::<QueryResponse>(&response.body) {
                if page.error.is_some() {
                    return Ok(page);
                }
            }
            return Err(response.status_error());
        }
        Ok(serde_json::from_str(&response.body)?)
    }
}
