//! Lazy pagination over queries larger than one page.
//!
//! A [`ScrollStream`] requests the first page with the query text, then
//! follows the server-issued cursor until the service reports that no
//! results are left.
//!
//! A server-side error or a transport failure ends the stream early. Hits
//! already yielded stay valid and no panic or `Err` item is produced; the
//! failure is kept on the stream and can be read back with
//! [`ScrollStream::error`] once iteration stops. Callers that must tell a
//! complete result from a truncated one should check it.

use std::fmt;
use std::mem;
use std::vec;

use tracing::{debug, warn};

use crate::client::{Hit, QueryResponse};
use crate::error::FerroError;

/// One page request issued by a [`ScrollStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest<'a> {
    /// The first page, selected by the query text.
    Initial(&'a str),
    /// A later page, selected by the cursor of the previous page.
    Continue(&'a str),
}

/// Fetches one page of a paginated query.
pub trait PageFetcher {
    fn fetch_page(&mut self, request: PageRequest<'_>) -> Result<QueryResponse, FerroError>;
}

impl<F> PageFetcher for F
where
    F: FnMut(PageRequest<'_>) -> Result<QueryResponse, FerroError>,
{
    fn fetch_page(&mut self, request: PageRequest<'_>) -> Result<QueryResponse, FerroError> {
        self(request)
    }
}

/// Something worth telling the caller while a stream runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrollEvent {
    /// A page arrived.
    Page {
        number: usize,
        hits: usize,
        total: u64,
    },
    /// The service attached a warning, e.g. an expiring cursor.
    Warning(String),
    /// The stream stopped on an error.
    Error(FerroError),
}

enum ScrollState {
    Init,
    Streaming {
        hits: vec::IntoIter<Hit>,
        cursor: Option<String>,
    },
    Done,
    Failed,
}

type EventFn<'a> = Box<dyn FnMut(&ScrollEvent) + 'a>;

/// Single-pass iterator over every hit of a query.
///
/// ```
/// use ferro_myvariant::client::QueryResponse;
/// use ferro_myvariant::scroll::{PageRequest, ScrollStream};
///
/// let pages = |request: PageRequest<'_>| -> Result<QueryResponse, ferro_myvariant::FerroError> {
///     Ok(match request {
///         PageRequest::Initial(_) => serde_json::from_str(
///             r#"{"total": 2, "_scroll_id": "c1", "hits": [{"_id": "a"}]}"#,
///         )?,
///         PageRequest::Continue("c1") => serde_json::from_str(
///             r#"{"total": 2, "_scroll_id": "c1", "hits": [{"_id": "b"}]}"#,
///         )?,
///         PageRequest::Continue(_) => unreachable!(),
///     })
/// };
///
/// let mut stream = ScrollStream::new("chr1:69500-70000", pages);
/// let ids: Vec<String> = stream.by_ref().filter_map(|h| h.id().map(String::from)).collect();
/// assert_eq!(ids, vec!["a", "b"]);
/// assert_eq!(stream.total(), Some(2));
/// assert!(stream.error().is_none());
/// ```
pub struct ScrollStream<'a, P> {
    fetcher: P,
    query: String,
    state: ScrollState,
    total: Option<u64>,
    pages: usize,
    yielded: usize,
    error: Option<FerroError>,
    on_event: Option<EventFn<'a>>,
}

impl<'a, P: PageFetcher> ScrollStream<'a, P> {
    /// Create a stream; nothing is fetched until the first call to `next`.
    pub fn new(query: impl Into<String>, fetcher: P) -> Self {
        Self {
            fetcher,
            query: query.into(),
            state: ScrollState::Init,
            total: None,
            pages: 0,
            yielded: 0,
            error: None,
            on_event: None,
        }
    }

    /// Register a callback for page, warning and error events.
    pub fn with_events(mut self, on_event: impl FnMut(&ScrollEvent) + 'a) -> Self {
        self.on_event = Some(Box::new(on_event));
        self
    }

    /// The query this stream was created for.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// `total` reported by the first page, once it has arrived.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Number of pages fetched so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Number of hits yielded so far.
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    /// The error that ended the stream, if it was cut short.
    pub fn error(&self) -> Option<&FerroError> {
        self.error.as_ref()
    }

    /// True once the stream will yield nothing more.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, ScrollState::Done | ScrollState::Failed)
    }

    fn emit(&mut self, event: ScrollEvent) {
        if let Some(on_event) = self.on_event.as_mut() {
            on_event(&event);
        }
    }

    fn fail(&mut self, err: FerroError) {
        warn!("scroll over {:?} stopped after {} hits: {}", self.query, self.yielded, err);
        self.emit(ScrollEvent::Error(err.clone()));
        self.error = Some(err);
        self.state = ScrollState::Failed;
    }

    fn fetch(&mut self, cursor: Option<&str>) {
        let request = match cursor {
            Some(cursor) => PageRequest::Continue(cursor),
            None => PageRequest::Initial(&self.query),
        };
        let result = self.fetcher.fetch_page(request);
        match result {
            Ok(page) => self.accept(page),
            Err(err) => self.fail(err),
        }
    }

    fn accept(&mut self, page: QueryResponse) {
        self.pages += 1;
        if let Some(warning) = &page.warning {
            warn!("{}", warning);
            self.emit(ScrollEvent::Warning(warning.clone()));
        }
        if let Some(failure) = page.failure() {
            let err = FerroError::Scroll {
                msg: failure.to_string(),
            };
            self.fail(err);
            return;
        }
        if self.total.is_none() {
            self.total = Some(page.total);
        }
        self.emit(ScrollEvent::Page {
            number: self.pages,
            hits: page.hits.len(),
            total: page.total,
        });

        if page.hits.is_empty() {
            debug!("scroll over {:?} done after {} pages", self.query, self.pages);
            self.state = ScrollState::Done;
            return;
        }
        let cursor = if page.is_exhausted() { None } else { page.cursor };
        self.state = ScrollState::Streaming {
            hits: page.hits.into_iter(),
            cursor,
        };
    }
}

impl<P: PageFetcher> Iterator for ScrollStream<'_, P> {
    type Item = Hit;

    fn next(&mut self) -> Option<Hit> {
        loop {
            match mem::replace(&mut self.state, ScrollState::Done) {
                ScrollState::Init => self.fetch(None),
                ScrollState::Streaming { mut hits, cursor } => {
                    if let Some(hit) = hits.next() {
                        self.state = ScrollState::Streaming { hits, cursor };
                        self.yielded += 1;
                        return Some(hit);
                    }
                    match cursor {
                        Some(cursor) => self.fetch(Some(&cursor)),
                        None => {
                            debug!("scroll over {:?} done without cursor", self.query);
                            self.state = ScrollState::Done;
                        }
                    }
                }
                ScrollState::Done => return None,
                ScrollState::Failed => {
                    self.state = ScrollState::Failed;
                    return None;
                }
            }
        }
    }
}

impl<P: PageFetcher> std::iter::FusedIterator for ScrollStream<'_, P> {}

impl<P> fmt::Debug for ScrollStream<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            ScrollState::Init => "init",
            ScrollState::Streaming { .. } => "streaming",
            ScrollState::Done => "done",
            ScrollState::Failed => "failed",
        };
        f.debug_struct("ScrollStream")
            .field("query", &self.query)
            .field("state", &state)
            .field("total", &self.total)
            .field("pages", &self.pages)
            .field("yielded", &self.yielded)
            .field("error", &self.error)
            .finish()
    }
}
