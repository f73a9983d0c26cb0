//! Scripted transport for tests and offline use.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::PoisonError;

use super::transport::{HttpResponse, Method, Params, Transport};
use crate::error::FerroError;

/// A request recorded by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl RecordedRequest {
    /// First value of a parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Replays queued responses in order and records every request.
///
/// When the queue is empty the fallback handler, if any, answers instead;
/// without one the request fails with a transport error.
///
/// ```
/// use ferro_myvariant::client::{MockTransport, Transport};
///
/// let mock = MockTransport::new();
/// mock.push_json(200, r#"{"_id": "chr1:g.35366C>T"}"#);
/// let response = mock.get("http://localhost/variant/chr1:g.35366C>T", &[]).unwrap();
/// assert_eq!(response.status, 200);
/// assert_eq!(mock.requests().len(), 1);
/// ```
#[derive(Default)]
pub struct MockTransport {
    queue: Mutex<VecDeque<Result<HttpResponse, FerroError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    fallback: Option<Box<dyn Fn(&RecordedRequest) -> HttpResponse + Send + Sync>>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("queued", &self.lock_queue().len())
            .field("requests", &self.lock_requests().len())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl MockTransport {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that answers every request with `handler`.
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> HttpResponse + Send + Sync + 'static,
    {
        Self {
            fallback: Some(Box::new(handler)),
            ..Self::default()
        }
    }

    /// Queue a response.
    pub fn push(&self, response: HttpResponse) {
        self.lock_queue().push_back(Ok(response));
    }

    /// Queue a response with the given status and body.
    pub fn push_json(&self, status: u16, body: impl Into<String>) {
        self.push(HttpResponse::new(status, body));
    }

    /// Queue a network failure.
    pub fn push_error(&self, err: FerroError) {
        self.lock_queue().push_back(Err(err));
    }

    /// All requests seen so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock_requests().clone()
    }

    /// Number of queued responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.lock_queue().len()
    }

    fn respond(&self, method: Method, url: &str, params: &Params) -> Result<HttpResponse, FerroError> {
        let request = RecordedRequest {
            method,
            url: url.to_string(),
            params: params.to_vec(),
        };
        self.lock_requests().push(request.clone());

        if let Some(next) = self.lock_queue().pop_front() {
            return next;
        }
        match &self.fallback {
            Some(handler) => Ok(handler(&request)),
            None => Err(FerroError::transport(
                format!("no mock response queued for {} {}", method, url),
                None,
            )),
        }
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<HttpResponse, FerroError>>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_requests(&self) -> std::sync::MutexGuard<'_, Vec<RecordedRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MockTransport {
    fn get(&self, url: &str, params: &Params) -> Result<HttpResponse, FerroError> {
        self.respond(Method::Get, url, params)
    }

    fn post(&self, url: &str, form: &Params) -> Result<HttpResponse, FerroError> {
        self.respond(Method::Post, url, form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_then_fallback() {
        let mock = MockTransport::with_handler(|_| HttpResponse::new(200, "fallback"));
        mock.push_json(200, "first");

        assert_eq!(mock.get("u", &[]).unwrap().body, "first");
        assert_eq!(mock.get("u", &[]).unwrap().body, "fallback");
        assert_eq!(mock.remaining(), 0);
    }

    #[test]
    fn test_empty_queue_is_transport_error() {
        let mock = MockTransport::new();
        let err = mock.post("u", &[]).unwrap_err();
        assert!(matches!(err, FerroError::Transport { .. }));
    }

    #[test]
    fn test_requests_are_recorded() {
        let mock = MockTransport::new();
        mock.push_json(200, "[]");
        let form = vec![("ids".to_string(), "a,b".to_string())];
        mock.post("http://localhost/variant", &form).unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].param("ids"), Some("a,b"));
        assert_eq!(requests[0].param("fields"), None);
    }
}
