//! The HTTP seam between the client and the network.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FerroError;

/// Query-string parameters or form fields, in insertion order.
pub type Params = [(String, String)];

/// HTTP method of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// A response as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
    /// Whether the response was served from the response cache.
    pub from_cache: bool,
}

impl HttpResponse {
    /// A fresh (uncached) response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            from_cache: false,
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into a transport error.
    pub fn error_for_status(self) -> Result<Self, FerroError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(self.status_error())
        }
    }

    /// A transport error carrying this response's status and body excerpt.
    pub fn status_error(&self) -> FerroError {
        let mut msg = self.body.trim().to_string();
        if msg.len() > 200 {
            let cut = (0..=200).rev().find(|i| msg.is_char_boundary(*i)).unwrap_or(0);
            msg.truncate(cut);
        }
        FerroError::transport(msg, Some(self.status))
    }
}

/// Blocking HTTP transport.
///
/// Implementations fail with [`FerroError::Transport`] on network errors and
/// return non-2xx responses as-is; status handling is the caller's concern.
pub trait Transport {
    /// `GET url?params`
    fn get(&self, url: &str, params: &Params) -> Result<HttpResponse, FerroError>;

    /// `POST url` with an urlencoded form body.
    fn post(&self, url: &str, form: &Params) -> Result<HttpResponse, FerroError>;

    /// Dispatch on `method`.
    fn send(&self, method: Method, url: &str, params: &Params) -> Result<HttpResponse, FerroError> {
        match method {
            Method::Get => self.get(url, params),
            Method::Post => self.post(url, params),
        }
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str, params: &Params) -> Result<HttpResponse, FerroError> {
        (**self).get(url, params)
    }

    fn post(&self, url: &str, form: &Params) -> Result<HttpResponse, FerroError> {
        (**self).post(url, form)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get(&self, url: &str, params: &Params) -> Result<HttpResponse, FerroError> {
        (**self).get(url, params)
    }

    fn post(&self, url: &str, form: &Params) -> Result<HttpResponse, FerroError> {
        (**self).post(url, form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_for_status() {
        assert!(HttpResponse::new(200, "[]").error_for_status().is_ok());

        let err = HttpResponse::new(404, "not found").error_for_status().unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("HTTP 404"));
    }

    #[test]
    fn test_long_error_body_is_truncated() {
        let body = "x".repeat(1000);
        let err = HttpResponse::new(500, body).error_for_status().unwrap_err();
        assert!(err.to_string().len() < 300);
    }

    #[test]
    fn test_method_wire_names() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(serde_json::to_string(&Method::Post).unwrap(), "\"POST\"");
    }
}
