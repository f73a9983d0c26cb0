//! Network transport over `reqwest`.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use super::transport::{HttpResponse, Params, Transport};
use crate::error::FerroError;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("ferro-myvariant/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the given request timeout and user agent.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FerroError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FerroError::Config {
                msg: format!("Failed to create HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    fn read(response: reqwest::blocking::Response) -> Result<HttpResponse, FerroError> {
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(HttpResponse::new(status, body))
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, params: &Params) -> Result<HttpResponse, FerroError> {
        debug!("GET {} {:?}", url, params);
        let response = self.client.get(url).query(params).send()?;
        Self::read(response)
    }

    fn post(&self, url: &str, form: &Params) -> Result<HttpResponse, FerroError> {
        debug!("POST {} ({} form fields)", url, form.len());
        let response = self.client.post(url).form(form).send()?;
        Self::read(response)
    }
}
