//! Stateless HTTP request builder and response parser for the beer API.
//!
//! # Design
//! `BeerClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Executing the round-trip is left to a `Transport`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{canonical_reason, HttpMethod, HttpRequest, HttpResponse};
use crate::types::Beer;

/// Synchronous, stateless client for the beer API.
#[derive(Debug, Clone)]
pub struct BeerClient {
    base_url: String,
}

impl BeerClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_all(&self) -> HttpRequest {
        self.bare(HttpMethod::Get, format!("{}/beers", self.base_url))
    }

    pub fn build_get(&self, id: i32) -> HttpRequest {
        self.bare(HttpMethod::Get, format!("{}/beers/{id}", self.base_url))
    }

    pub fn build_list_by_user(&self, username: &str) -> HttpRequest {
        self.bare(
            HttpMethod::Get,
            format!("{}/beers/{}", self.base_url, encode_segment(username)),
        )
    }

    /// The server assigns the id, so whatever `beer.id` holds is ignored.
    pub fn build_create(&self, beer: &Beer) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, format!("{}/beers", self.base_url), beer)
    }

    pub fn build_update(&self, id: i32, beer: &Beer) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Put, format!("{}/beers/{id}", self.base_url), beer)
    }

    pub fn build_delete(&self, id: i32) -> HttpRequest {
        self.bare(HttpMethod::Delete, format!("{}/beers/{id}", self.base_url))
    }

    pub fn parse_list_all(&self, response: HttpResponse) -> Result<Vec<Beer>, ApiError> {
        parse_list(response)
    }

    pub fn parse_list_by_user(&self, response: HttpResponse) -> Result<Vec<Beer>, ApiError> {
        parse_list(response)
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<Beer, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<Beer, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<Beer, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    /// The service echoes the removed beer; a bodiless 2xx yields `None`.
    pub fn parse_delete(&self, response: HttpResponse) -> Result<Option<Beer>, ApiError> {
        check_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(None);
        }
        decode(&response.body).map(Some)
    }

    fn bare(&self, method: HttpMethod, path: String) -> HttpRequest {
        HttpRequest {
            method,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_json(&self, method: HttpMethod, path: String, beer: &Beer) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(beer).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

fn parse_list(response: HttpResponse) -> Result<Vec<Beer>, ApiError> {
    check_status(&response)?;
    if response.body.trim().is_empty() {
        return Ok(Vec::new());
    }
    decode(&response.body)
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-2xx responses to `ApiError::Protocol`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let status_text = if response.reason.is_empty() {
        canonical_reason(response.status)
            .unwrap_or_default()
            .to_string()
    } else {
        response.reason.clone()
    };
    Err(ApiError::Protocol {
        status: response.status,
        status_text,
    })
}

/// Everything outside RFC 3986 unreserved characters, except `@` and `+`
/// which are legal in a segment and common in account names.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'@')
    .remove(b'+');

/// Percent-encode a value for use as a single path segment.
fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}
