//! Client core for a personal beer catalog.
//!
//! # Overview
//! `Synchronizer` owns the client-side view of a user's beer collection and
//! keeps it in step with the remote service. Under it, `BeerClient` builds
//! requests and parses responses without I/O, and a `Transport` performs the
//! round-trip.
//!
//! # Design
//! - `BeerClient` is stateless: each operation is a `build_*` / `parse_*`
//!   pair, so request shapes and status mapping are testable without a
//!   server.
//! - `BeerApi` is the async seam the synchronizer depends on; tests inject
//!   fakes, production uses `HttpBeerApi` over `ReqwestTransport`.
//! - Every mutation is confirmed by a full list refresh; nothing is patched
//!   locally ahead of the server.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod draft;
pub mod error;
pub mod http;
pub mod sync;
pub mod transport;
pub mod types;

pub use api::{BeerApi, HttpBeerApi};
pub use client::BeerClient;
pub use config::{ClientConfig, ConfigError, StalePolicy};
pub use draft::BeerDraft;
pub use error::{ApiError, Field, SubmitError, ValidationErrors};
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse};
pub use sync::{CollectionState, Synchronizer};
pub use transport::{ReqwestTransport, Transport};
pub use types::Beer;
