//! Error types for the beer catalog client.
//!
//! # Design
//! Failures split by where they happened. `Transport` means no response ever
//! arrived; `Protocol` means the server answered with a non-2xx status. The
//! two payload variants cover JSON that could not be produced or understood.
//!
//! `Display` is the user-facing text: the synchronizer stores it verbatim as
//! the collection's error message.

use thiserror::Error;

/// Message used when a transport failure carries no description.
pub const UNREACHABLE_MESSAGE: &str = "Unable to connect to the server";

/// Errors returned by the HTTP client and the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never reached the server or no response came back.
    #[error("{}", transport_message(.0))]
    Transport(Option<String>),

    /// The server responded with a non-2xx status. An empty `status_text`
    /// displays as the bare code.
    #[error("{}", protocol_message(*status, status_text))]
    Protocol { status: u16, status_text: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status of a protocol failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

fn transport_message(message: &Option<String>) -> &str {
    match message.as_deref() {
        Some(m) if !m.is_empty() => m,
        _ => UNREACHABLE_MESSAGE,
    }
}

fn protocol_message(status: u16, status_text: &str) -> String {
    if status_text.is_empty() {
        status.to_string()
    } else {
        format!("{status} {status_text}")
    }
}

/// A form field checked before a beer is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Abv,
    Volume,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Abv => "abv",
            Field::Volume => "volume",
        }
    }
}

/// Per-field validation failures collected from a draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid beer: {}", describe(.0))]
pub struct ValidationErrors(pub Vec<(Field, String)>);

impl ValidationErrors {
    pub fn has(&self, field: Field) -> bool {
        self.0.iter().any(|(f, _)| *f == field)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.iter().map(|(f, _)| *f)
    }
}

fn describe(errors: &[(Field, String)]) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{}: {message}", field.label()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure of a form submission: rejected locally or by the service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    #[error(transparent)]
    Api(#[from] ApiError),
}
