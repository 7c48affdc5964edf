//! Domain types for the beer catalog API.
//!
//! # Design
//! `Beer` mirrors the remote service's JSON schema field-for-field; serde
//! renames to camelCase so the wire names (`pictureUrl`, `howMany`) match
//! exactly. The mock-server crate defines its own copy of the record and the
//! integration tests catch any schema drift between the two.
//!
//! The service is loose about optional text: fields may be absent or `null`.
//! Both collapse to the field's default instead of failing the whole list.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Picture URL assigned to beers created without one.
pub const DEFAULT_PICTURE_URL: &str = "defaultUrl";

/// Owner recorded on beers added while no identity is signed in.
pub const UNKNOWN_USER: &str = "unknown user";

/// A single beer record as stored by the remote service.
///
/// `id` is assigned by the server; `0` marks a draft that has not been saved
/// yet and never appears in a list fetched from the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Beer {
    #[serde(default)]
    pub id: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub brewery: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub style: String,
    pub abv: f64,
    pub volume: f64,
    #[serde(default = "default_picture_url", deserialize_with = "null_as_picture_url")]
    pub picture_url: String,
    #[serde(default = "default_how_many")]
    pub how_many: i32,
}

impl Beer {
    /// Whether the server has assigned this beer an id.
    pub fn is_saved(&self) -> bool {
        self.id != 0
    }

    /// Stand-in shown when a detail lookup finds no beer with the given id.
    pub fn placeholder() -> Self {
        Self {
            id: 0,
            user: UNKNOWN_USER.to_string(),
            brewery: "unknown brewery".to_string(),
            name: "No beer".to_string(),
            style: "unknown style".to_string(),
            abv: 0.0,
            volume: 0.0,
            picture_url: "no_image_url".to_string(),
            how_many: 1,
        }
    }
}

impl fmt::Display for Beer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Beer(id={}, user='{}', brewery='{}', name='{}', style='{}', abv={}, volume={}cl, pictureUrl='{}', howMany={})",
            self.id,
            self.user,
            self.brewery,
            self.name,
            self.style,
            self.abv,
            self.volume,
            self.picture_url,
            self.how_many
        )
    }
}

fn default_picture_url() -> String {
    DEFAULT_PICTURE_URL.to_string()
}

fn default_how_many() -> i32 {
    1
}

fn null_as_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_picture_url<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_picture_url))
}
