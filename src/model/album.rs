use std::fmt;

use rocket::request::FromParam;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Primary key of an album row. Server-assigned, never reused.
#[derive(Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone)]
#[serde(transparent)]
pub struct AlbumId(String);

impl AlbumId {
    /// A fresh random (v4) identifier in canonical hyphenated form.
    pub fn generate() -> AlbumId {
        AlbumId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for AlbumId {
    fn from(val: String) -> AlbumId {
        AlbumId(val)
    }
}

impl From<&str> for AlbumId {
    fn from(val: &str) -> AlbumId {
        AlbumId(val.to_owned())
    }
}

impl fmt::Display for AlbumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Lookups accept any non-empty segment; ids are not required to be uuids.
impl<'a> FromParam<'a> for AlbumId {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<AlbumId, &'a str> {
        if param.is_empty() {
            return Err(param);
        }
        Ok(AlbumId::from(param))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Album {
    pub album_id: AlbumId,
    pub name: String,
    pub artist: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<u8>>,
}

impl Album {
    pub fn new(album_id: AlbumId, name: String, artist: String, price: f64) -> Album {
        Album {
            album_id,
            name,
            artist,
            price,
            image: None,
        }
    }
}
