use serde::{Deserialize, Serialize};

use crate::model::{Album, AlbumId};

/// Body of `POST /add`. Every field is required and nothing else is allowed.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AlbumCreateRequest {
    pub name: String,
    pub artist: String,
    pub price: f64,
}

impl AlbumCreateRequest {
    pub fn into_album(self, album_id: AlbumId) -> Album {
        Album::new(album_id, self.name, self.artist, self.price)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AlbumIdResponse {
    #[serde(rename = "albumID")]
    pub album_id: AlbumId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> serde_json::Result<AlbumCreateRequest> {
        serde_json::from_str(raw)
    }

    #[test]
    fn accepts_exact_shape() {
        let req = parse(r#"{"name":"Abbey Road","artist":"The Beatles","price":9.99}"#).unwrap();
        assert_eq!(req.name, "Abbey Road");
        assert_eq!(req.artist, "The Beatles");
        assert_eq!(req.price, 9.99);
    }

    #[test]
    fn accepts_empty_strings_and_zero_price() {
        let req = parse(r#"{"name":"","artist":"","price":0}"#).unwrap();
        assert_eq!(req.price, 0.0);
    }

    #[test]
    fn rejects_nonconforming_payloads() {
        assert!(parse("not json").is_err());
        assert!(parse(r#"{"name":"a","artist":"b","price":"9.99"}"#).is_err());
        assert!(parse(r#"{"name":"a","artist":"b"}"#).is_err());
        assert!(parse(r#"{"name":"a","artist":"b","price":1,"image":"x"}"#).is_err());
        assert!(parse(r#"{"name":null,"artist":"b","price":1}"#).is_err());
        assert!(parse(r#"[]"#).is_err());
    }

    #[test]
    fn response_uses_album_id_key() {
        let body = serde_json::to_value(AlbumIdResponse { album_id: AlbumId::from("abc") }).unwrap();
        assert_eq!(body, serde_json::json!({"albumID": "abc"}));
    }
}
