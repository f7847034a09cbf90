use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use serde_json::{Map, Value};

// The fetch route reports under "message", the create route under "error".
const MESSAGE_KEY: &str = "message";
const ERROR_KEY: &str = "error";

/// A failed request: a status plus a one-field JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: Status,
    key: &'static str,
    text: String,
}

impl ApiError {
    pub fn message(status: Status, text: impl Into<String>) -> ApiError {
        ApiError { status, key: MESSAGE_KEY, text: text.into() }
    }

    pub fn error(status: Status, text: impl Into<String>) -> ApiError {
        ApiError { status, key: ERROR_KEY, text: text.into() }
    }

    pub fn album_not_found() -> ApiError {
        ApiError::message(Status::NotFound, "Album not found")
    }

    pub fn album_fetch_failed() -> ApiError {
        ApiError::message(Status::InternalServerError, "Error fetching album")
    }

    pub fn invalid_json() -> ApiError {
        ApiError::error(Status::BadRequest, "Invalid JSON data")
    }

    pub fn album_insert_failed() -> ApiError {
        ApiError::error(Status::InternalServerError, "Failed to insert album into database")
    }

    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert(self.key.into(), Value::String(self.text.clone()));
        Value::Object(body)
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status;
        (status, Json(self.body())).respond_to(req)
    }
}
