use log::{error, info};
use rocket::http::Status;
use rocket::serde::json::{self, Json};
use rocket::{Request, Route, Catcher, State};
use serde_json::{json, Value};

use crate::database::Database;
use crate::error::StoreError;
use crate::model::AlbumId;
use crate::rpc::{AlbumCreateRequest, AlbumIdResponse, ApiError, StatusResponse};

pub fn routes() -> Vec<Route> {
    routes![
        count_get,
        album_get,
        album_add_post,
    ]
}

pub fn catchers() -> Vec<Catcher> {
    catchers![
        not_found,
        fallback,
    ]
}

// Health check; never touches storage.
#[get("/count")]
fn count_get() -> Json<StatusResponse> {
    Json(StatusResponse::ok())
}

#[get("/album/<album_id>")]
async fn album_get(db: &State<Database>, album_id: AlbumId) -> Result<Json<AlbumIdResponse>, ApiError> {
    info!("Received GET request for albumID: {}", album_id);

    match db.find_album(album_id).await {
        Ok(album_id) => Ok(Json(AlbumIdResponse { album_id })),
        Err(StoreError::NotFound) => Err(ApiError::album_not_found()),
        Err(e) => {
            error!("error fetching album: {}", e);
            Err(ApiError::album_fetch_failed())
        }
    }
}

#[post("/add", data = "<album>")]
async fn album_add_post(
    db: &State<Database>,
    album: Result<Json<AlbumCreateRequest>, json::Error<'_>>,
) -> Result<(Status, Json<AlbumIdResponse>), ApiError> {
    let Json(album) = album.map_err(|e| {
        info!("rejecting album body: {}", e);
        ApiError::invalid_json()
    })?;

    let album_id = AlbumId::generate();
    db.insert_album(album.into_album(album_id.clone()))
        .await
        .map_err(|e| {
            error!("error inserting album {}: {}", album_id, e);
            ApiError::album_insert_failed()
        })?;

    Ok((Status::Created, Json(AlbumIdResponse { album_id })))
}

#[catch(404)]
fn not_found() -> Json<Value> {
    Json(json!({"error": "Not found"}))
}

#[catch(default)]
fn fallback(status: Status, _req: &Request<'_>) -> (Status, Json<Value>) {
    let reason = status.reason().unwrap_or("Unknown error");
    (status, Json(json!({"error": reason})))
}
