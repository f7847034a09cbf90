mod album;
pub use self::album::{
    AlbumCreateRequest,
    AlbumIdResponse,
};

mod status;
pub use self::status::StatusResponse;

mod error;
pub use self::error::ApiError;
