mod album;

pub use self::album::{
    AlbumId,
    Album,
};
