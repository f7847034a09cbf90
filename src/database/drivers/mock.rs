use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use parking_lot::RwLock;
use serde::Deserialize;
use url::Url;

use super::DbConnector;
use crate::error::StoreError;
use crate::model::{Album, AlbumId};

pub const DRIVER_NAME: &str = "mock";

const FIXTURE_FILE: &str = "database.json";

/// Which operations the mock refuses, selected with `?fail=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailMode {
    #[default]
    Never,
    Reads,
    Writes,
    All,
}

impl FailMode {
    fn parse(val: &str) -> Result<FailMode, StoreError> {
        match val {
            "never" | "" => Ok(FailMode::Never),
            "read" | "reads" => Ok(FailMode::Reads),
            "write" | "writes" => Ok(FailMode::Writes),
            "all" => Ok(FailMode::All),
            other => Err(StoreError::Connection(format!("unknown mock fail mode: {}", other))),
        }
    }

    fn fails_reads(self) -> bool {
        matches!(self, FailMode::Reads | FailMode::All)
    }

    fn fails_writes(self) -> bool {
        matches!(self, FailMode::Writes | FailMode::All)
    }
}

/// `mock://` keeps albums in memory. A url path (`mock:///srv/fixtures`) names
/// a directory whose `database.json` seeds the table once the schema is ensured.
pub fn get_conn(url: &Url) -> Result<MockConnector, StoreError> {
    let mut fail = FailMode::Never;
    for (key, val) in url.query_pairs() {
        if key == "fail" {
            fail = FailMode::parse(&val)?;
        }
    }

    let mut conn = MockConnector::new().with_fail_mode(fail);
    if !url.path().trim_start_matches('/').is_empty() {
        let data_dir = url.to_file_path()
            .map_err(|()| StoreError::Connection(format!("invalid mock fixture path: {}", url)))?;
        conn.fixtures = load_fixtures(&data_dir)?;
    }
    Ok(conn)
}

fn load_fixtures(data_dir: &Path) -> Result<Vec<Album>, StoreError> {
    let database_path = data_dir.join(FIXTURE_FILE);
    let db_json = File::open(&database_path)
        .map_err(|e| StoreError::Connection(format!("{}: {}", database_path.display(), e)))?;
    let fixtures: Fixtures = serde_json::from_reader(db_json)
        .map_err(|e| StoreError::Connection(format!("{}: {}", database_path.display(), e)))?;
    info!("loaded {} mock albums from {}", fixtures.albums.len(), database_path.display());
    Ok(fixtures.albums)
}

#[derive(Debug, Deserialize)]
struct Fixtures {
    albums: Vec<Album>,
}

#[derive(Debug, Default)]
pub struct MockConnector {
    schema_ready: AtomicBool,
    fixtures: Vec<Album>,
    albums: RwLock<BTreeMap<AlbumId, Album>>,
    fail: FailMode,
}

impl MockConnector {
    pub fn new() -> MockConnector {
        MockConnector::default()
    }

    pub fn with_fail_mode(mut self, fail: FailMode) -> MockConnector {
        self.fail = fail;
        self
    }

    pub fn len(&self) -> usize {
        self.albums.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &AlbumId) -> Option<Album> {
        self.albums.read().get(id).cloned()
    }

    fn check_schema(&self) -> Result<(), StoreError> {
        if !self.schema_ready.load(Ordering::Acquire) {
            return Err(StoreError::Storage("relation \"album\" does not exist".into()));
        }
        Ok(())
    }
}

impl DbConnector for MockConnector {
    fn ping(&self) -> Result<(), StoreError> {
        if self.fail == FailMode::All {
            return Err(StoreError::Connection("mock backend unreachable".into()));
        }
        Ok(())
    }

    fn ensure_schema(&self) -> Result<(), StoreError> {
        self.ping()?;
        if self.schema_ready.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let mut albums = self.albums.write();
        for album in self.fixtures.iter() {
            albums.entry(album.album_id.clone()).or_insert_with(|| album.clone());
        }
        Ok(())
    }

    fn find_album(&self, id: &AlbumId) -> Result<AlbumId, StoreError> {
        if self.fail.fails_reads() {
            return Err(StoreError::Storage("mock read failure".into()));
        }
        self.check_schema()?;
        self.albums.read()
            .get(id)
            .map(|album| album.album_id.clone())
            .ok_or(StoreError::NotFound)
    }

    fn insert_album(&self, album: &Album) -> Result<(), StoreError> {
        if self.fail.fails_writes() {
            return Err(StoreError::Storage("mock write failure".into()));
        }
        self.check_schema()?;
        let mut albums = self.albums.write();
        if albums.contains_key(&album.album_id) {
            return Err(StoreError::Duplicate(album.album_id.to_string()));
        }
        debug!("mock insert {}", album.album_id);
        albums.insert(album.album_id.clone(), Album { image: None, ..album.clone() });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn abbey_road(id: &str) -> Album {
        Album::new(AlbumId::from(id), "Abbey Road".into(), "The Beatles".into(), 9.99)
    }

    #[test]
    fn requires_schema_before_use() {
        let conn = MockConnector::new();
        let err = conn.insert_album(&abbey_road("a")).unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
        assert!(conn.is_empty());
    }

    #[test]
    fn ensure_schema_is_idempotent() {
        let conn = MockConnector::new();
        conn.ensure_schema().unwrap();
        conn.insert_album(&abbey_road("a")).unwrap();
        conn.ensure_schema().unwrap();
        assert_eq!(conn.len(), 1);
    }

    #[test]
    fn insert_then_find() {
        let conn = MockConnector::new();
        conn.ensure_schema().unwrap();
        conn.insert_album(&abbey_road("a")).unwrap();
        assert_eq!(conn.find_album(&AlbumId::from("a")).unwrap(), AlbumId::from("a"));
        assert!(conn.find_album(&AlbumId::from("b")).unwrap_err().is_not_found());
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let conn = MockConnector::new();
        conn.ensure_schema().unwrap();
        conn.insert_album(&abbey_road("a")).unwrap();
        let err = conn.insert_album(&abbey_road("a")).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(ref id) if id == "a"));
    }

    #[test]
    fn image_is_never_stored() {
        let conn = MockConnector::new();
        conn.ensure_schema().unwrap();
        let mut album = abbey_road("a");
        album.image = Some(vec![1, 2, 3]);
        conn.insert_album(&album).unwrap();
        assert_eq!(conn.get(&AlbumId::from("a")).unwrap().image, None);
    }

    #[test]
    fn fail_modes_from_url() {
        let conn = get_conn(&Url::parse("mock://?fail=read").unwrap()).unwrap();
        conn.ensure_schema().unwrap();
        conn.insert_album(&abbey_road("a")).unwrap();
        let err = conn.find_album(&AlbumId::from("a")).unwrap_err();
        assert!(!err.is_not_found());

        let conn = get_conn(&Url::parse("mock://?fail=all").unwrap()).unwrap();
        assert!(conn.ping().is_err());
        assert!(conn.ensure_schema().is_err());

        assert!(get_conn(&Url::parse("mock://?fail=sometimes").unwrap()).is_err());
    }

    #[test]
    fn fixtures_seed_the_table() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(FIXTURE_FILE), r#"{"albums": [
            {"album_id": "seeded", "name": "Revolver", "artist": "The Beatles", "price": 7.5}
        ]}"#).unwrap();

        let conn = MockConnector {
            fixtures: load_fixtures(dir.path()).unwrap(),
            ..MockConnector::default()
        };
        conn.ensure_schema().unwrap();
        assert_eq!(conn.find_album(&AlbumId::from("seeded")).unwrap(), AlbumId::from("seeded"));
    }

    #[test]
    fn fixture_dir_with_spaces_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("my fixtures é");
        fs::create_dir(&data_dir).unwrap();
        fs::write(data_dir.join(FIXTURE_FILE), r#"{"albums": [
            {"album_id": "spaced", "name": "Help!", "artist": "The Beatles", "price": 5.0}
        ]}"#).unwrap();

        let url = Url::parse(&format!("mock://{}", data_dir.display())).unwrap();
        assert!(url.path().contains("%20"));
        let conn = get_conn(&url).unwrap();
        conn.ensure_schema().unwrap();
        assert_eq!(conn.find_album(&AlbumId::from("spaced")).unwrap(), AlbumId::from("spaced"));
    }

    #[test]
    fn missing_fixture_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_fixtures(dir.path()).is_err());
    }
}
