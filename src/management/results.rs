use std::path::PathBuf;

use crate::{error::Result, utils};

/// Results artifact holding the track URIs resolved for one playlist.
///
/// The file is a JSON array of URIs named after the playlist, so a later run
/// can add the same tracks without searching the catalog again.
pub struct ResolvedTracksStore {
    dir: PathBuf,
    playlist_name: String,
}

impl ResolvedTracksStore {
    pub fn new(dir: impl Into<PathBuf>, playlist_name: &str) -> Self {
        Self {
            dir: dir.into(),
            playlist_name: playlist_name.to_string(),
        }
    }

    pub fn playlist_name(&self) -> &str {
        &self.playlist_name
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(utils::results_file_name(&self.playlist_name))
    }

    pub fn exists(&self) -> bool {
        self.path().is_file()
    }

    pub async fn persist(&self, uris: &[String]) -> Result<PathBuf> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(uris)?;
        async_fs::write(&path, json).await?;
        Ok(path)
    }

    pub async fn load(&self) -> Result<Vec<String>> {
        let json = async_fs::read_to_string(self.path()).await?;
        let uris: Vec<String> = serde_json::from_str(&json)?;
        Ok(uris)
    }
}
