use std::path::Path;

use tabled::Table;

use crate::{
    cli::Session,
    config::Config,
    error::Result,
    info,
    management::ResolvedTracksStore,
    success,
    types::{AppendReport, InsertMode, PlaylistDescriptor, PlaylistTableRow},
    utils, warning,
};

/// What an import should do besides resolving and adding tracks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Use the results artifact of an earlier run instead of searching again.
    pub reuse: bool,
    /// Add to an existing playlist with this name instead of creating one.
    pub existing: bool,
    pub mode: InsertMode,
}

/// Creates an empty playlist and returns its name.
pub async fn create(session: &Session, descriptor: &PlaylistDescriptor) -> Result<String> {
    let name = session
        .client
        .create_playlist(&session.user_id, descriptor)
        .await?;
    success!("Playlist '{}' created.", name);
    Ok(name)
}

/// Builds a playlist from the `Name` column of a CSV file.
///
/// # Steps
///
/// 1. **Input**: reads the song names; a file without a `Name` column is
///    rejected before anything is created remotely
/// 2. **Playlist**: creates the playlist unless `existing` is set
/// 3. **Resolve**: searches every song, or loads the results artifact of an
///    earlier run when `reuse` is set and the artifact exists
/// 4. **Report**: lists songs that had no match or whose search failed
/// 5. **Populate**: adds the resolved tracks in batches of 100
///
/// A failure in step 5 reports the batch that failed. The results artifact
/// is already on disk at that point, so a rerun with `--reuse --existing`
/// avoids searching again.
pub async fn import(
    session: &Session,
    config: &Config,
    csv_path: &Path,
    descriptor: &PlaylistDescriptor,
    options: ImportOptions,
) -> Result<AppendReport> {
    let songs = utils::read_song_queries(csv_path)?;
    info!("Read {} songs from {}", songs.len(), csv_path.display());

    let name = if options.existing {
        descriptor.name.clone()
    } else {
        create(session, descriptor).await?
    };

    let store = ResolvedTracksStore::new(&config.results_dir, &name);
    let uris = if options.reuse && store.exists() {
        let uris = store.load().await?;
        info!(
            "Reusing {} resolved tracks from {}",
            uris.len(),
            store.path().display()
        );
        uris
    } else {
        info!("Searching {} songs...", songs.len());
        let resolution = session.client.resolve_and_persist(&songs, &store).await?;
        info!(
            "Resolved {} of {} songs, saved to {}",
            resolution.uris.len(),
            songs.len(),
            store.path().display()
        );
        if !resolution.is_complete() {
            warning!("Some songs were not added:");
            println!("{}", Table::new(resolution.unresolved_rows()));
        }
        resolution.uris
    };

    let report = session
        .client
        .add_tracks(&name, &uris, options.mode)
        .await?;
    success!(
        "Added {} tracks to '{}' in {} batches.",
        report.tracks,
        name,
        report.batches
    );

    Ok(report)
}

/// Prints the playlists of the authenticated user as a table.
pub async fn list_playlists(session: &Session) -> Result<()> {
    let playlists = session.client.list_playlists().await?;
    if playlists.is_empty() {
        info!("No playlists found.");
        return Ok(());
    }

    let rows: Vec<PlaylistTableRow> = playlists
        .into_iter()
        .map(|p| PlaylistTableRow {
            name: p.name,
            id: p.id,
        })
        .collect();
    println!("{}", Table::new(rows));
    Ok(())
}
