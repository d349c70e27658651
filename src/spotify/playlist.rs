use crate::{
    error::{Error, Result},
    info,
    spotify::{SpotifyClient, ensure_success, error_body},
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, AppendReport,
        CreatePlaylistRequest, CreatePlaylistResponse, GetUserPlaylistsResponse, InsertMode,
        Playlist, PlaylistDescriptor,
    },
};

/// Maximum number of URIs Spotify accepts in one add-tracks request.
pub const BATCH_SIZE: usize = 100;

/// Page size used when listing the user's playlists.
const PLAYLIST_PAGE_LIMIT: u32 = 50;

impl SpotifyClient {
    /// Creates a playlist owned by `user_id` and returns its name.
    ///
    /// Spotify answers with the id of the new playlist, which is only logged:
    /// later operations find the playlist again by name through
    /// [`find_playlist_id`](SpotifyClient::find_playlist_id).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] when the request fails or Spotify rejects it.
    pub async fn create_playlist(
        &self,
        user_id: &str,
        descriptor: &PlaylistDescriptor,
    ) -> Result<String> {
        const ENDPOINT: &str = "POST /users/{user_id}/playlists";

        let body = CreatePlaylistRequest {
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
            public: descriptor.public,
        };

        let response = self
            .post(&self.url(&format!("/users/{}/playlists", user_id)))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::api(ENDPOINT, e))?;
        let response = ensure_success(ENDPOINT, response).await?;
        let created: CreatePlaylistResponse = response
            .json()
            .await
            .map_err(|e| Error::api(ENDPOINT, e))?;

        info!("Created playlist '{}' ({})", created.name, created.id);
        Ok(descriptor.name.clone())
    }

    /// Lists every playlist of the authenticated user, following `next`
    /// links until the last page.
    pub async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        let mut playlists = Vec::new();
        let mut next = Some(self.first_playlists_page());

        while let Some(url) = next {
            let page = self.playlists_page(&url).await?;
            playlists.extend(page.items);
            next = page.next;
        }

        Ok(playlists)
    }

    /// Finds the id of the first playlist named `name`.
    ///
    /// Names are assumed unique. When several playlists share a name, the one
    /// listed first by `GET /me/playlists` wins and the others are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlaylistNotFound`] when no playlist carries the name.
    pub async fn find_playlist_id(&self, name: &str) -> Result<String> {
        let mut next = Some(self.first_playlists_page());

        while let Some(url) = next {
            let page = self.playlists_page(&url).await?;
            if let Some(playlist) = page.items.into_iter().find(|p| p.name == name) {
                return Ok(playlist.id);
            }
            next = page.next;
        }

        Err(Error::PlaylistNotFound(name.to_string()))
    }

    /// Adds track URIs to the playlist named `playlist_name`.
    ///
    /// The playlist id is looked up by name first. The URIs are then split
    /// into consecutive batches of at most [`BATCH_SIZE`] and sent one
    /// request per batch, in order, so `M` URIs take `ceil(M / 100)` requests
    /// and every URI is sent exactly once.
    ///
    /// # Insert Mode
    ///
    /// - [`InsertMode::Append`] omits `position`; the playlist ends up in
    ///   input order.
    /// - [`InsertMode::Head`] sends `position: 0` with every batch. Spotify
    ///   keeps the order inside a batch, but each batch lands before the
    ///   previous one: `[A1..A100]` then `[B1..B30]` gives `[B1..B30, A1..A100]`.
    ///
    /// # Errors
    ///
    /// - [`Error::PlaylistNotFound`] when the name lookup fails; nothing is sent
    /// - [`Error::Mutation`] when a batch is rejected. Batches before it stay
    ///   applied and the error says which batch failed and how many tracks
    ///   were already added, so the rest can be added by hand.
    pub async fn add_tracks(
        &self,
        playlist_name: &str,
        uris: &[String],
        mode: InsertMode,
    ) -> Result<AppendReport> {
        let playlist_id = self.find_playlist_id(playlist_name).await?;
        let url = self.url(&format!("/playlists/{}/tracks", playlist_id));

        let batches = uris.len().div_ceil(BATCH_SIZE);
        let mut submitted = 0;

        for (index, chunk) in uris.chunks(BATCH_SIZE).enumerate() {
            let mutation_error = |reason: String| Error::Mutation {
                batch: index + 1,
                batches,
                submitted,
                reason,
            };

            let body = AddTrackToPlaylistRequest {
                uris: chunk.to_vec(),
                position: match mode {
                    InsertMode::Append => None,
                    InsertMode::Head => Some(0),
                },
            };

            let response = self
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| mutation_error(e.to_string()))?;

            if !response.status().is_success() {
                return Err(mutation_error(error_body(response).await));
            }

            let added = response
                .json::<AddTrackToPlaylistResponse>()
                .await
                .map_err(|e| mutation_error(e.to_string()))?;

            submitted += chunk.len();
            info!(
                "Added batch {}/{} ({} tracks, snapshot {})",
                index + 1,
                batches,
                chunk.len(),
                added.snapshot_id
            );
        }

        Ok(AppendReport {
            playlist_id,
            batches,
            tracks: submitted,
        })
    }

    fn first_playlists_page(&self) -> String {
        self.url(&format!("/me/playlists?limit={}", PLAYLIST_PAGE_LIMIT))
    }

    async fn playlists_page(&self, url: &str) -> Result<GetUserPlaylistsResponse> {
        const ENDPOINT: &str = "GET /me/playlists";

        let response = self
            .get(url)
            .send()
            .await
            .map_err(|e| Error::api(ENDPOINT, e))?;
        let response = ensure_success(ENDPOINT, response).await?;
        response.json().await.map_err(|e| Error::api(ENDPOINT, e))
    }
}
