use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    error::{Error, Result},
    management::ResolvedTracksStore,
    spotify::{SpotifyClient, error_body},
    types::{SearchResponse, SongQuery, UnresolvedTableRow},
    warning,
};

/// Number of hits requested per search. Only the first one is used.
pub const SEARCH_LIMIT: u32 = 1;

/// Result of resolving a list of song names.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Track URIs of the matched songs, in input order.
    pub uris: Vec<String>,
    /// Songs the catalog had no hit for.
    pub unmatched: Vec<SongQuery>,
    /// Songs whose search request failed, with the failure.
    pub failed: Vec<(SongQuery, Error)>,
}

impl Resolution {
    /// `true` when every song produced a URI.
    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty() && self.failed.is_empty()
    }

    pub fn unresolved_rows(&self) -> Vec<UnresolvedTableRow> {
        let unmatched = self.unmatched.iter().map(|q| UnresolvedTableRow {
            song: q.to_string(),
            reason: "no match".to_string(),
        });
        let failed = self.failed.iter().map(|(q, e)| UnresolvedTableRow {
            song: q.to_string(),
            reason: e.to_string(),
        });
        unmatched.chain(failed).collect()
    }
}

impl SpotifyClient {
    /// Looks up one song name and returns the URI of the first track hit.
    ///
    /// The query is sent as `track:<name>` restricted to `type=track`.
    /// `Ok(None)` means the catalog answered with an empty result set, which
    /// is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SearchQuery`] for transport failures, non-success
    /// statuses and bodies that do not parse as a search response.
    pub async fn search_track(&self, query: &SongQuery) -> Result<Option<String>> {
        let search_error = |reason: String| Error::SearchQuery {
            query: query.to_string(),
            reason,
        };

        let q = format!("track:{}", query.0);
        let limit = SEARCH_LIMIT.to_string();
        let response = self
            .get(&self.url("/search"))
            .query(&[("q", q.as_str()), ("type", "track"), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| search_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(search_error(error_body(response).await));
        }

        let json = response
            .json::<SearchResponse>()
            .await
            .map_err(|e| search_error(e.to_string()))?;

        Ok(json.tracks.items.into_iter().next().map(|t| t.uri))
    }

    /// Resolves song names to track URIs, one search request per song.
    ///
    /// Songs are looked up strictly in input order. A song without hits is
    /// skipped and listed in [`Resolution::unmatched`]; a song whose request
    /// fails is reported as a warning, listed in [`Resolution::failed`] and
    /// the next song is looked up. URIs found before or after a failure are
    /// always kept, so the output is the ordered subsequence of matched songs.
    ///
    /// A progress bar shows the position in the list while the lookup runs.
    pub async fn resolve_tracks(&self, queries: &[SongQuery]) -> Resolution {
        let pb = ProgressBar::new(queries.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.blue} [{bar:30.blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));

        let mut resolution = Resolution::default();

        for query in queries {
            pb.set_message(query.to_string());

            match self.search_track(query).await {
                Ok(Some(uri)) => resolution.uris.push(uri),
                Ok(None) => resolution.unmatched.push(query.clone()),
                Err(e) => {
                    pb.suspend(|| warning!("{}", e));
                    resolution.failed.push((query.clone(), e));
                }
            }

            pb.inc(1);
        }

        pb.finish_and_clear();
        resolution
    }

    /// Resolves the songs and writes the matched URIs to `store`.
    ///
    /// The artifact is written even when some songs failed, so whatever was
    /// resolved can be inspected or reused without searching again.
    pub async fn resolve_and_persist(
        &self,
        queries: &[SongQuery],
        store: &ResolvedTracksStore,
    ) -> Result<Resolution> {
        let resolution = self.resolve_tracks(queries).await;
        store.persist(&resolution.uris).await?;
        Ok(resolution)
    }
}
