//! In-process stand-in for the Spotify accounts service and Web API.

#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    path::Path as FsPath,
    sync::{Arc, Mutex},
};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post},
};
use serde_json::{Value, json};
use spotlist::{
    config::Config,
    spotify::SpotifyClient,
    types::{AddTrackToPlaylistRequest, BearerToken, CreatePlaylistRequest},
};

pub const TOKEN: &str = "test-token";
pub const USER_ID: &str = "test-user";

#[derive(Debug, Clone)]
pub struct FakePlaylist {
    pub id: String,
    pub name: String,
    pub description: String,
    pub public: bool,
    pub tracks: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub authorization: Option<String>,
    pub form: HashMap<String, String>,
}

pub struct FakeState {
    base_url: String,
    /// song name -> track uri
    pub catalog: HashMap<String, String>,
    pub failing_queries: HashSet<String>,
    /// queries answered with 200 and a body that is not a search response
    pub malformed_queries: HashSet<String>,
    pub playlists: Vec<FakePlaylist>,
    pub page_size: usize,
    /// 1-based add-tracks request that answers with 500
    pub fail_batch: Option<usize>,
    pub token_status: StatusCode,
    pub token_body: Value,
    pub token_requests: Vec<TokenRequest>,
    pub search_requests: Vec<HashMap<String, String>>,
    pub add_requests: Vec<(String, AddTrackToPlaylistRequest)>,
}

impl FakeState {
    fn new(base_url: &str) -> Self {
        FakeState {
            base_url: base_url.to_string(),
            catalog: HashMap::new(),
            failing_queries: HashSet::new(),
            malformed_queries: HashSet::new(),
            playlists: Vec::new(),
            page_size: 50,
            fail_batch: None,
            token_status: StatusCode::OK,
            token_body: json!({
                "access_token": TOKEN,
                "token_type": "Bearer",
                "scope": "playlist-modify-public",
                "expires_in": 3600,
                "refresh_token": "refresh"
            }),
            token_requests: Vec::new(),
            search_requests: Vec::new(),
            add_requests: Vec::new(),
        }
    }

    pub fn add_playlist(&mut self, id: &str, name: &str) {
        self.playlists.push(FakePlaylist {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            public: true,
            tracks: Vec::new(),
        });
    }

    pub fn playlist(&self, id: &str) -> Option<&FakePlaylist> {
        self.playlists.iter().find(|p| p.id == id)
    }
}

type Shared = Arc<Mutex<FakeState>>;

pub struct FakeSpotify {
    pub base_url: String,
    state: Shared,
}

impl FakeSpotify {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(Mutex::new(FakeState::new(&base_url)));

        let app = Router::new()
            .route("/api/token", post(token))
            .route("/v1/me", get(me))
            .route("/v1/me/playlists", get(my_playlists))
            .route("/v1/search", get(search))
            .route("/v1/users/{user_id}/playlists", post(create_playlist))
            .route("/v1/playlists/{id}/tracks", post(add_tracks))
            .with_state(Arc::clone(&state));

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeSpotify { base_url, state }
    }

    pub fn api_url(&self) -> String {
        format!("{}/v1", self.base_url)
    }

    pub fn config(&self, results_dir: &FsPath) -> Config {
        let mut config = Config::new("client-id", "client-secret", "http://127.0.0.1:8888/callback");
        config.token_url = format!("{}/api/token", self.base_url);
        config.api_url = self.api_url();
        config.results_dir = results_dir.to_path_buf();
        config
    }

    pub fn client(&self) -> SpotifyClient {
        SpotifyClient::new(reqwest::Client::new(), &self.api_url(), BearerToken::new(TOKEN))
    }

    /// Runs `f` with the fake's state locked. Never hold it across an await.
    pub fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {}", TOKEN);
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected)
}

fn api_error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({ "error": { "status": status.as_u16(), "message": message } })),
    )
}

async fn token(
    State(state): State<Shared>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.token_requests.push(TokenRequest {
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        form,
    });
    (state.token_status, Json(state.token_body.clone()))
}

async fn me(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return api_error(StatusCode::UNAUTHORIZED, "Invalid access token");
    }
    (
        StatusCode::OK,
        Json(json!({ "id": USER_ID, "display_name": "Test User" })),
    )
}

async fn search(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return api_error(StatusCode::UNAUTHORIZED, "Invalid access token");
    }

    let mut state = state.lock().unwrap();
    state.search_requests.push(params.clone());

    let name = params
        .get("q")
        .map(|q| q.trim_start_matches("track:").to_string())
        .unwrap_or_default();

    if state.failing_queries.contains(&name) {
        return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }
    if state.malformed_queries.contains(&name) {
        return (StatusCode::OK, Json(json!({ "tracks": {} })));
    }

    let items: Vec<Value> = state
        .catalog
        .get(&name)
        .map(|uri| json!({ "uri": uri, "name": name }))
        .into_iter()
        .collect();

    (StatusCode::OK, Json(json!({ "tracks": { "items": items } })))
}

async fn my_playlists(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return api_error(StatusCode::UNAUTHORIZED, "Invalid access token");
    }

    let state = state.lock().unwrap();
    let offset: usize = params
        .get("offset")
        .and_then(|o| o.parse().ok())
        .unwrap_or(0);
    let end = (offset + state.page_size).min(state.playlists.len());

    let items: Vec<Value> = state.playlists[offset.min(end)..end]
        .iter()
        .map(|p| json!({ "id": p.id, "name": p.name }))
        .collect();
    let next = (end < state.playlists.len()).then(|| {
        format!(
            "{}/v1/me/playlists?offset={}&limit={}",
            state.base_url, end, state.page_size
        )
    });

    (StatusCode::OK, Json(json!({ "items": items, "next": next })))
}

async fn create_playlist(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(body): Json<CreatePlaylistRequest>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return api_error(StatusCode::UNAUTHORIZED, "Invalid access token");
    }
    if user_id != USER_ID {
        return api_error(StatusCode::FORBIDDEN, "You cannot create a playlist for another user");
    }

    let mut state = state.lock().unwrap();
    let id = format!("pl{}", state.playlists.len() + 1);
    state.playlists.push(FakePlaylist {
        id: id.clone(),
        name: body.name.clone(),
        description: body.description,
        public: body.public,
        tracks: Vec::new(),
    });

    (
        StatusCode::CREATED,
        Json(json!({ "id": id, "name": body.name })),
    )
}

async fn add_tracks(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<AddTrackToPlaylistRequest>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return api_error(StatusCode::UNAUTHORIZED, "Invalid access token");
    }

    let mut state = state.lock().unwrap();
    state.add_requests.push((id.clone(), body.clone()));
    let request_number = state.add_requests.len();

    if state.fail_batch == Some(request_number) {
        return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }

    let Some(playlist) = state.playlists.iter_mut().find(|p| p.id == id) else {
        return api_error(StatusCode::NOT_FOUND, "Not found.");
    };

    match body.position {
        Some(position) => {
            let start = (position as usize).min(playlist.tracks.len());
            for (i, uri) in body.uris.into_iter().enumerate() {
                playlist.tracks.insert(start + i, uri);
            }
        }
        None => playlist.tracks.extend(body.uris),
    }

    (
        StatusCode::CREATED,
        Json(json!({ "snapshot_id": format!("snap{}", request_number) })),
    )
}
