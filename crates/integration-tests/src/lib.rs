//! In-process stand-in for the Ratehub REST API.
//!
//! [`MockApi`] serves the subset of the API the client exercises, backed
//! by in-memory state, and counts hits per endpoint so tests can assert on
//! request de-duplication and cache behavior.
//!
//! Fixed accounts:
//! - `alice@example.com` / `Secret!1pw` (USER)
//! - `bob@example.com` / `Secret!1pw` (USER)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use ratehub_client::{ClientConfig, RatehubClient};
use ratehub_core::{PageMeta, Paginated, Rating, Role, Store, User};

pub const PASSWORD: &str = "Secret!1pw";

type SharedState = Arc<Mutex<MockState>>;

struct Account {
    token: &'static str,
    user: User,
}

struct MockState {
    stores: Vec<Store>,
    /// The test user's rating per store id. One rater is enough for the
    /// client-side flows under test.
    ratings: HashMap<i64, Rating>,
    next_rating_id: i64,
    hits: HashMap<&'static str, usize>,
    response_delay: Duration,
}

impl MockState {
    fn hit(&mut self, label: &'static str) -> Duration {
        *self.hits.entry(label).or_insert(0) += 1;
        self.response_delay
    }

    fn store_mut(&mut self, id: i64) -> Option<&mut Store> {
        self.stores.iter_mut().find(|s| s.id == id)
    }

    /// Keep the store's aggregate in sync with the single test rating.
    fn sync_aggregates(&mut self, store_id: i64) {
        let rating = self.ratings.get(&store_id).map(|r| r.value);
        if let Some(store) = self.store_mut(store_id) {
            match rating {
                Some(value) => {
                    store.rating_count = 1;
                    store.average_rating = f64::from(value);
                }
                None => {
                    store.rating_count = 0;
                    store.average_rating = 0.0;
                }
            }
        }
    }
}

fn seed_store(id: i64, name: &str, address: &str) -> Store {
    Store {
        id,
        name: name.to_string(),
        email: None,
        address: address.to_string(),
        average_rating: 0.0,
        rating_count: 0,
        owner_id: None,
        created_at: None,
        user_rating: None,
    }
}

fn account(name: &str, email: &str, token: &'static str, id: i64) -> Account {
    Account {
        token,
        user: User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            address: None,
            role: Role::User,
            created_at: None,
            store_rating: None,
        },
    }
}

fn accounts() -> Vec<(&'static str, Account)> {
    vec![
        (
            "alice@example.com",
            account("Alice Cartwright Pemberton", "alice@example.com", "token-alice", 1),
        ),
        (
            "bob@example.com",
            account("Robert Fitzgerald Castellano", "bob@example.com", "token-bob", 2),
        ),
    ]
}

fn bearer_user(headers: &HeaderMap) -> Option<User> {
    let header = headers.get("authorization")?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    accounts()
        .into_iter()
        .find(|(_, a)| a.token == token)
        .map(|(_, a)| a.user)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// The running mock server.
pub struct MockApi {
    base_url: String,
    state: SharedState,
}

impl MockApi {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state: SharedState = Arc::new(Mutex::new(MockState {
            stores: vec![
                seed_store(1, "Corner Bakery and Provisions Co", "12 Baker Street"),
                seed_store(2, "Harbor Lights General Grocery", "4 Quay Lane"),
            ],
            ratings: HashMap::new(),
            next_rating_id: 1,
            hits: HashMap::new(),
            response_delay: Duration::ZERO,
        }));

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/me", get(me))
            .route("/api/public/stores", get(public_stores))
            .route("/api/public/stores/{id}", get(public_store))
            .route("/api/public/store-rating/{store_id}", get(rating_lookup))
            .route("/api/user/stores/{store_id}/ratings", post(rating_create))
            .route(
                "/api/user/ratings/{id}",
                axum::routing::patch(rating_update).delete(rating_delete),
            )
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock api");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// A client pointed at this server, with an in-memory session.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> RatehubClient {
        let url = url::Url::parse(&self.base_url).expect("mock url");
        let config = ClientConfig::new(url).without_session_file();
        RatehubClient::new(config).expect("build client")
    }

    /// A client that persists its session at `path`.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client_with_session_file(&self, path: std::path::PathBuf) -> RatehubClient {
        let url = url::Url::parse(&self.base_url).expect("mock url");
        let mut config = ClientConfig::new(url).without_session_file();
        config.session_file = Some(path);
        RatehubClient::new(config).expect("build client")
    }

    /// How many requests the endpoint has served.
    #[must_use]
    pub fn hits(&self, label: &str) -> usize {
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.hits.get(label).copied().unwrap_or(0)
    }

    /// Delay every subsequent response, to widen race windows.
    pub fn set_response_delay(&self, delay: Duration) {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.response_delay = delay;
    }
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(state): State<SharedState>, Json(body): Json<LoginBody>) -> Response {
    let delay = lock(&state).hit("login");
    tokio::time::sleep(delay).await;

    if body.password != PASSWORD {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }
    accounts()
        .into_iter()
        .find(|(email, _)| *email == body.email)
        .map_or_else(
            || error_response(StatusCode::UNAUTHORIZED, "Invalid email or password"),
            |(_, a)| Json(json!({ "token": a.token, "user": a.user })).into_response(),
        )
}

async fn me(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let delay = lock(&state).hit("me");
    tokio::time::sleep(delay).await;

    bearer_user(&headers).map_or_else(
        || error_response(StatusCode::UNAUTHORIZED, "Authentication required"),
        |user| Json(json!({ "user": user })).into_response(),
    )
}

async fn public_stores(State(state): State<SharedState>) -> Response {
    let (delay, items) = {
        let mut state = lock(&state);
        let delay = state.hit("stores");
        (delay, state.stores.clone())
    };
    tokio::time::sleep(delay).await;

    let total = items.len() as u64;
    let page = Paginated {
        items,
        meta: PageMeta {
            page: 1,
            limit: 10,
            total,
            total_pages: 1,
        },
    };
    Json(page).into_response()
}

async fn public_store(State(state): State<SharedState>, Path(id): Path<i64>) -> Response {
    let (delay, store) = {
        let mut state = lock(&state);
        let delay = state.hit("store_detail");
        (delay, state.stores.iter().find(|s| s.id == id).cloned())
    };
    tokio::time::sleep(delay).await;

    store.map_or_else(
        || error_response(StatusCode::NOT_FOUND, "Store not found"),
        |store| Json(store).into_response(),
    )
}

async fn rating_lookup(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(store_id): Path<i64>,
) -> Response {
    let (delay, rating) = {
        let mut state = lock(&state);
        let delay = state.hit("rating_lookup");
        (delay, state.ratings.get(&store_id).cloned())
    };
    tokio::time::sleep(delay).await;

    if bearer_user(&headers).is_none() {
        return error_response(StatusCode::UNAUTHORIZED, "Authentication required");
    }
    rating.map_or_else(
        || error_response(StatusCode::NOT_FOUND, "No rating for this store"),
        |rating| Json(rating).into_response(),
    )
}

#[derive(Deserialize)]
struct RatingBody {
    rating: u8,
    comment: Option<String>,
}

async fn rating_create(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(store_id): Path<i64>,
    Json(body): Json<RatingBody>,
) -> Response {
    let Some(user) = bearer_user(&headers) else {
        return error_response(StatusCode::UNAUTHORIZED, "Authentication required");
    };
    if !(1..=5).contains(&body.rating) {
        return error_response(StatusCode::BAD_REQUEST, "Rating must be between 1 and 5");
    }

    let (delay, rating) = {
        let mut state = lock(&state);
        let delay = state.hit("rating_create");
        let rating = Rating {
            id: state.next_rating_id,
            store_id: Some(store_id),
            user_id: Some(user.id),
            value: body.rating,
            comment: body.comment,
            created_at: None,
            updated_at: None,
            user_name: Some(user.name),
        };
        state.next_rating_id += 1;
        state.ratings.insert(store_id, rating.clone());
        state.sync_aggregates(store_id);
        (delay, rating)
    };
    tokio::time::sleep(delay).await;

    (StatusCode::CREATED, Json(rating)).into_response()
}

async fn rating_update(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<RatingBody>,
) -> Response {
    if bearer_user(&headers).is_none() {
        return error_response(StatusCode::UNAUTHORIZED, "Authentication required");
    }

    let (delay, rating) = {
        let mut state = lock(&state);
        let delay = state.hit("rating_update");
        let store_id = state
            .ratings
            .iter()
            .find(|(_, r)| r.id == id)
            .map(|(store_id, _)| *store_id);
        let rating = store_id.and_then(|store_id| {
            let rating = state.ratings.get_mut(&store_id)?;
            rating.value = body.rating;
            rating.comment = body.comment.clone();
            let updated = rating.clone();
            state.sync_aggregates(store_id);
            Some(updated)
        });
        (delay, rating)
    };
    tokio::time::sleep(delay).await;

    rating.map_or_else(
        || error_response(StatusCode::NOT_FOUND, "Rating not found"),
        |rating| Json(rating).into_response(),
    )
}

async fn rating_delete(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if bearer_user(&headers).is_none() {
        return error_response(StatusCode::UNAUTHORIZED, "Authentication required");
    }

    let (delay, removed) = {
        let mut state = lock(&state);
        let delay = state.hit("rating_delete");
        let store_id = state
            .ratings
            .iter()
            .find(|(_, r)| r.id == id)
            .map(|(store_id, _)| *store_id);
        let removed = store_id.is_some_and(|store_id| {
            state.ratings.remove(&store_id);
            state.sync_aggregates(store_id);
            true
        });
        (delay, removed)
    };
    tokio::time::sleep(delay).await;

    if removed {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response(StatusCode::NOT_FOUND, "Rating not found")
    }
}

fn lock(state: &SharedState) -> std::sync::MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
