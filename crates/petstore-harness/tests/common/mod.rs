// crates/petstore-harness/tests/common/mod.rs
// ============================================================================
// Module: Pet Store Stub
// Description: In-memory pet-store server for harness integration tests.
// Purpose: Run suites over real HTTP on loopback without a remote service.
// Dependencies: axum, petstore-harness, tokio
// ============================================================================

//! ## Overview
//! Serves the `/v2/pet`, `/v2/store`, and `/v2/user` endpoints from memory on
//! `127.0.0.1:0`, on its own thread and runtime. Deleted resources can linger
//! for a configurable number of reads to exercise eventually-gone polling.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use petstore_harness::HarnessClient;
use petstore_harness::RetryPolicy;
use petstore_harness::SuiteOptions;
use serde_json::Value;
use serde_json::json;
use tokio::runtime::Builder;
use tokio::sync::oneshot;
use url::Url;

/// Id of the pet seeded so the inventory always lists `available`.
pub const SEEDED_PET_ID: i64 = 9000;

/// Stub behavior knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubOptions {
    /// Reads that still see a resource after it was deleted.
    pub delete_lag: u32,
}

#[derive(Default)]
struct StubData {
    pets: BTreeMap<i64, Value>,
    orders: BTreeMap<i64, Value>,
    users: BTreeMap<String, Value>,
    ghosts: HashMap<String, (Value, u32)>,
    api_keys: Vec<String>,
}

#[derive(Clone)]
struct StubState {
    options: StubOptions,
    data: Arc<Mutex<StubData>>,
}

impl StubState {
    fn with_data<T>(&self, f: impl FnOnce(&mut StubData) -> T) -> Option<T> {
        self.data.lock().ok().map(|mut data| f(&mut data))
    }
}

/// Handle for the stub server; shuts it down on drop.
pub struct PetStoreStub {
    base_url: Url,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
    data: Arc<Mutex<StubData>>,
}

impl PetStoreStub {
    /// Base URL including the `/v2` prefix.
    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    /// Client bound to the stub with a short timeout.
    pub fn client(&self) -> Result<HarnessClient, String> {
        HarnessClient::new(self.base_url(), Duration::from_secs(5)).map_err(|err| err.to_string())
    }

    /// Suite options with a fast poll budget.
    pub fn suite_options(&self) -> SuiteOptions {
        SuiteOptions {
            gone_policy: RetryPolicy::new(5, Duration::from_millis(5)),
            ..SuiteOptions::default()
        }
    }

    /// `api_key` header values received so far.
    pub fn api_keys(&self) -> Vec<String> {
        self.data.lock().map_or_else(|_| Vec::new(), |data| data.api_keys.clone())
    }

    /// Ids of pets currently stored.
    pub fn pet_ids(&self) -> Vec<i64> {
        self.data.lock().map_or_else(|_| Vec::new(), |data| data.pets.keys().copied().collect())
    }

    /// Usernames currently stored.
    pub fn usernames(&self) -> Vec<String> {
        self.data.lock().map_or_else(|_| Vec::new(), |data| data.users.keys().cloned().collect())
    }
}

impl Drop for PetStoreStub {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Spawns a stub with default options.
pub fn spawn_stub() -> Result<PetStoreStub, String> {
    spawn_stub_with(StubOptions::default())
}

/// Spawns a stub with the given options.
pub fn spawn_stub_with(options: StubOptions) -> Result<PetStoreStub, String> {
    let listener =
        StdTcpListener::bind("127.0.0.1:0").map_err(|err| format!("stub bind failed: {err}"))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("stub listener nonblocking failed: {err}"))?;
    let addr = listener.local_addr().map_err(|err| format!("stub local addr failed: {err}"))?;
    let base_url =
        Url::parse(&format!("http://{addr}/v2")).map_err(|err| format!("stub url invalid: {err}"))?;

    let mut seeded = StubData::default();
    seeded.pets.insert(
        SEEDED_PET_ID,
        json!({"id": SEEDED_PET_ID, "name": "seed", "photoUrls": [], "tags": [], "status": "available"}),
    );
    let data = Arc::new(Mutex::new(seeded));
    let state = StubState {
        options,
        data: Arc::clone(&data),
    };
    let app = Router::new()
        .route("/v2/pet", post(upsert_pet).put(upsert_pet))
        .route("/v2/pet/findByStatus", get(find_pets_by_status))
        .route("/v2/pet/{id}", get(get_pet).delete(delete_pet))
        .route("/v2/store/inventory", get(inventory))
        .route("/v2/store/order", post(place_order))
        .route("/v2/store/order/{id}", get(get_order).delete(delete_order))
        .route("/v2/user/createWithList", post(create_users))
        .route("/v2/user/login", get(login))
        .route("/v2/user/{username}", get(get_user).put(update_user).delete(delete_user))
        .with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = thread::spawn(move || {
        let Ok(runtime) = Builder::new_current_thread().enable_all().build() else {
            return;
        };
        runtime.block_on(async move {
            let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                return;
            };
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });
    });
    Ok(PetStoreStub {
        base_url,
        shutdown: Some(shutdown_tx),
        join: Some(join),
        data,
    })
}

/// Returns an unused loopback URL (nothing listens on it).
pub fn closed_port_url() -> Result<Url, String> {
    let listener =
        StdTcpListener::bind("127.0.0.1:0").map_err(|err| format!("bind failed: {err}"))?;
    let addr = listener.local_addr().map_err(|err| format!("local addr failed: {err}"))?;
    drop(listener);
    Url::parse(&format!("http://{addr}/v2")).map_err(|err| err.to_string())
}

/// Loopback server that accepts connections but never writes a response.
pub struct SilentServer {
    base_url: Url,
    stop: Arc<AtomicBool>,
    join: Option<thread::JoinHandle<()>>,
}

impl SilentServer {
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl Drop for SilentServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Starts a [`SilentServer`]; accepted sockets stay open until it drops.
pub fn spawn_silent_server() -> Result<SilentServer, String> {
    let listener =
        StdTcpListener::bind("127.0.0.1:0").map_err(|err| format!("bind failed: {err}"))?;
    listener.set_nonblocking(true).map_err(|err| format!("nonblocking failed: {err}"))?;
    let addr = listener.local_addr().map_err(|err| format!("local addr failed: {err}"))?;
    let base_url = Url::parse(&format!("http://{addr}/v2")).map_err(|err| err.to_string())?;
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    let join = thread::spawn(move || {
        let mut held = Vec::new();
        while !flag.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, _)) => held.push(stream),
                Err(_) => thread::sleep(Duration::from_millis(5)),
            }
        }
    });
    Ok(SilentServer {
        base_url,
        stop,
        join: Some(join),
    })
}

// ============================================================================
// SECTION: Responses
// ============================================================================

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"code": 1, "type": "error", "message": message})))
        .into_response()
}

fn ok_message(message: &str) -> Response {
    (StatusCode::OK, Json(json!({"code": 200, "type": "unknown", "message": message})))
        .into_response()
}

fn server_error() -> Response {
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

fn record_api_key(state: &StubState, headers: &HeaderMap) {
    if let Some(value) = headers.get("api_key").and_then(|value| value.to_str().ok()) {
        let value = value.to_string();
        state.with_data(|data| data.api_keys.push(value));
    }
}

/// Serves a lingering deleted resource, consuming one read.
fn read_ghost(data: &mut StubData, key: &str) -> Option<Value> {
    let (value, remaining) = data.ghosts.get_mut(key)?;
    let value = value.clone();
    *remaining = remaining.saturating_sub(1);
    if *remaining == 0 {
        data.ghosts.remove(key);
    }
    Some(value)
}

fn bury(data: &mut StubData, lag: u32, key: String, value: Value) {
    if lag > 0 {
        data.ghosts.insert(key, (value, lag));
    }
}

// ============================================================================
// SECTION: Pets
// ============================================================================

async fn upsert_pet(State(state): State<StubState>, Json(pet): Json<Value>) -> Response {
    let Some(id) = pet.get("id").and_then(Value::as_i64) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "bad input"}))).into_response();
    };
    let stored = pet.clone();
    match state.with_data(|data| data.pets.insert(id, stored)) {
        Some(_) => (StatusCode::OK, Json(pet)).into_response(),
        None => server_error(),
    }
}

async fn find_pets_by_status(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record_api_key(&state, &headers);
    let status = query.get("status").cloned().unwrap_or_default();
    let found = state.with_data(|data| {
        data.pets
            .values()
            .filter(|pet| pet.get("status").and_then(Value::as_str) == Some(status.as_str()))
            .cloned()
            .collect::<Vec<_>>()
    });
    found.map_or_else(server_error, |pets| (StatusCode::OK, Json(Value::Array(pets))).into_response())
}

async fn get_pet(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    record_api_key(&state, &headers);
    let Ok(id) = id.parse::<i64>() else {
        return not_found("Pet not found");
    };
    let found = state.with_data(|data| {
        data.pets.get(&id).cloned().or_else(|| read_ghost(data, &format!("pet/{id}")))
    });
    match found {
        Some(Some(pet)) => (StatusCode::OK, Json(pet)).into_response(),
        Some(None) => not_found("Pet not found"),
        None => server_error(),
    }
}

async fn delete_pet(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    record_api_key(&state, &headers);
    let Ok(id) = id.parse::<i64>() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let lag = state.options.delete_lag;
    let removed = state.with_data(|data| {
        let removed = data.pets.remove(&id);
        if let Some(pet) = &removed {
            bury(data, lag, format!("pet/{id}"), pet.clone());
        }
        removed.is_some()
    });
    match removed {
        Some(true) => ok_message(&id.to_string()),
        Some(false) => StatusCode::NOT_FOUND.into_response(),
        None => server_error(),
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

async fn inventory(State(state): State<StubState>) -> Response {
    let counts = state.with_data(|data| {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for status in data.pets.values().filter_map(|pet| pet.get("status").and_then(Value::as_str)) {
            *counts.entry(status.to_string()).or_default() += 1;
        }
        counts
    });
    counts.map_or_else(server_error, |counts| (StatusCode::OK, Json(json!(counts))).into_response())
}

async fn place_order(State(state): State<StubState>, Json(order): Json<Value>) -> Response {
    let Some(id) = order.get("id").and_then(Value::as_i64) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "bad input"}))).into_response();
    };
    let stored = order.clone();
    match state.with_data(|data| data.orders.insert(id, stored)) {
        Some(_) => (StatusCode::OK, Json(order)).into_response(),
        None => server_error(),
    }
}

async fn get_order(State(state): State<StubState>, Path(id): Path<String>) -> Response {
    let Ok(id) = id.parse::<i64>() else {
        return not_found("Order not found");
    };
    let found = state.with_data(|data| {
        data.orders.get(&id).cloned().or_else(|| read_ghost(data, &format!("order/{id}")))
    });
    match found {
        Some(Some(order)) => (StatusCode::OK, Json(order)).into_response(),
        Some(None) => not_found("Order not found"),
        None => server_error(),
    }
}

async fn delete_order(State(state): State<StubState>, Path(id): Path<String>) -> Response {
    let Ok(id) = id.parse::<i64>() else {
        return not_found("Order not found");
    };
    let lag = state.options.delete_lag;
    let removed = state.with_data(|data| {
        let removed = data.orders.remove(&id);
        if let Some(order) = &removed {
            bury(data, lag, format!("order/{id}"), order.clone());
        }
        removed.is_some()
    });
    match removed {
        Some(true) => ok_message(&id.to_string()),
        Some(false) => not_found("Order Not Found"),
        None => server_error(),
    }
}

// ============================================================================
// SECTION: Users
// ============================================================================

fn username_of(user: &Value) -> Option<String> {
    user.get("username").and_then(Value::as_str).map(str::to_string)
}

async fn create_users(State(state): State<StubState>, Json(users): Json<Vec<Value>>) -> Response {
    let stored = state.with_data(|data| {
        for user in users {
            if let Some(username) = username_of(&user) {
                data.users.insert(username, user);
            }
        }
    });
    match stored {
        Some(()) => ok_message("ok"),
        None => server_error(),
    }
}

async fn login(State(state): State<StubState>, Query(query): Query<HashMap<String, String>>) -> Response {
    let username = query.get("username").cloned().unwrap_or_default();
    let password = query.get("password").cloned().unwrap_or_default();
    let valid = state.with_data(|data| {
        data.users
            .get(&username)
            .and_then(|user| user.get("password").and_then(Value::as_str))
            .is_some_and(|stored| stored == password)
    });
    match valid {
        Some(true) => ok_message("logged in user session:1"),
        Some(false) => (StatusCode::BAD_REQUEST, Json(json!({"message": "Invalid username/password supplied"})))
            .into_response(),
        None => server_error(),
    }
}

async fn get_user(State(state): State<StubState>, Path(username): Path<String>) -> Response {
    let found = state.with_data(|data| {
        data.users.get(&username).cloned().or_else(|| read_ghost(data, &format!("user/{username}")))
    });
    match found {
        Some(Some(user)) => (StatusCode::OK, Json(user)).into_response(),
        Some(None) => not_found("User not found"),
        None => server_error(),
    }
}

async fn update_user(
    State(state): State<StubState>,
    Path(username): Path<String>,
    Json(user): Json<Value>,
) -> Response {
    let key = username_of(&user).unwrap_or_else(|| username.clone());
    let stored = state.with_data(|data| {
        data.users.remove(&username);
        data.users.insert(key, user);
    });
    match stored {
        Some(()) => ok_message("updated"),
        None => server_error(),
    }
}

async fn delete_user(State(state): State<StubState>, Path(username): Path<String>) -> Response {
    let lag = state.options.delete_lag;
    let removed = state.with_data(|data| {
        let removed = data.users.remove(&username);
        if let Some(user) = &removed {
            bury(data, lag, format!("user/{username}"), user.clone());
        }
        removed.is_some()
    });
    match removed {
        Some(true) => ok_message(&username),
        Some(false) => StatusCode::NOT_FOUND.into_response(),
        None => server_error(),
    }
}
