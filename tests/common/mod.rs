use std::collections::HashMap;
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::oneshot;

use recipe_tui::config::ApiOptions;

/// A request as the fixture server saw it. `path` keeps its percent-encoding.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone)]
struct Fixture {
    recipes: Arc<Vec<Value>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl Fixture {
    fn record(&self, method: Method, uri: &OriginalUri, body: Option<Value>) {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(RecordedRequest {
                method,
                path: uri.path().to_string(),
                query: uri.query().map(str::to_string),
                body,
            });
    }

    fn page(&self, recipes: Vec<Value>, skip: usize, limit: usize) -> Value {
        json!({
            "recipes": recipes,
            "total": self.recipes.len(),
            "skip": skip,
            "limit": limit,
        })
    }

    fn find(&self, id: u64) -> Option<Value> {
        self.recipes
            .iter()
            .find(|recipe| recipe["id"].as_u64() == Some(id))
            .cloned()
    }
}

/// In-process stand-in for the recipes service, served from a background tokio runtime so the
/// blocking client under test can call it from the test thread.
pub struct FixtureServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl FixtureServer {
    pub fn start(recipes: Vec<Value>) -> Self {
        let fixture = Fixture {
            recipes: Arc::new(recipes),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = fixture.requests.clone();

        let app = Router::new()
            .route("/recipes", get(list))
            .route("/recipes/search", get(search))
            .route("/recipes/tag/:tag", get(by_tag))
            .route("/recipes/add", post(create))
            .route("/recipes/:id", get(show).put(update))
            .route("/down", get(unavailable))
            .route("/down/*rest", get(unavailable).post(unavailable))
            .with_state(fixture);

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fixture server");
        listener
            .set_nonblocking(true)
            .expect("non-blocking listener");
        let addr = listener.local_addr().expect("local addr");
        let (tx, rx) = oneshot::channel::<()>();

        let handle = thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .expect("fixture runtime");
            runtime.block_on(async move {
                let listener =
                    tokio::net::TcpListener::from_std(listener).expect("tokio listener");
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = rx.await;
                    })
                    .await
                    .expect("fixture server");
            });
        });

        Self {
            addr,
            requests,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    pub fn options(&self) -> ApiOptions {
        self.options_for("/recipes")
    }

    pub fn options_for(&self, path: &str) -> ApiOptions {
        ApiOptions {
            base_url: format!("http://{}{path}", self.addr),
            timeout_secs: 5,
            ..ApiOptions::default()
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub fn recipe(id: u64, name: &str, tags: &[&str]) -> Value {
    json!({
        "id": id,
        "name": name,
        "ingredients": ["Salt"],
        "instructions": ["Cook"],
        "prepTimeMinutes": 10,
        "cookTimeMinutes": 20,
        "servings": 2,
        "difficulty": "Easy",
        "cuisine": "Italian",
        "caloriesPerServing": 300,
        "tags": tags,
        "userId": 1,
        "image": "",
        "rating": 4.5,
        "reviewCount": 10,
        "mealType": ["Dinner"],
    })
}

pub fn collection(count: u64) -> Vec<Value> {
    (1..=count)
        .map(|id| recipe(id, &format!("Recipe {id}"), &["Dinner"]))
        .collect()
}

fn number(params: &HashMap<String, String>, key: &str, default: usize) -> usize {
    params
        .get(key)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

async fn list(
    State(fixture): State<Fixture>,
    uri: OriginalUri,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    fixture.record(Method::GET, &uri, None);
    let limit = number(&params, "limit", 30);
    let skip = number(&params, "skip", 0);
    let slice: Vec<Value> = fixture.recipes.iter().skip(skip).take(limit).cloned().collect();
    let count = slice.len();
    Json(fixture.page(slice, skip, count))
}

async fn search(
    State(fixture): State<Fixture>,
    uri: OriginalUri,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    fixture.record(Method::GET, &uri, None);
    let needle = params.get("q").cloned().unwrap_or_default().to_lowercase();
    let hits: Vec<Value> = fixture
        .recipes
        .iter()
        .filter(|recipe| {
            recipe["name"]
                .as_str()
                .map(|name| name.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .cloned()
        .collect();
    let count = hits.len();
    Json(json!({ "recipes": hits, "total": count, "skip": 0, "limit": count }))
}

async fn by_tag(
    State(fixture): State<Fixture>,
    uri: OriginalUri,
    Path(tag): Path<String>,
) -> Json<Value> {
    fixture.record(Method::GET, &uri, None);
    let hits: Vec<Value> = fixture
        .recipes
        .iter()
        .filter(|recipe| {
            recipe["tags"]
                .as_array()
                .map(|tags| tags.iter().any(|t| t.as_str() == Some(tag.as_str())))
                .unwrap_or(false)
        })
        .cloned()
        .collect();
    let count = hits.len();
    Json(json!({ "recipes": hits, "total": count, "skip": 0, "limit": count }))
}

async fn show(
    State(fixture): State<Fixture>,
    uri: OriginalUri,
    Path(id): Path<u64>,
) -> Result<Json<Value>, StatusCode> {
    fixture.record(Method::GET, &uri, None);
    fixture.find(id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn create(
    State(fixture): State<Fixture>,
    uri: OriginalUri,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fixture.record(Method::POST, &uri, Some(body.clone()));
    let mut created = body;
    created["id"] = json!(fixture.recipes.len() + 1);
    (StatusCode::CREATED, Json(created))
}

async fn update(
    State(fixture): State<Fixture>,
    uri: OriginalUri,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    fixture.record(Method::PUT, &uri, Some(body.clone()));
    let mut current = fixture.find(id).ok_or(StatusCode::NOT_FOUND)?;
    if let (Some(target), Some(changes)) = (current.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            target.insert(key.clone(), value.clone());
        }
    }
    Ok(Json(current))
}

async fn unavailable() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}
