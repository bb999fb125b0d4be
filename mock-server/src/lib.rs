//! In-process stand-in for the headless content API.
//!
//! Serves seeded, read-only collections under `/api/{collection}` and a
//! writable `/api/newsletter-subs` collection with a unique `email`
//! attribute. Successes use the `{data, meta}` envelope, failures the
//! `{data: null, error: {status, name, message, details}}` envelope.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: u64,
    pub email: String,
    pub source: Option<String>,
    pub consent: Option<bool>,
}

#[derive(Default)]
struct Store {
    subscribers: Vec<Subscriber>,
    collections: HashMap<String, Vec<Value>>,
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<Store>>,
    token: Option<Arc<str>>,
}

type Reply = (StatusCode, Json<Value>);

pub const UNIQUE_MESSAGE: &str = "This attribute must be unique";

/// Router without authentication.
pub fn app() -> Router {
    app_with_token(None)
}

/// Router that answers 401 unless requests carry `Bearer <token>`.
pub fn app_with_token(token: Option<&str>) -> Router {
    let state = AppState {
        store: Arc::new(RwLock::new(Store {
            subscribers: Vec::new(),
            collections: seed(),
        })),
        token: token.map(Arc::from),
    };
    Router::new()
        .route(
            "/api/newsletter-subs",
            get(list_subscribers).post(create_subscriber),
        )
        .route("/api/{collection}", get(list_entries))
        .route("/api/{collection}/{id}", get(get_entry))
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: Option<String>) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_token(token.as_deref())).await
}

/// Content every fresh server starts with. `articles` deliberately mixes the
/// flat and the `data`/`attributes` media encodings.
pub fn seed() -> HashMap<String, Vec<Value>> {
    let articles = vec![
        json!({
            "id": 1,
            "title": "Lac Blanc",
            "slug": "lac-blanc",
            "cover": {"url": "/uploads/lac_blanc.jpg", "alternativeText": "Lac Blanc at dawn"},
            "images": [
                {"url": "/uploads/lac_1.jpg", "alternativeText": "Shore"},
                {"url": "/uploads/lac_2.jpg"}
            ]
        }),
        json!({
            "id": 2,
            "title": "Aiguille du Midi",
            "slug": "aiguille-du-midi",
            "cover": {"data": {"id": 5, "attributes": {"url": "/uploads/midi.jpg", "alternativeText": "Cable car"}}},
            "images": {"data": [
                {"id": 6, "attributes": {"url": "/uploads/midi_1.jpg"}},
                {"id": 7, "attributes": {}},
                {"id": 8, "attributes": {"url": "https://cdn.example.com/midi_3.jpg"}}
            ]}
        }),
    ];
    HashMap::from([("articles".to_string(), articles)])
}

fn error(status: StatusCode, name: &str, message: &str, details: Value) -> Reply {
    (
        status,
        Json(json!({
            "data": null,
            "error": {
                "status": status.as_u16(),
                "name": name,
                "message": message,
                "details": details,
            }
        })),
    )
}

fn not_found() -> Reply {
    error(StatusCode::NOT_FOUND, "NotFoundError", "Not Found", json!({}))
}

fn check_token(state: &AppState, headers: &HeaderMap) -> Result<(), Reply> {
    let Some(token) = state.token.as_deref() else {
        return Ok(());
    };
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if presented == Some(token) {
        Ok(())
    } else {
        Err(error(
            StatusCode::UNAUTHORIZED,
            "UnauthorizedError",
            "Missing or invalid credentials",
            json!({}),
        ))
    }
}

fn subscriber_entry(subscriber: &Subscriber) -> Value {
    json!({
        "id": subscriber.id,
        "attributes": {
            "email": subscriber.email,
            "source": subscriber.source,
            "consent": subscriber.consent,
        }
    })
}

async fn list_subscribers(State(state): State<AppState>, headers: HeaderMap) -> Reply {
    if let Err(reply) = check_token(&state, &headers) {
        return reply;
    }
    let store = state.store.read().await;
    let data: Vec<Value> = store.subscribers.iter().map(subscriber_entry).collect();
    let total = data.len();
    (
        StatusCode::OK,
        Json(json!({"data": data, "meta": {"pagination": {"total": total}}})),
    )
}

async fn create_subscriber(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    if let Err(reply) = check_token(&state, &headers) {
        return reply;
    }

    let Some(data) = body.get("data").and_then(Value::as_object) else {
        return error(
            StatusCode::BAD_REQUEST,
            "ValidationError",
            "Missing \"data\" payload in the request body",
            json!({}),
        );
    };
    let Some(email) = data.get("email").and_then(Value::as_str) else {
        return error(
            StatusCode::BAD_REQUEST,
            "ValidationError",
            "email must be a `string` type",
            json!({"errors": [{"path": ["email"], "message": "email must be a `string` type", "name": "ValidationError"}]}),
        );
    };
    let consent = match data.get("consent") {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(_) => {
            return error(
                StatusCode::BAD_REQUEST,
                "ValidationError",
                "consent must be a `boolean` type",
                json!({"errors": [{"path": ["consent"], "message": "consent must be a `boolean` type", "name": "ValidationError"}]}),
            );
        }
    };

    let mut store = state.store.write().await;
    if store.subscribers.iter().any(|s| s.email == email) {
        return error(
            StatusCode::BAD_REQUEST,
            "ValidationError",
            UNIQUE_MESSAGE,
            json!({"errors": [{"path": ["email"], "message": UNIQUE_MESSAGE, "name": "ValidationError"}]}),
        );
    }

    let subscriber = Subscriber {
        id: store.subscribers.len() as u64 + 1,
        email: email.to_string(),
        source: data.get("source").and_then(Value::as_str).map(String::from),
        consent,
    };
    let entry = subscriber_entry(&subscriber);
    store.subscribers.push(subscriber);
    (StatusCode::OK, Json(json!({"data": entry, "meta": {}})))
}

async fn list_entries(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Reply {
    if let Err(reply) = check_token(&state, &headers) {
        return reply;
    }
    let store = state.store.read().await;
    let Some(entries) = store.collections.get(&collection) else {
        return not_found();
    };
    (
        StatusCode::OK,
        Json(json!({
            "data": entries,
            "meta": {
                "query": query.unwrap_or_default(),
                "pagination": {"total": entries.len()},
            }
        })),
    )
}

async fn get_entry(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Reply {
    if let Err(reply) = check_token(&state, &headers) {
        return reply;
    }
    let store = state.store.read().await;
    let entry = store
        .collections
        .get(&collection)
        .and_then(|entries| entries.iter().find(|e| e["id"].to_string() == id));
    match entry {
        Some(entry) => (StatusCode::OK, Json(json!({"data": entry, "meta": {}}))),
        None => not_found(),
    }
}
