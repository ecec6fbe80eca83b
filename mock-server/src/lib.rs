//! In-memory OpenADR 3 VTN.
//!
//! Issues client-credentials tokens at `/auth/token`, requires a bearer token
//! on every other route, and keeps each collection as a list of JSON objects
//! in creation order. Records are stored as received plus the server-managed
//! `id`, `createdDateTime` and `modificationDateTime` fields.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Path, RawQuery, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Largest page a search may request.
pub const MAX_LIMIT: usize = 50;

/// Credentials the token endpoint accepts and the lifetime of issued tokens.
#[derive(Debug, Clone)]
pub struct VtnConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_ttl: Duration,
}

impl Default for VtnConfig {
    fn default() -> Self {
        Self {
            client_id: "mock-client".to_string(),
            client_secret: "mock-secret".to_string(),
            token_ttl: Duration::from_secs(3600),
        }
    }
}

impl VtnConfig {
    /// Defaults overridden by `VTN_CLIENT_ID` and `VTN_CLIENT_SECRET`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(id) = std::env::var("VTN_CLIENT_ID") {
            config.client_id = id;
        }
        if let Ok(secret) = std::env::var("VTN_CLIENT_SECRET") {
            config.client_secret = secret;
        }
        config
    }
}

type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Kind {
    Program,
    Event,
    Report,
    Subscription,
    Ven,
    Resource,
}

impl Kind {
    fn name(self) -> &'static str {
        match self {
            Kind::Program => "program",
            Kind::Event => "event",
            Kind::Report => "report",
            Kind::Subscription => "subscription",
            Kind::Ven => "ven",
            Kind::Resource => "resource",
        }
    }

    fn required(self) -> &'static [&'static str] {
        match self {
            Kind::Program => &["programName", "retailerName", "programType"],
            Kind::Event => &["programId", "eventName"],
            Kind::Report => &["programId", "clientName", "reportName"],
            Kind::Subscription => &["clientName", "programId"],
            Kind::Ven => &["venName"],
            Kind::Resource => &["resourceName"],
        }
    }

    /// Query keys this collection filters on.
    fn filters(self) -> &'static [(&'static str, Filter)] {
        match self {
            Kind::Program => &[("targets", Filter::Targets)],
            Kind::Event => &[
                ("programID", Filter::Field("programId")),
                ("targets", Filter::Targets),
            ],
            Kind::Report => &[
                ("programID", Filter::Field("programId")),
                ("eventID", Filter::Field("eventId")),
                ("clientName", Filter::Field("clientName")),
            ],
            Kind::Subscription => &[
                ("programID", Filter::Field("programId")),
                ("clientName", Filter::Field("clientName")),
                ("objects", Filter::Objects),
            ],
            Kind::Ven => &[
                ("venName", Filter::Field("venName")),
                ("targets", Filter::Targets),
            ],
            Kind::Resource => &[
                ("resourceName", Filter::Field("resourceName")),
                ("targets", Filter::Targets),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Filter {
    /// String field equal to any wanted value.
    Field(&'static str),
    /// `targets` array sharing a value with the wanted ones.
    Targets,
    /// Any `objectOperations[].objects` entry among the wanted ones.
    Objects,
}

impl Filter {
    fn matches(self, record: &Record, wanted: &[&str]) -> bool {
        match self {
            Filter::Field(field) => record
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|value| wanted.contains(&value)),
            Filter::Targets => strings(record.get("targets")).any(|t| wanted.contains(&t)),
            Filter::Objects => record
                .get("objectOperations")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .flat_map(|op| strings(op.get("objects")))
                .any(|object| wanted.contains(&object)),
        }
    }
}

fn strings<'a>(value: Option<&'a Value>) -> impl Iterator<Item = &'a str> + 'a {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

fn id_of(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

fn belongs_to(record: &Record, parent: Option<&str>) -> bool {
    parent.map_or(true, |ven| record.get("venId").and_then(Value::as_str) == Some(ven))
}

#[derive(Default)]
struct Store {
    tokens: HashMap<String, Instant>,
    collections: HashMap<Kind, Vec<Record>>,
}

impl Store {
    fn records(&self, kind: Kind) -> &[Record] {
        self.collections.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    fn records_mut(&mut self, kind: Kind) -> &mut Vec<Record> {
        self.collections.entry(kind).or_default()
    }

    fn position(&self, kind: Kind, parent: Option<&str>, id: &str) -> Option<usize> {
        self.records(kind)
            .iter()
            .position(|r| id_of(r) == Some(id) && belongs_to(r, parent))
    }

    fn ensure_ven(&self, ven_id: &str) -> Result<(), Problem> {
        match self.position(Kind::Ven, None, ven_id) {
            Some(_) => Ok(()),
            None => Err(Problem::not_found(Kind::Ven, ven_id)),
        }
    }

    /// Record a new token, dropping any that have already expired.
    fn issue_token(&mut self, token: String, ttl: Duration) {
        let now = Instant::now();
        self.tokens.retain(|_, expires_at| *expires_at > now);
        self.tokens.insert(token, now + ttl);
    }

    fn token_is_valid(&self, token: &str) -> bool {
        self.tokens
            .get(token)
            .is_some_and(|expires_at| *expires_at > Instant::now())
    }
}

type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
struct AppState {
    config: Arc<VtnConfig>,
    db: Db,
}

/// RFC 7807 problem returned for every API failure.
#[derive(Debug)]
struct Problem {
    status: StatusCode,
    detail: String,
}

impl Problem {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    fn not_found(kind: Kind, id: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{} {id} not found", kind.name()))
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let body = json!({
            "type": "about:blank",
            "title": self.status.canonical_reason().unwrap_or("Error"),
            "status": self.status.as_u16(),
            "detail": self.detail,
        });
        (
            self.status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            Json(body),
        )
            .into_response()
    }
}

/// Router with the default credentials.
pub fn app() -> Router {
    app_with(VtnConfig::default())
}

pub fn app_with(config: VtnConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
        db: Db::default(),
    };

    let api = Router::new()
        .merge(collection(Kind::Program, "/programs"))
        .merge(collection(Kind::Event, "/events"))
        .merge(collection(Kind::Report, "/reports"))
        .merge(collection(Kind::Subscription, "/subscriptions"))
        .merge(collection(Kind::Ven, "/vens"))
        .merge(ven_resources())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .route("/auth/token", post(issue_token))
        .merge(api)
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, VtnConfig::default()).await
}

pub async fn run_with(listener: TcpListener, config: VtnConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

fn collection(kind: Kind, path: &str) -> Router<AppState> {
    Router::new()
        .route(
            path,
            get(move |state: State<AppState>, RawQuery(query): RawQuery| {
                list(state, kind, None, query)
            })
            .post(move |state: State<AppState>, body: String| create(state, kind, None, body)),
        )
        .route(
            &format!("{path}/{{id}}"),
            get(move |state: State<AppState>, Path(id): Path<String>| fetch(state, kind, None, id))
                .put(
                    move |state: State<AppState>, Path(id): Path<String>, body: String| {
                        replace(state, kind, None, id, body)
                    },
                )
                .delete(move |state: State<AppState>, Path(id): Path<String>| {
                    remove(state, kind, None, id)
                }),
        )
}

fn ven_resources() -> Router<AppState> {
    let kind = Kind::Resource;
    Router::new()
        .route(
            "/vens/{id}/resources",
            get(
                move |state: State<AppState>, Path(ven): Path<String>, RawQuery(query): RawQuery| {
                    list(state, kind, Some(ven), query)
                },
            )
            .post(
                move |state: State<AppState>, Path(ven): Path<String>, body: String| {
                    create(state, kind, Some(ven), body)
                },
            ),
        )
        .route(
            "/vens/{id}/resources/{resource_id}",
            get(
                move |state: State<AppState>, Path((ven, id)): Path<(String, String)>| {
                    fetch(state, kind, Some(ven), id)
                },
            )
            .put(
                move |state: State<AppState>,
                      Path((ven, id)): Path<(String, String)>,
                      body: String| { replace(state, kind, Some(ven), id, body) },
            )
            .delete(
                move |state: State<AppState>, Path((ven, id)): Path<(String, String)>| {
                    remove(state, kind, Some(ven), id)
                },
            ),
        )
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

fn oauth_error(status: StatusCode, error: &str) -> Response {
    (status, Json(json!({ "error": error }))).into_response()
}

async fn issue_token(State(state): State<AppState>, body: String) -> Response {
    let form: HashMap<String, String> = url::form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect();

    if form.get("grant_type").map(String::as_str) != Some("client_credentials") {
        return oauth_error(StatusCode::BAD_REQUEST, "unsupported_grant_type");
    }
    let authenticated = form.get("client_id") == Some(&state.config.client_id)
        && form.get("client_secret") == Some(&state.config.client_secret);
    if !authenticated {
        warn!(client_id = ?form.get("client_id"), "rejected client credentials");
        return oauth_error(StatusCode::UNAUTHORIZED, "invalid_client");
    }

    let token = Uuid::new_v4().simple().to_string();
    let ttl = state.config.token_ttl;
    state.db.write().await.issue_token(token.clone(), ttl);
    info!(ttl_secs = ttl.as_secs(), "issued access token");

    Json(json!({
        "access_token": token,
        "token_type": "Bearer",
        "expires_in": ttl.as_secs(),
    }))
    .into_response()
}

async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer ")))
        .map(str::to_owned);
    let authorized = match token {
        Some(token) => state.db.read().await.token_is_valid(&token),
        None => false,
    };
    if !authorized {
        warn!(path = %request.uri().path(), "missing or invalid bearer token");
        return Problem::new(StatusCode::UNAUTHORIZED, "missing or invalid bearer token")
            .into_response();
    }
    next.run(request).await
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_query(query: Option<&str>) -> Vec<(String, String)> {
    query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// `(skip, limit)` from the query, defaulting to the first full page.
fn page(pairs: &[(String, String)]) -> Result<(usize, usize), Problem> {
    let value = |key: &str| pairs.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.as_str());

    let skip = match value("skip") {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| Problem::bad_request(format!("skip must be a non-negative integer, got {raw}")))?,
        None => 0,
    };
    let limit = match value("limit") {
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|limit| *limit <= MAX_LIMIT)
            .ok_or_else(|| {
                Problem::bad_request(format!("limit must be between 0 and {MAX_LIMIT}, got {raw}"))
            })?,
        None => MAX_LIMIT,
    };
    Ok((skip, limit))
}

fn parse_record(kind: Kind, body: &str) -> Result<Record, Problem> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| Problem::bad_request(format!("invalid JSON body: {e}")))?;
    let Value::Object(record) = value else {
        return Err(Problem::bad_request("body must be a JSON object"));
    };

    let missing: Vec<&str> = kind
        .required()
        .iter()
        .copied()
        .filter(|field| {
            record
                .get(*field)
                .and_then(Value::as_str)
                .map_or(true, |value| value.trim().is_empty())
        })
        .collect();
    if !missing.is_empty() {
        return Err(Problem::bad_request(format!("{} is required", missing.join(", "))));
    }
    Ok(record)
}

async fn list(
    State(state): State<AppState>,
    kind: Kind,
    parent: Option<String>,
    query: Option<String>,
) -> Result<Json<Vec<Record>>, Problem> {
    let pairs = parse_query(query.as_deref());
    let (skip, limit) = page(&pairs)?;

    let store = state.db.read().await;
    if let Some(ven) = &parent {
        store.ensure_ven(ven)?;
    }

    let matched: Vec<Record> = store
        .records(kind)
        .iter()
        .filter(|record| belongs_to(record, parent.as_deref()))
        .filter(|record| {
            kind.filters().iter().all(|&(key, filter)| {
                let wanted: Vec<&str> = pairs
                    .iter()
                    .filter(|(k, _)| k.as_str() == key)
                    .map(|(_, v)| v.as_str())
                    .collect();
                wanted.is_empty() || filter.matches(record, &wanted)
            })
        })
        .skip(skip)
        .take(limit)
        .cloned()
        .collect();

    debug!(kind = kind.name(), count = matched.len(), "search");
    Ok(Json(matched))
}

async fn fetch(
    State(state): State<AppState>,
    kind: Kind,
    parent: Option<String>,
    id: String,
) -> Result<Json<Record>, Problem> {
    let store = state.db.read().await;
    if let Some(ven) = &parent {
        store.ensure_ven(ven)?;
    }
    store
        .position(kind, parent.as_deref(), &id)
        .map(|index| Json(store.records(kind)[index].clone()))
        .ok_or_else(|| Problem::not_found(kind, &id))
}

async fn create(
    State(state): State<AppState>,
    kind: Kind,
    parent: Option<String>,
    body: String,
) -> Result<(StatusCode, Json<Record>), Problem> {
    let mut record = parse_record(kind, &body)?;

    let mut store = state.db.write().await;
    if let Some(ven) = &parent {
        store.ensure_ven(ven)?;
        record.insert("venId".to_string(), Value::String(ven.clone()));
    }

    let id = Uuid::new_v4().to_string();
    let now = timestamp();
    record.insert("id".to_string(), Value::String(id.clone()));
    record.insert("createdDateTime".to_string(), Value::String(now.clone()));
    record.insert("modificationDateTime".to_string(), Value::String(now));
    store.records_mut(kind).push(record.clone());

    info!(kind = kind.name(), %id, "created");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn replace(
    State(state): State<AppState>,
    kind: Kind,
    parent: Option<String>,
    id: String,
    body: String,
) -> Result<Json<Record>, Problem> {
    let mut record = parse_record(kind, &body)?;

    let mut store = state.db.write().await;
    if let Some(ven) = &parent {
        store.ensure_ven(ven)?;
        record.insert("venId".to_string(), Value::String(ven.clone()));
    }
    let index = store
        .position(kind, parent.as_deref(), &id)
        .ok_or_else(|| Problem::not_found(kind, &id))?;

    let existing = &mut store.records_mut(kind)[index];
    record.insert("id".to_string(), Value::String(id.clone()));
    if let Some(created) = existing.get("createdDateTime").cloned() {
        record.insert("createdDateTime".to_string(), created);
    }
    record.insert("modificationDateTime".to_string(), Value::String(timestamp()));
    *existing = record.clone();

    info!(kind = kind.name(), %id, "replaced");
    Ok(Json(record))
}

async fn remove(
    State(state): State<AppState>,
    kind: Kind,
    parent: Option<String>,
    id: String,
) -> Result<Json<Record>, Problem> {
    let mut store = state.db.write().await;
    if let Some(ven) = &parent {
        store.ensure_ven(ven)?;
    }
    let index = store
        .position(kind, parent.as_deref(), &id)
        .ok_or_else(|| Problem::not_found(kind, &id))?;
    let removed = store.records_mut(kind).remove(index);

    if kind == Kind::Ven {
        store
            .records_mut(Kind::Resource)
            .retain(|resource| !belongs_to(resource, Some(id.as_str())));
    }

    info!(kind = kind.name(), %id, "deleted");
    Ok(Json(removed))
}
