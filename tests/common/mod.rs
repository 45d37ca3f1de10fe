//! In-memory stand-in for the admin REST backend.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use campus_admin::{
    ApiClient, ApiRequest, ApiResponse, MemoryStorage, Navigator, RecordId, Result, Route,
    SessionStore, Transport,
};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";
pub const TOKEN: &str = "valid-token";

#[derive(Default)]
pub struct BackendState {
    /// Rejects every authenticated request with 401 when set.
    pub revoked: bool,
    pub records: BTreeMap<&'static str, BTreeMap<RecordId, Value>>,
    pub links: BTreeMap<RecordId, BTreeSet<RecordId>>,
    pub next_id: RecordId,
    /// Course IDs whose attach call fails with 500.
    pub fail_attach: BTreeSet<RecordId>,
    /// Paths answered with a bare 500.
    pub fail_paths: BTreeSet<String>,
}

#[derive(Default)]
pub struct FakeBackend {
    pub state: Mutex<BackendState>,
    pub requests: Mutex<Vec<ApiRequest>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        let backend = Self::default();
        backend.state.lock().unwrap().next_id = 100;
        Arc::new(backend)
    }

    pub fn insert(&self, collection: &'static str, record: Value) {
        let id = record["id"].as_i64().expect("record id");
        self.state
            .lock()
            .unwrap()
            .records
            .entry(collection)
            .or_default()
            .insert(id, record);
    }

    pub fn link(&self, event: RecordId, courses: &[RecordId]) {
        self.state
            .lock()
            .unwrap()
            .links
            .insert(event, courses.iter().copied().collect());
    }

    pub fn links_of(&self, event: RecordId) -> BTreeSet<RecordId> {
        self.state
            .lock()
            .unwrap()
            .links
            .get(&event)
            .cloned()
            .unwrap_or_default()
    }

    pub fn revoke(&self) {
        self.state.lock().unwrap().revoked = true;
    }

    pub fn fail_attach(&self, course: RecordId) {
        self.state.lock().unwrap().fail_attach.insert(course);
    }

    pub fn heal(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_attach.clear();
        state.fail_paths.clear();
    }

    pub fn fail_path(&self, path: &str) {
        self.state.lock().unwrap().fail_paths.insert(path.to_string());
    }

    /// `METHOD path` for every request seen, in order.
    pub fn calls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let mut state = self.state.lock().unwrap();

        if request.path == "/auth/login" {
            let body = request.body.clone().unwrap_or(Value::Null);
            if body["username"] == USERNAME && body["password"] == PASSWORD {
                return ApiResponse::json_body(
                    201,
                    json!({
                        "access_token": TOKEN,
                        "user": {"id": 1, "username": USERNAME, "email": "admin@example.org"}
                    }),
                );
            }
            return ApiResponse::json_body(401, json!({"statusCode": 401, "message": "Invalid credentials"}));
        }

        if state.revoked || request.bearer.as_deref() != Some(TOKEN) {
            return ApiResponse::json_body(401, json!({"statusCode": 401, "message": "Unauthorized"}));
        }

        if state.fail_paths.contains(&request.path) {
            return ApiResponse::new(500, "");
        }

        let segments: Vec<&str> = request.path.split('/').filter(|s| !s.is_empty()).collect();
        let collection: &'static str = match segments.first() {
            Some(&"universities") => "universities",
            Some(&"courses") => "courses",
            Some(&"events") => "events",
            _ => return ApiResponse::json_body(404, json!({"message": "Not Found"})),
        };

        match (request.method.as_str(), segments.as_slice()) {
            ("GET", [_]) => {
                let query: BTreeMap<_, _> = request.query.iter().cloned().collect();
                let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
                let limit: usize = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);
                let all = state.records.get(collection).cloned().unwrap_or_default();
                let items: Vec<Value> = all
                    .values()
                    .skip((page - 1) * limit)
                    .take(limit)
                    .cloned()
                    .collect();
                ApiResponse::json_body(200, json!({"items": items, "total": all.len()}))
            }
            ("POST", [_]) => {
                state.next_id += 1;
                let id = state.next_id;
                let mut record = request.body.clone().unwrap_or_else(|| json!({}));
                record["id"] = json!(id);
                state.records.entry(collection).or_default().insert(id, record.clone());
                ApiResponse::json_body(201, record)
            }
            (method, [_, id]) => {
                let Ok(id) = id.parse::<RecordId>() else {
                    return ApiResponse::json_body(400, json!({"message": "Bad id"}));
                };
                let exists = state
                    .records
                    .get(collection)
                    .is_some_and(|records| records.contains_key(&id));
                if !exists {
                    return ApiResponse::json_body(404, json!({"message": "Not Found"}));
                }
                match method {
                    "GET" => {
                        let mut record = state.records[collection][&id].clone();
                        if collection == "events" {
                            let courses: Vec<Value> = state
                                .links
                                .get(&id)
                                .into_iter()
                                .flatten()
                                .map(|cid| {
                                    state
                                        .records
                                        .get("courses")
                                        .and_then(|c| c.get(cid))
                                        .cloned()
                                        .unwrap_or_else(|| json!({"id": cid, "title": "?"}))
                                })
                                .collect();
                            record["courses"] = json!(courses);
                        }
                        ApiResponse::json_body(200, record)
                    }
                    "PATCH" => {
                        let patch = request.body.clone().unwrap_or_else(|| json!({}));
                        if let Some(record) = state
                            .records
                            .get_mut(collection)
                            .and_then(|r| r.get_mut(&id))
                        {
                            if let (Some(target), Some(fields)) = (record.as_object_mut(), patch.as_object()) {
                                for (k, v) in fields {
                                    target.insert(k.clone(), v.clone());
                                }
                            }
                        }
                        ApiResponse::json_body(200, state.records[collection][&id].clone())
                    }
                    "DELETE" => {
                        if let Some(records) = state.records.get_mut(collection) {
                            records.remove(&id);
                        }
                        state.links.remove(&id);
                        ApiResponse::new(200, "")
                    }
                    _ => ApiResponse::json_body(405, json!({"message": "Method Not Allowed"})),
                }
            }
            (method, ["events", id, "courses", course]) => {
                let (Ok(id), Ok(course)) = (id.parse::<RecordId>(), course.parse::<RecordId>()) else {
                    return ApiResponse::json_body(400, json!({"message": "Bad id"}));
                };
                match method {
                    "POST" => {
                        if state.fail_attach.contains(&course) {
                            return ApiResponse::new(500, "");
                        }
                        state.links.entry(id).or_default().insert(course);
                        ApiResponse::new(201, "")
                    }
                    "DELETE" => {
                        if let Some(links) = state.links.get_mut(&id) {
                            links.remove(&course);
                        }
                        ApiResponse::new(200, "")
                    }
                    _ => ApiResponse::json_body(405, json!({"message": "Method Not Allowed"})),
                }
            }
            _ => ApiResponse::json_body(404, json!({"message": "Not Found"})),
        }
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let response = self.handle(&request);
        self.requests.lock().unwrap().push(request);
        Ok(response)
    }
}

/// Client, session and navigator wired together the way the CLI does it.
pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub session: Arc<SessionStore>,
    pub navigator: Arc<Navigator>,
    pub client: ApiClient,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_session(SessionStore::new(MemoryStorage::new()))
    }

    pub fn with_session(session: SessionStore) -> Self {
        let backend = FakeBackend::new();
        let session = Arc::new(session);
        let navigator = Arc::new(Navigator::new(Route::Dashboard));
        let client = ApiClient::new(backend.clone(), session.clone())
            .with_unauthorized_hook(navigator.login_redirect_hook());
        Self {
            backend,
            session,
            navigator,
            client,
        }
    }

    pub async fn logged_in() -> Self {
        let harness = Self::new();
        harness
            .client
            .login(USERNAME, PASSWORD)
            .await
            .expect("login should succeed");
        harness.backend.clear_calls();
        harness
    }
}

pub fn course(id: RecordId, title: &str) -> Value {
    json!({"id": id, "title": title, "isActive": true, "university": {"id": 1, "name": "MIT"}})
}

pub fn event(id: RecordId, name: &str) -> Value {
    json!({"id": id, "name": name, "isActive": true})
}

pub fn university(id: RecordId, name: &str) -> Value {
    json!({"id": id, "name": name, "location": "Cambridge", "isActive": true})
}
