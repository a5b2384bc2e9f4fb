//! In-process rendition of the catalog REST contract, used as the external
//! collaborator in client integration tests.
//!
//! Implements only the client-facing contract: cookie-based sessions over a
//! fixed test credential pair, hierarchical items with server-computed
//! ancestors, `fields`-filtered reads, multipart file attachment with
//! optional scrape, set-semantics ACL documents, and directed relationships.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// The one credential pair the mock accepts.
pub const TEST_USERNAME: &str = "tester@example.gov";
pub const TEST_PASSWORD: &str = "tester-password";

const SESSION_COOKIE: &str = "catalog-session";

#[derive(Clone, Debug)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub parent_id: Option<String>,
    pub ancestors: Vec<String>,
    pub files: Vec<FileEntry>,
    pub facets: Option<Vec<Value>>,
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
    pub content_type: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadAccess {
    #[serde(default)]
    pub acl: BTreeSet<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub inherited: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WriteAccess {
    #[serde(default)]
    pub acl: BTreeSet<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub read: ReadAccess,
    #[serde(default)]
    pub write: WriteAccess,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    pub item_id: String,
    pub related_item_id: String,
    #[serde(rename = "type")]
    pub link_type: String,
}

#[derive(Debug)]
pub struct Catalog {
    items: HashMap<String, Item>,
    permissions: HashMap<String, Permissions>,
    relationships: Vec<Relationship>,
    sessions: HashSet<String>,
    my_items_id: String,
}

pub type Db = Arc<RwLock<Catalog>>;

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

type ApiErr = (StatusCode, Json<ErrorBody>);

fn err(status: StatusCode, message: &str) -> ApiErr {
    (
        status,
        Json(ErrorBody {
            message: message.to_string(),
        }),
    )
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn owner_permissions() -> Permissions {
    let mut permissions = Permissions::default();
    permissions
        .read
        .acl
        .insert(format!("USER:{TEST_USERNAME}"));
    permissions
        .write
        .acl
        .insert(format!("USER:{TEST_USERNAME}"));
    permissions
}

pub fn app() -> Router {
    let my_items_id = new_id();
    let root = Item {
        id: my_items_id.clone(),
        title: "My Items".to_string(),
        parent_id: None,
        ancestors: Vec::new(),
        files: Vec::new(),
        facets: None,
        extra: serde_json::Map::new(),
    };
    let mut items = HashMap::new();
    let mut permissions = HashMap::new();
    permissions.insert(my_items_id.clone(), owner_permissions());
    items.insert(my_items_id.clone(), root);

    let db: Db = Arc::new(RwLock::new(Catalog {
        items,
        permissions,
        relationships: Vec::new(),
        sessions: HashSet::new(),
        my_items_id,
    }));

    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/user/me", get(current_user))
        .route("/items", get(find_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/items/{id}/files", post(upload_files))
        .route(
            "/items/{id}/permissions",
            get(get_permissions).put(set_permissions),
        )
        .route("/relationships", post(create_relationship))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|part| {
        part.trim()
            .strip_prefix(SESSION_COOKIE)?
            .strip_prefix('=')
            .map(str::to_string)
    })
}

fn require_session(catalog: &Catalog, headers: &HeaderMap) -> Result<(), ApiErr> {
    match session_id(headers) {
        Some(sid) if catalog.sessions.contains(&sid) => Ok(()),
        _ => Err(err(StatusCode::UNAUTHORIZED, "not authenticated")),
    }
}

/// Serialize an item, honoring a `fields` selector: `id` and `title` are
/// always present; optional fields appear only when requested (or all of
/// them when no selector was given).
fn item_json(item: &Item, fields: Option<&str>) -> Value {
    let include = |name: &str| {
        fields.map_or(true, |list| list.split(',').any(|f| f.trim() == name))
    };

    let mut out = serde_json::Map::new();
    out.insert("id".to_string(), json!(item.id));
    out.insert("title".to_string(), json!(item.title));
    if include("parentId") {
        if let Some(parent_id) = &item.parent_id {
            out.insert("parentId".to_string(), json!(parent_id));
        }
    }
    if include("ancestors") {
        out.insert("ancestors".to_string(), json!(item.ancestors));
    }
    if include("files") && !item.files.is_empty() {
        out.insert("files".to_string(), json!(item.files));
    }
    if include("facets") {
        if let Some(facets) = &item.facets {
            out.insert("facets".to_string(), json!(facets));
        }
    }
    for (key, value) in &item.extra {
        if include(key) {
            out.insert(key.clone(), value.clone());
        }
    }
    Value::Object(out)
}

// --- auth ---

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginRequest>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<Value>), ApiErr> {
    if input.username != TEST_USERNAME || input.password != TEST_PASSWORD {
        return Err(err(StatusCode::UNAUTHORIZED, "invalid credentials"));
    }
    let sid = new_id();
    db.write().await.sessions.insert(sid.clone());
    Ok((
        StatusCode::OK,
        [(
            header::SET_COOKIE,
            format!("{SESSION_COOKIE}={sid}; Path=/"),
        )],
        Json(json!({ "username": input.username })),
    ))
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> StatusCode {
    if let Some(sid) = session_id(&headers) {
        db.write().await.sessions.remove(&sid);
    }
    StatusCode::NO_CONTENT
}

async fn current_user(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, ApiErr> {
    let catalog = db.read().await;
    require_session(&catalog, &headers)?;
    Ok(Json(json!({
        "id": "user1",
        "email": TEST_USERNAME,
        "myItemsId": catalog.my_items_id,
    })))
}

// --- items ---

async fn get_item(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiErr> {
    let catalog = db.read().await;
    require_session(&catalog, &headers)?;
    let item = catalog
        .items
        .get(&id)
        .ok_or_else(|| err(StatusCode::NOT_FOUND, "item not found"))?;
    Ok(Json(item_json(item, params.get("fields").map(String::as_str))))
}

async fn find_items(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiErr> {
    let catalog = db.read().await;
    require_session(&catalog, &headers)?;

    let mut matched: Vec<&Item> = catalog
        .items
        .values()
        .filter(|item| match params.get("parentId") {
            Some(parent_id) => item.parent_id.as_deref() == Some(parent_id),
            None => true,
        })
        .filter(|item| match params.get("q") {
            Some(q) => item.title.contains(q.as_str()),
            None => true,
        })
        .collect();
    matched.sort_by(|a, b| a.title.cmp(&b.title));

    let total = matched.len();
    let offset: usize = params
        .get("pageToken")
        .and_then(|t| t.parse().ok())
        .unwrap_or(0);
    let max: usize = params
        .get("max")
        .and_then(|m| m.parse().ok())
        .unwrap_or(20);

    let fields = params.get("fields").map(String::as_str);
    let page: Vec<Value> = matched
        .iter()
        .skip(offset)
        .take(max)
        .map(|item| item_json(item, fields))
        .collect();

    let mut out = json!({ "items": page, "total": total });
    if offset + max < total {
        out["nextPageToken"] = json!((offset + max).to_string());
    }
    Ok(Json(out))
}

/// Split a create/update payload into known fields and catalog extras.
fn split_fields(input: Value) -> (Option<String>, Option<String>, serde_json::Map<String, Value>) {
    let mut title = None;
    let mut parent_id = None;
    let mut extra = serde_json::Map::new();
    if let Value::Object(map) = input {
        for (key, value) in map {
            match key.as_str() {
                "title" => title = value.as_str().map(str::to_string),
                "parentId" => parent_id = value.as_str().map(str::to_string),
                "id" => {}
                _ => {
                    extra.insert(key, value);
                }
            }
        }
    }
    (title, parent_id, extra)
}

fn ancestors_of(catalog: &Catalog, parent_id: &str) -> Result<Vec<String>, ApiErr> {
    let parent = catalog
        .items
        .get(parent_id)
        .ok_or_else(|| err(StatusCode::BAD_REQUEST, "unknown parentId"))?;
    let mut ancestors = parent.ancestors.clone();
    ancestors.push(parent_id.to_string());
    Ok(ancestors)
}

async fn create_item(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiErr> {
    let mut catalog = db.write().await;
    require_session(&catalog, &headers)?;

    let (title, parent_id, extra) = split_fields(input);
    let parent_id = parent_id.unwrap_or_else(|| catalog.my_items_id.clone());
    let ancestors = ancestors_of(&catalog, &parent_id)?;

    let item = Item {
        id: new_id(),
        title: title.unwrap_or_default(),
        parent_id: Some(parent_id),
        ancestors,
        files: Vec::new(),
        facets: None,
        extra,
    };
    let body = item_json(&item, None);
    catalog.permissions.insert(item.id.clone(), owner_permissions());
    catalog.items.insert(item.id.clone(), item);
    Ok((StatusCode::CREATED, Json(body)))
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ApiErr> {
    let mut catalog = db.write().await;
    require_session(&catalog, &headers)?;
    if !catalog.items.contains_key(&id) {
        return Err(err(StatusCode::NOT_FOUND, "item not found"));
    }

    let (title, parent_id, extra) = split_fields(input);
    let ancestors = match &parent_id {
        Some(parent_id) => Some(ancestors_of(&catalog, parent_id)?),
        None => None,
    };

    let Some(item) = catalog.items.get_mut(&id) else {
        return Err(err(StatusCode::NOT_FOUND, "item not found"));
    };
    if let Some(title) = title {
        item.title = title;
    }
    if let (Some(parent_id), Some(ancestors)) = (parent_id, ancestors) {
        item.parent_id = Some(parent_id);
        item.ancestors = ancestors;
    }
    item.extra.extend(extra);
    Ok(Json(item_json(item, None)))
}

async fn delete_item(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiErr> {
    let mut catalog = db.write().await;
    require_session(&catalog, &headers)?;
    if catalog.items.remove(&id).is_none() {
        return Err(err(StatusCode::NOT_FOUND, "item not found"));
    }
    catalog.permissions.remove(&id);
    catalog
        .relationships
        .retain(|r| r.item_id != id && r.related_item_id != id);
    Ok(StatusCode::NO_CONTENT)
}

// --- file upload ---

#[derive(Deserialize)]
struct UploadParams {
    #[serde(default)]
    scrape: bool,
}

async fn upload_files(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiErr> {
    // read the whole body before taking the write lock
    let mut uploaded = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| err(StatusCode::BAD_REQUEST, &e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field
            .file_name()
            .ok_or_else(|| err(StatusCode::BAD_REQUEST, "file part without filename"))?
            .to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| err(StatusCode::BAD_REQUEST, &e.to_string()))?;
        uploaded.push(FileEntry {
            name,
            size: bytes.len() as u64,
            content_type,
        });
    }
    if uploaded.is_empty() {
        return Err(err(StatusCode::BAD_REQUEST, "no file parts in upload"));
    }

    let mut catalog = db.write().await;
    require_session(&catalog, &headers)?;
    let item = catalog
        .items
        .get_mut(&id)
        .ok_or_else(|| err(StatusCode::NOT_FOUND, "item not found"))?;

    if params.scrape {
        let facets = item.facets.get_or_insert_with(Vec::new);
        for entry in &uploaded {
            facets.push(json!({
                "className": "Extracted Metadata",
                "name": entry.name,
                "contentType": entry.content_type,
            }));
        }
    }
    item.files.extend(uploaded);
    Ok(Json(item_json(item, None)))
}

// --- permissions ---

async fn get_permissions(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Permissions>, ApiErr> {
    let catalog = db.read().await;
    require_session(&catalog, &headers)?;
    catalog
        .permissions
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| err(StatusCode::NOT_FOUND, "item not found"))
}

async fn set_permissions(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<Permissions>,
) -> Result<Json<Permissions>, ApiErr> {
    let mut catalog = db.write().await;
    require_session(&catalog, &headers)?;
    if !catalog.items.contains_key(&id) {
        return Err(err(StatusCode::NOT_FOUND, "item not found"));
    }
    catalog.permissions.insert(id, input.clone());
    Ok(Json(input))
}

// --- relationships ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRelationship {
    item_id: String,
    related_item_id: String,
    #[serde(default, rename = "type")]
    link_type: Option<String>,
}

async fn create_relationship(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateRelationship>,
) -> Result<(StatusCode, Json<Relationship>), ApiErr> {
    let mut catalog = db.write().await;
    require_session(&catalog, &headers)?;
    if !catalog.items.contains_key(&input.item_id)
        || !catalog.items.contains_key(&input.related_item_id)
    {
        return Err(err(StatusCode::BAD_REQUEST, "unknown item id"));
    }
    let relationship = Relationship {
        id: new_id(),
        item_id: input.item_id,
        related_item_id: input.related_item_id,
        link_type: input.link_type.unwrap_or_else(|| "related".to_string()),
    };
    catalog.relationships.push(relationship.clone());
    Ok((StatusCode::CREATED, Json(relationship)))
}
