use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const DEFAULT_TOKEN: &str = "testToken";
const DEFAULT_LIMIT: u32 = 25;
const MAX_LIMIT: u32 = 500;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StringRef {
    pub id: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    #[serde(skip)]
    pub project_id: u64,
    pub text: String,
    pub string_id: u64,
    pub string: StringRef,
    pub language_id: String,
    #[serde(rename = "type")]
    pub comment_type: String,
    pub issue_type: Option<String>,
    pub issue_status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    pub text: String,
    #[serde(rename = "type")]
    pub comment_type: String,
    pub target_language_id: String,
    pub string_id: u64,
    pub issue_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub string_id: Option<u64>,
    #[serde(rename = "type")]
    pub comment_type: Option<String>,
    pub target_language_id: Option<String>,
    pub issue_type: Option<String>,
    pub issue_status: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// One JSON-Patch operation as received on the wire.
#[derive(Deserialize)]
pub struct PatchOp {
    pub op: String,
    pub path: String,
    pub value: Option<Value>,
}

#[derive(Default, Clone)]
pub struct Store {
    comments: BTreeMap<u64, Comment>,
    next_id: u64,
}

impl Store {
    fn insert(&mut self, project_id: u64, input: CreateComment) -> Result<Comment, ApiError> {
        validate_create(&input)?;
        self.next_id += 1;
        let issue_status = (input.comment_type == "issue").then(|| "unresolved".to_string());
        let comment = Comment {
            id: self.next_id,
            project_id,
            text: input.text,
            string_id: input.string_id,
            string: StringRef { id: input.string_id },
            language_id: input.target_language_id,
            comment_type: input.comment_type,
            issue_type: input.issue_type,
            issue_status,
        };
        self.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    fn find(&self, project_id: u64, id: u64) -> Result<&Comment, ApiError> {
        self.comments
            .get(&id)
            .filter(|c| c.project_id == project_id)
            .ok_or_else(ApiError::comment_not_found)
    }

    fn find_mut(&mut self, project_id: u64, id: u64) -> Result<&mut Comment, ApiError> {
        self.comments
            .get_mut(&id)
            .filter(|c| c.project_id == project_id)
            .ok_or_else(ApiError::comment_not_found)
    }

    fn remove(&mut self, project_id: u64, id: u64) -> Result<Comment, ApiError> {
        self.find(project_id, id)?;
        self.comments.remove(&id).ok_or_else(ApiError::comment_not_found)
    }
}

#[derive(Clone)]
pub struct AppState {
    token: Arc<str>,
    db: Arc<RwLock<Store>>,
}

/// Error reply in the service's `{"error": ...}` / `{"errors": [...]}` shapes.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": { "code": status.as_u16(), "message": message } }),
        }
    }

    fn comment_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Comment Not Found")
    }

    fn validation(key: &str, code: &str, message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: json!({ "errors": [{ "error": {
                "key": key,
                "errors": [{ "code": code, "message": message }]
            } }] }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub fn app() -> Router {
    app_with_token(DEFAULT_TOKEN)
}

pub fn app_with_token(token: &str) -> Router {
    let state = AppState {
        token: Arc::from(token),
        db: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route(
            "/projects/{project_id}/comments",
            get(list_comments).post(add_comment).patch(batch_comments),
        )
        .route(
            "/projects/{project_id}/comments/{comment_id}",
            get(get_comment).patch(edit_comment).delete(delete_comment),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_token(token)).await
}

fn authorize(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let expected = format!("Bearer {}", state.token);
    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if provided == Some(expected.as_str()) {
        Ok(())
    } else {
        tracing::debug!("rejected request with missing or wrong bearer token");
        Err(ApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

fn validate_create(input: &CreateComment) -> ApiResult<()> {
    if input.text.trim().is_empty() {
        return Err(ApiError::validation("text", "isEmpty", "Value is required and can't be empty"));
    }
    match input.comment_type.as_str() {
        "comment" => Ok(()),
        "issue" if input.issue_type.is_none() => Err(ApiError::validation(
            "issueType",
            "isEmpty",
            "Value is required for issues",
        )),
        "issue" => Ok(()),
        _ => Err(ApiError::validation("type", "notInArray", "Unknown comment type")),
    }
}

fn apply_field(comment: &mut Comment, field: &str, value: Option<Value>) -> ApiResult<()> {
    match (field, value) {
        ("text", Some(Value::String(text))) if !text.trim().is_empty() => {
            comment.text = text;
            Ok(())
        }
        ("type", Some(Value::String(kind))) if kind == comment.comment_type => Ok(()),
        ("issueStatus", Some(Value::String(status)))
            if comment.comment_type == "issue" && (status == "resolved" || status == "unresolved") =>
        {
            comment.issue_status = Some(status);
            Ok(())
        }
        (field, _) => Err(ApiError::validation(
            field,
            "invalidValue",
            "Field cannot be changed to this value",
        )),
    }
}

fn item(comment: &Comment) -> Value {
    json!({ "data": comment })
}

async fn list_comments(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    authorize(&state, &headers)?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(ApiError::validation("limit", "notBetween", "Limit must be between 1 and 500"));
    }
    let offset = query.offset.unwrap_or(0);

    let store = state.db.read().await;
    let page: Vec<Value> = store
        .comments
        .values()
        .filter(|c| c.project_id == project_id)
        .filter(|c| query.string_id.is_none_or(|id| c.string_id == id))
        .filter(|c| query.comment_type.as_ref().is_none_or(|t| &c.comment_type == t))
        .filter(|c| query.target_language_id.as_ref().is_none_or(|l| &c.language_id == l))
        .filter(|c| query.issue_type.is_none() || c.issue_type == query.issue_type)
        .filter(|c| query.issue_status.is_none() || c.issue_status == query.issue_status)
        .skip(offset as usize)
        .take(limit as usize)
        .map(item)
        .collect();

    Ok(Json(json!({ "data": page, "pagination": { "offset": offset, "limit": limit } })))
}

async fn add_comment(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
    headers: HeaderMap,
    Json(input): Json<CreateComment>,
) -> ApiResult<Json<Value>> {
    authorize(&state, &headers)?;
    let comment = state.db.write().await.insert(project_id, input)?;
    tracing::debug!(project_id, id = comment.id, "created comment");
    Ok(Json(item(&comment)))
}

async fn get_comment(
    State(state): State<AppState>,
    Path((project_id, comment_id)): Path<(u64, u64)>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    authorize(&state, &headers)?;
    let store = state.db.read().await;
    let comment = store.find(project_id, comment_id)?;
    Ok(Json(item(comment)))
}

async fn delete_comment(
    State(state): State<AppState>,
    Path((project_id, comment_id)): Path<(u64, u64)>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers)?;
    state.db.write().await.remove(project_id, comment_id)?;
    tracing::debug!(project_id, id = comment_id, "deleted comment");
    Ok(StatusCode::OK)
}

async fn edit_comment(
    State(state): State<AppState>,
    Path((project_id, comment_id)): Path<(u64, u64)>,
    headers: HeaderMap,
    Json(ops): Json<Vec<PatchOp>>,
) -> ApiResult<Json<Value>> {
    authorize(&state, &headers)?;
    let mut store = state.db.write().await;
    let mut edited = store.find_mut(project_id, comment_id)?.clone();
    for op in ops {
        let field = op.path.strip_prefix('/').unwrap_or(&op.path);
        if op.op != "replace" {
            return Err(ApiError::validation("op", "notInArray", "Only replace is supported"));
        }
        apply_field(&mut edited, field, op.value)?;
    }
    *store.find_mut(project_id, comment_id)? = edited.clone();
    Ok(Json(item(&edited)))
}

/// Applies every operation to a copy of the store and commits only when
/// all of them succeed.
async fn batch_comments(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
    headers: HeaderMap,
    Json(ops): Json<Vec<PatchOp>>,
) -> ApiResult<Json<Value>> {
    authorize(&state, &headers)?;
    let mut store = state.db.write().await;
    let mut draft = store.clone();
    let mut affected = Vec::new();

    for op in ops {
        let segments: Vec<&str> = op.path.trim_start_matches('/').split('/').collect();
        match (op.op.as_str(), segments.as_slice()) {
            ("add", ["-"]) => {
                let value = op.value.unwrap_or(Value::Null);
                let input: CreateComment = serde_json::from_value(value).map_err(|e| {
                    ApiError::validation("value", "invalidPayload", &e.to_string())
                })?;
                affected.push(draft.insert(project_id, input)?);
            }
            ("replace", [id, field]) => {
                let id = parse_id(id)?;
                let comment = draft.find_mut(project_id, id)?;
                apply_field(comment, field, op.value)?;
                affected.push(comment.clone());
            }
            ("remove", [id]) => {
                let id = parse_id(id)?;
                draft.remove(project_id, id)?;
            }
            _ => {
                return Err(ApiError::validation("path", "invalidPath", "Unsupported batch operation"));
            }
        }
    }

    *store = draft;
    let data: Vec<Value> = affected.iter().map(item).collect();
    Ok(Json(json!({ "data": data })))
}

fn parse_id(segment: &str) -> ApiResult<u64> {
    segment
        .parse()
        .map_err(|_| ApiError::validation("path", "invalidPath", "Comment id must be numeric"))
}
