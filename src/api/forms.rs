use crate::ax_state::AppState;
use crate::core::manager::{prepare_row, ConstraintRowManager};
use crate::core::render::render_form;
use crate::core::submission::decode_submission;
use crate::error::{AddConstraintError, EditError};
use crate::models::form::{AddConstraintRequest, EditConstraintRequest, FormCreated, FormView};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

// --- 1. 表单会话 ---

/// 新建一张空表单，对应浏览器中一个空的 `#constraints` 容器
pub async fn create_form(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let id = Uuid::new_v4();
    state.forms.insert(id, ConstraintRowManager::new(state.policy));
    info!("新建表单会话: id={}", id);
    (StatusCode::CREATED, Json(FormCreated { id }))
}

pub async fn get_form(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    match state.forms.get(&id) {
        Some(form) => Json(FormView {
            id,
            rows: form.rows().to_vec(),
        })
        .into_response(),
        None => form_not_found(id),
    }
}

pub async fn delete_form(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    match state.forms.remove(&id) {
        Some(_) => {
            info!("关闭表单会话: id={}", id);
            StatusCode::NO_CONTENT.into_response()
        }
        None => form_not_found(id),
    }
}

#[derive(Debug, Deserialize)]
pub struct MarkupQuery {
    pub file_path: Option<String>,
}

/// 渲染当前表单的约束容器 HTML
pub async fn form_markup(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(q): Query<MarkupQuery>,
) -> Response {
    match state.forms.get(&id) {
        Some(form) => Html(render_form(q.file_path.as_deref(), form.rows())).into_response(),
        None => form_not_found(id),
    }
}

// --- 2. 约束行增删改 ---

/// 新增约束行
/// 处理流程：校验文件路径 -> 解析列名 (不持有会话锁) -> 追加到表单末尾
/// 请求体可省略，等同于未提供文件路径
pub async fn add_constraint(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Option<Json<AddConstraintRequest>>,
) -> Response {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    if !state.forms.contains_key(&id) {
        return form_not_found(id);
    }

    let row = match prepare_row(state.columns.as_ref(), state.policy, payload.file_path.as_deref()).await {
        Ok(row) => row,
        Err(e) => return add_error_response(e),
    };

    // 等待期间表单可能已被关闭
    match state.forms.get_mut(&id) {
        Some(mut form) => {
            let row = form.append(row).clone();
            (StatusCode::CREATED, Json(row)).into_response()
        }
        None => form_not_found(id),
    }
}

pub async fn edit_constraint(
    State(state): State<Arc<AppState>>,
    Path((id, row_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<EditConstraintRequest>,
) -> Response {
    let mut form = match state.forms.get_mut(&id) {
        Some(form) => form,
        None => return form_not_found(id),
    };
    match form.edit(row_id, payload) {
        Ok(row) => Json(row.clone()).into_response(),
        Err(e @ EditError::RowNotFound(_)) => {
            (StatusCode::NOT_FOUND, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(e) => {
            warn!("拒绝约束行编辑: {}", e);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// 移除约束行，重复移除同一行不报错
pub async fn remove_constraint(
    State(state): State<Arc<AppState>>,
    Path((id, row_id)): Path<(Uuid, Uuid)>,
) -> Response {
    match state.forms.get_mut(&id) {
        Some(mut form) => {
            let removed = form.remove(row_id);
            Json(json!({ "removed": removed, "remaining": form.len() })).into_response()
        }
        None => form_not_found(id),
    }
}

// --- 3. 表单提交解码 ---

pub async fn decode_constraints(body: Bytes) -> Response {
    match decode_submission(&body) {
        Ok(constraints) => Json(constraints).into_response(),
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

fn add_error_response(e: AddConstraintError) -> Response {
    if e.is_user_facing() {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "notification": e.to_string() })),
        )
            .into_response()
    } else {
        // 传输失败只进诊断日志，不弹窗
        error!("获取列名失败: {}", e);
        (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": "Error fetching columns" })),
        )
            .into_response()
    }
}

fn form_not_found(id: Uuid) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("Form not found: {}", id) })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use crate::api::router;
    use crate::ax_state::AppState;
    use crate::core::columns::{ColumnSource, ResolvedColumns, StaticColumns};
    use crate::core::manager::AddPolicy;
    use crate::error::ColumnSourceError;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct Remote {
        columns: Option<Vec<&'static str>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ColumnSource for Remote {
        async fn resolve(&self, _file_path: Option<&str>) -> Result<ResolvedColumns, ColumnSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.columns {
                Some(c) => Ok(ResolvedColumns {
                    columns: c.iter().map(|s| s.to_string()).collect(),
                    placeholder: false,
                }),
                None => Err(ColumnSourceError::Request("connection refused".into())),
            }
        }
    }

    fn state_with(columns: Arc<dyn ColumnSource>, require_file_path: bool) -> Arc<AppState> {
        Arc::new(AppState::new(
            columns,
            AddPolicy { require_file_path },
            PathBuf::from("results"),
        ))
    }

    fn remote(columns: Option<Vec<&'static str>>) -> Arc<Remote> {
        Arc::new(Remote {
            columns,
            calls: AtomicUsize::new(0),
        })
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, value)
    }

    async fn new_form(app: &Router) -> String {
        let (status, body) = send(app, Method::POST, "/api/forms", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn add_twice_remove_first_over_http() {
        let app = router(state_with(remote(Some(vec!["age", "name"])), true));
        let form = new_form(&app).await;
        let add = format!("/api/forms/{}/constraints", form);

        let (s1, r1) = send(&app, Method::POST, &add, Some(json!({ "file_path": "data.csv" }))).await;
        let (s2, r2) = send(&app, Method::POST, &add, Some(json!({ "file_path": "data.csv" }))).await;
        assert_eq!(s1, StatusCode::CREATED);
        assert_eq!(s2, StatusCode::CREATED);
        assert_eq!(r1["options"], json!(["age", "name"]));
        assert_ne!(r1["id"], r2["id"]);

        let first = r1["id"].as_str().unwrap();
        let (status, body) = send(
            &app,
            Method::DELETE,
            &format!("/api/forms/{}/constraints/{}", form, first),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "removed": true, "remaining": 1 }));

        let (_, again) = send(
            &app,
            Method::DELETE,
            &format!("/api/forms/{}/constraints/{}", form, first),
            None,
        )
        .await;
        assert_eq!(again, json!({ "removed": false, "remaining": 1 }));

        let (_, view) = send(&app, Method::GET, &format!("/api/forms/{}", form), None).await;
        let rows = view["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], r2["id"]);
    }

    #[tokio::test]
    async fn missing_file_path_is_a_notification_without_request() {
        let columns = remote(Some(vec!["age"]));
        let app = router(state_with(columns.clone(), true));
        let form = new_form(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/forms/{}/constraints", form),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["notification"], "Please upload a file first!");
        assert_eq!(columns.calls.load(Ordering::SeqCst), 0);

        let (_, view) = send(&app, Method::GET, &format!("/api/forms/{}", form), None).await;
        assert!(view["rows"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bodyless_add_is_a_notification_without_request() {
        let columns = remote(Some(vec!["age"]));
        let app = router(state_with(columns.clone(), true));
        let form = new_form(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/forms/{}/constraints", form),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["notification"], "Please upload a file first!");
        assert_eq!(columns.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn bodyless_add_fetches_when_ungated() {
        let columns = remote(Some(vec!["age", "name"]));
        let app = router(state_with(columns.clone(), false));
        let form = new_form(&app).await;

        let (status, row) = send(
            &app,
            Method::POST,
            &format!("/api/forms/{}/constraints", form),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(row["options"], json!(["age", "name"]));
        assert_eq!(columns.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_columns_is_a_notification() {
        let app = router(state_with(remote(Some(vec![])), true));
        let form = new_form(&app).await;
        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/forms/{}/constraints", form),
            Some(json!({ "file_path": "data.csv" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["notification"], "No columns available for this dataset!");
    }

    #[tokio::test]
    async fn transport_failure_is_bad_gateway_without_notification() {
        let app = router(state_with(remote(None), false));
        let form = new_form(&app).await;
        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/forms/{}/constraints", form),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.get("notification").is_none());
    }

    #[tokio::test]
    async fn edit_and_render_markup() {
        let app = router(state_with(Arc::new(StaticColumns::new(["age", "name"])), false));
        let form = new_form(&app).await;
        let (_, row) = send(
            &app,
            Method::POST,
            &format!("/api/forms/{}/constraints", form),
            Some(json!({})),
        )
        .await;
        assert_eq!(row["column"], Value::Null);
        let row_id = row["id"].as_str().unwrap();
        let row_uri = format!("/api/forms/{}/constraints/{}", form, row_id);

        let (status, edited) = send(
            &app,
            Method::PATCH,
            &row_uri,
            Some(json!({ "column": "name", "operator": "!=", "value": "Bob" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(edited["column"], "name");
        assert_eq!(edited["operator"], "!=");

        let (status, _) = send(&app, Method::PATCH, &row_uri, Some(json!({ "column": "salary" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, html) = send(
            &app,
            Method::GET,
            &format!("/api/forms/{}/markup?file_path=data.csv", form),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let html = html.as_str().unwrap();
        assert!(html.contains(r#"<option value="name" selected>name</option>"#));
        assert!(html.contains(r#"<option value="!=" selected>!=</option>"#));
        assert!(html.contains(r#"value="Bob""#));
        assert!(html.contains(r#"name="file_path" value="data.csv""#));
    }

    #[tokio::test]
    async fn unknown_form_is_not_found() {
        let app = router(state_with(remote(Some(vec!["age"])), false));
        let ghost = uuid::Uuid::new_v4();
        let (status, _) = send(&app, Method::GET, &format!("/api/forms/{}", ghost), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/forms/{}/constraints", ghost),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let form = new_form(&app).await;
        let (status, _) = send(&app, Method::DELETE, &format!("/api/forms/{}", form), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::GET, &format!("/api/forms/{}", form), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn decode_endpoint_returns_triples() {
        let app = router(state_with(remote(Some(vec!["age"])), false));
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/constraints/decode")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(
                "constraint_column%5B%5D=age&constraint_operator%5B%5D=%3C&constraint_value%5B%5D=40",
            ))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!([{ "column": "age", "operator": "<", "value": "40" }]));
    }
}
