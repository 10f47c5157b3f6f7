use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::{error, info, warn};

use crate::ax_state::AppState;
use crate::infra::utils::resolve_in_folder;

/// 以附件形式下发结果目录中的文件，文件内容流式读取
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    request: Request,
) -> Response {
    let file_path = match resolve_in_folder(&state.results_folder, &filename) {
        Some(p) => p,
        None => {
            warn!("拒绝非法下载路径: {}", filename);
            return (StatusCode::BAD_REQUEST, format!("Invalid file name: {}", filename)).into_response();
        }
    };

    match tokio::fs::metadata(&file_path).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => {
            error!("不是普通文件: {}", file_path.display());
            return (StatusCode::NOT_FOUND, format!("File not found: {}", filename)).into_response();
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error!("文件不存在: {}", file_path.display());
            return (StatusCode::NOT_FOUND, format!("File not found: {}", filename)).into_response();
        }
        Err(e) => {
            error!("读取文件失败: {} ({})", file_path.display(), e);
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    }

    info!("下发文件: {}", file_path.display());
    let mut response = ServeFile::new(&file_path)
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {})
        .map(Body::new);

    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', ""));
    let disposition = HeaderValue::from_bytes(disposition.as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    response
        .headers_mut()
        .insert(header::CONTENT_DISPOSITION, disposition);
    response
}
