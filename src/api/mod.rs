pub mod download;
pub mod forms;

use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::download::download_file;
use crate::api::forms::{
    add_constraint, create_form, decode_constraints, delete_form, edit_constraint, form_markup,
    get_form, remove_constraint,
};
use crate::ax_state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/api/forms", post(create_form))
        .route("/api/forms/{id}", get(get_form).delete(delete_form))
        .route("/api/forms/{id}/markup", get(form_markup))
        .route("/api/forms/{id}/constraints", post(add_constraint))
        .route(
            "/api/forms/{id}/constraints/{row_id}",
            patch(edit_constraint).delete(remove_constraint),
        )
        .route("/api/constraints/decode", post(decode_constraints))
        .route("/download/{filename}", get(download_file))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
