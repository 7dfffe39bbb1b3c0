use std::sync::Arc;

use axum::{extract::State, response::Html};

use super::{AppState, ABOUT_TEMPLATE};
use crate::template::TemplateContext;
use crate::web::error::ApiError;

/// GET /about
pub async fn about(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let context = TemplateContext::new()
        .with("version", env!("CARGO_PKG_VERSION"))
        .with("owner_suffix", state.owner_suffix.as_str())
        .with("max_depth", i64::from(state.max_depth));
    state.render(ABOUT_TEMPLATE, &context)
}
