use crate::components::UploadsPanel;
use crate::AppState;
use askama::Template;
use axum::{extract::State, response::IntoResponse};

#[derive(Template)]
#[template(path = "pages/uploads.html")]
pub struct UploadsPageTemplate {
    pub panel: UploadsPanel,
}

pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let uploads = state.store.list();
    let panel = UploadsPanel::new(
        &uploads,
        state.store.is_uploading(),
        &state.store.busy_ids(),
    );

    UploadsPageTemplate { panel }
}

pub async fn health_check() -> &'static str {
    "OK"
}
