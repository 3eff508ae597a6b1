//! The single-page UI.

use axum::{extract::State, response::Html};

use crate::state::SharedState;

/// Page shell; the script inside talks to the JSON API.
pub const INDEX_HTML: &str = include_str!("../../templates/index.html");

pub async fn index(State(state): State<SharedState>) -> Html<String> {
    Html(render_index(&state.inspire_base_url))
}

fn render_index(inspire_base: &str) -> String {
    INDEX_HTML
        .replace("{{inspire_base}}", inspire_base.trim_end_matches('/'))
        .replace("{{version}}", env!("CARGO_PKG_VERSION"))
}
