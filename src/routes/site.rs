/**
 * Public Site Routes
 * Server-rendered portfolio page and its JSON view model
 */
use axum::{extract::State, response::Html, Json};

use crate::carousel::Carousel;
use crate::site::{self, render, SiteView};
use crate::viewer::ViewerSnapshot;
use crate::AppState;

/// Width assumed for the first paint, before the browser reports its own
const INITIAL_VIEWPORT_PX: u32 = 1280;

async fn build_view(state: &AppState) -> SiteView {
    let backend = state.backend.as_ref();
    let data = site::load_site_data(backend).await;
    SiteView::build(&data, &site::public_url_fn(backend))
}

/// GET /
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let view = build_view(&state).await;
    let carousel = Carousel::with_items(
        INITIAL_VIEWPORT_PX,
        view.videos.clone(),
        view.images.clone(),
    );
    let snapshot = ViewerSnapshot::of(None, &carousel, None);
    let period_ms = u64::try_from(state.config.auto_advance.as_millis()).unwrap_or(u64::MAX);

    Html(render::page(&view, &snapshot, period_ms).into_string())
}

/// GET /api/site
pub async fn site_data(State(state): State<AppState>) -> Json<SiteView> {
    Json(build_view(&state).await)
}
