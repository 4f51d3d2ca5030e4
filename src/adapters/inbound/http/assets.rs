use crate::app::App;
use crate::ports::outbound::asset_store::AssetError;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Serves a stored asset by its path under the strip prefix.
pub async fn fetch(State(app): State<App>, Path(asset): Path<String>) -> Response {
    let services = app.services().await;
    match services.assets.fetch(&asset).await {
        Ok(found) => (StatusCode::OK, [(CONTENT_TYPE, found.content_type)], found.bytes).into_response(),
        Err(AssetError::NotFound(_)) => StatusCode::NOT_FOUND.into_response(),
        Err(why) => {
            log::warn!("Failed to serve asset {asset} - {why}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
