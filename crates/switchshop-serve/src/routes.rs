//! HTTP routes: listing, download and health.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::error;

use switchshop_core::LibraryFile;
use switchshop_index::LibraryIndex;

use crate::delivery::prepare_response;

/// Mount point for the listing and downloads.
pub const SHOP_PATH: &str = "/shop";

/// Characters kept verbatim in a single path segment (as `encodeURIComponent`).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub(crate) struct AppState {
    pub(crate) index: LibraryIndex,
}

/// One row of the JSON listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingEntry {
    #[serde(flatten)]
    pub file: LibraryFile,
    /// Size in binary units, e.g. `1.5 GiB`.
    pub size_label: String,
    /// Download URL for this file.
    pub href: String,
}

impl From<LibraryFile> for ListingEntry {
    fn from(file: LibraryFile) -> Self {
        Self {
            size_label: format_size(file.size),
            href: download_href(&file.name),
            file,
        }
    }
}

/// Format size in human-readable form.
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Download URL for a file name.
pub fn download_href(name: &str) -> String {
    format!("{SHOP_PATH}/{}", utf8_percent_encode(name, PATH_SEGMENT))
}

/// Build the application router for `index`.
pub fn router(index: LibraryIndex) -> Router {
    let state = Arc::new(AppState { index });

    Router::new()
        .route("/health", get(health))
        .route(SHOP_PATH, get(list_library))
        .route("/shop/:name", get(download).head(download_headers))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "ok"
}

async fn list_library(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ListingEntry>>, (StatusCode, &'static str)> {
    match state.index.try_scan().await {
        Ok(files) => Ok(Json(files.into_iter().map(ListingEntry::from).collect())),
        Err(err) => {
            error!("Error handling {SHOP_PATH} request: {err}");
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"))
        }
    }
}

async fn download(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    prepare_response(&state.index, &name, true).await
}

async fn download_headers(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    prepare_response(&state.index, &name, false).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_href_encodes_segment() {
        assert_eq!(
            download_href("[B] Abz\u{fb} [0100C1300BBC6000][v0-0].nsp"),
            "/shop/%5BB%5D%20Abz%C3%BB%20%5B0100C1300BBC6000%5D%5Bv0-0%5D.nsp"
        );
        assert_eq!(download_href("a/b?.nsp"), "/shop/a%2Fb%3F.nsp");
    }

    #[test]
    fn test_listing_entry_from_file() {
        let file = LibraryFile::new("/lib", "Game", "game.nsp", 1536);
        let entry = ListingEntry::from(file);
        assert!(entry.size_label.starts_with("1.5"));
        assert!(entry.size_label.ends_with("KiB"));
        assert_eq!(entry.href, "/shop/game.nsp");
    }
}
