//! Extension to MIME type mapping for downloads.

use crate::file::extension_of;

/// Fallback for unknown or missing extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Known extensions (lowercase, with dot) and their content types.
const CONTENT_TYPES: &[(&str, &str)] = &[
    (".bin", OCTET_STREAM),
    (".txt", "text/plain"),
    (".html", "text/html"),
    (".css", "text/css"),
    (".js", "application/javascript"),
    (".json", "application/json"),
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".gif", "image/gif"),
    (".svg", "image/svg+xml"),
    (".pdf", "application/pdf"),
    (".zip", "application/zip"),
    (".mp3", "audio/mpeg"),
    (".mp4", "video/mp4"),
    // Nintendo Switch package
    (".nsp", OCTET_STREAM),
];

/// Content type for a file name, matched case-insensitively on its extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    let Some(ext) = extension_of(file_name) else {
        return OCTET_STREAM;
    };

    CONTENT_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(OCTET_STREAM)
}
