//! Turning a requested file name into a download response.
//!
//! Each request moves through `Resolving -> Classifying -> Measuring ->
//! Streaming` and ends in exactly one of: a 200 with headers (and a body for
//! `GET`), a 404, or a 500. Nothing is retried.

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

use switchshop_core::{ShopError, content_type_for};
use switchshop_index::LibraryIndex;

use crate::body::FileBody;
use crate::disposition;

const NOT_FOUND_MESSAGE: &str = "File not found";
const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Stage a delivery reached; used to label failures in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStage {
    Resolving,
    Classifying,
    Measuring,
    Streaming,
}

/// Body attached to a [`DeliveryResponse`].
#[derive(Debug)]
pub enum DeliveryBody {
    /// `HEAD` requests.
    Empty,
    /// Short plain-text message for error responses.
    Text(&'static str),
    /// The file itself, read lazily.
    File(FileBody),
}

/// Status, headers and optional body for one download request.
#[derive(Debug)]
pub struct DeliveryResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: DeliveryBody,
}

impl DeliveryResponse {
    fn text(status: StatusCode, message: &'static str, include_body: bool) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let body = if include_body {
            DeliveryBody::Text(message)
        } else {
            DeliveryBody::Empty
        };

        Self {
            status,
            headers,
            body,
        }
    }

    /// 404 with a short text body when `include_body` is set.
    pub fn not_found(include_body: bool) -> Self {
        Self::text(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE, include_body)
    }

    /// 500 with a generic text body when `include_body` is set.
    pub fn internal_error(include_body: bool) -> Self {
        Self::text(
            StatusCode::INTERNAL_SERVER_ERROR,
            INTERNAL_ERROR_MESSAGE,
            include_body,
        )
    }

    fn from_error(err: &ShopError, include_body: bool) -> Self {
        if err.is_not_found() {
            Self::not_found(include_body)
        } else {
            Self::internal_error(include_body)
        }
    }

    /// Value of a header as a string, if present and visible ASCII.
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl IntoResponse for DeliveryResponse {
    fn into_response(self) -> Response {
        let body = match self.body {
            DeliveryBody::Empty => Body::empty(),
            DeliveryBody::Text(message) => Body::from(message),
            DeliveryBody::File(file) => Body::from_stream(file),
        };

        (self.status, self.headers, body).into_response()
    }
}

/// Build the response for `requested_name`.
///
/// `requested_name` is the already percent-decoded path segment. With
/// `include_body == false` the headers are exactly those a body-bearing
/// request would get, minus the body. Every failure is mapped to a status
/// here; nothing escapes to the transport.
pub async fn prepare_response(
    index: &LibraryIndex,
    requested_name: &str,
    include_body: bool,
) -> DeliveryResponse {
    match deliver(index, requested_name, include_body).await {
        Ok(response) => response,
        Err((stage, err)) if err.is_not_found() => {
            debug!(name = requested_name, ?stage, "{err}");
            DeliveryResponse::from_error(&err, include_body)
        }
        Err((stage, err)) => {
            error!(?stage, "Error handling /shop/{requested_name} request: {err}");
            DeliveryResponse::from_error(&err, include_body)
        }
    }
}

async fn deliver(
    index: &LibraryIndex,
    requested_name: &str,
    include_body: bool,
) -> Result<DeliveryResponse, (DeliveryStage, ShopError)> {
    let file = index
        .resolve(requested_name)
        .await
        .map_err(|err| (DeliveryStage::Resolving, err))?
        .ok_or_else(|| {
            (
                DeliveryStage::Resolving,
                ShopError::NotFound {
                    name: requested_name.to_string(),
                },
            )
        })?;

    let content_type = content_type_for(requested_name);

    // Fresh stat: the indexed size may already be stale.
    let metadata = tokio::fs::metadata(&file.path)
        .await
        .map_err(|err| (DeliveryStage::Measuring, ShopError::io(&file.path, err)))?;
    if !metadata.is_file() {
        return Err((
            DeliveryStage::Measuring,
            ShopError::FileTransientlyMissing {
                path: file.path.clone(),
            },
        ));
    }
    let length = metadata.len();

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    headers.insert(header::CONTENT_DISPOSITION, disposition_header(requested_name));

    // Opened for HEAD too, so both methods agree on unreadable files.
    let handle = tokio::fs::File::open(&file.path)
        .await
        .map_err(|err| (DeliveryStage::Streaming, ShopError::io(&file.path, err)))?;
    let body = if include_body {
        let chunk_size = index.config().chunk_size;
        DeliveryBody::File(FileBody::new(handle, &file.path, length, chunk_size))
    } else {
        DeliveryBody::Empty
    };

    debug!(
        name = requested_name,
        path = %file.path.display(),
        length,
        include_body,
        "delivering file"
    );

    Ok(DeliveryResponse {
        status: StatusCode::OK,
        headers,
        body,
    })
}

/// `Content-Disposition` value for `name`.
///
/// Both parameters are percent-encoded to visible ASCII, so the value is
/// always a valid header.
fn disposition_header(name: &str) -> HeaderValue {
    let value = disposition::attachment(name);
    debug_assert!(value.bytes().all(|b| b == b' ' || b.is_ascii_graphic()));
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disposition_header_for_hostile_names() {
        let names = [
            "plain.nsp",
            "quote\"back\\slash.nsp",
            "ctrl\r\n\t\u{0}\u{7f}.nsp",
            "100% [v0] ;=,.nsp",
            "\u{65e5}\u{672c}\u{8a9e} Caf\u{e9}.nsp",
            "",
        ];

        for name in names {
            let value = disposition_header(name);
            let text = value.to_str().unwrap();
            assert!(text.starts_with("attachment; filename=\""), "{text}");
            assert!(text.contains("; filename*=UTF-8''"), "{text}");
        }
    }
}
