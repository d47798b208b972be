//! SLD encode and parse handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use thiserror::Error;
use tracing::{info, instrument, warn};

use sld_common::{SldError, StyleRequest};
use sld_protocol::{error_report, parse_sld};

use crate::state::AppState;

/// Media type of SLD documents.
pub const SLD_CONTENT_TYPE: &str = "application/vnd.ogc.sld+xml";

/// Error returned by a handler, rendered as an OGC exception report.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub SldError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(header::CONTENT_TYPE, "application/vnd.ogc.se_xml")],
            error_report(&self.0),
        )
            .into_response()
    }
}

fn body_text(body: &Bytes) -> Result<&str, SldError> {
    std::str::from_utf8(body).map_err(|e| SldError::InvalidParameter {
        param: "body".to_string(),
        message: e.to_string(),
    })
}

/// POST /sld - Encode a JSON style request as an SLD document
#[instrument(skip_all)]
pub async fn encode_handler(Extension(state): Extension<Arc<AppState>>, body: Bytes) -> Response {
    counter!("sld_encode_requests_total").increment(1);

    let result = body_text(&body)
        .and_then(StyleRequest::from_json)
        .and_then(|request| {
            let xml = state.encoder().encode_request(&request)?;
            info!(
                layer = %request.layer.name,
                style_type = %request.style_type,
                bytes = xml.len(),
                "Encoded style"
            );
            Ok(xml)
        });

    match result {
        Ok(xml) => (StatusCode::OK, [(header::CONTENT_TYPE, SLD_CONTENT_TYPE)], xml).into_response(),
        Err(e) => {
            counter!("sld_encode_errors_total").increment(1);
            warn!(error = %e, "Style encoding failed");
            ApiError(e).into_response()
        }
    }
}

/// POST /sld/parse - Read an SLD document and return its tree as JSON
#[instrument(skip_all)]
pub async fn parse_handler(body: Bytes) -> Response {
    counter!("sld_parse_requests_total").increment(1);

    match body_text(&body).and_then(parse_sld) {
        Ok(document) => Json(document).into_response(),
        Err(e) => {
            counter!("sld_parse_errors_total").increment(1);
            warn!(error = %e, "SLD parsing failed");
            ApiError(e).into_response()
        }
    }
}
