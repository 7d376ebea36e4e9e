use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Query},
    routing::{get, post},
    Json, Router,
};
use pdf::ExtractOptions;
use pdflayers_core::layers::{LayerReport, Precision};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::prelude::*;

/// Build the service router. `max_upload_bytes` caps request bodies.
pub fn router(max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/extract-layers", post(extract_layers))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "PDF Layer Extraction API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "pdf-layer-extractor" }))
}

#[derive(Debug, Deserialize)]
struct ExtractParams {
    precision: Option<String>,
}

struct Upload {
    filename: String,
    bytes: Bytes,
}

async fn extract_layers(
    Query(params): Query<ExtractParams>,
    multipart: Multipart,
) -> Result<Json<LayerReport>, ApiError> {
    let options = ExtractOptions {
        precision: parse_precision(params.precision.as_deref())?,
    };

    let upload = read_upload(multipart).await?;
    if !upload.filename.to_lowercase().ends_with(".pdf") {
        return Err(ApiError::NotPdf);
    }
    // Checked before anything tries to open the document.
    if upload.bytes.is_empty() {
        return Err(ApiError::EmptyUpload);
    }

    log::info!(
        "Extracting layers from '{}' ({} bytes)",
        upload.filename,
        upload.bytes.len()
    );

    let Upload { filename, bytes } = upload;
    let report = tokio::task::spawn_blocking(move || pdf::extract_layers(&bytes, &options))
        .await
        .map_err(|e| ApiError::Internal(f!("Task join error: {e}")))??;

    Ok(Json(report.with_filename(filename)))
}

fn parse_precision(raw: Option<&str>) -> Result<Option<Precision>, ApiError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value: u8 = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::InvalidPrecision(f!("'{raw}' is not an integer between 0 and 3")))?;
    Precision::try_from(value)
        .map(Some)
        .map_err(|e| ApiError::InvalidPrecision(e.to_string()))
}

/// The field named `file`, or else the first field that carries a filename.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut fallback = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Multipart(e.to_string()))?
    {
        let is_file = field.name() == Some("file");
        let filename = field.file_name().map(str::to_string);
        if !is_file && (filename.is_none() || fallback.is_some()) {
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Multipart(e.to_string()))?;
        let upload = Upload {
            filename: filename.unwrap_or_default(),
            bytes,
        };
        if is_file {
            return Ok(upload);
        }
        fallback = Some(upload);
    }

    fallback.ok_or(ApiError::MissingFile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use pdf::fixtures::PdfFixture;
    use tower::ServiceExt;

    const BOUNDARY: &str = "pdflayers-boundary";

    fn app() -> Router {
        router(10 * 1024 * 1024)
    }

    fn multipart_body(field: &str, filename: Option<&str>, bytes: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let disposition = match filename {
            Some(name) => format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\n"),
            None => format!("Content-Disposition: form-data; name=\"{field}\"\r\n"),
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method("POST")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn layered_pdf() -> Vec<u8> {
        let marked = "/OC /oc1 BDC 0 0 m 100 0 l S EMC";
        let mut fixture = PdfFixture::new();
        let dims = fixture.ocg("Dimensions");
        fixture.page(marked, &[("oc1", dims)]);
        fixture.page("0 0 m 50 50 l S", &[]);
        fixture.page(marked, &[("oc1", dims)]);
        fixture.to_bytes().unwrap()
    }

    #[tokio::test]
    async fn test_root_banner() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, json) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "PDF Layer Extraction API is running");
        assert!(json["version"].is_string());
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "pdf-layer-extractor");
    }

    #[tokio::test]
    async fn test_extract_layers() {
        let body = multipart_body("file", Some("plan.pdf"), &layered_pdf());
        let (status, json) = send(upload_request("/extract-layers", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["filename"], "plan.pdf");
        assert_eq!(json["has_layers"], true);
        assert_eq!(json["layer_count"], 1);
        assert_eq!(json["total_pages"], 3);
        assert_eq!(json["layers"][0]["name"], "Dimensions");
        assert_eq!(json["layers"][0]["vectors"]["page_1"][0]["type"], "line");
        assert_eq!(json["pages_with_layers"][0]["page_number"], 1);
        assert_eq!(json["pages_with_layers"][1]["page_number"], 3);
        assert_eq!(json["layer_usage_analysis"]["pages_without_layers"], 1);
    }

    #[tokio::test]
    async fn test_extension_check_ignores_case() {
        let body = multipart_body("file", Some("PLAN.PDF"), &layered_pdf());
        let (status, _) = send(upload_request("/extract-layers", body)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_falls_back_to_first_named_file() {
        let body = multipart_body("upload", Some("plan.pdf"), &layered_pdf());
        let (status, json) = send(upload_request("/extract-layers", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["filename"], "plan.pdf");
    }

    #[tokio::test]
    async fn test_rejects_non_pdf_filename() {
        let body = multipart_body("file", Some("plan.dwg"), &layered_pdf());
        let (status, json) = send(upload_request("/extract-layers", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "not_pdf");
    }

    #[tokio::test]
    async fn test_rejects_empty_upload() {
        let body = multipart_body("file", Some("empty.pdf"), b"");
        let (status, json) = send(upload_request("/extract-layers", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "empty_upload");
    }

    #[tokio::test]
    async fn test_rejects_invalid_pdf() {
        let body = multipart_body("file", Some("broken.pdf"), b"this is not a pdf");
        let (status, json) = send(upload_request("/extract-layers", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "invalid_pdf");
        assert!(json["message"].as_str().unwrap().starts_with("Invalid PDF"));
    }

    #[tokio::test]
    async fn test_missing_file_field() {
        let body = multipart_body("note", None, b"hello");
        let (status, json) = send(upload_request("/extract-layers", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "missing_file");
    }

    #[tokio::test]
    async fn test_precision_query() {
        let body = multipart_body("file", Some("plan.pdf"), &layered_pdf());
        let (status, _) = send(upload_request("/extract-layers?precision=2", body)).await;
        assert_eq!(status, StatusCode::OK);

        let body = multipart_body("file", Some("plan.pdf"), &layered_pdf());
        let (status, json) = send(upload_request("/extract-layers?precision=7", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "invalid_precision");
    }

    #[test]
    fn test_parse_precision() {
        assert_eq!(parse_precision(None).unwrap(), None);
        assert_eq!(
            parse_precision(Some("3")).unwrap(),
            Some(Precision::try_from(3).unwrap())
        );
        assert!(matches!(
            parse_precision(Some("-1")),
            Err(ApiError::InvalidPrecision(_))
        ));
        assert!(matches!(
            parse_precision(Some("4")),
            Err(ApiError::InvalidPrecision(_))
        ));
    }
}
