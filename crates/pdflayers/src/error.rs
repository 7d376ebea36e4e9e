use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures of the HTTP surface, each mapped to a status and a JSON body
/// `{ "error": <kind>, "message": <description> }`.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Only PDF files are accepted")]
    NotPdf,

    #[error("The uploaded file is empty")]
    EmptyUpload,

    #[error("No file was uploaded")]
    MissingFile,

    #[error("Invalid PDF file: {0}")]
    InvalidPdf(String),

    #[error("Invalid precision: {0}")]
    InvalidPrecision(String),

    #[error("Malformed multipart body: {0}")]
    Multipart(String),

    #[error("Error processing PDF: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotPdf => "not_pdf",
            ApiError::EmptyUpload => "empty_upload",
            ApiError::MissingFile => "missing_file",
            ApiError::InvalidPdf(_) => "invalid_pdf",
            ApiError::InvalidPrecision(_) => "invalid_precision",
            ApiError::Multipart(_) => "multipart",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl From<pdf::PdfError> for ApiError {
    fn from(err: pdf::PdfError) -> Self {
        if err.is_input_error() {
            ApiError::InvalidPdf(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::debug!("Rejected request: {}", self);
        }
        let body = json!({ "error": self.kind(), "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_errors_map_by_class() {
        let parse = ApiError::from(pdf::PdfError::Parse("bad header".into()));
        assert!(matches!(parse, ApiError::InvalidPdf(_)));
        assert_eq!(parse.status(), StatusCode::BAD_REQUEST);

        let encrypted = ApiError::from(pdf::PdfError::Encrypted);
        assert_eq!(encrypted.kind(), "invalid_pdf");

        let missing = ApiError::from(pdf::PdfError::NotFound("3 0 R".into()));
        assert!(matches!(missing, ApiError::Internal(_)));
        assert_eq!(missing.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_client_errors_are_bad_request() {
        for err in [
            ApiError::NotPdf,
            ApiError::EmptyUpload,
            ApiError::MissingFile,
            ApiError::InvalidPrecision("7".into()),
            ApiError::Multipart("eof".into()),
        ] {
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }
}
