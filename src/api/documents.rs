//! Document endpoints

use axum::{
    body::Body,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Request, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::debug;

use super::state::AppState;
use super::types::{
    ApiError, ApiErrorType, BatchUploadItem, BatchUploadResponse, DeleteResponse, DocumentDetail,
    DocumentIdPath, DocumentListResponse, UploadResponse,
};
use crate::domain::ingestion::ConvertMode;
use crate::infrastructure::services::UploadRequest;

/// Multipart field carrying a single file
pub const SINGLE_FILE_FIELD: &str = "file";

/// Multipart field carrying one of several files
pub const MULTI_FILE_FIELD: &str = "files";

/// GET /
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Document backend is running" }))
}

/// GET /documents
pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<DocumentListResponse>, ApiError> {
    debug!("Listing documents");

    let records = state.document_service.list().await?;
    Ok(Json(DocumentListResponse::new(&records)))
}

/// GET /documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    DocumentIdPath(id): DocumentIdPath,
) -> Result<Json<DocumentDetail>, ApiError> {
    debug!(id = %id, "Getting document");

    let record = state.document_service.get(id).await?;
    Ok(Json(DocumentDetail::from(&record)))
}

/// POST /documents/upload
pub async fn upload_documents(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    handle_upload(state, multipart, ConvertMode::Auto).await
}

/// POST /documents/upload-and-convert
///
/// Presentations must go through the configured conversion backend.
pub async fn upload_and_convert(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    handle_upload(state, multipart, ConvertMode::Force).await
}

/// GET /documents/{id}/pdf
pub async fn download_pdf(
    State(state): State<AppState>,
    DocumentIdPath(id): DocumentIdPath,
    request: Request,
) -> Result<Response, ApiError> {
    let record = state.document_service.pdf(id).await?;

    let response = ServeFile::new(record.pdf_path())
        .oneshot(request)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to read PDF: {}", e)))?;

    if response.status() == StatusCode::NOT_FOUND {
        return Err(ApiError::not_found("PDF not found"));
    }

    let mut response = response.map(Body::new);
    if let Ok(value) = HeaderValue::from_str(&content_disposition(record.original_file_name())) {
        response.headers_mut().insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}

/// DELETE /documents/{id}
pub async fn delete_document(
    State(state): State<AppState>,
    DocumentIdPath(id): DocumentIdPath,
) -> Result<Json<DeleteResponse>, ApiError> {
    debug!(id = %id, "Deleting document");

    let record = state.document_service.delete(id).await?;

    Ok(Json(DeleteResponse {
        success: true,
        id: record.id().value(),
    }))
}

async fn handle_upload(
    state: AppState,
    multipart: Result<Multipart, MultipartRejection>,
    mode: ConvertMode,
) -> Result<Response, ApiError> {
    let multipart =
        multipart.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let received = read_uploads(multipart).await?;

    debug!(
        single = received.single.len(),
        multiple = received.multiple.len(),
        ?mode,
        "Received upload"
    );

    if received.multiple.is_empty() && received.single.len() <= 1 {
        let upload = received
            .single
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

        let record = state.document_service.ingest(upload, mode).await?;
        return Ok((StatusCode::CREATED, Json(UploadResponse::new(&record))).into_response());
    }

    let uploads = received
        .single
        .into_iter()
        .chain(received.multiple)
        .collect();

    let results = state
        .document_service
        .ingest_batch(uploads, mode)
        .await?
        .into_iter()
        .map(|item| match item.result {
            Ok(record) => BatchUploadItem::succeeded(&record),
            Err(e) => BatchUploadItem::failed(item.original_file_name, e.to_string()),
        })
        .collect();

    Ok((StatusCode::CREATED, Json(BatchUploadResponse::new(results))).into_response())
}

#[derive(Debug, Default)]
struct ReceivedUploads {
    single: Vec<UploadRequest>,
    multiple: Vec<UploadRequest>,
}

async fn read_uploads(mut multipart: Multipart) -> Result<ReceivedUploads, ApiError> {
    let mut received = ReceivedUploads::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();
        let Some(file_name) = field.file_name().map(str::to_string) else {
            debug!(field = %field_name, "Ignoring non-file field");
            continue;
        };
        let content_type = field.content_type().map(str::to_string);

        let target = match field_name.as_str() {
            SINGLE_FILE_FIELD => &mut received.single,
            MULTI_FILE_FIELD => &mut received.multiple,
            other => {
                debug!(field = %other, "Ignoring unexpected file field");
                continue;
            }
        };

        let bytes = field.bytes().await.map_err(multipart_error)?;

        // Browsers send an empty part for an untouched file input
        if file_name.is_empty() && bytes.is_empty() {
            continue;
        }

        let mut upload = UploadRequest::new(file_name, bytes);
        if let Some(content_type) = content_type {
            upload = upload.with_content_type(content_type);
        }
        target.push(upload);
    }

    Ok(received)
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::new(err.status(), ApiErrorType::InvalidRequestError, err.body_text())
}

/// `inline` disposition naming the PDF after the original upload, with an
/// ASCII fallback and an RFC 5987 UTF-8 name.
fn content_disposition(original_file_name: &str) -> String {
    let stem = std::path::Path::new(original_file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("document");
    let file_name = format!("{}.pdf", stem);

    let fallback: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let encoded: String = file_name
        .bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&b) {
                (b as char).to_string()
            } else {
                format!("%{:02X}", b)
            }
        })
        .collect();

    format!("inline; filename=\"{}\"; filename*=UTF-8''{}", fallback, encoded)
}
