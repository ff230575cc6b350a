//! HTTP handlers for the pdfdesk API
//!
//! Each transform handler does the same dance: resolve the caller's owner
//! id, pull files and fields out of the multipart body, build the typed
//! operation request, and hand it to the pipeline on a blocking thread.

use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use pdfdesk_core::{pipeline, OperationRequest, PageSelector};
use pdfdesk_store::OwnerId;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::OperationResponse;
use crate::state::AppState;

/// Transport-level cap on documents per merge request.
const MAX_MERGE_FILES: usize = 10;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

pub async fn test() -> Json<Value> {
    Json(json!({ "message": "PDF routes are working correctly (local mode)!" }))
}

pub async fn merge(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<OperationResponse>, ApiError> {
    let owner = owner_from_headers(&headers)?;
    let form = UploadForm::read(multipart).await?;

    let documents = form.files_named("pdfs");
    if documents.len() > MAX_MERGE_FILES {
        return Err(ApiError::BadRequest(format!(
            "At most {MAX_MERGE_FILES} PDF files can be merged at once"
        )));
    }
    if documents.len() < 2 {
        return Err(ApiError::BadRequest(
            "At least 2 PDF files are required for merging".into(),
        ));
    }

    run(state, OperationRequest::Merge { documents }, owner).await
}

pub async fn split(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<OperationResponse>, ApiError> {
    let owner = owner_from_headers(&headers)?;
    let form = UploadForm::read(multipart).await?;

    let document = form.single_file("pdf")?;
    let start_page = form.require_u32("startPage")?;
    let end_page = form.require_u32("endPage")?;

    run(
        state,
        OperationRequest::Split {
            document,
            start_page,
            end_page,
        },
        owner,
    )
    .await
}

pub async fn rotate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<OperationResponse>, ApiError> {
    let owner = owner_from_headers(&headers)?;
    let form = UploadForm::read(multipart).await?;

    let document = form.single_file("pdf")?;
    let angle = form
        .text("angle")
        .ok_or_else(|| ApiError::BadRequest("Valid rotation angle (90, 180, 270) required".into()))?
        .trim()
        .parse::<i64>()
        .map_err(|_| ApiError::BadRequest("angle must be an integer".into()))?;
    let page_number = form.optional_u32("pageNumber")?;

    run(
        state,
        OperationRequest::Rotate {
            document,
            angle,
            page_number,
        },
        owner,
    )
    .await
}

pub async fn compress(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<OperationResponse>, ApiError> {
    let owner = owner_from_headers(&headers)?;
    let form = UploadForm::read(multipart).await?;
    let document = form.single_file("pdf")?;

    run(state, OperationRequest::Compress { document }, owner).await
}

pub async fn stamp_signature(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<OperationResponse>, ApiError> {
    let owner = owner_from_headers(&headers)?;
    let form = UploadForm::read(multipart).await?;

    let document = form.single_file("pdf")?;
    let image = decode_data_url(form.text("signatureDataUrl"))?;

    let page = form
        .text("page")
        .unwrap_or("last")
        .parse::<PageSelector>()
        .map_err(ApiError::BadRequest)?;
    let x = form.optional_f64("x")?.unwrap_or(50.0);
    let y = form.optional_f64("y")?.unwrap_or(50.0);
    let width = form.optional_f64("width")?.unwrap_or(180.0);

    run(
        state,
        OperationRequest::StampSignature {
            document,
            image,
            page,
            x,
            y,
            width,
        },
        owner,
    )
    .await
}

/// Run the pipeline on a blocking thread and shape the response.
async fn run(
    state: Arc<AppState>,
    request: OperationRequest,
    owner: OwnerId,
) -> Result<Json<OperationResponse>, ApiError> {
    let outcome =
        tokio::task::spawn_blocking(move || pipeline::execute(request, &owner, &state.store))
            .await
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("pipeline task failed: {e}")))??;

    tracing::info!(
        operation = outcome.label,
        file = %outcome.artifact.file_name,
        owner = %outcome.artifact.owner_id,
        original_size = outcome.original_size,
        result_size = outcome.result_size,
        "operation complete"
    );

    Ok(Json(OperationResponse::from_outcome(&outcome)))
}

/// Owner id from the upstream auth layer; absent header means the shared
/// anonymous namespace.
fn owner_from_headers(headers: &HeaderMap) -> Result<OwnerId, ApiError> {
    let principal = headers.get("x-owner-id").and_then(|v| v.to_str().ok());
    OwnerId::from_principal(principal).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Extract the raw image bytes from a `data:image/...;base64,` payload.
fn decode_data_url(data_url: Option<&str>) -> Result<Vec<u8>, ApiError> {
    let data_url = data_url.filter(|v| v.starts_with("data:image")).ok_or_else(|| {
        ApiError::BadRequest("signatureDataUrl (data:image/png;base64,...) is required".into())
    })?;
    let encoded = data_url
        .split_once(',')
        .map(|(_, rest)| rest)
        .ok_or_else(|| ApiError::BadRequest("signatureDataUrl has no base64 payload".into()))?;
    BASE64
        .decode(encoded)
        .map_err(|e| ApiError::BadRequest(format!("invalid base64 image payload: {e}")))
}

/// Files and text fields pulled out of one multipart body.
struct UploadForm {
    files: Vec<(String, Vec<u8>)>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut files = Vec::new();
        let mut fields = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if field.file_name().is_some() {
                if field.content_type() != Some("application/pdf") {
                    return Err(ApiError::BadRequest("Only PDF files are allowed".into()));
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;
                files.push((name, bytes.to_vec()));
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("failed to read field: {e}")))?;
                fields.insert(name, value);
            }
        }

        Ok(Self { files, fields })
    }

    fn files_named(&self, name: &str) -> Vec<Vec<u8>> {
        self.files
            .iter()
            .filter(|(field, _)| field == name)
            .map(|(_, bytes)| bytes.clone())
            .collect()
    }

    fn single_file(&self, name: &str) -> Result<Vec<u8>, ApiError> {
        self.files_named(name)
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::BadRequest("PDF file is required".into()))
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn require_u32(&self, name: &str) -> Result<u32, ApiError> {
        self.text(name)
            .ok_or_else(|| ApiError::BadRequest(format!("{name} is required")))?
            .trim()
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("{name} must be a positive integer")))
    }

    fn optional_u32(&self, name: &str) -> Result<Option<u32>, ApiError> {
        match self.text(name) {
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ApiError::BadRequest(format!("{name} must be a positive integer"))),
            None => Ok(None),
        }
    }

    fn optional_f64(&self, name: &str) -> Result<Option<f64>, ApiError> {
        match self.text(name) {
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ApiError::BadRequest(format!("{name} must be a number"))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use lopdf::{dictionary, Dictionary, Document, Object, Stream};
    use pdfdesk_store::ArtifactStore;
    use tower::ServiceExt;

    const BOUNDARY: &str = "pdfdesk-test-boundary";

    fn sample_pdf(num_pages: u32) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut page_ids = Vec::new();
        for page_num in 0..num_pages {
            let content = format!("BT /F1 12 Tf 50 700 Td (Page-{}) Tj ET", page_num + 1);
            let content_id = doc.add_object(Object::Stream(Stream::new(
                Dictionary::new(),
                content.into_bytes(),
            )));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
            });
            page_ids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => num_pages as i64,
                "Kids" => page_ids,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    /// `(name, Some(filename), bytes)` for files, `(name, None, value)` for
    /// text fields.
    fn multipart_body(parts: &[(&str, Option<&str>, Vec<u8>)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, bytes) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match filename {
                Some(filename) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn test_app() -> (tempfile::TempDir, axum::Router) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        let state = Arc::new(AppState { store });
        (dir, crate::app(state))
    }

    async fn post_multipart(
        app: axum::Router,
        uri: &str,
        parts: &[(&str, Option<&str>, Vec<u8>)],
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("x-owner-id", "user-1")
            .body(Body::from(multipart_body(parts)))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, app) = test_app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_merge_two_pdfs() {
        let (dir, app) = test_app();

        let (status, json) = post_multipart(
            app,
            "/api/pdfs/merge",
            &[
                ("pdfs", Some("a.pdf"), sample_pdf(2)),
                ("pdfs", Some("b.pdf"), sample_pdf(3)),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::OK, "body: {json}");
        assert_eq!(json["success"], true);
        let file_name = json["fileName"].as_str().unwrap();
        assert!(file_name.ends_with(".pdf"));
        assert!(json["downloadUrl"]
            .as_str()
            .unwrap()
            .starts_with("/uploads/user-1/"));

        let saved = dir.path().join("user-1").join(file_name);
        let doc = Document::load_mem(&std::fs::read(saved).unwrap()).unwrap();
        assert_eq!(doc.get_pages().len(), 5);
    }

    #[tokio::test]
    async fn test_merge_single_pdf_rejected() {
        let (_dir, app) = test_app();

        let (status, json) = post_multipart(
            app,
            "/api/pdfs/merge",
            &[("pdfs", Some("a.pdf"), sample_pdf(2))],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("At least 2"));
    }

    #[tokio::test]
    async fn test_split_missing_bounds_rejected() {
        let (_dir, app) = test_app();

        let (status, json) = post_multipart(
            app,
            "/api/pdfs/split",
            &[
                ("pdf", Some("a.pdf"), sample_pdf(5)),
                ("startPage", None, b"2".to_vec()),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("endPage"));
    }

    #[tokio::test]
    async fn test_split_happy_path() {
        let (_dir, app) = test_app();

        let (status, json) = post_multipart(
            app,
            "/api/pdfs/split",
            &[
                ("pdf", Some("a.pdf"), sample_pdf(5)),
                ("startPage", None, b"2".to_vec()),
                ("endPage", None, b"4".to_vec()),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::OK, "body: {json}");
        assert!(json["fileName"].as_str().unwrap().contains("split-2-4-"));
    }

    #[tokio::test]
    async fn test_rotate_invalid_angle_rejected() {
        let (_dir, app) = test_app();

        let (status, json) = post_multipart(
            app,
            "/api/pdfs/rotate",
            &[
                ("pdf", Some("a.pdf"), sample_pdf(2)),
                ("angle", None, b"45".to_vec()),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("rotation angle"));
    }

    #[tokio::test]
    async fn test_stamp_requires_data_url() {
        let (_dir, app) = test_app();

        let (status, json) = post_multipart(
            app,
            "/api/pdfs/stamp-signature",
            &[
                ("pdf", Some("a.pdf"), sample_pdf(1)),
                ("signatureDataUrl", None, b"nonsense".to_vec()),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("signatureDataUrl"));
    }

    #[tokio::test]
    async fn test_non_pdf_upload_rejected() {
        let (_dir, app) = test_app();

        // multipart_body always marks files as application/pdf, so build a
        // mismatched part by hand
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"pdf\"; filename=\"a.txt\"\r\nContent-Type: text/plain\r\n\r\n",
        );
        body.extend_from_slice(b"hello");
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri("/api/pdfs/compress")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_owner_header_uses_anonymous() {
        let (dir, app) = test_app();

        let request = Request::builder()
            .method("POST")
            .uri("/api/pdfs/compress")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(&[(
                "pdf",
                Some("a.pdf"),
                sample_pdf(1),
            )])))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(dir.path().join("anonymous").is_dir());
    }
}
