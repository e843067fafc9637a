//! Route handlers
//!
//! Each handler builds its own gateway from the current configuration,
//! performs one operation and wraps the outcome in the response envelope.

use axum::{
    Extension, Json,
    body::Body,
    extract::{
        Multipart, Path, Query, State, multipart::MultipartRejection, rejection::QueryRejection,
    },
    http::{
        HeaderMap, HeaderValue, StatusCode, Uri,
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use syncer_core::listing::SearchPattern;
use syncer_core::transfer::key_file_name;
use syncer_core::{
    DeleteRequest, DeleteResult, DownloadRequest, DownloadResult, ObjectEntry, StorageClass,
    UploadRequest, UploadResult,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResponse, ErrorCode};
use crate::state::AppState;

/// Default page size for `/files/list`
const DEFAULT_MAX_KEYS: usize = 100;

/// Listing cap applied before search filtering
const SEARCH_LIMIT: usize = 1000;

/// Read size when streaming a downloaded object back to the client
const DOWNLOAD_CHUNK_SIZE: usize = 64 * 1024;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    prefix: String,
    #[serde(default = "default_max_keys")]
    max_keys: usize,
}

fn default_max_keys() -> usize {
    DEFAULT_MAX_KEYS
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pattern: String,
    #[serde(default)]
    prefix: String,
}

#[derive(Debug, Serialize)]
pub struct FileList {
    files: Vec<ObjectEntry>,
    total_count: usize,
    prefix: String,
}

#[derive(Debug, Serialize)]
pub struct UploadedFile {
    s3_key: String,
    size: u64,
    storage_class: StorageClass,
}

#[derive(Debug, Serialize)]
pub struct DeletedFile {
    s3_key: String,
    deleted: bool,
}

fn invalid_query(rejection: QueryRejection) -> ApiError {
    ApiError::validation("Invalid query parameters", rejection.body_text())
}

/// `GET /health`, no authentication
pub async fn health() -> Json<ApiResponse<serde_json::Value>> {
    ApiResponse::ok(
        json!({ "status": "healthy", "service": "cloud-syncer web API" }),
        "Service is running normally",
    )
}

/// `GET /auth/verify`
pub async fn verify_auth(
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> Json<ApiResponse<serde_json::Value>> {
    ApiResponse::ok(
        json!({ "authenticated": true, "user": user }),
        "Authentication verified successfully",
    )
}

/// `GET /files/list?prefix&max_keys`
pub async fn list_files(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<FileList> {
    let Query(query) = query.map_err(invalid_query)?;
    let gateway = state.gateway().await?;

    let files = gateway
        .list_objects(&query.prefix, query.max_keys)
        .await
        .map_err(|e| ApiError::storage(&e, ErrorCode::ListFailed, "Failed to list files"))?;

    let message = format!("Found {} files", files.len());
    Ok(ApiResponse::ok(
        FileList {
            total_count: files.len(),
            files,
            prefix: query.prefix,
        },
        message,
    ))
}

/// `GET /files/search?pattern&prefix`
pub async fn search_files(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<FileList> {
    let Query(query) = query.map_err(invalid_query)?;
    let pattern = SearchPattern::parse(&query.pattern)
        .map_err(|e| ApiError::validation("Invalid search pattern", e.to_string()))?;
    let gateway = state.gateway().await?;

    let entries = gateway
        .list_objects(&query.prefix, SEARCH_LIMIT)
        .await
        .map_err(|e| ApiError::storage(&e, ErrorCode::SearchFailed, "Failed to search files"))?;
    let files = pattern.filter(entries);

    let message = format!("Found {} matching files", files.len());
    Ok(ApiResponse::ok(
        FileList {
            total_count: files.len(),
            files,
            prefix: query.prefix,
        },
        message,
    ))
}

/// `POST /files/upload` with multipart fields `file`, `s3_key`, `storage_class`
///
/// The file part is streamed to a temporary file that is removed when the
/// request completes.
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<UploadedFile> {
    let mut multipart =
        multipart.map_err(|e| ApiError::validation("Invalid upload request", e.body_text()))?;
    let gateway = state.gateway().await?;

    let mut upload: Option<(Option<String>, tempfile::NamedTempFile, u64)> = None;
    let mut s3_key: Option<String> = None;
    let mut storage_class = StorageClass::Standard;

    let bad_form = |e: axum::extract::multipart::MultipartError| {
        ApiError::validation("Invalid upload request", e.body_text())
    };

    while let Some(mut field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_owned);
                let (temp, size) = spool(&mut field).await?;
                upload = Some((file_name, temp, size));
            }
            Some("s3_key") => {
                let value = field.text().await.map_err(bad_form)?;
                s3_key = Some(value).filter(|key| !key.trim().is_empty());
            }
            Some("storage_class") => {
                let value = field.text().await.map_err(bad_form)?;
                storage_class = value
                    .parse::<StorageClass>()
                    .map_err(|e| ApiError::validation("Invalid storage class", e.to_string()))?;
            }
            _ => {}
        }
    }

    let Some((file_name, temp, size)) = upload else {
        return Err(ApiError::validation("Invalid upload request", "No file provided"));
    };
    let key = s3_key
        .or(file_name)
        .ok_or_else(|| ApiError::validation("Invalid upload request", "File name is required"))?;

    let request = UploadRequest::new(temp.path(), key.as_str()).with_storage_class(Some(storage_class));
    match gateway.upload_object(&request).await {
        UploadResult::Success { storage_class, .. } => Ok(ApiResponse::ok(
            UploadedFile {
                s3_key: key,
                size,
                storage_class,
            },
            "File uploaded successfully",
        )),
        UploadResult::Failure { message, .. } => Err(ApiError::internal(
            ErrorCode::UploadFailed,
            "Failed to upload file",
            message,
        )),
    }
}

/// Copy one multipart field into a fresh temporary file
async fn spool(
    field: &mut axum::extract::multipart::Field<'_>,
) -> Result<(tempfile::NamedTempFile, u64), ApiError> {
    let spool_error =
        |e: std::io::Error| ApiError::internal(ErrorCode::Server, "Failed to store upload", e.to_string());

    let temp = tempfile::NamedTempFile::new().map_err(spool_error)?;
    let mut file = tokio::fs::File::from_std(temp.reopen().map_err(spool_error)?);
    let mut size = 0u64;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::validation("Invalid upload request", e.body_text()))?
    {
        file.write_all(&chunk).await.map_err(spool_error)?;
        size += chunk.len() as u64;
    }
    file.flush().await.map_err(spool_error)?;

    Ok((temp, size))
}

/// `GET /files/download/{*key}`
///
/// The object is fetched into a private temporary directory and streamed
/// back in chunks. The directory lives as long as the response body.
pub async fn download_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let failed = |e: std::io::Error| {
        ApiError::internal(ErrorCode::DownloadFailed, "Failed to download file", e.to_string())
    };

    let gateway = state.gateway().await?;
    let temp_dir = tempfile::TempDir::new().map_err(failed)?;
    let local_path = temp_dir.path().join("download");

    let request = DownloadRequest::new(key.as_str(), Some(local_path.clone()), true)
        .map_err(|e| ApiError::validation("Invalid file path provided", e.to_string()))?;

    let size = match gateway.download_object(&request).await {
        DownloadResult::Success { size_bytes, .. } => size_bytes,
        DownloadResult::Failure { message, .. } => {
            return Err(ApiError::new(
                StatusCode::NOT_FOUND,
                ErrorCode::FileNotFound,
                "File not found or download failed",
                message,
            ));
        }
    };

    let file = tokio::fs::File::open(&local_path).await.map_err(failed)?;
    let body = Body::from_stream(futures::stream::try_unfold(
        (file, temp_dir),
        |(mut file, temp_dir)| async move {
            let mut chunk = vec![0u8; DOWNLOAD_CHUNK_SIZE];
            let read = file.read(&mut chunk).await?;
            if read == 0 {
                return Ok::<_, std::io::Error>(None);
            }
            chunk.truncate(read);
            Ok(Some((chunk, (file, temp_dir))))
        },
    ));

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
    headers.insert(CONTENT_DISPOSITION, attachment(key_file_name(&key)));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(size));

    Ok((headers, body).into_response())
}

/// `GET /files/download/` with no key at all
pub async fn download_without_key() -> ApiError {
    ApiError::validation("Invalid file path provided", "Object key cannot be empty")
}

fn attachment(file_name: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// `DELETE /files/{*key}`
pub async fn delete_file(State(state): State<AppState>, Path(key): Path<String>) -> ApiResult<DeletedFile> {
    remove(&state, key).await
}

/// `DELETE /files/download/{*key}`
///
/// The download route claims this path, so the `download/` segment that
/// the router consumed is put back before deleting.
pub async fn delete_download(
    State(state): State<AppState>,
    Path(rest): Path<String>,
) -> ApiResult<DeletedFile> {
    remove(&state, format!("download/{rest}")).await
}

/// `DELETE` on a fixed route such as `/files/list`, where the key is the
/// literal path after `/files/`
pub async fn delete_reserved(State(state): State<AppState>, uri: Uri) -> ApiResult<DeletedFile> {
    let key = uri.path().strip_prefix("/files/").unwrap_or_default().to_string();
    remove(&state, key).await
}

async fn remove(state: &AppState, key: String) -> ApiResult<DeletedFile> {
    let request = DeleteRequest::new(key, false).map_err(|_| empty_key())?;
    let gateway = state.gateway().await?;

    match gateway.delete_object(request.key()).await {
        DeleteResult::Success { key, .. } => Ok(ApiResponse::ok(
            DeletedFile {
                s3_key: key,
                deleted: true,
            },
            "File deleted successfully",
        )),
        DeleteResult::Failure { message, .. } => Err(ApiError::internal(
            ErrorCode::DeleteFailed,
            "Failed to delete file",
            message,
        )),
    }
}

/// `DELETE /files/` with no key at all
pub async fn delete_without_key() -> ApiError {
    empty_key()
}

fn empty_key() -> ApiError {
    ApiError::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::DeleteFailed,
        "Invalid file path provided",
        "File path cannot be empty",
    )
}
