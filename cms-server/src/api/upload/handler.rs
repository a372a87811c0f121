//! Image Upload Handler
//!
//! Accepts PNG, JPEG and WebP, re-encodes to JPEG and stores the result under
//! `<work_dir>/storage/<resource>/<sha256>.jpg`. The public URL is written
//! into the target field.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Response};
use http::{StatusCode, header};
use image::ImageFormat;
use sha2::{Digest, Sha256};
use std::io::Cursor;

use crate::auth::Actor;
use crate::core::ServerState;
use crate::db::repository::{item, user};
use crate::policy::{Ability, ItemPolicy, UserPolicy, authorize};
use shared::client::UploadResponse;
use shared::error::{AppError, AppResult, ErrorCode};

/// JPEG quality for stored images
const JPEG_QUALITY: u8 = 85;

/// 可上传的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UploadTarget {
    ItemImage,
    UserProfileImage,
}

impl UploadTarget {
    fn parse(resource: &str, field: &str) -> Option<Self> {
        match (resource, field) {
            ("items", "image") => Some(Self::ItemImage),
            ("users", "profile-image" | "profileImage") => Some(Self::UserProfileImage),
            _ => None,
        }
    }

    /// storage 下的子目录
    fn folder(&self) -> &'static str {
        match self {
            Self::ItemImage => "items",
            Self::UserProfileImage => "users",
        }
    }
}

/// Calculate SHA256 hash of data
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// 格式检查 + 解码 + JPEG 重新编码
fn reencode_as_jpeg(data: &[u8]) -> AppResult<Vec<u8>> {
    let format = image::guess_format(data).map_err(|_| {
        AppError::with_message(ErrorCode::UnsupportedMedia, "The file must be a PNG, JPEG or WebP image.")
    })?;
    if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP) {
        return Err(AppError::with_message(
            ErrorCode::UnsupportedMedia,
            format!("Unsupported image format {format:?}"),
        ));
    }

    let img = image::load_from_memory_with_format(data, format)
        .map_err(|e| AppError::validation(format!("Invalid image: {e}")))?;

    let mut buffer = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut buffer), JPEG_QUALITY);
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| AppError::internal(format!("Failed to encode image: {e}")))?;
    Ok(buffer)
}

/// 读取 multipart 中的 `file` 字段
async fn read_file_field(multipart: &mut Multipart) -> AppResult<Bytes> {
    let multipart_error = |e: axum::extract::multipart::MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::new(ErrorCode::PayloadTooLarge)
        } else {
            AppError::invalid_request(format!("Invalid multipart request: {e}"))
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            return field.bytes().await.map_err(multipart_error);
        }
    }
    Err(AppError::invalid_attribute("file", "The file field is required."))
}

/// POST /api/v2/uploads/{resource}/{id}/{field}
///
/// 顺序：目标 (404) → 策略 (403) → 文件校验 (413 / 422) → 写盘 → 更新字段
pub async fn upload(
    State(state): State<ServerState>,
    actor: Actor,
    Path((resource, id, field)): Path<(String, i64, String)>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    let target = UploadTarget::parse(&resource, &field)
        .ok_or_else(|| AppError::not_found(format!("Upload target {resource}/{field}")))?;

    match target {
        UploadTarget::ItemImage => {
            let existing = item::find_by_id(&state.pool, id).await?.ok_or_else(|| {
                AppError::with_message(ErrorCode::ItemNotFound, format!("Item {id} not found"))
            })?;
            authorize(&ItemPolicy, Some(&actor), Ability::Update(&existing))?;
        }
        UploadTarget::UserProfileImage => {
            let existing = user::find_by_id(&state.pool, id).await?.ok_or_else(|| {
                AppError::with_message(ErrorCode::UserNotFound, format!("User {id} not found"))
            })?;
            authorize(&UserPolicy, Some(&actor), Ability::Update(&existing))?;
        }
    }

    let data = read_file_field(&mut multipart).await?;
    if data.is_empty() {
        return Err(AppError::invalid_attribute("file", "The file must not be empty."));
    }
    if data.len() > state.config.max_upload_size {
        return Err(AppError::with_message(
            ErrorCode::PayloadTooLarge,
            format!("The file may not be greater than {} bytes.", state.config.max_upload_size),
        ));
    }

    let jpeg = reencode_as_jpeg(&data)?;
    let hash = calculate_hash(&jpeg);
    let filename = format!("{hash}.jpg");

    let dir = state.config.storage_dir().join(target.folder());
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::storage(format!("Failed to create storage directory: {e}")))?;
    let path = dir.join(&filename);
    // 内容寻址：同样内容已存在则不再写入
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        tokio::fs::write(&path, &jpeg)
            .await
            .map_err(|e| AppError::storage(format!("Failed to save file: {e}")))?;
    }

    let url = format!("{}/storage/{}/{filename}", state.config.public_url, target.folder());
    match target {
        UploadTarget::ItemImage => item::set_image(&state.pool, id, &url).await?,
        UploadTarget::UserProfileImage => user::set_profile_image(&state.pool, id, &url).await?,
    }

    tracing::info!(
        user_id = actor.id,
        resource = %resource,
        target_id = id,
        size = jpeg.len(),
        hash = %hash,
        "Image uploaded"
    );
    Ok((StatusCode::CREATED, Json(UploadResponse { url })))
}

/// GET /storage/{folder}/{file}
pub async fn serve(
    State(state): State<ServerState>,
    Path((folder, file)): Path<(String, String)>,
) -> AppResult<Response> {
    // Security check: prevent path traversal
    let valid_folder = matches!(folder.as_str(), "items" | "users");
    if !valid_folder
        || file.is_empty()
        || file.contains("..")
        || file.contains('/')
        || file.contains('\\')
    {
        return Err(AppError::not_found("File"));
    }

    let path = state.config.storage_dir().join(&folder).join(&file);
    let content = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::not_found("File"))?;
    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime.essence_str().to_string())],
        content,
    )
        .into_response())
}
