// ABOUTME: Image upload pipeline: content sniffing, size and shape rules, hashing and storage
// ABOUTME: Identical bytes are stored once; later uploads return the existing record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Media Uploads
//!
//! Every file is checked before anything is written: the declared MIME type
//! must be allowed and must agree with the type sniffed from the bytes, the
//! file must fit the size limit, and its dimensions must satisfy the rule for
//! its media type. Accepted files are keyed by their SHA-256 digest.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use giftminder_core::constants::{limits, media as media_limits};
use giftminder_core::errors::ErrorCode;
use giftminder_core::models::{ImageFormat, MediaFile, MediaType};
use giftminder_core::validation::validate_length;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::database::MediaManager;
use crate::errors::{AppError, AppResult};
use crate::storage::MediaStorage;

/// One file taken from a multipart request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client supplied file name, informational only
    pub file_name: Option<String>,
    /// Declared MIME type
    pub content_type: Option<String>,
    /// Raw bytes
    pub data: Bytes,
}

/// Facts established about an accepted image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageInfo {
    /// Sniffed format
    pub format: ImageFormat,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ImageInfo {
    /// Width divided by height
    #[must_use]
    pub fn ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Validate that `data` is an allowed image and read its dimensions
///
/// # Errors
///
/// Returns a media validation error for empty or oversized files, disallowed
/// or mismatching MIME types and unreadable images
pub fn inspect_image(data: &[u8], declared_mime: Option<&str>) -> AppResult<ImageInfo> {
    if data.is_empty() {
        return Err(AppError::media_validation("File is empty"));
    }
    if data.len() > media_limits::MAX_FILE_SIZE {
        return Err(AppError::media_validation(format!(
            "File exceeds the {} MiB limit",
            media_limits::MAX_FILE_SIZE / (1024 * 1024)
        )));
    }

    let sniffed = match imagesize::image_type(data) {
        Ok(imagesize::ImageType::Png) => ImageFormat::Png,
        Ok(imagesize::ImageType::Jpeg) => ImageFormat::Jpeg,
        Ok(other) => {
            return Err(AppError::media_validation(format!(
                "Unsupported image type {other:?}, expected PNG or JPEG"
            )))
        }
        Err(e) => {
            return Err(AppError::media_validation(format!(
                "File is not a readable image: {e}"
            )))
        }
    };

    if let Some(declared) = declared_mime {
        let declared_format = ImageFormat::from_mime(declared).ok_or_else(|| {
            AppError::media_validation(format!(
                "MIME type '{declared}' is not allowed, expected image/png or image/jpeg"
            ))
        })?;
        if declared_format != sniffed {
            return Err(AppError::media_validation(format!(
                "Declared MIME type '{declared}' does not match file content '{}'",
                sniffed.mime_type()
            )));
        }
    }

    let size = imagesize::blob_size(data)
        .map_err(|e| AppError::media_validation(format!("Cannot read image dimensions: {e}")))?;
    let dimension = |value: usize| {
        u32::try_from(value)
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| AppError::media_validation(format!("Invalid image dimension {value}")))
    };

    Ok(ImageInfo {
        format: sniffed,
        width: dimension(size.width)?,
        height: dimension(size.height)?,
    })
}

/// Shape rule for each media type
///
/// # Errors
///
/// Returns a media validation error for non-square avatars and content
/// images outside the allowed aspect ratio
pub fn check_shape(media_type: MediaType, info: &ImageInfo) -> AppResult<()> {
    match media_type {
        MediaType::Avatar if info.width != info.height => Err(AppError::media_validation(
            format!("Avatar must be square, got {}x{}", info.width, info.height),
        )),
        MediaType::Content
            if !(media_limits::CONTENT_MIN_RATIO..=media_limits::CONTENT_MAX_RATIO)
                .contains(&info.ratio()) =>
        {
            Err(AppError::media_validation(format!(
                "Image aspect ratio {:.2} is outside {}..={}",
                info.ratio(),
                media_limits::CONTENT_MIN_RATIO,
                media_limits::CONTENT_MAX_RATIO
            )))
        }
        _ => Ok(()),
    }
}

/// Lowercase hex SHA-256 of `data`
#[must_use]
pub fn content_hash(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

struct AcceptedFile {
    data: Bytes,
    info: ImageInfo,
}

/// Result of storing one file
struct Stored {
    record: MediaFile,
    /// Set when this call inserted the record
    created: bool,
    /// Set when this call uploaded the object
    uploaded_key: Option<String>,
}

/// Media upload use cases
pub struct MediaService {
    media: MediaManager,
    storage: Arc<dyn MediaStorage>,
}

impl MediaService {
    /// Create a service over media metadata and object storage
    #[must_use]
    pub fn new(media: MediaManager, storage: Arc<dyn MediaStorage>) -> Self {
        Self { media, storage }
    }

    /// Upload a square profile picture
    ///
    /// # Errors
    ///
    /// Returns a media validation error for rejected files and a storage or
    /// database error when persisting fails
    #[tracing::instrument(skip(self, file, alt), fields(size = file.data.len()))]
    pub async fn upload_avatar(&self, file: UploadedFile, alt: Option<String>) -> AppResult<MediaFile> {
        if let Some(alt) = &alt {
            validate_length("alt", alt, 0, limits::ALT_MAX)?;
        }
        let accepted = Self::accept(MediaType::Avatar, file)?;
        Ok(self.store(MediaType::Avatar, accepted, alt).await?.record)
    }

    /// Upload up to ten illustration images
    ///
    /// All files are validated before any is stored. If storing a later file
    /// fails, the records and objects created for earlier files of the batch
    /// are removed again; files that were already stored before the call are
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns a media validation error when the file count is out of range
    /// or any file is rejected
    #[tracing::instrument(skip(self, files), fields(count = files.len()))]
    pub async fn upload_content(&self, files: Vec<UploadedFile>) -> AppResult<Vec<MediaFile>> {
        if files.is_empty() || files.len() > media_limits::MAX_FILES_PER_UPLOAD {
            return Err(AppError::media_validation(format!(
                "Expected between 1 and {} files, got {}",
                media_limits::MAX_FILES_PER_UPLOAD,
                files.len()
            )));
        }

        let accepted = files
            .into_iter()
            .map(|file| Self::accept(MediaType::Content, file))
            .collect::<AppResult<Vec<_>>>()?;

        let mut stored = Vec::with_capacity(accepted.len());
        for file in accepted {
            match self.store(MediaType::Content, file, None).await {
                Ok(item) => stored.push(item),
                Err(e) => {
                    self.discard(&stored).await;
                    return Err(e);
                }
            }
        }
        Ok(stored.into_iter().map(|item| item.record).collect())
    }

    /// Undo the parts of a failed batch that this batch created
    async fn discard(&self, stored: &[Stored]) {
        for item in stored {
            if item.created {
                if let Err(e) = self.media.delete(item.record.id).await {
                    tracing::warn!(media_id = %item.record.id, error = %e, "Failed to remove media record");
                }
            }
            if let Some(key) = &item.uploaded_key {
                if let Err(e) = self.storage.delete(key).await {
                    tracing::warn!(key, error = %e, "Failed to remove orphaned object");
                }
            }
        }
        tracing::info!(discarded = stored.len(), "Rolled back partial content upload");
    }

    fn accept(media_type: MediaType, file: UploadedFile) -> AppResult<AcceptedFile> {
        let info = inspect_image(&file.data, file.content_type.as_deref()).map_err(|e| {
            match &file.file_name {
                Some(name) => AppError::new(e.code, format!("{name}: {}", e.message)),
                None => e,
            }
        })?;
        check_shape(media_type, &info)?;
        Ok(AcceptedFile {
            data: file.data,
            info,
        })
    }

    async fn store(
        &self,
        media_type: MediaType,
        file: AcceptedFile,
        alt: Option<String>,
    ) -> AppResult<Stored> {
        let hash = content_hash(&file.data);
        if let Some(existing) = self.media.get_by_hash(&hash).await? {
            tracing::debug!(media_id = %existing.id, %hash, "Upload matches stored media");
            return Ok(Stored {
                record: existing,
                created: false,
                uploaded_key: None,
            });
        }

        let key = format!(
            "{}/{hash}.{}",
            media_type.key_prefix(),
            file.info.format.extension()
        );
        let size = file.data.len();
        let uploaded_now = !self.storage.exists(&key).await?;
        let url = if uploaded_now {
            self.storage
                .upload(&key, file.data, file.info.format.mime_type())
                .await?
        } else {
            self.storage.public_url(&key)
        };

        let record = MediaFile {
            id: Uuid::new_v4(),
            url,
            hash,
            media_type,
            alt,
            mime_type: file.info.format.mime_type().to_owned(),
            size: u64::try_from(size).unwrap_or(u64::MAX),
            width: file.info.width,
            height: file.info.height,
            ratio: file.info.ratio(),
            created_at: Utc::now(),
        };

        match self.media.create(&record).await {
            Ok(()) => {
                tracing::info!(media_id = %record.id, key, size, "Media stored");
                Ok(Stored {
                    record,
                    created: true,
                    uploaded_key: uploaded_now.then_some(key),
                })
            }
            Err(e) if e.code == ErrorCode::ResourceAlreadyExists => {
                // A concurrent upload of the same bytes won the insert.
                let existing = self.media.get_by_hash(&record.hash).await?.ok_or(e)?;
                Ok(Stored {
                    record: existing,
                    created: false,
                    uploaded_key: None,
                })
            }
            Err(e) => {
                if uploaded_now {
                    if let Err(cleanup) = self.storage.delete(&key).await {
                        tracing::warn!(key, error = %cleanup, "Failed to remove orphaned object");
                    }
                }
                Err(e)
            }
        }
    }
}
