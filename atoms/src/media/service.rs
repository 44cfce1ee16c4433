use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::model::UploadFile;
use crate::error::StoreError;
use crate::validation::FieldErrors;

pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_TYPES: [(&str, &str); 5] = [
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/svg+xml", "svg"),
];

/// File extension for an accepted image content type.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let content_type = content_type.trim().to_ascii_lowercase();
    ALLOWED_TYPES
        .iter()
        .find(|(ct, _)| *ct == content_type)
        .map(|(_, ext)| *ext)
}

pub fn object_key(file_id: &str, extension: &str) -> String {
    format!("attachments/{}.{}", file_id, extension)
}

pub fn object_url(bucket: &str, key: &str) -> String {
    format!("https://{}.s3.amazonaws.com/{}", bucket, key)
}

/// A file that passed checks and is ready to store.
#[derive(Debug)]
pub struct DecodedFile {
    pub key: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Checks every file before anything is written; errors are keyed `files[i]`.
pub fn decode_files(files: &[UploadFile]) -> Result<Vec<DecodedFile>, FieldErrors> {
    let mut errors = FieldErrors::new();
    let mut decoded = Vec::with_capacity(files.len());

    if files.is_empty() {
        errors.insert("files", "At least one file is required");
        return Err(errors);
    }

    for (i, file) in files.iter().enumerate() {
        let field = format!("files[{}]", i);

        let Some(ext) = extension_for(&file.content_type) else {
            errors.insert(&field, format!("{}: unsupported type {}", file.file_name, file.content_type));
            continue;
        };

        match STANDARD.decode(file.data.trim()) {
            Ok(bytes) if bytes.is_empty() => {
                errors.insert(&field, format!("{}: file is empty", file.file_name));
            }
            Ok(bytes) if bytes.len() > MAX_FILE_BYTES => {
                errors.insert(&field, format!("{}: file exceeds 10 MB", file.file_name));
            }
            Ok(bytes) => decoded.push(DecodedFile {
                key: object_key(&uuid::Uuid::new_v4().to_string(), ext),
                content_type: file.content_type.trim().to_ascii_lowercase(),
                bytes,
            }),
            Err(_) => {
                errors.insert(&field, format!("{}: data is not valid base64", file.file_name));
            }
        }
    }

    if errors.is_empty() {
        Ok(decoded)
    } else {
        Err(errors)
    }
}

/// Store the files in S3 and return their URLs in request order
pub async fn upload_images(
    s3_client: &S3Client,
    bucket: &str,
    files: &[UploadFile],
) -> Result<Vec<String>, StoreError> {
    let decoded = decode_files(files).map_err(StoreError::Invalid)?;

    let mut urls = Vec::with_capacity(decoded.len());
    for file in decoded {
        s3_client
            .put_object()
            .bucket(bucket)
            .key(&file.key)
            .content_type(&file.content_type)
            .body(ByteStream::from(file.bytes))
            .send()
            .await
            .map_err(|e| StoreError::backend("S3 put_object", e))?;

        tracing::info!("Stored attachment {}", file.key);
        urls.push(object_url(bucket, &file.key));
    }

    Ok(urls)
}
