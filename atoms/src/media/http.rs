use aws_sdk_s3::Client as S3Client;
use lambda_http::{http::StatusCode, Body, Error as LambdaError, Response};

use super::model::{UploadRequest, UploadResponse};
use super::service::upload_images;
use crate::respond;

/// HTTP Handler: POST /uploads
pub async fn upload_images_handler(
    s3_client: &S3Client,
    bucket: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let request: UploadRequest = match respond::parse_body(body)? {
        Ok(request) => request,
        Err(resp) => return Ok(resp),
    };

    tracing::info!("Upload of {} file(s) to {}", request.files.len(), bucket);

    match upload_images(s3_client, bucket, &request.files).await {
        Ok(urls) => respond::json(StatusCode::CREATED, &UploadResponse { urls }),
        Err(e) => respond::store_error(e),
    }
}
