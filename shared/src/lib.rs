//! Process-wide state and cross-cutting HTTP concerns for the API lambda.

pub mod config;
pub mod cors;

use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::Client as S3Client;

pub use config::Config;

/// Clients are built once per cold start and shared across invocations.
pub struct AppState {
    pub dynamo_client: DynamoClient,
    pub s3_client: S3Client,
    pub config: Config,
}

impl AppState {
    pub async fn from_env() -> Self {
        let aws_config = aws_config::load_from_env().await;
        let config = Config::from_env();

        tracing::info!(
            "Using table {} and bucket {}",
            config.table_name,
            config.bucket_name
        );

        Self {
            dynamo_client: DynamoClient::new(&aws_config),
            s3_client: S3Client::new(&aws_config),
            config,
        }
    }
}
