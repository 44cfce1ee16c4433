//! Domain atoms of the QA tracker: tasks, test executions and their attachments.
//!
//! Each atom has a `model`, a `service` that talks to DynamoDB/S3 through
//! clients it is handed, and `http` handlers built on top of the service.

pub mod dynamo;
pub mod error;
pub mod respond;
pub mod validation;

pub mod executions;
pub mod media;
pub mod tasks;

pub use error::StoreError;
pub use validation::FieldErrors;
