// Re-export model types and service functions
pub mod draft;
pub mod http;
pub mod model;
pub mod service;

pub use draft::TaskDraft;
pub use model::{Task, TaskPayload};
