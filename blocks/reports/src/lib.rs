//! Dashboard, reports and export views over the whole QA store.

pub mod analytics;
pub mod demo;
pub mod export;
pub mod handlers;
pub mod report;
pub mod types;

pub use handlers::{dashboard_handler, export_handler, reports_handler};
