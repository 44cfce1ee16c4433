pub mod http;
pub mod model;
pub mod service;
pub mod session;

pub use model::{
    ExecutionPayload, ExecutionRow, ExecutionStatus, TaskChecklist, TestCaseResult, TestExecution,
};
pub use session::{ExecutionSession, Stopwatch, Submission};
