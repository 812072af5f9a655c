mod actions;
mod errors;
mod report_engine;

pub use actions::{ActionKind, AdminAction, ReplayStats};
pub use errors::EngineError;
pub use report_engine::ReportEngine;
