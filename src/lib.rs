pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, View};
pub use config::TomlConfig;

pub use adapters::{HttpMarkRepository, InMemoryMarkRepository};
pub use crate::core::{
    engine::{EngineSettings, ResultsEngine},
    grading::GradeTable,
    report::{Report, ReportAssembler},
    session::ReportSession,
};
pub use utils::error::{EngineError, Result};
