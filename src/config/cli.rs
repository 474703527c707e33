use crate::domain::model::FilterCriteria;
use crate::utils::error::{EngineError, Result};
use crate::utils::validation::{validate_range, validate_year_filter, Validate};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    /// Class summary with distributions and statistics
    Summary,
    /// Full printable class report
    Report,
    /// Single student summary
    Student,
    /// Classes of a school
    Classes,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "results-engine")]
#[command(about = "Aggregate exam marks into student and class result summaries")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "results-engine.toml")]
    pub config: String,

    #[arg(long, value_enum, default_value_t = View::Report)]
    pub view: View,

    #[arg(long)]
    pub class_id: Option<String>,

    #[arg(long)]
    pub student_id: Option<String>,

    #[arg(long)]
    pub school_id: Option<String>,

    /// 4-digit year or "all"
    #[arg(long)]
    pub year: Option<String>,

    /// Exam type such as "midterm", or "all"
    #[arg(long)]
    pub exam_type: Option<String>,

    /// Override engine.concurrency from the config file
    #[arg(long)]
    pub concurrency: Option<usize>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            year: self.year.clone(),
            exam_type: self.exam_type.clone(),
        }
    }

    fn require<'a>(&self, field: &str, value: &'a Option<String>) -> Result<&'a str> {
        value
            .as_deref()
            .ok_or_else(|| EngineError::MissingConfigError {
                field: field.to_string(),
            })
    }

    /// 依 view 取得所需的 id
    pub fn target_id(&self) -> Result<&str> {
        match self.view {
            View::Summary | View::Report => self.require("--class-id", &self.class_id),
            View::Student => self.require("--student-id", &self.student_id),
            View::Classes => self.require("--school-id", &self.school_id),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        self.target_id()?;
        if let Some(year) = &self.year {
            validate_year_filter("--year", year)?;
        }
        if let Some(concurrency) = self.concurrency {
            validate_range(
                "--concurrency",
                concurrency,
                1,
                super::toml_config::MAX_CONCURRENCY,
            )?;
        }
        Ok(())
    }
}
