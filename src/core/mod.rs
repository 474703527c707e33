pub mod class;
pub mod engine;
pub mod fetch;
pub mod filter;
pub mod grading;
pub mod report;
pub mod session;
pub mod student;

pub use crate::domain::model::{
    ClassRef, ClassStatistics, ClassSummary, FilterCriteria, GradedEntry, MarkRecord,
    RecordsByStudent, Student, StudentSummary,
};
pub use crate::domain::ports::{ConfigProvider, MarkRepository};
pub use crate::utils::error::Result;
