use crate::core::grading::GradeTable;
use crate::domain::model::{ClassRef, MarkRecord, Student};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::FixedOffset;

/// 成績資料來源，由外部系統擁有
#[async_trait]
pub trait MarkRepository: Send + Sync {
    /// 學生不存在時回傳 `NotFound`；存在但沒有成績時回傳空陣列
    async fn get_marks_by_student(&self, student_id: &str) -> Result<Vec<MarkRecord>>;
    async fn get_students_by_class(&self, class_id: &str) -> Result<Vec<Student>>;
    async fn get_classes_by_school(&self, school_id: &str) -> Result<Vec<ClassRef>>;
}

pub trait ConfigProvider: Send + Sync {
    fn concurrency(&self) -> usize;
    fn reporting_offset(&self) -> FixedOffset;
    fn grade_table(&self) -> Result<GradeTable>;
}
