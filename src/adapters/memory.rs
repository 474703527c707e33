use crate::domain::model::{ClassRef, MarkRecord, Student};
use crate::domain::ports::MarkRepository;
use crate::utils::error::{EngineError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// 記憶體內的成績來源，供測試與展示使用
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarkRepository {
    classes: Vec<ClassRef>,
    students: Vec<Student>,
    marks: HashMap<String, Vec<MarkRecord>>,
    failing_students: HashSet<String>,
}

impl InMemoryMarkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, class: ClassRef) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_student(mut self, student: Student) -> Self {
        self.students.push(student);
        self
    }

    pub fn with_marks(mut self, student_id: &str, records: Vec<MarkRecord>) -> Self {
        self.marks
            .entry(student_id.to_string())
            .or_default()
            .extend(records);
        self
    }

    /// 讓指定學生的成績讀取失敗，用於模擬後端錯誤
    pub fn with_failing_student(mut self, student_id: &str) -> Self {
        self.failing_students.insert(student_id.to_string());
        self
    }
}

#[async_trait]
impl MarkRepository for InMemoryMarkRepository {
    async fn get_marks_by_student(&self, student_id: &str) -> Result<Vec<MarkRecord>> {
        if self.failing_students.contains(student_id) {
            return Err(EngineError::repository(format!(
                "simulated failure for student {}",
                student_id
            )));
        }
        if !self.students.iter().any(|s| s.id == student_id) {
            return Err(EngineError::not_found("student", student_id));
        }
        Ok(self.marks.get(student_id).cloned().unwrap_or_default())
    }

    async fn get_students_by_class(&self, class_id: &str) -> Result<Vec<Student>> {
        if !self.classes.iter().any(|c| c.id == class_id) {
            return Err(EngineError::not_found("class", class_id));
        }
        Ok(self
            .students
            .iter()
            .filter(|s| s.class_id == class_id)
            .cloned()
            .collect())
    }

    async fn get_classes_by_school(&self, school_id: &str) -> Result<Vec<ClassRef>> {
        Ok(self
            .classes
            .iter()
            .filter(|c| c.school_id.as_deref() == Some(school_id))
            .cloned()
            .collect())
    }
}
