use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 單一學生、單一科目、單一次考試的成績紀錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkRecord {
    pub id: String,
    pub student_id: String,
    pub class_id: String,
    pub subject_id: String,
    pub subject_name: String,
    pub exam_type: String,
    pub exam_date: DateTime<Utc>,
    pub marks_obtained: f64,
    pub max_marks: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl MarkRecord {
    /// 滿分必須為正、得分必須為非負有限數，否則不參與統計
    pub fn is_valid(&self) -> bool {
        self.max_marks.is_finite()
            && self.max_marks > 0.0
            && self.marks_obtained.is_finite()
            && self.marks_obtained >= 0.0
    }

    /// 僅對有效紀錄有意義
    pub fn percentage(&self) -> f64 {
        (self.marks_obtained / self.max_marks) * 100.0
    }

    /// 空白的 stored grade 視同未填
    pub fn stored_grade(&self) -> Option<&str> {
        self.grade
            .as_deref()
            .map(str::trim)
            .filter(|grade| !grade.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub roll_number: String,
    pub class_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,
}

/// 年份與考試類型篩選條件，`None` 或 "all" 表示不篩選
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_type: Option<String>,
}

impl FilterCriteria {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_exam_type(mut self, exam_type: impl Into<String>) -> Self {
        self.exam_type = Some(exam_type.into());
        self
    }
}

/// 已評分的單筆紀錄，供報表明細使用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedEntry {
    pub record_id: String,
    pub subject_id: String,
    pub subject_name: String,
    pub exam_type: String,
    pub exam_date: DateTime<Utc>,
    pub marks_obtained: f64,
    pub max_marks: f64,
    pub percentage: f64,
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub student_id: String,
    pub total_obtained: f64,
    pub total_max: f64,
    pub percentage: f64,
    pub grade: String,
    pub exam_count: usize,
    pub grade_counts: BTreeMap<String, usize>,
    pub passed: bool,
    /// 被排除的不合法紀錄數
    pub excluded_count: usize,
    pub entries: Vec<GradedEntry>,
}

impl StudentSummary {
    /// 沒有任何成績資料，與「有資料但不及格」不同
    pub fn has_data(&self) -> bool {
        self.exam_count > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStatistics {
    pub student_count: usize,
    pub students_with_data: usize,
    pub passed_count: usize,
    pub failed_count: usize,
    pub no_data_count: usize,
    pub pass_rate: f64,
    pub average_percentage: f64,
    pub highest_percentage: Option<f64>,
    pub lowest_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub class_id: String,
    pub per_student: Vec<StudentSummary>,
    /// 以單次考試為單位的等第分佈
    pub grade_distribution: BTreeMap<String, usize>,
    /// 以學生總成績為單位的等第分佈
    pub student_grade_distribution: BTreeMap<String, usize>,
    pub statistics: ClassStatistics,
    /// 讀取失敗而降級為無資料的學生
    pub unavailable_students: Vec<String>,
}

pub type RecordsByStudent = HashMap<String, Vec<MarkRecord>>;
