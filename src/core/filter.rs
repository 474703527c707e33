use crate::domain::model::{FilterCriteria, MarkRecord};
use chrono::{Datelike, FixedOffset};

pub const ALL_SENTINEL: &str = "all";

/// 空白或 "all" 視同未設定
fn active_value(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(ALL_SENTINEL))
        .map(str::to_string)
}

/// 依年份與考試類型篩選成績紀錄，兩個條件以 AND 組合
#[derive(Debug, Clone)]
pub struct RecordFilter {
    year: Option<String>,
    exam_type: Option<String>,
    offset: FixedOffset,
}

impl RecordFilter {
    /// `offset` 是計算考試日期所屬年份時使用的報表時區
    pub fn new(criteria: &FilterCriteria, offset: FixedOffset) -> Self {
        Self {
            year: active_value(criteria.year.as_deref()),
            exam_type: active_value(criteria.exam_type.as_deref()).map(|t| t.to_lowercase()),
            offset,
        }
    }

    pub fn is_pass_through(&self) -> bool {
        self.year.is_none() && self.exam_type.is_none()
    }

    pub fn matches(&self, record: &MarkRecord) -> bool {
        if let Some(year) = &self.year {
            let local_year = record.exam_date.with_timezone(&self.offset).year();
            if format!("{:04}", local_year) != *year {
                return false;
            }
        }

        if let Some(exam_type) = &self.exam_type {
            if record.exam_type.trim().to_lowercase() != *exam_type {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, records: &[MarkRecord]) -> Vec<MarkRecord> {
        if self.is_pass_through() {
            return records.to_vec();
        }
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

pub fn filter_records(
    records: &[MarkRecord],
    criteria: &FilterCriteria,
    offset: FixedOffset,
) -> Vec<MarkRecord> {
    RecordFilter::new(criteria, offset).apply(records)
}
