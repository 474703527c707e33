use crate::core::grading::GradeTable;
use crate::domain::model::{GradedEntry, MarkRecord, StudentSummary};
use std::collections::BTreeMap;

/// 將單一學生（已篩選）的成績紀錄彙整為總結
pub struct StudentAggregator<'a> {
    grades: &'a GradeTable,
}

impl<'a> StudentAggregator<'a> {
    pub fn new(grades: &'a GradeTable) -> Self {
        Self { grades }
    }

    /// 沒有任何成績紀錄時的總結（examCount = 0）
    pub fn empty(&self, student_id: &str) -> StudentSummary {
        self.aggregate(student_id, &[])
    }

    pub fn aggregate(&self, student_id: &str, records: &[MarkRecord]) -> StudentSummary {
        let mut total_obtained = 0.0;
        let mut total_max = 0.0;
        let mut excluded_count = 0;
        let mut grade_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut entries = Vec::with_capacity(records.len());

        for record in records {
            if !record.is_valid() {
                excluded_count += 1;
                tracing::warn!(
                    "⚠️ Excluding malformed mark record {} for student {} (obtained: {}, max: {})",
                    record.id,
                    student_id,
                    record.marks_obtained,
                    record.max_marks
                );
                continue;
            }

            total_obtained += record.marks_obtained;
            total_max += record.max_marks;

            let percentage = record.percentage();
            let computed = self.grades.grade_for(percentage);
            let grade = match record.stored_grade() {
                Some(stored) => {
                    if stored != computed {
                        tracing::debug!(
                            "Stored grade {} differs from computed {} on record {}",
                            stored,
                            computed,
                            record.id
                        );
                    }
                    stored.to_string()
                }
                None => computed.to_string(),
            };

            *grade_counts.entry(grade.clone()).or_insert(0) += 1;
            entries.push(GradedEntry {
                record_id: record.id.clone(),
                subject_id: record.subject_id.clone(),
                subject_name: record.subject_name.clone(),
                exam_type: record.exam_type.clone(),
                exam_date: record.exam_date,
                marks_obtained: record.marks_obtained,
                max_marks: record.max_marks,
                percentage,
                grade,
            });
        }

        let percentage = if total_max > 0.0 {
            (total_obtained / total_max) * 100.0
        } else {
            0.0
        };
        let exam_count = entries.len();
        let classification = self.grades.classify(percentage);

        StudentSummary {
            student_id: student_id.to_string(),
            total_obtained,
            total_max,
            percentage,
            grade: classification.grade,
            exam_count,
            grade_counts,
            passed: exam_count > 0 && classification.passed,
            excluded_count,
            entries,
        }
    }
}
