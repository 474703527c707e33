use crate::core::filter::RecordFilter;
use crate::core::grading::GradeTable;
use crate::core::student::StudentAggregator;
use crate::domain::model::{
    ClassStatistics, ClassSummary, FilterCriteria, RecordsByStudent, Student, StudentSummary,
};
use chrono::FixedOffset;
use std::collections::BTreeMap;

/// 對班上每位學生套用篩選與彙整，產生班級總結
pub struct ClassAggregator<'a> {
    grades: &'a GradeTable,
    offset: FixedOffset,
}

impl<'a> ClassAggregator<'a> {
    pub fn new(grades: &'a GradeTable, offset: FixedOffset) -> Self {
        Self { grades, offset }
    }

    /// `per_student` 與 `students` 順序一致；不在 `records_by_student` 中的學生以無資料呈現
    pub fn aggregate_class(
        &self,
        class_id: &str,
        students: &[Student],
        records_by_student: &RecordsByStudent,
        criteria: &FilterCriteria,
    ) -> ClassSummary {
        let filter = RecordFilter::new(criteria, self.offset);
        let aggregator = StudentAggregator::new(self.grades);

        let per_student: Vec<StudentSummary> = students
            .iter()
            .map(|student| match records_by_student.get(&student.id) {
                Some(records) => aggregator.aggregate(&student.id, &filter.apply(records)),
                None => aggregator.empty(&student.id),
            })
            .collect();

        let grade_distribution = entry_distribution(&per_student);
        let student_grade_distribution = student_distribution(&per_student);
        let statistics = class_statistics(&per_student);

        tracing::debug!(
            "Aggregated class {}: {} students, {} with data",
            class_id,
            statistics.student_count,
            statistics.students_with_data
        );

        ClassSummary {
            class_id: class_id.to_string(),
            per_student,
            grade_distribution,
            student_grade_distribution,
            statistics,
            unavailable_students: Vec::new(),
        }
    }
}

/// 全班所有考試紀錄的等第分佈
pub fn entry_distribution(summaries: &[StudentSummary]) -> BTreeMap<String, usize> {
    let mut distribution = BTreeMap::new();
    for summary in summaries.iter().filter(|s| s.has_data()) {
        for (grade, count) in &summary.grade_counts {
            *distribution.entry(grade.clone()).or_insert(0) += count;
        }
    }
    distribution
}

/// 有資料學生的總成績等第分佈
pub fn student_distribution(summaries: &[StudentSummary]) -> BTreeMap<String, usize> {
    let mut distribution = BTreeMap::new();
    for summary in summaries.iter().filter(|s| s.has_data()) {
        *distribution.entry(summary.grade.clone()).or_insert(0) += 1;
    }
    distribution
}

pub fn class_statistics(summaries: &[StudentSummary]) -> ClassStatistics {
    let with_data: Vec<&StudentSummary> = summaries.iter().filter(|s| s.has_data()).collect();
    let passed_count = with_data.iter().filter(|s| s.passed).count();
    let students_with_data = with_data.len();

    let (pass_rate, average_percentage) = if students_with_data > 0 {
        let total: f64 = with_data.iter().map(|s| s.percentage).sum();
        (
            passed_count as f64 / students_with_data as f64 * 100.0,
            total / students_with_data as f64,
        )
    } else {
        (0.0, 0.0)
    };

    ClassStatistics {
        student_count: summaries.len(),
        students_with_data,
        passed_count,
        failed_count: students_with_data - passed_count,
        no_data_count: summaries.len() - students_with_data,
        pass_rate,
        average_percentage,
        highest_percentage: with_data.iter().map(|s| s.percentage).reduce(f64::max),
        lowest_percentage: with_data.iter().map(|s| s.percentage).reduce(f64::min),
    }
}
