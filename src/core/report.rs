use crate::core::grading::format_percentage;
use crate::domain::model::{ClassStatistics, ClassSummary, FilterCriteria, Student, StudentSummary};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultStatus {
    Passed,
    Failed,
    NoData,
}

impl ResultStatus {
    pub fn of(summary: &StudentSummary) -> Self {
        if !summary.has_data() {
            ResultStatus::NoData
        } else if summary.passed {
            ResultStatus::Passed
        } else {
            ResultStatus::Failed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub student_id: String,
    pub roll_number: String,
    pub name: String,
    pub exam_count: usize,
    pub total_obtained: f64,
    pub total_max: f64,
    pub percentage: f64,
    pub percentage_display: String,
    pub grade: String,
    pub status: ResultStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRow {
    pub subject: String,
    pub exam_type: String,
    pub exam_date: String,
    pub marks_obtained: f64,
    pub max_marks: f64,
    pub percentage: f64,
    pub percentage_display: String,
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsRow {
    pub total_obtained: f64,
    pub total_max: f64,
    pub percentage: f64,
    pub percentage_display: String,
    pub grade: String,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetail {
    pub student_id: String,
    pub roll_number: String,
    pub name: String,
    pub rows: Vec<DetailRow>,
    pub totals: TotalsRow,
}

/// 尚未渲染的班級報表：總表加上每位有資料學生的明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub class_id: String,
    pub criteria: FilterCriteria,
    pub summary: Vec<SummaryRow>,
    pub details: Vec<StudentDetail>,
    pub grade_distribution: BTreeMap<String, usize>,
    pub student_grade_distribution: BTreeMap<String, usize>,
    pub statistics: ClassStatistics,
}

impl Report {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct ReportAssembler;

impl ReportAssembler {
    /// 相同輸入必定產生相同輸出；名冊中缺少的學生以 id 代替姓名
    pub fn assemble_class_report(
        class_summary: &ClassSummary,
        students_by_id: &HashMap<String, Student>,
        criteria: &FilterCriteria,
    ) -> Report {
        let mut summary = Vec::with_capacity(class_summary.per_student.len());
        let mut details = Vec::new();

        for student_summary in &class_summary.per_student {
            let (roll_number, name) = match students_by_id.get(&student_summary.student_id) {
                Some(student) => (student.roll_number.clone(), student.name.clone()),
                None => (String::new(), student_summary.student_id.clone()),
            };

            summary.push(SummaryRow {
                student_id: student_summary.student_id.clone(),
                roll_number: roll_number.clone(),
                name: name.clone(),
                exam_count: student_summary.exam_count,
                total_obtained: student_summary.total_obtained,
                total_max: student_summary.total_max,
                percentage: student_summary.percentage,
                percentage_display: format_percentage(student_summary.percentage),
                grade: student_summary.grade.clone(),
                status: ResultStatus::of(student_summary),
            });

            if student_summary.has_data() {
                details.push(Self::detail_for(student_summary, roll_number, name));
            }
        }

        Report {
            class_id: class_summary.class_id.clone(),
            criteria: criteria.clone(),
            summary,
            details,
            grade_distribution: class_summary.grade_distribution.clone(),
            student_grade_distribution: class_summary.student_grade_distribution.clone(),
            statistics: class_summary.statistics.clone(),
        }
    }

    fn detail_for(summary: &StudentSummary, roll_number: String, name: String) -> StudentDetail {
        let rows = summary
            .entries
            .iter()
            .map(|entry| DetailRow {
                subject: entry.subject_name.clone(),
                exam_type: entry.exam_type.clone(),
                exam_date: entry.exam_date.format("%Y-%m-%d").to_string(),
                marks_obtained: entry.marks_obtained,
                max_marks: entry.max_marks,
                percentage: entry.percentage,
                percentage_display: format_percentage(entry.percentage),
                grade: entry.grade.clone(),
            })
            .collect();

        StudentDetail {
            student_id: summary.student_id.clone(),
            roll_number,
            name,
            rows,
            totals: TotalsRow {
                total_obtained: summary.total_obtained,
                total_max: summary.total_max,
                percentage: summary.percentage,
                percentage_display: format_percentage(summary.percentage),
                grade: summary.grade.clone(),
                passed: summary.passed,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::class::ClassAggregator;
    use crate::core::grading::GradeTable;
    use crate::domain::model::{MarkRecord, RecordsByStudent};
    use chrono::{FixedOffset, TimeZone, Utc};

    fn students() -> Vec<Student> {
        vec![
            Student {
                id: "s1".to_string(),
                name: "Amina".to_string(),
                roll_number: "01".to_string(),
                class_id: "c1".to_string(),
            },
            Student {
                id: "s2".to_string(),
                name: "Bao".to_string(),
                roll_number: "02".to_string(),
                class_id: "c1".to_string(),
            },
        ]
    }

    fn records() -> RecordsByStudent {
        let mut map = RecordsByStudent::new();
        map.insert(
            "s1".to_string(),
            vec![
                MarkRecord {
                    id: "r1".to_string(),
                    student_id: "s1".to_string(),
                    class_id: "c1".to_string(),
                    subject_id: "eng".to_string(),
                    subject_name: "English".to_string(),
                    exam_type: "Midterm".to_string(),
                    exam_date: Utc.with_ymd_and_hms(2023, 3, 2, 9, 0, 0).unwrap(),
                    marks_obtained: 45.0,
                    max_marks: 50.0,
                    grade: None,
                    comments: None,
                },
                MarkRecord {
                    id: "r2".to_string(),
                    student_id: "s1".to_string(),
                    class_id: "c1".to_string(),
                    subject_id: "math".to_string(),
                    subject_name: "Mathematics".to_string(),
                    exam_type: "Midterm".to_string(),
                    exam_date: Utc.with_ymd_and_hms(2023, 3, 4, 9, 0, 0).unwrap(),
                    marks_obtained: 30.0,
                    max_marks: 50.0,
                    grade: None,
                    comments: Some("needs practice".to_string()),
                },
            ],
        );
        map
    }

    fn build() -> Report {
        let table = GradeTable::default();
        let students = students();
        let by_id: HashMap<String, Student> =
            students.iter().map(|s| (s.id.clone(), s.clone())).collect();
        let criteria = FilterCriteria::all();
        let class_summary = ClassAggregator::new(&table, FixedOffset::east_opt(0).unwrap())
            .aggregate_class("c1", &students, &records(), &criteria);
        ReportAssembler::assemble_class_report(&class_summary, &by_id, &criteria)
    }

    #[test]
    fn test_summary_has_every_student_and_details_skip_no_data() {
        let report = build();

        assert_eq!(report.summary.len(), 2);
        assert_eq!(report.summary[0].roll_number, "01");
        assert_eq!(report.summary[0].status, ResultStatus::Passed);
        assert_eq!(report.summary[1].status, ResultStatus::NoData);
        assert_eq!(report.summary[1].exam_count, 0);

        assert_eq!(report.details.len(), 1);
        assert_eq!(report.details[0].student_id, "s1");
    }

    #[test]
    fn test_detail_rows_and_totals_match_summary() {
        let report = build();
        let detail = &report.details[0];

        assert_eq!(detail.rows.len(), 2);
        assert_eq!(detail.rows[0].subject, "English");
        assert_eq!(detail.rows[0].exam_date, "2023-03-02");
        assert_eq!(detail.rows[0].percentage_display, "90.0");
        assert_eq!(detail.rows[0].grade, "A+");
        assert_eq!(detail.rows[1].grade, "B");

        assert_eq!(detail.totals.total_obtained, 75.0);
        assert_eq!(detail.totals.total_max, 100.0);
        assert_eq!(detail.totals.percentage_display, "75.0");
        assert_eq!(detail.totals.grade, "B+");
        assert!(detail.totals.passed);
    }

    #[test]
    fn test_report_is_deterministic() {
        let first = build().to_json_pretty().unwrap();
        let second = build().to_json_pretty().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_student_falls_back_to_id() {
        let table = GradeTable::default();
        let students = students();
        let criteria = FilterCriteria::all();
        let class_summary = ClassAggregator::new(&table, FixedOffset::east_opt(0).unwrap())
            .aggregate_class("c1", &students, &records(), &criteria);
        let report = ReportAssembler::assemble_class_report(&class_summary, &HashMap::new(), &criteria);

        assert_eq!(report.summary[0].name, "s1");
        assert_eq!(report.summary[0].roll_number, "");
    }
}
