use chrono::{FixedOffset, TimeZone, Utc};
use results_engine::core::class::ClassAggregator;
use results_engine::core::filter::filter_records;
use results_engine::core::student::StudentAggregator;
use results_engine::domain::model::{ClassRef, FilterCriteria, MarkRecord, RecordsByStudent, Student};
use results_engine::{EngineSettings, GradeTable, InMemoryMarkRepository, ReportAssembler, ResultsEngine};
use std::collections::HashMap;
use std::sync::Arc;

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn mark(id: &str, student_id: &str, year: i32, obtained: f64, max: f64) -> MarkRecord {
    MarkRecord {
        id: id.to_string(),
        student_id: student_id.to_string(),
        class_id: "7A".to_string(),
        subject_id: format!("subject-{}", id),
        subject_name: format!("Subject {}", id),
        exam_type: "Final".to_string(),
        exam_date: Utc.with_ymd_and_hms(year, 11, 5, 9, 30, 0).unwrap(),
        marks_obtained: obtained,
        max_marks: max,
        grade: None,
        comments: None,
    }
}

fn student(id: &str, name: &str, roll: &str) -> Student {
    Student {
        id: id.to_string(),
        name: name.to_string(),
        roll_number: roll.to_string(),
        class_id: "7A".to_string(),
    }
}

/// Scenario A: 45/50 + 30/50
#[test]
fn test_student_with_two_records() {
    let table = GradeTable::default();
    let summary = StudentAggregator::new(&table).aggregate(
        "s1",
        &[mark("r1", "s1", 2023, 45.0, 50.0), mark("r2", "s1", 2023, 30.0, 50.0)],
    );

    assert_eq!(summary.total_obtained, 75.0);
    assert_eq!(summary.total_max, 100.0);
    assert_eq!(summary.percentage, 75.0);
    assert_eq!(summary.grade, "B+");
    assert!(summary.passed);
    assert_eq!(summary.exam_count, 2);
}

/// Scenario B: no records
#[test]
fn test_student_with_no_records() {
    let table = GradeTable::default();
    let summary = StudentAggregator::new(&table).aggregate("s1", &[]);

    assert_eq!(summary.percentage, 0.0);
    assert_eq!(summary.grade, "F");
    assert!(!summary.passed);
    assert_eq!(summary.exam_count, 0);
}

/// Scenario C: class of three, year filter removes all of one student's records
#[test]
fn test_year_filter_leaves_every_student_in_class() {
    let table = GradeTable::default();
    let students = vec![
        student("s1", "Amina", "01"),
        student("s2", "Bao", "02"),
        student("s3", "Chidi", "03"),
    ];
    let mut records = RecordsByStudent::new();
    records.insert("s1".to_string(), vec![mark("r1", "s1", 2023, 80.0, 100.0)]);
    records.insert("s2".to_string(), vec![mark("r2", "s2", 2022, 65.0, 100.0)]);

    let summary = ClassAggregator::new(&table, utc()).aggregate_class(
        "7A",
        &students,
        &records,
        &FilterCriteria::all().with_year("2023"),
    );

    assert_eq!(summary.per_student.len(), 3);
    assert_eq!(summary.per_student[0].exam_count, 1);
    assert_eq!(summary.per_student[1].exam_count, 0);
    assert_eq!(summary.per_student[2].exam_count, 0);
}

/// Scenario D: maxMarks = 0 is excluded everywhere
#[test]
fn test_zero_max_marks_record_is_excluded() {
    let table = GradeTable::default();
    let summary = StudentAggregator::new(&table).aggregate(
        "s1",
        &[mark("ok", "s1", 2023, 35.0, 50.0), mark("bad", "s1", 2023, 10.0, 0.0)],
    );

    assert_eq!(summary.total_max, 50.0);
    assert_eq!(summary.total_obtained, 35.0);
    assert_eq!(summary.grade_counts.values().sum::<usize>(), 1);
    assert_eq!(summary.excluded_count, 1);
}

/// Scenario E: per-record grades versus combined totals
#[test]
fn test_per_record_grading_is_independent_of_aggregate() {
    let table = GradeTable::default();
    let summary = StudentAggregator::new(&table).aggregate(
        "s1",
        &[mark("r1", "s1", 2023, 95.0, 100.0), mark("r2", "s1", 2023, 11.0, 20.0)],
    );

    let expected: Vec<(&str, usize)> = vec![("A+", 1), ("C+", 1)];
    let actual: Vec<(&str, usize)> = summary
        .grade_counts
        .iter()
        .map(|(grade, count)| (grade.as_str(), *count))
        .collect();
    assert_eq!(actual, expected);

    // 106 / 120, not the mean of 95% and 55%
    assert!((summary.percentage - 106.0 / 120.0 * 100.0).abs() < 1e-9);
    assert_eq!(summary.grade, "A");
}

#[test]
fn test_totals_equal_sums_of_valid_records() {
    let table = GradeTable::default();
    let records: Vec<MarkRecord> = (0..10)
        .map(|i| mark(&format!("r{}", i), "s1", 2023, i as f64 * 3.5, 40.0 + i as f64))
        .collect();
    let summary = StudentAggregator::new(&table).aggregate("s1", &records);

    let obtained: f64 = records.iter().map(|r| r.marks_obtained).sum();
    let max: f64 = records.iter().map(|r| r.max_marks).sum();
    assert_eq!(summary.total_obtained, obtained);
    assert_eq!(summary.total_max, max);
    assert_eq!(summary.exam_count, 10);
}

#[test]
fn test_filter_all_is_identity() {
    let records = vec![
        mark("r1", "s1", 2021, 10.0, 20.0),
        mark("r2", "s1", 2024, 15.0, 20.0),
    ];
    assert_eq!(
        filter_records(&records, &FilterCriteria::all().with_year("all"), utc()),
        records
    );
}

#[test]
fn test_report_assembly_is_deterministic() {
    let table = GradeTable::default();
    let students = vec![student("s1", "Amina", "01"), student("s2", "Bao", "02")];
    let by_id: HashMap<String, Student> = students.iter().map(|s| (s.id.clone(), s.clone())).collect();
    let mut records = RecordsByStudent::new();
    records.insert(
        "s1".to_string(),
        vec![mark("r1", "s1", 2023, 45.0, 50.0), mark("r2", "s1", 2023, 30.0, 50.0)],
    );
    records.insert("s2".to_string(), vec![mark("r3", "s2", 2023, 12.0, 50.0)]);
    let criteria = FilterCriteria::all();

    let render = || {
        let summary =
            ClassAggregator::new(&table, utc()).aggregate_class("7A", &students, &records, &criteria);
        ReportAssembler::assemble_class_report(&summary, &by_id, &criteria)
            .to_json_pretty()
            .unwrap()
    };

    assert_eq!(render(), render());
}

#[tokio::test]
async fn test_engine_end_to_end_with_in_memory_repository() {
    let repository = InMemoryMarkRepository::new()
        .with_class(ClassRef {
            id: "7A".to_string(),
            name: "Grade 7 A".to_string(),
            school_id: Some("north".to_string()),
        })
        .with_student(student("s1", "Amina", "01"))
        .with_student(student("s2", "Bao", "02"))
        .with_student(student("s3", "Chidi", "03"))
        .with_marks(
            "s1",
            vec![mark("r1", "s1", 2023, 45.0, 50.0), mark("r2", "s1", 2023, 30.0, 50.0)],
        )
        .with_marks("s2", vec![mark("r3", "s2", 2023, 12.0, 50.0)])
        .with_failing_student("s3");

    let engine = ResultsEngine::new(
        Arc::new(repository),
        GradeTable::default(),
        EngineSettings {
            concurrency: 2,
            ..EngineSettings::default()
        },
    );

    let report = engine
        .class_report("7A", &FilterCriteria::all().with_year("2023"))
        .await
        .unwrap();

    assert_eq!(report.summary.len(), 3);
    assert_eq!(report.details.len(), 2);
    assert_eq!(report.summary[1].grade, "F");
    assert_eq!(report.summary[1].exam_count, 1);
    assert_eq!(report.summary[2].exam_count, 0);
    assert_eq!(report.statistics.passed_count, 1);
    assert_eq!(report.statistics.failed_count, 1);
    assert_eq!(report.statistics.no_data_count, 1);
    assert_eq!(report.grade_distribution.values().sum::<usize>(), 3);
}
