use crate::core::class::ClassAggregator;
use crate::core::fetch::{fetch_records_bounded, DEFAULT_CONCURRENCY};
use crate::core::filter::RecordFilter;
use crate::core::grading::GradeTable;
use crate::core::report::{Report, ReportAssembler};
use crate::core::student::StudentAggregator;
use crate::domain::model::{ClassRef, ClassSummary, FilterCriteria, Student, StudentSummary};
use crate::domain::ports::{ConfigProvider, MarkRepository};
use crate::utils::error::Result;
use chrono::{FixedOffset, Offset, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub concurrency: usize,
    pub reporting_offset: FixedOffset,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            reporting_offset: Utc.fix(),
        }
    }
}

/// 給呈現層使用的成績查詢入口，本身不持有任何可變狀態
pub struct ResultsEngine<R: MarkRepository + ?Sized> {
    repository: Arc<R>,
    grades: Arc<GradeTable>,
    settings: EngineSettings,
}

impl<R: MarkRepository + ?Sized> Clone for ResultsEngine<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            grades: self.grades.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<R: MarkRepository + ?Sized + 'static> ResultsEngine<R> {
    pub fn new(repository: Arc<R>, grades: GradeTable, settings: EngineSettings) -> Self {
        Self {
            repository,
            grades: Arc::new(grades),
            settings,
        }
    }

    pub fn from_config<C: ConfigProvider>(repository: Arc<R>, config: &C) -> Result<Self> {
        let settings = EngineSettings {
            concurrency: config.concurrency(),
            reporting_offset: config.reporting_offset(),
        };
        Ok(Self::new(repository, config.grade_table()?, settings))
    }

    pub fn grades(&self) -> &GradeTable {
        &self.grades
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// 單一學生查詢：讀取失敗無法產生任何總結，因此直接回傳錯誤
    pub async fn student_summary(
        &self,
        student_id: &str,
        criteria: &FilterCriteria,
    ) -> Result<StudentSummary> {
        let records = self.repository.get_marks_by_student(student_id).await?;
        let filtered = RecordFilter::new(criteria, self.settings.reporting_offset).apply(&records);

        tracing::debug!(
            "Student {}: {} of {} records match {:?}",
            student_id,
            filtered.len(),
            records.len(),
            criteria
        );

        Ok(StudentAggregator::new(&self.grades).aggregate(student_id, &filtered))
    }

    pub async fn class_summary(
        &self,
        class_id: &str,
        criteria: &FilterCriteria,
    ) -> Result<ClassSummary> {
        let (_, summary) = self.load_class(class_id, criteria).await?;
        Ok(summary)
    }

    pub async fn class_report(&self, class_id: &str, criteria: &FilterCriteria) -> Result<Report> {
        let (students, summary) = self.load_class(class_id, criteria).await?;
        let students_by_id: HashMap<String, Student> = students
            .into_iter()
            .map(|student| (student.id.clone(), student))
            .collect();

        Ok(ReportAssembler::assemble_class_report(
            &summary,
            &students_by_id,
            criteria,
        ))
    }

    pub async fn list_classes(&self, school_id: &str) -> Result<Vec<ClassRef>> {
        self.repository.get_classes_by_school(school_id).await
    }

    /// 班級名冊讀不到時回傳錯誤；個別學生讀取失敗則降級為無資料
    async fn load_class(
        &self,
        class_id: &str,
        criteria: &FilterCriteria,
    ) -> Result<(Vec<Student>, ClassSummary)> {
        let started = Instant::now();
        tracing::info!("🚀 Aggregating results for class {}", class_id);

        let students = self.repository.get_students_by_class(class_id).await?;
        let student_ids: Vec<String> = students.iter().map(|s| s.id.clone()).collect();

        let outcome = fetch_records_bounded(
            self.repository.clone(),
            &student_ids,
            self.settings.concurrency,
        )
        .await;

        let mut summary = ClassAggregator::new(&self.grades, self.settings.reporting_offset)
            .aggregate_class(class_id, &students, &outcome.records, criteria);
        summary.unavailable_students = outcome.failed;

        if !summary.unavailable_students.is_empty() {
            tracing::warn!(
                "⚠️ Class {}: {} students degraded to no data after fetch failures",
                class_id,
                summary.unavailable_students.len()
            );
        }
        tracing::info!(
            "✅ Class {} aggregated: {} students in {:?}",
            class_id,
            summary.per_student.len(),
            started.elapsed()
        );

        Ok((students, summary))
    }
}
