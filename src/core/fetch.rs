use crate::domain::model::{MarkRecord, RecordsByStudent};
use crate::domain::ports::MarkRepository;
use crate::utils::error::{EngineError, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const DEFAULT_CONCURRENCY: usize = 8;

/// 批次讀取結果：成功的學生放入 `records`，失敗的只記錄 id
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: RecordsByStudent,
    pub failed: Vec<String>,
}

/// 以固定寬度的並發讀取每位學生的成績
///
/// 單一學生失敗不影響其他學生；`failed` 依輸入順序排列。讀取工作放在
/// `JoinSet` 中，呼叫端的 future 被丟棄時尚未完成的讀取會一併中止。
pub async fn fetch_records_bounded<R>(
    repository: Arc<R>,
    student_ids: &[String],
    width: usize,
) -> FetchOutcome
where
    R: MarkRepository + ?Sized + 'static,
{
    let semaphore = Arc::new(Semaphore::new(width.max(1)));
    let mut tasks = JoinSet::new();

    for (index, student_id) in student_ids.iter().enumerate() {
        let semaphore = semaphore.clone();
        let repository = repository.clone();
        let id = student_id.clone();

        tasks.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    let error = EngineError::TaskError {
                        message: format!("Fetch pool closed: {}", e),
                    };
                    return (index, Err(error));
                }
            };
            tracing::debug!("📡 Fetching marks for student {}", id);
            (index, repository.get_marks_by_student(&id).await)
        });
    }

    let mut results: Vec<Option<Result<Vec<MarkRecord>>>> =
        student_ids.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => results[index] = Some(result),
            Err(e) => tracing::error!("❌ Fetch task did not complete: {}", e),
        }
    }

    let mut outcome = FetchOutcome::default();
    for (student_id, result) in student_ids.iter().zip(results) {
        match result {
            Some(Ok(records)) => {
                tracing::debug!("Fetched {} records for student {}", records.len(), student_id);
                outcome.records.insert(student_id.clone(), records);
            }
            Some(Err(e)) => {
                tracing::warn!("⚠️ Marks unavailable for student {}: {}", student_id, e);
                outcome.failed.push(student_id.clone());
            }
            None => outcome.failed.push(student_id.clone()),
        }
    }

    outcome
}
