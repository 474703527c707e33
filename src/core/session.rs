use crate::core::engine::ResultsEngine;
use crate::core::report::Report;
use crate::domain::model::FilterCriteria;
use crate::domain::ports::MarkRepository;
use crate::utils::error::{EngineError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::task::AbortHandle;

/// 呈現層的報表工作階段：新的篩選條件會取代仍在執行的舊請求
///
/// 每次 `run` 都會遞增 generation 並中止前一個背景工作。被取代的請求回傳
/// `EngineError::Superseded`，其結果永遠不會寫入 `latest`。
pub struct ReportSession<R: MarkRepository + ?Sized + 'static> {
    engine: ResultsEngine<R>,
    generation: AtomicU64,
    in_flight: Mutex<Option<(u64, AbortHandle)>>,
    latest: Mutex<Option<(u64, Report)>>,
}

impl<R: MarkRepository + ?Sized + 'static> ReportSession<R> {
    pub fn new(engine: ResultsEngine<R>) -> Self {
        Self {
            engine,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
            latest: Mutex::new(None),
        }
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// 最近一次成功、且未被取代的報表
    pub fn latest(&self) -> Option<Report> {
        let latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        latest.as_ref().map(|(_, report)| report.clone())
    }

    pub async fn run(&self, class_id: &str, criteria: FilterCriteria) -> Result<Report> {
        let log_criteria = format!("{:?}", criteria);
        let engine = self.engine.clone();
        let owned_class_id = class_id.to_string();
        let handle =
            tokio::spawn(async move { engine.class_report(&owned_class_id, &criteria).await });

        // generation 與 in-flight 工作必須在同一把鎖內一起更新
        let generation = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((previous_generation, previous)) =
                in_flight.replace((generation, handle.abort_handle()))
            {
                if previous_generation < generation {
                    previous.abort();
                }
            }
            generation
        };
        tracing::info!(
            "📋 Report request #{} for class {} with {}",
            generation,
            class_id,
            log_criteria
        );

        let report = match handle.await {
            Ok(result) => result?,
            Err(e) if e.is_cancelled() => {
                tracing::debug!("Report request #{} was cancelled", generation);
                return Err(EngineError::Superseded { generation });
            }
            Err(e) => {
                return Err(EngineError::TaskError {
                    message: e.to_string(),
                })
            }
        };

        let mut latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("Discarding stale report #{}", generation);
            return Err(EngineError::Superseded { generation });
        }
        *latest = Some((generation, report.clone()));

        Ok(report)
    }
}
