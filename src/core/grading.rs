use crate::utils::error::{EngineError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_unique_labels};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PASS_MARK: f64 = 40.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeBand {
    pub min_percentage: f64,
    pub label: String,
}

impl GradeBand {
    pub fn new(min_percentage: f64, label: impl Into<String>) -> Self {
        Self {
            min_percentage,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub grade: String,
    pub passed: bool,
}

/// 等第對照表，依門檻由高至低排列
///
/// 最後一個門檻為 0 的等第是不及格的兜底等第。及格判定與等第是兩條獨立規則，
/// 只由 `pass_mark` 決定。
#[derive(Debug, Clone, PartialEq)]
pub struct GradeTable {
    bands: Vec<GradeBand>,
    pass_mark: f64,
}

impl Default for GradeTable {
    fn default() -> Self {
        let bands = [
            (90.0, "A+"),
            (80.0, "A"),
            (70.0, "B+"),
            (60.0, "B"),
            (50.0, "C+"),
            (40.0, "C"),
            (0.0, "F"),
        ]
        .into_iter()
        .map(|(min, label)| GradeBand::new(min, label))
        .collect();

        Self {
            bands,
            pass_mark: DEFAULT_PASS_MARK,
        }
    }
}

impl GradeTable {
    pub fn new(mut bands: Vec<GradeBand>, pass_mark: f64) -> Result<Self> {
        if bands.is_empty() {
            return Err(EngineError::ConfigValidationError {
                field: "grading.bands".to_string(),
                message: "At least one grade band is required".to_string(),
            });
        }

        for band in &bands {
            validate_non_empty_string("grading.bands.label", &band.label)?;
            if !band.min_percentage.is_finite() {
                return Err(EngineError::InvalidConfigValueError {
                    field: "grading.bands.min_percentage".to_string(),
                    value: band.min_percentage.to_string(),
                    reason: "Threshold must be a finite number".to_string(),
                });
            }
            validate_range(
                "grading.bands.min_percentage",
                band.min_percentage,
                0.0,
                100.0,
            )?;
        }
        validate_unique_labels("grading.bands.label", bands.iter().map(|b| b.label.as_str()))?;
        validate_range("grading.pass_mark", pass_mark, 0.0, 100.0)?;

        bands.sort_by(|a, b| b.min_percentage.total_cmp(&a.min_percentage));

        let catch_all = bands.iter().filter(|b| b.min_percentage == 0.0).count();
        if catch_all != 1 {
            return Err(EngineError::ConfigValidationError {
                field: "grading.bands".to_string(),
                message: format!(
                    "Exactly one catch-all band with min_percentage = 0 is required, found {}",
                    catch_all
                ),
            });
        }

        Ok(Self { bands, pass_mark })
    }

    pub fn bands(&self) -> &[GradeBand] {
        &self.bands
    }

    pub fn pass_mark(&self) -> f64 {
        self.pass_mark
    }

    /// 第一個門檻小於等於百分比的等第；低於所有門檻（例如負值）時落在最低等第
    pub fn grade_for(&self, percentage: f64) -> &str {
        self.bands
            .iter()
            .find(|band| percentage >= band.min_percentage)
            .or_else(|| self.bands.last())
            .map(|band| band.label.as_str())
            .unwrap_or_default()
    }

    pub fn is_passing(&self, percentage: f64) -> bool {
        percentage >= self.pass_mark
    }

    pub fn classify(&self, percentage: f64) -> Classification {
        Classification {
            grade: self.grade_for(percentage).to_string(),
            passed: self.is_passing(percentage),
        }
    }

    /// 0 為最高等第
    pub fn rank(&self, label: &str) -> Option<usize> {
        self.bands.iter().position(|band| band.label == label)
    }
}

/// 顯示用：夾在 0..=100 並取一位小數，運算一律使用原始值
pub fn format_percentage(percentage: f64) -> String {
    if !percentage.is_finite() {
        return "0.0".to_string();
    }
    format!("{:.1}", percentage.clamp(0.0, 100.0))
}
