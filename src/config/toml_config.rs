use crate::adapters::http::{HttpMarkRepository, DEFAULT_TIMEOUT_SECONDS};
use crate::core::fetch::DEFAULT_CONCURRENCY;
use crate::core::grading::{GradeBand, GradeTable, DEFAULT_PASS_MARK};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EngineError, Result};
use crate::utils::validation::{validate_range, validate_url, Validate};
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const MAX_CONCURRENCY: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub repository: RepositoryConfig,
    pub engine: Option<EngineConfig>,
    pub grading: Option<GradingConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub concurrency: Option<usize>,
    pub reporting_utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradingConfig {
    pub pass_mark: Option<f64>,
    pub bands: Option<Vec<GradeBandConfig>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeBandConfig {
    pub min_percentage: f64,
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EngineError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EngineError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_TOKEN})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EngineError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("repository.base_url", &self.repository.base_url)?;

        if let Some(timeout) = self.repository.timeout_seconds {
            validate_range("repository.timeout_seconds", timeout, 1, 600)?;
        }

        if let Some(engine) = &self.engine {
            if let Some(concurrency) = engine.concurrency {
                validate_range("engine.concurrency", concurrency, 1, MAX_CONCURRENCY)?;
            }
            if let Some(offset) = engine.reporting_utc_offset_minutes {
                validate_range("engine.reporting_utc_offset_minutes", offset, -720, 840)?;
            }
        }

        if let Some(level) = self.logging.as_ref().and_then(|l| l.level.as_deref()) {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level) {
                return Err(EngineError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        // 等第表在建構時驗證
        self.build_grade_table()?;

        Ok(())
    }

    pub fn concurrency(&self) -> usize {
        self.engine
            .as_ref()
            .and_then(|e| e.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY)
    }

    pub fn set_concurrency(&mut self, concurrency: usize) {
        self.engine.get_or_insert_with(EngineConfig::default).concurrency = Some(concurrency);
    }

    pub fn reporting_offset(&self) -> FixedOffset {
        self.engine
            .as_ref()
            .and_then(|e| e.reporting_utc_offset_minutes)
            .and_then(|minutes| minutes.checked_mul(60))
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.repository
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        )
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    pub fn build_grade_table(&self) -> Result<GradeTable> {
        let grading = self.grading.clone().unwrap_or_default();
        let pass_mark = grading.pass_mark.unwrap_or(DEFAULT_PASS_MARK);

        match grading.bands {
            Some(bands) => GradeTable::new(
                bands
                    .into_iter()
                    .map(|b| GradeBand::new(b.min_percentage, b.label))
                    .collect(),
                pass_mark,
            ),
            None => GradeTable::new(GradeTable::default().bands().to_vec(), pass_mark),
        }
    }

    pub fn build_repository(&self) -> Result<HttpMarkRepository> {
        let headers = self.repository.headers.clone().unwrap_or_default();
        HttpMarkRepository::new(&self.repository.base_url, self.timeout(), &headers)
    }
}

impl ConfigProvider for TomlConfig {
    fn concurrency(&self) -> usize {
        self.concurrency()
    }

    fn reporting_offset(&self) -> FixedOffset {
        self.reporting_offset()
    }

    fn grade_table(&self) -> Result<GradeTable> {
        self.build_grade_table()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
