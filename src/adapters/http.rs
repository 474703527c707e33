use crate::domain::model::{ClassRef, MarkRecord, Student};
use crate::domain::ports::MarkRepository;
use crate::utils::error::{EngineError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// 透過 REST 後端讀取成績的 MarkRepository
///
/// 路由：
/// - `GET {base}/students/{id}/marks`
/// - `GET {base}/classes/{id}/students`
/// - `GET {base}/schools/{id}/classes`
///
/// 回應可以是 JSON 陣列，或是帶有 `data` 陣列的物件。
#[derive(Debug, Clone)]
pub struct HttpMarkRepository {
    base_url: Url,
    client: Client,
}

impl HttpMarkRepository {
    pub fn new(base_url: &str, timeout: Duration, headers: &HashMap<String, String>) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| EngineError::InvalidConfigValueError {
            field: "repository.base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                EngineError::ConfigValidationError {
                    field: format!("repository.headers.{}", name),
                    message: format!("Invalid header name: {}", e),
                }
            })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| EngineError::ConfigValidationError {
                    field: format!("repository.headers.{}", name),
                    message: format!("Invalid header value: {}", e),
                })?;
            header_map.insert(header_name, header_value);
        }

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(header_map)
            .build()?;

        Ok(Self { base_url, client })
    }

    pub fn with_defaults(base_url: &str) -> Result<Self> {
        Self::new(
            base_url,
            Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            &HashMap::new(),
        )
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| EngineError::ConfigError {
                message: format!("Base URL cannot be a base: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_list<T: DeserializeOwned>(&self, url: Url, entity: &str, id: &str) -> Result<Vec<T>> {
        tracing::debug!("Making API request to: {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status == StatusCode::NOT_FOUND {
            return Err(EngineError::not_found(entity, id));
        }
        if !status.is_success() {
            return Err(EngineError::repository(format!(
                "{} {} returned HTTP {}",
                entity, id, status
            )));
        }

        let body: serde_json::Value = response.json().await?;
        let items = match body {
            array @ serde_json::Value::Array(_) => array,
            serde_json::Value::Object(mut obj) => match obj.remove("data") {
                Some(data @ serde_json::Value::Array(_)) => data,
                _ => {
                    return Err(EngineError::repository(format!(
                        "Unexpected response shape for {} {}",
                        entity, id
                    )))
                }
            },
            serde_json::Value::Null => serde_json::Value::Array(Vec::new()),
            _ => {
                return Err(EngineError::repository(format!(
                    "Unexpected response shape for {} {}",
                    entity, id
                )))
            }
        };

        Ok(serde_json::from_value(items)?)
    }
}

#[async_trait]
impl MarkRepository for HttpMarkRepository {
    async fn get_marks_by_student(&self, student_id: &str) -> Result<Vec<MarkRecord>> {
        let url = self.endpoint(&["students", student_id, "marks"])?;
        self.get_list(url, "student", student_id).await
    }

    async fn get_students_by_class(&self, class_id: &str) -> Result<Vec<Student>> {
        let url = self.endpoint(&["classes", class_id, "students"])?;
        self.get_list(url, "class", class_id).await
    }

    async fn get_classes_by_school(&self, school_id: &str) -> Result<Vec<ClassRef>> {
        let url = self.endpoint(&["schools", school_id, "classes"])?;
        self.get_list(url, "school", school_id).await
    }
}
