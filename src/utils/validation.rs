use crate::utils::error::{EngineError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EngineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EngineError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EngineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EngineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(EngineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 年份篩選值必須是 "all" 或四位數年份
pub fn validate_year_filter(field_name: &str, value: &str) -> Result<()> {
    if value.eq_ignore_ascii_case("all") {
        return Ok(());
    }
    if value.len() == 4 && value.chars().all(|c| c.is_ascii_digit()) {
        return Ok(());
    }
    Err(EngineError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: "Year must be a 4-digit year or \"all\"".to_string(),
    })
}

pub fn validate_unique_labels<'a, I>(field_name: &str, labels: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for label in labels {
        if !seen.insert(label) {
            return Err(EngineError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: label.to_string(),
                reason: "Duplicate label".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("repository.base_url", "https://example.com").is_ok());
        assert!(validate_url("repository.base_url", "http://example.com/api").is_ok());
        assert!(validate_url("repository.base_url", "").is_err());
        assert!(validate_url("repository.base_url", "invalid-url").is_err());
        assert!(validate_url("repository.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("engine.concurrency", 8, 1, 64).is_ok());
        assert!(validate_range("engine.concurrency", 0, 1, 64).is_err());
        assert!(validate_range("engine.concurrency", 65, 1, 64).is_err());
    }

    #[test]
    fn test_validate_year_filter() {
        assert!(validate_year_filter("year", "2023").is_ok());
        assert!(validate_year_filter("year", "all").is_ok());
        assert!(validate_year_filter("year", "ALL").is_ok());
        assert!(validate_year_filter("year", "23").is_err());
        assert!(validate_year_filter("year", "20x3").is_err());
    }

    #[test]
    fn test_validate_unique_labels() {
        assert!(validate_unique_labels("grading.bands", ["A", "B", "F"]).is_ok());
        assert!(validate_unique_labels("grading.bands", ["A", "A", "F"]).is_err());
    }
}
