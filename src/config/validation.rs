//! Configuration validation
//!
//! Checks the settings that would otherwise only fail on the first API call:
//! - Instance URLs are present and absolute
//! - Link type and done status are not empty
//! - Feature and task labels are distinct

use super::glue_config::GlueConfig;
use crate::GlueError;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

fn check_url(field: &str, url: &str, errors: &mut Vec<ValidationError>) {
    if url.trim().is_empty() {
        errors.push(ValidationError::new(field, "URL is required"));
    } else if !url.starts_with("https://") && !url.starts_with("http://") {
        errors.push(ValidationError::new(
            field,
            format!("URL must start with http:// or https://: {}", url),
        ));
    }
}

/// Validate a jira-glue configuration
pub fn validate_config(config: &GlueConfig) -> ValidationResult {
    let mut errors = Vec::new();

    check_url("github.url", &config.github.url, &mut errors);
    check_url("jira.url", &config.jira.url, &mut errors);

    if config.jira.link_type.trim().is_empty() {
        errors.push(ValidationError::new("jira.link_type", "Link type is required"));
    }
    if config.jira.done_status.trim().is_empty() {
        errors.push(ValidationError::new("jira.done_status", "Done status is required"));
    }
    if config.labels.feature.trim().is_empty() {
        errors.push(ValidationError::new("labels.feature", "Feature label is required"));
    }
    if config.labels.feature.eq_ignore_ascii_case(&config.labels.task) {
        errors.push(ValidationError::new(
            "labels.task",
            "Task label must differ from the feature label",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate and fold all errors into one `GlueError::Config`
pub fn validate_config_result(config: &GlueConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        GlueError::Config(format!(
            "Configuration validation failed:\n  - {}",
            messages.join("\n  - ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> GlueConfig {
        let mut config = GlueConfig::new();
        config.jira.url = "https://example.atlassian.net".to_string();
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_missing_jira_url() {
        let errors = validate_config(&GlueConfig::new()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "jira.url");
    }

    #[test]
    fn test_relative_url_rejected() {
        let mut config = valid();
        config.github.url = "github.example.com".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "github.url");
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.jira.link_type = " ".to_string();
        config.labels.task = "Feature".to_string();

        let err = validate_config_result(&config).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("jira.link_type"));
        assert!(msg.contains("labels.task"));
    }
}
