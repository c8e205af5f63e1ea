use super::TravelConfig;
use crate::utils::error::{Result, TravelError};
use regex::Regex;
use std::path::Path;

impl TravelConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TravelError::Io)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = substitute_env_vars(content)?;

        let mut config: TravelConfig =
            toml::from_str(&processed_content).map_err(|e| TravelError::ConfigValidation {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        config.drop_unresolved_credentials();
        Ok(config)
    }

    /// 沒有被替換的 `${VAR}` 金鑰視為未設定
    fn drop_unresolved_credentials(&mut self) {
        for key in [
            &mut self.credentials.places_api_key,
            &mut self.credentials.search_api_key,
        ] {
            if key.as_deref().is_some_and(is_placeholder) {
                *key = None;
            }
        }
    }
}

fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("${") && value.ends_with('}')
}

/// 替換環境變數 (例如 ${SERPAPI_API_KEY})
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TravelError::ConfigValidation {
        field: "env_substitution".to_string(),
        message: e.to_string(),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ConfigProvider;
    use crate::utils::validation::Validate;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[credentials]
places_api_key = "places-123"
search_api_key = "serp-456"

[endpoints]
geocode = "http://localhost:8080/geocode/json"
place_search = "http://localhost:8080/place/textsearch/json"
place_details = "http://localhost:8080/place/details/json"
search = "http://localhost:8080/search.json"

[timeouts]
places_secs = 5
search_secs = 20
"#;

        let config = TravelConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.places_api_key(), Some("places-123"));
        assert_eq!(config.search_api_key(), Some("serp-456"));
        assert_eq!(config.geocode_endpoint(), "http://localhost:8080/geocode/json");
        assert_eq!(config.places_timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = TravelConfig::from_toml_str("").unwrap();
        assert_eq!(config, TravelConfig::default());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TRIP_PLANNER_TEST_SEARCH_KEY", "serp-from-env");

        let toml_content = r#"
[credentials]
search_api_key = "${TRIP_PLANNER_TEST_SEARCH_KEY}"
places_api_key = "${TRIP_PLANNER_TEST_UNSET_KEY}"
"#;

        let config = TravelConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.search_api_key(), Some("serp-from-env"));
        assert!(config.places_api_key().is_none());

        std::env::remove_var("TRIP_PLANNER_TEST_SEARCH_KEY");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[endpoints]
geocode = "invalid-url"
"#;

        let config = TravelConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_reports_parsing_field() {
        let err = TravelConfig::from_toml_str("[timeouts\nplaces_secs = 1").unwrap_err();
        match err {
            TravelError::ConfigValidation { field, .. } => assert_eq!(field, "toml_parsing"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[timeouts]
search_secs = 45
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TravelConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.search_timeout(), Duration::from_secs(45));
        assert_eq!(config.places_timeout(), Duration::from_secs(10));
    }
}
