#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, non_blank, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const PLACES_KEY_ENV: &str = "GOOGLE_PLACES_API_KEY";
pub const SEARCH_KEY_ENV: &str = "SERPAPI_API_KEY";

pub const DEFAULT_GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const DEFAULT_PLACE_SEARCH_ENDPOINT: &str =
    "https://maps.googleapis.com/maps/api/place/textsearch/json";
pub const DEFAULT_PLACE_DETAILS_ENDPOINT: &str =
    "https://maps.googleapis.com/maps/api/place/details/json";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://serpapi.com/search.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TravelConfig {
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// 地圖／地點服務的金鑰
    pub places_api_key: Option<String>,
    /// 航班／飯店搜尋服務的金鑰
    pub search_api_key: Option<String>,
}

// 金鑰不進日誌
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("places_api_key", &mask(&self.places_api_key))
            .field("search_api_key", &mask(&self.search_api_key))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub geocode: String,
    pub place_search: String,
    pub place_details: String,
    pub search: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            geocode: DEFAULT_GEOCODE_ENDPOINT.to_string(),
            place_search: DEFAULT_PLACE_SEARCH_ENDPOINT.to_string(),
            place_details: DEFAULT_PLACE_DETAILS_ENDPOINT.to_string(),
            search: DEFAULT_SEARCH_ENDPOINT.to_string(),
        }
    }
}

impl EndpointConfig {
    /// 所有端點都指向同一個 base URL（測試用的 mock server）
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            geocode: format!("{}/geocode/json", base),
            place_search: format!("{}/place/textsearch/json", base),
            place_details: format!("{}/place/details/json", base),
            search: format!("{}/search.json", base),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub places_secs: u64,
    pub search_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            places_secs: 10,
            search_secs: 30,
        }
    }
}

impl TravelConfig {
    /// 從環境變數讀取金鑰，其餘使用預設值
    pub fn from_env() -> Self {
        Self {
            credentials: Credentials {
                places_api_key: std::env::var(PLACES_KEY_ENV).ok(),
                search_api_key: std::env::var(SEARCH_KEY_ENV).ok(),
            },
            ..Self::default()
        }
    }

    pub fn with_endpoints(mut self, endpoints: EndpointConfig) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_places_api_key(mut self, key: impl Into<String>) -> Self {
        self.credentials.places_api_key = Some(key.into());
        self
    }

    pub fn with_search_api_key(mut self, key: impl Into<String>) -> Self {
        self.credentials.search_api_key = Some(key.into());
        self
    }
}

impl ConfigProvider for TravelConfig {
    fn places_api_key(&self) -> Option<&str> {
        non_blank(self.credentials.places_api_key.as_deref())
    }

    fn search_api_key(&self) -> Option<&str> {
        non_blank(self.credentials.search_api_key.as_deref())
    }

    fn geocode_endpoint(&self) -> &str {
        &self.endpoints.geocode
    }

    fn place_search_endpoint(&self) -> &str {
        &self.endpoints.place_search
    }

    fn place_details_endpoint(&self) -> &str {
        &self.endpoints.place_details
    }

    fn search_endpoint(&self) -> &str {
        &self.endpoints.search
    }

    fn places_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.places_secs)
    }

    fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.search_secs)
    }
}

impl Validate for TravelConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("endpoints.geocode", &self.endpoints.geocode)?;
        validation::validate_url("endpoints.place_search", &self.endpoints.place_search)?;
        validation::validate_url("endpoints.place_details", &self.endpoints.place_details)?;
        validation::validate_url("endpoints.search", &self.endpoints.search)?;
        validation::validate_positive_number("timeouts.places_secs", self.timeouts.places_secs, 1)?;
        validation::validate_positive_number("timeouts.search_secs", self.timeouts.search_secs, 1)?;
        Ok(())
    }
}
