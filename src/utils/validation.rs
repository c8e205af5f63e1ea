use crate::utils::error::{Result, TravelError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(TravelError::ConfigValidation {
            field: field_name.to_string(),
            message: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(TravelError::ConfigValidation {
                field: field_name.to_string(),
                message: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(TravelError::ConfigValidation {
            field: field_name.to_string(),
            message: format!("Invalid URL format '{}': {}", url_str, e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(TravelError::ConfigValidation {
            field: field_name.to_string(),
            message: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TravelError::InvalidField {
            field: field_name.to_string(),
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
        return Err(TravelError::InvalidField {
            field: field_name.to_string(),
            reason: format!("{} is outside {}..={}", value, min, max),
        });
    }
    Ok(())
}

pub fn validate_party_size(party_size: u32) -> Result<()> {
    if party_size == 0 {
        return Err(TravelError::InvalidField {
            field: "party_size".to_string(),
            reason: "at least one traveller is required".to_string(),
        });
    }
    Ok(())
}

/// 空白字串視為未設定
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("endpoints.geocode", "https://maps.googleapis.com").is_ok());
        assert!(validate_url("endpoints.geocode", "http://127.0.0.1:8080/geo").is_ok());
        assert!(validate_url("endpoints.geocode", "").is_err());
        assert!(validate_url("endpoints.geocode", "invalid-url").is_err());
        assert!(validate_url("endpoints.geocode", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("timeouts.places_secs", 10, 1).is_ok());
        assert!(validate_positive_number("timeouts.places_secs", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("radius_meters", 5000, 1, 50_000).is_ok());
        assert!(validate_range("radius_meters", 0, 1, 50_000).is_err());
        assert!(validate_range("radius_meters", 60_000, 1, 50_000).is_err());
    }

    #[test]
    fn test_validate_party_size() {
        assert!(validate_party_size(1).is_ok());
        assert!(validate_party_size(0).is_err());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  key ")), Some("key"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
