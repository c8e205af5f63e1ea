use crate::config::PLACES_KEY_ENV;
use crate::core::http::{fetch_json, provider_status};
use crate::domain::model::{
    from_arguments, ComponentId, EnrichedPlace, PlaceCandidate, PlaceQuery, ResultEnvelope,
    ToolContext, ToolOutcome,
};
use crate::domain::ports::{ConfigProvider, Orchestrator};
use crate::utils::error::{Result, TravelError};
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};

pub const MAX_PLACE_RESULTS: usize = 10;
pub const MAX_RADIUS_METERS: u32 = 50_000;
pub const DETAIL_FIELDS: &str =
    "name,rating,formatted_address,opening_hours,price_level,reviews,types,website";
const FETCH_LABEL: &str = "places";

impl Validate for PlaceQuery {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("location", &self.location)?;
        validate_non_empty_string("query", &self.query)?;
        validate_range("radius_meters", self.radius_meters, 1, MAX_RADIUS_METERS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// 地點探索：geocode → 文字搜尋 → 逐一查詢 details。
///
/// details 查詢各自獨立，單一失敗只會讓該候選被略過；
/// 全部失敗時退回文字搜尋的原始結果。
pub struct PlaceDiscovery<C: ConfigProvider> {
    config: C,
    client: Client,
}

impl<C: ConfigProvider> PlaceDiscovery<C> {
    pub fn new(config: C) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub async fn find_places(&self, query: &PlaceQuery) -> ResultEnvelope {
        match self.discover(query).await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!("❌ Place discovery failed: {}", e);
                ResultEnvelope::from_error(&e, FETCH_LABEL)
            }
        }
    }

    async fn discover(&self, query: &PlaceQuery) -> Result<ResultEnvelope> {
        query.validate()?;
        let api_key = self
            .config
            .places_api_key()
            .ok_or_else(|| TravelError::MissingCredential {
                field: "places_api_key".to_string(),
                env_var: PLACES_KEY_ENV.to_string(),
            })?;

        // 階段 1：geocode
        let coords = self.geocode(&query.location, api_key).await?;
        tracing::info!(
            "📍 {} resolved to ({}, {})",
            query.location,
            coords.lat,
            coords.lng
        );

        let mut search_params = Map::new();
        search_params.insert("location".to_string(), json!(query.location));
        search_params.insert("query".to_string(), json!(query.query));
        search_params.insert(
            "coordinates".to_string(),
            json!({"lat": coords.lat, "lng": coords.lng}),
        );

        // 階段 2：文字搜尋
        let payload = self.text_search(query, coords, api_key).await?;
        let candidates = candidates_from(&payload);
        if candidates.is_empty() {
            let status = provider_status(&payload).to_string();
            tracing::info!("📍 No places found (status: {})", status);
            return Ok(
                ResultEnvelope::no_results("No places found", payload, search_params)
                    .with_status(status),
            );
        }

        // 階段 3：逐一補齊細節
        let mut enriched = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            match self.details(candidate, api_key).await {
                Ok(place) => enriched.push(place),
                Err(e) => tracing::warn!(
                    "⚠️ Skipping details for {} ({}): {}",
                    candidate.name,
                    candidate.place_id,
                    e
                ),
            }
        }
        tracing::info!(
            "📍 Enriched {} of {} candidates",
            enriched.len(),
            candidates.len()
        );

        // 階段 4：組裝
        if enriched.is_empty() {
            let items = candidates.into_iter().map(|c| c.coarse).collect();
            return Ok(ResultEnvelope::success(items, search_params).with_warnings(vec![
                "Place details were unavailable; returning basic search results.".to_string(),
            ]));
        }

        let items = enriched
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ResultEnvelope::success(items, search_params))
    }

    async fn geocode(&self, location: &str, api_key: &str) -> Result<Coordinates> {
        let params = [
            ("address", location.to_string()),
            ("key", api_key.to_string()),
        ];
        let payload = fetch_json(
            &self.client,
            self.config.geocode_endpoint(),
            &params,
            self.config.places_timeout(),
        )
        .await?;

        let status = provider_status(&payload);
        let location_value = payload
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .and_then(|first| first.pointer("/geometry/location"));

        match (status, location_value) {
            ("OK", Some(loc)) => match (
                loc.get("lat").and_then(Value::as_f64),
                loc.get("lng").and_then(Value::as_f64),
            ) {
                (Some(lat), Some(lng)) => Ok(Coordinates { lat, lng }),
                _ => Err(TravelError::LocationNotFound {
                    location: location.to_string(),
                    status: status.to_string(),
                }),
            },
            _ => Err(TravelError::LocationNotFound {
                location: location.to_string(),
                status: status.to_string(),
            }),
        }
    }

    async fn text_search(
        &self,
        query: &PlaceQuery,
        coords: Coordinates,
        api_key: &str,
    ) -> Result<Value> {
        let params = [
            ("query", format!("{} in {}", query.query, query.location)),
            ("location", format!("{},{}", coords.lat, coords.lng)),
            ("radius", query.radius_meters.to_string()),
            ("key", api_key.to_string()),
        ];
        fetch_json(
            &self.client,
            self.config.place_search_endpoint(),
            &params,
            self.config.places_timeout(),
        )
        .await
    }

    async fn details(&self, candidate: &PlaceCandidate, api_key: &str) -> Result<EnrichedPlace> {
        let params = [
            ("place_id", candidate.place_id.clone()),
            ("fields", DETAIL_FIELDS.to_string()),
            ("key", api_key.to_string()),
        ];
        let payload = fetch_json(
            &self.client,
            self.config.place_details_endpoint(),
            &params,
            self.config.places_timeout(),
        )
        .await?;

        let status = provider_status(&payload).to_string();
        if status == "OK" {
            if let Some(result) = payload.get("result").filter(|r| r.is_object()) {
                return Ok(enriched_from(candidate, result));
            }
        }
        Err(TravelError::UpstreamStatus { status, payload })
    }
}

fn candidates_from(payload: &Value) -> Vec<PlaceCandidate> {
    payload
        .get("results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .take(MAX_PLACE_RESULTS)
                .filter_map(|result| {
                    let place_id = result.get("place_id")?.as_str()?.to_string();
                    let name = result
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    Some(PlaceCandidate {
                        place_id,
                        name,
                        coarse: result.clone(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn enriched_from(candidate: &PlaceCandidate, result: &Value) -> EnrichedPlace {
    let text = |key: &str| result.get(key).and_then(Value::as_str).map(str::to_string);
    let strings = |value: Option<&Value>| -> Vec<String> {
        value
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    };

    EnrichedPlace {
        place_id: candidate.place_id.clone(),
        name: text("name").unwrap_or_else(|| candidate.name.clone()),
        rating: result.get("rating").and_then(Value::as_f64),
        address: text("formatted_address"),
        hours: strings(result.pointer("/opening_hours/weekday_text")),
        price_level: result
            .get("price_level")
            .and_then(Value::as_u64)
            .and_then(|level| u8::try_from(level).ok()),
        reviews: result
            .get("reviews")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        categories: strings(result.get("types")),
        website: text("website"),
    }
}

#[async_trait]
impl<C: ConfigProvider> Orchestrator for PlaceDiscovery<C> {
    fn component(&self) -> ComponentId {
        ComponentId::ActivitiesAgent
    }

    fn tool_name(&self) -> &'static str {
        "find_places"
    }

    fn description(&self) -> &'static str {
        "Find attractions, restaurants or activities near a location, with ratings, hours and reviews."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {"type": "string", "description": "Free-text location, e.g. Kyoto, Japan"},
                "query": {"type": "string", "default": "tourist attractions"},
                "radius_meters": {"type": "integer", "minimum": 1, "maximum": MAX_RADIUS_METERS, "default": 5000}
            },
            "required": ["location"],
            "additionalProperties": false
        })
    }

    async fn invoke(&self, arguments: Value, _ctx: &mut ToolContext) -> ToolOutcome {
        let envelope = match from_arguments::<PlaceQuery>(arguments) {
            Ok(query) => self.find_places(&query).await,
            Err(e) => ResultEnvelope::from_error(&e, FETCH_LABEL),
        };
        ToolOutcome::Value(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_truncated_and_require_place_id() {
        let mut results: Vec<Value> = (0..12)
            .map(|i| json!({"place_id": format!("p{}", i), "name": format!("Place {}", i)}))
            .collect();
        results.insert(0, json!({"name": "No id"}));
        let payload = json!({"status": "OK", "results": results});

        let candidates = candidates_from(&payload);
        // 前 10 筆中有一筆沒有 place_id
        assert_eq!(candidates.len(), 9);
        assert_eq!(candidates[0].place_id, "p0");
    }

    #[test]
    fn test_enriched_from_details_result() {
        let candidate = PlaceCandidate {
            place_id: "abc".to_string(),
            name: "Fallback".to_string(),
            coarse: json!({}),
        };
        let result = json!({
            "name": "Louvre Museum",
            "rating": 4.7,
            "formatted_address": "Rue de Rivoli, 75001 Paris",
            "opening_hours": {"weekday_text": ["Monday: 9:00 AM – 6:00 PM"]},
            "price_level": 2,
            "reviews": [{"text": "Great"}],
            "types": ["museum", "tourist_attraction"],
            "website": "https://www.louvre.fr"
        });

        let place = enriched_from(&candidate, &result);
        assert_eq!(place.name, "Louvre Museum");
        assert_eq!(place.rating, Some(4.7));
        assert_eq!(place.hours.len(), 1);
        assert_eq!(place.price_level, Some(2));
        assert_eq!(place.categories, vec!["museum", "tourist_attraction"]);
        assert_eq!(place.website.as_deref(), Some("https://www.louvre.fr"));
    }

    #[test]
    fn test_enriched_keeps_candidate_name_when_missing() {
        let candidate = PlaceCandidate {
            place_id: "abc".to_string(),
            name: "Fallback".to_string(),
            coarse: json!({}),
        };
        let place = enriched_from(&candidate, &json!({}));
        assert_eq!(place.name, "Fallback");
        assert!(place.reviews.is_empty());
    }
}
