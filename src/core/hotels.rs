use crate::config::SEARCH_KEY_ENV;
use crate::core::http::fetch_json;
use crate::domain::model::{
    from_arguments, ComponentId, HotelQuery, ResultEnvelope, ToolContext, ToolOutcome,
};
use crate::domain::ports::{ConfigProvider, Orchestrator};
use crate::utils::error::{Result, TravelError};
use crate::utils::validation::{validate_non_empty_string, validate_party_size, Validate};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};

pub const MAX_HOTEL_RESULTS: usize = 10;
const FETCH_LABEL: &str = "hotel";

impl Validate for HotelQuery {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("location", &self.location)?;
        validate_non_empty_string("check_in", &self.check_in)?;
        validate_non_empty_string("check_out", &self.check_out)?;
        validate_non_empty_string("currency", &self.currency)?;
        validate_party_size(self.party_size)
    }
}

/// 飯店搜尋。日期原樣轉送，不做正規化。
pub struct HotelSearch<C: ConfigProvider> {
    config: C,
    client: Client,
}

impl<C: ConfigProvider> HotelSearch<C> {
    pub fn new(config: C) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub async fn find_hotels(&self, query: &HotelQuery) -> ResultEnvelope {
        if let Err(e) = query.validate() {
            return ResultEnvelope::from_error(&e, FETCH_LABEL);
        }

        let search_params = search_params(query);
        match self.search(query).await {
            Ok(payload) => assemble(payload, search_params),
            Err(e) => {
                tracing::error!("❌ Hotel search failed: {}", e);
                ResultEnvelope::from_error(&e, FETCH_LABEL)
            }
        }
    }

    async fn search(&self, query: &HotelQuery) -> Result<Value> {
        let api_key = self
            .config
            .search_api_key()
            .ok_or_else(|| TravelError::MissingCredential {
                field: "search_api_key".to_string(),
                env_var: SEARCH_KEY_ENV.to_string(),
            })?;

        let params = [
            ("engine", "google_hotels".to_string()),
            ("q", query.location.clone()),
            ("check_in_date", query.check_in.clone()),
            ("check_out_date", query.check_out.clone()),
            ("adults", query.party_size.to_string()),
            ("currency", query.currency.clone()),
            ("hl", "en".to_string()),
            ("api_key", api_key.to_string()),
        ];

        tracing::info!(
            "🏨 Searching hotels in {} from {} to {}",
            query.location,
            query.check_in,
            query.check_out
        );
        fetch_json(
            &self.client,
            self.config.search_endpoint(),
            &params,
            self.config.search_timeout(),
        )
        .await
    }
}

fn search_params(query: &HotelQuery) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("location".to_string(), json!(query.location));
    params.insert("checkIn".to_string(), json!(query.check_in));
    params.insert("checkOut".to_string(), json!(query.check_out));
    params.insert("partySize".to_string(), json!(query.party_size));
    params.insert("currency".to_string(), json!(query.currency));
    params
}

fn assemble(payload: Value, search_params: Map<String, Value>) -> ResultEnvelope {
    match payload.get("properties").and_then(Value::as_array) {
        Some(properties) => {
            let items: Vec<Value> = properties.iter().take(MAX_HOTEL_RESULTS).cloned().collect();
            tracing::info!(
                "🏨 Returning {} of {} properties",
                items.len(),
                properties.len()
            );
            ResultEnvelope::success(items, search_params)
        }
        None => {
            tracing::info!("🏨 No properties in response");
            ResultEnvelope::no_results("No hotels found", payload, search_params)
        }
    }
}

#[async_trait]
impl<C: ConfigProvider> Orchestrator for HotelSearch<C> {
    fn component(&self) -> ComponentId {
        ComponentId::HotelRecommender
    }

    fn tool_name(&self) -> &'static str {
        "find_hotels"
    }

    fn description(&self) -> &'static str {
        "Search hotels and other stays for a location and date range."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {"type": "string", "description": "City or area to stay in"},
                "check_in": {"type": "string", "description": "Check-in date, YYYY-MM-DD"},
                "check_out": {"type": "string", "description": "Check-out date, YYYY-MM-DD"},
                "party_size": {"type": "integer", "minimum": 1, "default": 1},
                "currency": {"type": "string", "default": "USD"}
            },
            "required": ["location", "check_in", "check_out"],
            "additionalProperties": false
        })
    }

    async fn invoke(&self, arguments: Value, _ctx: &mut ToolContext) -> ToolOutcome {
        let envelope = match from_arguments::<HotelQuery>(arguments) {
            Ok(query) => self.find_hotels(&query).await,
            Err(e) => ResultEnvelope::from_error(&e, FETCH_LABEL),
        };
        ToolOutcome::Value(envelope)
    }
}
