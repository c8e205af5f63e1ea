use crate::config::SEARCH_KEY_ENV;
use crate::core::dates;
use crate::core::http::fetch_json;
use crate::domain::model::{
    from_arguments, ComponentId, DateSpec, FlightQuery, ResultEnvelope, ToolContext, ToolOutcome,
};
use crate::domain::ports::{Clock, ConfigProvider, Orchestrator, SystemClock};
use crate::utils::error::{Result, TravelError};
use crate::utils::validation::{validate_non_empty_string, validate_party_size, Validate};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};

pub const MAX_FLIGHT_RESULTS: usize = 5;
const FETCH_LABEL: &str = "flight";

impl Validate for FlightQuery {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("origin", &self.origin)?;
        validate_non_empty_string("destination", &self.destination)?;
        validate_party_size(self.party_size)
    }
}

pub struct FlightSearch<C: ConfigProvider, K: Clock = SystemClock> {
    config: C,
    clock: K,
    client: Client,
}

impl<C: ConfigProvider> FlightSearch<C, SystemClock> {
    pub fn new(config: C) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: ConfigProvider, K: Clock> FlightSearch<C, K> {
    pub fn with_clock(config: C, clock: K) -> Self {
        Self {
            config,
            clock,
            client: Client::new(),
        }
    }

    /// 搜尋航班；任何結果（包含錯誤）都以信封返回
    pub async fn find_flights(&self, query: &FlightQuery) -> ResultEnvelope {
        if let Err(e) = query.validate() {
            return ResultEnvelope::from_error(&e, FETCH_LABEL);
        }

        let today = self.clock.today();
        let outbound = match dates::normalize(&query.departure_date, today) {
            Ok(spec) => spec,
            Err(e) => return ResultEnvelope::from_error(&e, FETCH_LABEL),
        };
        let mut warnings: Vec<String> = outbound.adjustment_note.iter().cloned().collect();
        let inbound = match query.return_date.as_deref().map(|d| dates::normalize(d, today)) {
            Some(Ok(spec)) => Some(spec),
            Some(Err(e)) => {
                return ResultEnvelope::from_error(&e, FETCH_LABEL).with_warnings(warnings)
            }
            None => None,
        };
        warnings.extend(inbound.iter().filter_map(|spec| spec.adjustment_note.clone()));

        let search_params = search_params(query, &outbound, inbound.as_ref());

        let envelope = match self.search(query, &outbound, inbound.as_ref()).await {
            Ok(payload) => assemble(payload, search_params),
            Err(e) => {
                tracing::error!("❌ Flight search failed: {}", e);
                ResultEnvelope::from_error(&e, FETCH_LABEL)
            }
        };
        envelope.with_warnings(warnings)
    }

    async fn search(
        &self,
        query: &FlightQuery,
        outbound: &DateSpec,
        inbound: Option<&DateSpec>,
    ) -> Result<Value> {
        let api_key = self
            .config
            .search_api_key()
            .ok_or_else(|| TravelError::MissingCredential {
                field: "search_api_key".to_string(),
                env_var: SEARCH_KEY_ENV.to_string(),
            })?;

        // 有回程日期即代表來回票，不另外送 trip type
        let mut params = vec![
            ("engine", "google_flights".to_string()),
            ("departure_id", query.origin.trim().to_uppercase()),
            ("arrival_id", query.destination.trim().to_uppercase()),
            ("outbound_date", outbound.to_param()),
            ("adults", query.party_size.to_string()),
            ("currency", "USD".to_string()),
            ("hl", "en".to_string()),
        ];
        if let Some(inbound) = inbound {
            params.push(("return_date", inbound.to_param()));
        }
        params.push(("api_key", api_key.to_string()));

        tracing::info!(
            "✈️ Searching flights {} -> {} on {}",
            query.origin,
            query.destination,
            outbound.to_param()
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

fn search_params(
    query: &FlightQuery,
    outbound: &DateSpec,
    inbound: Option<&DateSpec>,
) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("origin".to_string(), json!(query.origin));
    params.insert("destination".to_string(), json!(query.destination));
    params.insert("departureDate".to_string(), json!(outbound.to_param()));
    params.insert(
        "returnDate".to_string(),
        json!(inbound.map(DateSpec::to_param)),
    );
    params
}

fn assemble(payload: Value, search_params: Map<String, Value>) -> ResultEnvelope {
    match payload.get("best_flights").and_then(Value::as_array) {
        Some(options) => {
            let items: Vec<Value> = options.iter().take(MAX_FLIGHT_RESULTS).cloned().collect();
            tracing::info!(
                "✈️ Returning {} of {} flight options",
                items.len(),
                options.len()
            );
            ResultEnvelope::success(items, search_params)
        }
        None => {
            tracing::info!("✈️ No best flight options in response");
            ResultEnvelope::no_results("No flights found", payload, search_params)
        }
    }
}

#[async_trait]
impl<C: ConfigProvider, K: Clock> Orchestrator for FlightSearch<C, K> {
    fn component(&self) -> ComponentId {
        ComponentId::FlightFinder
    }

    fn tool_name(&self) -> &'static str {
        "find_flights"
    }

    fn description(&self) -> &'static str {
        "Search flights between two airports. Past dates are moved to their next future occurrence."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "origin": {"type": "string", "description": "Departure airport code, e.g. JFK"},
                "destination": {"type": "string", "description": "Arrival airport code, e.g. LHR"},
                "departure_date": {"type": "string", "description": "Outbound date, YYYY-MM-DD"},
                "return_date": {"type": "string", "description": "Return date for round trips, YYYY-MM-DD"},
                "party_size": {"type": "integer", "minimum": 1, "default": 1}
            },
            "required": ["origin", "destination", "departure_date"],
            "additionalProperties": false
        })
    }

    async fn invoke(&self, arguments: Value, _ctx: &mut ToolContext) -> ToolOutcome {
        let envelope = match from_arguments::<FlightQuery>(arguments) {
            Ok(query) => self.find_flights(&query).await,
            Err(e) => ResultEnvelope::from_error(&e, FETCH_LABEL),
        };
        ToolOutcome::Value(envelope)
    }
}
