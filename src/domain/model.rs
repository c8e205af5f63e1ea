use crate::utils::error::{ErrorCategory, Result, TravelError};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_PLACE_QUERY: &str = "tourist attractions";
pub const DEFAULT_RADIUS_METERS: u32 = 5000;

fn default_party_size() -> u32 {
    1
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_place_query() -> String {
    DEFAULT_PLACE_QUERY.to_string()
}

fn default_radius_meters() -> u32 {
    DEFAULT_RADIUS_METERS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    #[serde(default)]
    pub return_date: Option<String>,
    #[serde(default = "default_party_size")]
    pub party_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HotelQuery {
    pub location: String,
    pub check_in: String,
    pub check_out: String,
    #[serde(default = "default_party_size")]
    pub party_size: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaceQuery {
    pub location: String,
    #[serde(default = "default_place_query", alias = "category")]
    pub query: String,
    #[serde(default = "default_radius_meters")]
    pub radius_meters: u32,
}

impl PlaceQuery {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            query: default_place_query(),
            radius_meters: DEFAULT_RADIUS_METERS,
        }
    }
}

/// 將具名參數物件轉成查詢結構；未知欄位或缺少必要欄位都會被拒絕
pub fn from_arguments<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    if !arguments.is_object() {
        return Err(TravelError::InvalidField {
            field: "arguments".to_string(),
            reason: "tool arguments must be passed by name as a JSON object".to_string(),
        });
    }

    serde_json::from_value(arguments).map_err(|e| {
        let message = e.to_string();
        match message
            .strip_prefix("missing field `")
            .and_then(|rest| rest.split('`').next())
        {
            Some(field) => TravelError::MissingField {
                field: field.to_string(),
            },
            None => TravelError::InvalidField {
                field: "arguments".to_string(),
                reason: message,
            },
        }
    })
}

/// 正規化後的日期；`adjustment_note` 只在日期被往後推時出現
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSpec {
    pub date: NaiveDate,
    pub adjustment_note: Option<String>,
}

impl DateSpec {
    pub fn unchanged(date: NaiveDate) -> Self {
        Self {
            date,
            adjustment_note: None,
        }
    }

    pub fn was_adjusted(&self) -> bool {
        self.adjustment_note.is_some()
    }

    /// `YYYY-MM-DD`，也就是送往上游的格式
    pub fn to_param(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub items: Vec<Value>,
    #[serde(default)]
    pub search_params: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFailure {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// 所有 orchestrator 的統一回傳形狀：成功帶 `items`，失敗帶 `error`，兩者不會同時出現
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultEnvelope {
    Success(SearchResults),
    Failure(SearchFailure),
}

impl ResultEnvelope {
    pub fn success(items: Vec<Value>, search_params: Map<String, Value>) -> Self {
        ResultEnvelope::Success(SearchResults {
            items,
            search_params,
            warnings: Vec::new(),
            message: None,
            status: None,
            raw_response: None,
        })
    }

    /// 上游沒有回傳結果時的非錯誤信封，附上原始 payload 方便診斷
    pub fn no_results(
        message: impl Into<String>,
        raw_response: Value,
        search_params: Map<String, Value>,
    ) -> Self {
        ResultEnvelope::Success(SearchResults {
            items: Vec::new(),
            search_params,
            warnings: Vec::new(),
            message: Some(message.into()),
            status: None,
            raw_response: Some(raw_response),
        })
    }

    pub fn failure(error: impl Into<String>) -> Self {
        ResultEnvelope::Failure(SearchFailure {
            error: error.into(),
            details: None,
            instructions: None,
        })
    }

    /// 把內部錯誤轉成信封；傳輸層錯誤會加上 `Failed to fetch <label> data:` 前綴
    pub fn from_error(err: &TravelError, label: &str) -> Self {
        let error = match err.category() {
            ErrorCategory::UpstreamTransport => {
                format!("Failed to fetch {} data: {}", label, err)
            }
            _ => err.to_string(),
        };

        let details = match err {
            TravelError::UpstreamStatus { status, payload } => Some(serde_json::json!({
                "status": status,
                "payload": payload,
            })),
            TravelError::LocationNotFound { status, .. } => {
                Some(serde_json::json!({ "status": status }))
            }
            _ => None,
        };

        let instructions = match err.category() {
            ErrorCategory::Configuration | ErrorCategory::InvalidInput => {
                Some(err.recovery_suggestion())
            }
            _ => None,
        };

        ResultEnvelope::Failure(SearchFailure {
            error,
            details,
            instructions,
        })
    }

    /// 成功時附加警告；失敗時警告改放在 `details.warnings`
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        if warnings.is_empty() {
            return self;
        }
        match &mut self {
            ResultEnvelope::Success(results) => results.warnings.extend(warnings),
            ResultEnvelope::Failure(failure) => {
                let details = failure
                    .details
                    .get_or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(map) = details {
                    map.insert(
                        "warnings".to_string(),
                        Value::Array(warnings.into_iter().map(Value::String).collect()),
                    );
                }
            }
        }
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        if let ResultEnvelope::Success(results) = &mut self {
            results.status = Some(status.into());
        }
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResultEnvelope::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResultEnvelope::Failure(_))
    }

    pub fn items(&self) -> &[Value] {
        match self {
            ResultEnvelope::Success(results) => &results.items,
            ResultEnvelope::Failure(_) => &[],
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            ResultEnvelope::Success(results) => &results.warnings,
            ResultEnvelope::Failure(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ResultEnvelope::Success(_) => None,
            ResultEnvelope::Failure(failure) => Some(&failure.error),
        }
    }

    pub fn instructions(&self) -> Option<&str> {
        match self {
            ResultEnvelope::Success(_) => None,
            ResultEnvelope::Failure(failure) => failure.instructions.as_deref(),
        }
    }

    pub fn to_json(&self) -> Value {
        // 信封的欄位都是 JSON 原生型別，序列化不會失敗
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// 文字搜尋階段的候選地點
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceCandidate {
    pub place_id: String,
    pub name: String,
    pub coarse: Value,
}

/// 經過 details 查詢補齊的地點
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedPlace {
    pub place_id: String,
    pub name: String,
    pub rating: Option<f64>,
    pub address: Option<String>,
    pub hours: Vec<String>,
    pub price_level: Option<u8>,
    pub reviews: Vec<Value>,
    pub categories: Vec<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentId {
    RootAgent,
    FlightFinder,
    HotelRecommender,
    ActivitiesAgent,
}

impl ComponentId {
    pub const ALL: [ComponentId; 4] = [
        ComponentId::RootAgent,
        ComponentId::FlightFinder,
        ComponentId::HotelRecommender,
        ComponentId::ActivitiesAgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentId::RootAgent => "RootAgent",
            ComponentId::FlightFinder => "FlightFinder",
            ComponentId::HotelRecommender => "HotelRecommender",
            ComponentId::ActivitiesAgent => "ActivitiesAgent",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ComponentId::RootAgent => {
                "Coordinates travel planning by calling flight, stay, and activity agents."
            }
            ComponentId::FlightFinder => "Suggests flight options for a destination.",
            ComponentId::HotelRecommender => "Suggests hotel or stay options for a destination.",
            ComponentId::ActivitiesAgent => {
                "Suggests interesting activities for the user at a destination."
            }
        }
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentId {
    type Err = TravelError;

    fn from_str(s: &str) -> Result<Self> {
        ComponentId::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| TravelError::InvalidField {
                field: "agent_name".to_string(),
                reason: format!("unknown agent '{}'", s),
            })
    }
}

/// 工具執行結果：回傳值，或把控制權交給另一個元件
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Value(ResultEnvelope),
    Transfer(ComponentId),
}

/// 給推理層的工具定義
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub component: ComponentId,
    pub tool: String,
    pub transferred_to: Option<ComponentId>,
    pub succeeded: bool,
}

/// 呼叫端傳入的請求上下文，用於委派記錄
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    pub request_id: String,
    invocations: Vec<Invocation>,
}

impl ToolContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            invocations: Vec::new(),
        }
    }

    pub fn record(&mut self, component: ComponentId, tool: &str, outcome: &ToolOutcome) {
        let (transferred_to, succeeded) = match outcome {
            ToolOutcome::Value(envelope) => (None, envelope.is_success()),
            ToolOutcome::Transfer(target) => (Some(*target), true),
        };
        self.invocations.push(Invocation {
            component,
            tool: tool.to_string(),
            transferred_to,
            succeeded,
        });
    }

    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }
}
