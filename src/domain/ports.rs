use crate::domain::model::{ComponentId, ToolContext, ToolDefinition, ToolOutcome};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

/// 日期正規化所依據的「今天」
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub trait ConfigProvider: Send + Sync {
    fn places_api_key(&self) -> Option<&str>;
    fn search_api_key(&self) -> Option<&str>;
    fn geocode_endpoint(&self) -> &str;
    fn place_search_endpoint(&self) -> &str;
    fn place_details_endpoint(&self) -> &str;
    fn search_endpoint(&self) -> &str;
    fn places_timeout(&self) -> Duration;
    fn search_timeout(&self) -> Duration;
}

/// 可被推理層以具名參數呼叫的元件
#[async_trait]
pub trait Orchestrator: Send + Sync {
    fn component(&self) -> ComponentId;

    /// 推理層看到的工具名稱
    fn tool_name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// 參數的 JSON Schema
    fn input_schema(&self) -> serde_json::Value;

    async fn invoke(&self, arguments: serde_json::Value, ctx: &mut ToolContext) -> ToolOutcome;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.tool_name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}
