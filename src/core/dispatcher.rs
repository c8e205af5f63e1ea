use crate::config::TravelConfig;
use crate::core::flights::FlightSearch;
use crate::core::hotels::HotelSearch;
use crate::core::places::PlaceDiscovery;
use crate::domain::model::{
    from_arguments, ComponentId, ResultEnvelope, ToolContext, ToolDefinition, ToolOutcome,
};
use crate::domain::ports::Orchestrator;
use crate::utils::error::TravelError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

const DISPATCH_LABEL: &str = "dispatch";

/// 推理層發出的工具呼叫
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    /// 控制權已轉移給該元件，等待 `resume`
    Transferred(ComponentId),
    Dispatching(ComponentId),
    AwaitingResult(ComponentId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Completed {
        component: ComponentId,
        envelope: ResultEnvelope,
    },
    Transferred {
        to: ComponentId,
    },
}

impl DispatchOutcome {
    pub fn envelope(&self) -> Option<&ResultEnvelope> {
        match self {
            DispatchOutcome::Completed { envelope, .. } => Some(envelope),
            DispatchOutcome::Transferred { .. } => None,
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            DispatchOutcome::Completed {
                component,
                envelope,
            } => json!({"component": component, "result": envelope}),
            DispatchOutcome::Transferred { to } => json!({"transfer_to_agent": to}),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TransferArgs {
    agent_name: String,
}

/// 只發出轉移訊號的根工具
pub struct TransferTool {
    name: &'static str,
    description: &'static str,
    target: Option<ComponentId>,
}

impl TransferTool {
    /// `transfer_to_agent { agent_name }`
    pub fn generic() -> Self {
        Self {
            name: "transfer_to_agent",
            description: "Hand control of the request to the named agent.",
            target: None,
        }
    }

    /// 固定轉給 FlightFinder；參數寬鬆接受，不做解析
    pub fn delegate_flights() -> Self {
        Self {
            name: "delegate_flights",
            description: "Ask the FlightFinder agent to take over the flight search.",
            target: Some(ComponentId::FlightFinder),
        }
    }

    pub fn target(&self) -> Option<ComponentId> {
        self.target
    }
}

#[async_trait]
impl Orchestrator for TransferTool {
    fn component(&self) -> ComponentId {
        ComponentId::RootAgent
    }

    fn tool_name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn input_schema(&self) -> Value {
        match self.target {
            Some(_) => json!({
                "type": "object",
                "properties": {
                    "destination": {"type": "string"},
                    "dates": {"type": "string"},
                    "budget": {"type": "number"}
                }
            }),
            None => json!({
                "type": "object",
                "properties": {
                    "agent_name": {
                        "type": "string",
                        "enum": ["FlightFinder", "HotelRecommender", "ActivitiesAgent"]
                    }
                },
                "required": ["agent_name"],
                "additionalProperties": false
            }),
        }
    }

    async fn invoke(&self, arguments: Value, _ctx: &mut ToolContext) -> ToolOutcome {
        if let Some(target) = self.target {
            return ToolOutcome::Transfer(target);
        }

        let parsed = from_arguments::<TransferArgs>(arguments)
            .and_then(|args| args.agent_name.parse::<ComponentId>())
            .and_then(|target| match target {
                ComponentId::RootAgent => Err(TravelError::InvalidField {
                    field: "agent_name".to_string(),
                    reason: "control cannot be transferred to the root agent".to_string(),
                }),
                target => Ok(target),
            });
        match parsed {
            Ok(target) => ToolOutcome::Transfer(target),
            Err(e) => ToolOutcome::Value(ResultEnvelope::from_error(&e, DISPATCH_LABEL)),
        }
    }
}

/// 根元件：依工具名稱把請求交給航班、飯店或地點元件。
///
/// 一次只執行一個元件，失敗不重試，錯誤原樣放在信封裡往上交。
pub struct Dispatcher {
    components: BTreeMap<ComponentId, Box<dyn Orchestrator>>,
    root_tools: Vec<TransferTool>,
    state: DispatchState,
    history: Vec<DispatchState>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// 沒有任何子元件的 dispatcher
    pub fn new() -> Self {
        Self {
            components: BTreeMap::new(),
            root_tools: vec![TransferTool::generic(), TransferTool::delegate_flights()],
            state: DispatchState::Idle,
            history: Vec::new(),
        }
    }

    /// 以同一份配置建立三個子元件
    pub fn from_config(config: TravelConfig) -> Self {
        Self::new()
            .with_component(Box::new(FlightSearch::new(config.clone())))
            .with_component(Box::new(HotelSearch::new(config.clone())))
            .with_component(Box::new(PlaceDiscovery::new(config)))
    }

    pub fn with_component(mut self, component: Box<dyn Orchestrator>) -> Self {
        tracing::debug!("Registering component {}", component.component());
        self.components.insert(component.component(), component);
        self
    }

    /// 缺少的元件直接略過
    pub fn with_optional_component(self, component: Option<Box<dyn Orchestrator>>) -> Self {
        match component {
            Some(component) => self.with_component(component),
            None => self,
        }
    }

    pub fn active_components(&self) -> Vec<ComponentId> {
        self.components.keys().copied().collect()
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// 最近一次 `dispatch` 以來的狀態轉換
    pub fn history(&self) -> &[DispatchState] {
        &self.history
    }

    /// 目前等待 `resume` 的轉移目標
    pub fn pending_transfer(&self) -> Option<ComponentId> {
        match self.state {
            DispatchState::Transferred(target) => Some(target),
            _ => None,
        }
    }



    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> =
            self.components.values().map(|c| c.definition()).collect();

        for tool in &self.root_tools {
            let reachable = match tool.target() {
                Some(target) => self.components.contains_key(&target),
                None => !self.components.is_empty(),
            };
            if reachable {
                definitions.push(tool.definition());
            }
        }
        definitions
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tool_definitions().iter().any(|d| d.name == name)
    }

    pub async fn dispatch(&mut self, call: ToolCall, ctx: &mut ToolContext) -> DispatchOutcome {
        if let Some(pending) = self.pending_transfer() {
            tracing::warn!("Dropping pending transfer to {} for new call {}", pending, call.name);
            self.state = DispatchState::Idle;
        }
        self.history.clear();

        let target = self
            .components
            .iter()
            .find(|(_, c)| c.tool_name() == call.name)
            .map(|(id, _)| *id);
        if let Some(component) = target {
            return self.run(component, call.arguments, ctx).await;
        }

        if let Some(tool) = self.root_tools.iter().find(|t| t.tool_name() == call.name) {
            let outcome = tool.invoke(call.arguments, ctx).await;
            ctx.record(ComponentId::RootAgent, &call.name, &outcome);
            return self.settle(ComponentId::RootAgent, outcome);
        }

        tracing::error!("❌ Unknown tool: {}", call.name);
        let err = TravelError::InvalidField {
            field: "name".to_string(),
            reason: format!("unknown tool '{}'", call.name),
        };
        DispatchOutcome::Completed {
            component: ComponentId::RootAgent,
            envelope: ResultEnvelope::from_error(&err, DISPATCH_LABEL),
        }
    }

    /// 執行先前轉移到的元件
    pub async fn resume(&mut self, arguments: Value, ctx: &mut ToolContext) -> DispatchOutcome {
        match self.pending_transfer() {
            Some(target) => self.run(target, arguments, ctx).await,
            None => {
                let err = TravelError::InvalidField {
                    field: "state".to_string(),
                    reason: "no agent has been handed control".to_string(),
                };
                DispatchOutcome::Completed {
                    component: ComponentId::RootAgent,
                    envelope: ResultEnvelope::from_error(&err, DISPATCH_LABEL),
                }
            }
        }
    }

    async fn run(
        &mut self,
        component: ComponentId,
        arguments: Value,
        ctx: &mut ToolContext,
    ) -> DispatchOutcome {
        let Some(orchestrator) = self.components.get(&component) else {
            self.state = DispatchState::Idle;
            return unavailable(component);
        };
        let tool = orchestrator.tool_name();

        record_transition(
            &mut self.state,
            &mut self.history,
            DispatchState::Dispatching(component),
        );
        tracing::info!("🧭 [{}] Dispatching {} to {}", ctx.request_id, tool, component);

        record_transition(
            &mut self.state,
            &mut self.history,
            DispatchState::AwaitingResult(component),
        );
        let outcome = orchestrator.invoke(arguments, ctx).await;
        ctx.record(component, tool, &outcome);
        record_transition(&mut self.state, &mut self.history, DispatchState::Idle);

        self.settle(component, outcome)
    }

    fn settle(&mut self, from: ComponentId, outcome: ToolOutcome) -> DispatchOutcome {
        match outcome {
            ToolOutcome::Value(envelope) => {
                if let Some(error) = envelope.error() {
                    tracing::warn!("⚠️ {} returned an error envelope: {}", from, error);
                }
                DispatchOutcome::Completed {
                    component: from,
                    envelope,
                }
            }
            ToolOutcome::Transfer(target) if self.components.contains_key(&target) => {
                tracing::info!("🔀 {} transferred control to {}", from, target);
                record_transition(
                    &mut self.state,
                    &mut self.history,
                    DispatchState::Transferred(target),
                );
                DispatchOutcome::Transferred { to: target }
            }
            // 根元件或未啟用的元件都無法接手
            ToolOutcome::Transfer(target) => {
                self.state = DispatchState::Idle;
                unavailable(target)
            }
        }
    }
}

fn record_transition(
    state: &mut DispatchState,
    history: &mut Vec<DispatchState>,
    next: DispatchState,
) {
    tracing::debug!("Dispatch state {:?} -> {:?}", state, next);
    *state = next;
    history.push(next);
}

fn unavailable(component: ComponentId) -> DispatchOutcome {
    let err = TravelError::InvalidField {
        field: "agent_name".to_string(),
        reason: format!("agent '{}' is not available", component),
    };
    DispatchOutcome::Completed {
        component: ComponentId::RootAgent,
        envelope: ResultEnvelope::from_error(&err, DISPATCH_LABEL),
    }
}
