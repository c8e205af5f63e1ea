use crate::core::dispatcher::ToolCall;
use crate::domain::model::{DEFAULT_CURRENCY, DEFAULT_PLACE_QUERY, DEFAULT_RADIUS_METERS};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "trip-planner")]
#[command(about = "Flight, hotel and place lookups for trip planning agents")]
pub struct Cli {
    #[arg(long, help = "TOML config file; credentials fall back to the environment")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Search flights
    Flights {
        #[arg(long)]
        origin: String,
        #[arg(long)]
        destination: String,
        #[arg(long)]
        departure_date: String,
        #[arg(long)]
        return_date: Option<String>,
        #[arg(long, default_value_t = 1)]
        party_size: u32,
    },
    /// Search hotels
    Hotels {
        #[arg(long)]
        location: String,
        #[arg(long)]
        check_in: String,
        #[arg(long)]
        check_out: String,
        #[arg(long, default_value_t = 1)]
        party_size: u32,
        #[arg(long, default_value = DEFAULT_CURRENCY)]
        currency: String,
    },
    /// Find places near a location
    Places {
        #[arg(long)]
        location: String,
        #[arg(long, default_value = DEFAULT_PLACE_QUERY)]
        query: String,
        #[arg(long, default_value_t = DEFAULT_RADIUS_METERS)]
        radius_meters: u32,
    },
    /// Transfer control to an agent, then run it with --args
    Transfer {
        agent: String,
        #[arg(long, help = "JSON object passed to the agent after the transfer")]
        args: Option<String>,
    },
    /// Print the tool definitions exposed to the reasoning layer
    Tools,
}

impl Command {
    /// 轉成具名參數的工具呼叫；`tools` 沒有對應的呼叫
    pub fn to_tool_call(&self) -> Option<ToolCall> {
        match self {
            Command::Flights {
                origin,
                destination,
                departure_date,
                return_date,
                party_size,
            } => {
                let mut arguments = json!({
                    "origin": origin,
                    "destination": destination,
                    "departure_date": departure_date,
                    "party_size": party_size,
                });
                if let (Some(date), Value::Object(map)) = (return_date, &mut arguments) {
                    map.insert("return_date".to_string(), json!(date));
                }
                Some(ToolCall::new("find_flights", arguments))
            }
            Command::Hotels {
                location,
                check_in,
                check_out,
                party_size,
                currency,
            } => Some(ToolCall::new(
                "find_hotels",
                json!({
                    "location": location,
                    "check_in": check_in,
                    "check_out": check_out,
                    "party_size": party_size,
                    "currency": currency,
                }),
            )),
            Command::Places {
                location,
                query,
                radius_meters,
            } => Some(ToolCall::new(
                "find_places",
                json!({
                    "location": location,
                    "query": query,
                    "radius_meters": radius_meters,
                }),
            )),
            Command::Transfer { agent, .. } => Some(ToolCall::new(
                "transfer_to_agent",
                json!({ "agent_name": agent }),
            )),
            Command::Tools => None,
        }
    }
}
