pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::Cli;
pub use config::TravelConfig;

pub use core::{
    dispatcher::{DispatchOutcome, DispatchState, Dispatcher, ToolCall},
    flights::FlightSearch,
    hotels::HotelSearch,
    places::PlaceDiscovery,
};
pub use domain::model::{ComponentId, ResultEnvelope, ToolContext, ToolOutcome};
pub use domain::ports::{Clock, FixedClock, SystemClock};
pub use utils::error::{Result, TravelError};
