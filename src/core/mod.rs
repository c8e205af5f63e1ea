pub mod dates;
pub mod dispatcher;
pub mod flights;
pub mod hotels;
pub mod http;
pub mod places;

pub use crate::domain::model::{
    ComponentId, DateSpec, FlightQuery, HotelQuery, PlaceQuery, ResultEnvelope, ToolContext,
    ToolOutcome,
};
pub use crate::domain::ports::{Clock, ConfigProvider, Orchestrator};
pub use crate::utils::error::Result;
