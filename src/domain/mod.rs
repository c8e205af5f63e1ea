// Domain layer: data model and ports (traits) shared by the search orchestrators.

pub mod model;
pub mod ports;
