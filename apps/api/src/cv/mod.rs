// CV generation: render model, aggregation from the profile store, HTTP surface.

pub mod aggregator;
pub mod handlers;
pub mod model;
pub mod prompts;
