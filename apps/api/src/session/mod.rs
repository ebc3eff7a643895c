// Interactive sessions: browser seam, listing traversal, registry and HTTP surface.

pub mod adapter;
pub mod controller;
pub mod handlers;
pub mod registry;
pub mod saved;
pub mod webdriver;

pub use controller::{ListingStep, SessionError};
pub use registry::SessionRegistry;
