// Single-page CV layout: font metrics, greedy word wrap, cursor placement, PDF output.
// Layout is pure CPU work; only `render_to_file` touches the filesystem.

pub mod engine;
pub mod font_metrics;
pub mod pdf;
pub mod wrap;

pub use engine::DocumentLayoutEngine;
pub use font_metrics::default_page_config;
