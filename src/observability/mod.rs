//! Observability: structured logging through `tracing-subscriber` with
//! configurable formats (pretty, compact, JSON).

mod tracing_init;

pub use tracing_init::*;
