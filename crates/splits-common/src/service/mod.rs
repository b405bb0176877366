pub mod fallback;
pub mod monitoring;

pub use tracing;
