pub mod config;
pub mod engine;
pub mod snapshot;
mod variant;

pub use config::{AxisBounds, ChartConfig, ChartKind, TickPolicy};
pub use engine::{ChartEngine, RESIZE_DEBOUNCE_MS};
pub use snapshot::EngineSnapshot;
