pub mod dataset;
pub mod frame;
pub mod scale;
pub mod ticks;
pub mod types;

pub use dataset::Dataset;
pub use frame::{FrameEntry, select_race_frame, select_scatter_frame};
pub use scale::{BandScale, LinearScale};
pub use types::{DataPoint, FrameKey, Margins, PointStyle, TimestampMs, Viewport};
