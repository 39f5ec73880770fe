pub mod join;
pub mod plan;

pub use join::{KeyedJoin, partition_keys};
pub use plan::{
    AxisRole, AxisUpdate, CommittedDomains, CommittedEntry, Easing, EnterOp, ExitOp, FramePlan,
    NodeShape, Orientation, RenderState, ResolvedStyle, StyleDefaults, Tick, UpdateOp,
};
