pub mod driver;
pub(crate) mod scheduler;

pub use driver::DriverPhase;
