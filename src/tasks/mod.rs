pub mod aggregator;
pub mod report;
pub mod sampler;

pub use aggregator::{Aggregator, AxisAccumulator, Poll, WindowReport};
pub use sampler::on_conversion_complete;

#[cfg(target_os = "none")]
pub use aggregator::aggregator_task;
#[cfg(target_os = "none")]
pub use report::report_task;
