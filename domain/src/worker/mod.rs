//! Worker domain
//!
//! Role-tagged [`WorkerAgent`]s execute one task at a time and emit
//! [`WorkerResult`]s tagged with a [`ReflectionTag`]. Whether an output is
//! grounded is decided by a pluggable [`GroundingJudge`].

pub mod agent;
pub mod grounding;
pub mod result;

pub use agent::{AgentBusy, Availability, WorkerAgent};
pub use grounding::{ContextOverlapJudge, GroundingJudge};
pub use result::{ReflectionTag, WorkerResult};
