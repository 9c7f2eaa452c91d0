//! Objective orchestration domain
//!
//! An [`Objective`](entities::Objective) is decomposed into an ordered list of
//! [`SubGoal`](value_objects::SubGoal)s, each routed to a
//! [`WorkerRole`](role::WorkerRole). Every routed sub-goal becomes a
//! [`Task`](entities::Task) whose status only ever moves forward.
//!
//! ```text
//! Objective ──decompose──▶ [SubGoal; 3..=5] ──route──▶ Task(role) ──▶ WorkerPool
//! ```

pub mod decomposition_parser;
pub mod entities;
pub mod role;
pub mod value_objects;

pub use decomposition_parser::{DraftSubGoal, parse_decomposition};
pub use entities::{Objective, PipelineStage, Task, TaskStatus};
pub use role::WorkerRole;
pub use value_objects::{Decomposition, DecompositionKind, SubGoal};
