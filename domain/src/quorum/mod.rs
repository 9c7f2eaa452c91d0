//! Quorum consensus domain
//!
//! A decision moves through a one-way state machine:
//!
//! ```text
//! initiate ──► Pending ──cast*──► tally ──► Finalized(outcome)
//! ```
//!
//! # Fault tolerance
//!
//! To tolerate `f` faulty or unreachable voters a decision needs at least
//! `N = 3f + 1` required voters. An outcome needs `ceil(2N/3)` matching
//! ballots under the default [`QuorumRule::SuperMajority`]. The arithmetic is
//! applied to a single logical tally; ballots are not signed or replicated.

pub mod consensus;
pub mod integrity;
pub mod rule;
pub mod session;
pub mod vote;

pub use consensus::{ConsensusOutcome, TallyReport};
pub use integrity::{
    ContradictoryRevoteCheck, IntegrityCheck, IntegrityPolicy, IntegrityViolation,
    PermissiveIntegrity,
};
pub use rule::{QuorumRule, max_tolerated_faults, min_required_voters};
pub use session::{CastReceipt, ConsensusError, DecisionSnapshot, DecisionStatus, VoteSession};
pub use vote::{Ballot, VoteBreakdown, VoteChoice};
