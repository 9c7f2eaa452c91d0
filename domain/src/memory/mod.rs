//! Memory domain
//!
//! Four tiers sit behind one façade in the application layer:
//!
//! | Tier | Type here | Backend |
//! |------|-----------|---------|
//! | Working | [`WorkingMemory`] (owned, in-process) | none |
//! | Session | keyed values with TTL | `SessionStore` port |
//! | Semantic | [`Document`], [`SemanticHit`] | `VectorStore` port |
//! | Relational | [`Entity`], [`Relationship`], [`GraphPattern`] | `GraphStore` port |

pub mod entry;
pub mod graph;
pub mod semantic;
pub mod working;

pub use entry::{MemoryEntry, MemoryKind, MemoryTier};
pub use graph::{Entity, GraphMatch, GraphPattern, Relationship};
pub use semantic::{Document, SemanticHit, rank_by_similarity};
pub use working::WorkingMemory;
