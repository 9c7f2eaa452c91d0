//! Synthesis domain
//!
//! The supervisor merges worker results into a [`SynthesisResult`] and grades
//! it against [`QualityCriteria`].

pub mod quality;
pub mod result;

pub use quality::{QualityCheck, QualityCriteria, QualityReport};
pub use result::{SynthesisEntry, SynthesisResult};
