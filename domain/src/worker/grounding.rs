//! Grounding judgment for reflection tags.

use crate::util::significant_terms;
use crate::worker::result::ReflectionTag;

/// Decides whether a worker output is grounded in the context it was given.
///
/// Implementations must be deterministic for a given `(output, context)`.
pub trait GroundingJudge: Send + Sync {
    fn judge(&self, output: &str, context: &str) -> ReflectionTag;
}

/// Counts significant terms shared by output and context.
///
/// Empty context is always `Unsupported`: an unreachable memory tier yields
/// no context, which is exactly the signal the supervisor re-retrieves on.
#[derive(Debug, Clone)]
pub struct ContextOverlapJudge {
    min_shared_terms: usize,
}

impl ContextOverlapJudge {
    pub fn new(min_shared_terms: usize) -> Self {
        Self {
            min_shared_terms: min_shared_terms.max(1),
        }
    }
}

impl Default for ContextOverlapJudge {
    fn default() -> Self {
        Self::new(2)
    }
}

impl GroundingJudge for ContextOverlapJudge {
    fn judge(&self, output: &str, context: &str) -> ReflectionTag {
        if context.trim().is_empty() {
            return ReflectionTag::Unsupported;
        }
        let context_terms = significant_terms(context);
        let shared = significant_terms(output)
            .iter()
            .filter(|t| context_terms.contains(*t))
            .count();
        if shared >= self.min_shared_terms {
            ReflectionTag::Supported
        } else {
            ReflectionTag::Unsupported
        }
    }
}
