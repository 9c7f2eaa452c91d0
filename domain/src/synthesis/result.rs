//! Combined worker output

use crate::core::ids::ObjectiveId;
use crate::orchestration::role::WorkerRole;
use crate::synthesis::quality::QualityReport;
use crate::worker::result::WorkerResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker appended to lines whose result stayed unsupported after re-retrieval.
const FLAGGED_MARKER: &str = "[unsupported]";

/// One worker result as it entered the synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisEntry {
    pub result: WorkerResult,
    /// Still `Unsupported` after the single re-retrieval attempt
    pub flagged: bool,
    /// A re-retrieval was attempted for this result
    pub re_retrieved: bool,
}

impl SynthesisEntry {
    pub fn accepted(result: WorkerResult) -> Self {
        Self {
            flagged: !result.is_supported(),
            result,
            re_retrieved: false,
        }
    }

    pub fn after_re_retrieval(result: WorkerResult) -> Self {
        Self {
            flagged: !result.is_supported(),
            result,
            re_retrieved: true,
        }
    }
}

/// Merged output of one task group. Immutable once quality has been attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub task_group_id: ObjectiveId,
    pub entries: Vec<SynthesisEntry>,
    pub combined_output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityReport>,
    pub created_at: DateTime<Utc>,
}

impl SynthesisResult {
    /// Merge entries in the order given.
    ///
    /// Each entry becomes one `[Role] output` block; flagged entries carry an
    /// `[unsupported]` marker. The combined output depends only on the entries.
    pub fn combine(task_group_id: ObjectiveId, entries: Vec<SynthesisEntry>) -> Self {
        let combined_output = entries
            .iter()
            .map(|entry| {
                let mut block = format!("[{}] {}", entry.result.role, entry.result.output.trim());
                if entry.flagged {
                    block.push(' ');
                    block.push_str(FLAGGED_MARKER);
                }
                block
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        Self {
            task_group_id,
            entries,
            combined_output,
            quality: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_quality(mut self, report: QualityReport) -> Self {
        self.quality = Some(report);
        self
    }

    pub fn passed_quality(&self) -> Option<bool> {
        self.quality.as_ref().map(|q| q.passed)
    }

    pub fn contributing_roles(&self) -> Vec<&WorkerRole> {
        let mut roles: Vec<&WorkerRole> = self.entries.iter().map(|e| &e.result.role).collect();
        roles.sort();
        roles.dedup();
        roles
    }

    pub fn flagged_count(&self) -> usize {
        self.entries.iter().filter(|e| e.flagged).count()
    }

    pub fn re_retrieved_count(&self) -> usize {
        self.entries.iter().filter(|e| e.re_retrieved).count()
    }
}
