//! Quality gate

use crate::orchestration::role::WorkerRole;
use crate::synthesis::result::SynthesisResult;
use serde::{Deserialize, Serialize};

/// Explicit criteria a synthesis must meet before it can be finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityCriteria {
    /// Minimum number of contributing worker results
    pub min_workers: usize,
    /// Roles that must contribute at least one result
    pub required_roles: Vec<WorkerRole>,
    /// Minimum trimmed length (in characters) of every result's output
    pub min_output_length: usize,
    /// Accept results that stayed unsupported after re-retrieval
    pub allow_flagged: bool,
}

impl Default for QualityCriteria {
    fn default() -> Self {
        Self {
            min_workers: 3,
            required_roles: Vec::new(),
            min_output_length: 1,
            allow_flagged: false,
        }
    }
}

/// Outcome of one criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityCheck {
    pub criterion: String,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

impl QualityCheck {
    fn new(
        criterion: impl Into<String>,
        passed: bool,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            criterion: criterion.into(),
            passed,
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Pass/fail plus the per-criterion breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    pub passed: bool,
    pub checks: Vec<QualityCheck>,
}

impl QualityReport {
    pub fn failed_checks(&self) -> impl Iterator<Item = &QualityCheck> {
        self.checks.iter().filter(|c| !c.passed)
    }

    /// e.g. `min_workers (expected >= 3, got 2)`
    pub fn failure_summary(&self) -> String {
        self.failed_checks()
            .map(|c| format!("{} (expected {}, got {})", c.criterion, c.expected, c.actual))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl QualityCriteria {
    pub fn evaluate(&self, synthesis: &SynthesisResult) -> QualityReport {
        let mut checks = Vec::new();

        let count = synthesis.entries.len();
        checks.push(QualityCheck::new(
            "min_workers",
            count >= self.min_workers,
            format!(">= {}", self.min_workers),
            count.to_string(),
        ));

        let present = synthesis.contributing_roles();
        for role in &self.required_roles {
            let found = present.contains(&role);
            checks.push(QualityCheck::new(
                format!("required_role:{}", role),
                found,
                "present",
                if found { "present" } else { "missing" },
            ));
        }

        let shortest = synthesis
            .entries
            .iter()
            .map(|e| e.result.output.trim().chars().count())
            .min()
            .unwrap_or(0);
        checks.push(QualityCheck::new(
            "min_output_length",
            count > 0 && shortest >= self.min_output_length,
            format!(">= {}", self.min_output_length),
            shortest.to_string(),
        ));

        if !self.allow_flagged {
            let flagged = synthesis.flagged_count();
            checks.push(QualityCheck::new(
                "no_flagged_results",
                flagged == 0,
                "0",
                flagged.to_string(),
            ));
        }

        QualityReport {
            passed: checks.iter().all(|c| c.passed),
            checks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::ObjectiveId;
    use crate::synthesis::result::SynthesisEntry;
    use crate::synthesis::result::tests::result;
    use crate::worker::result::ReflectionTag;

    fn synthesis(results: Vec<(WorkerRole, &str, ReflectionTag)>) -> SynthesisResult {
        let entries = results
            .into_iter()
            .map(|(role, output, tag)| SynthesisEntry::accepted(result(role, output, tag)))
            .collect();
        SynthesisResult::combine(ObjectiveId::new("obj"), entries)
    }

    #[test]
    fn test_default_criteria_pass() {
        let s = synthesis(vec![
            (WorkerRole::Research, "found", ReflectionTag::Supported),
            (WorkerRole::Analysis, "compared", ReflectionTag::Supported),
            (WorkerRole::Implementation, "built", ReflectionTag::Supported),
        ]);
        let report = QualityCriteria::default().evaluate(&s);
        assert!(report.passed);
        assert_eq!(report.checks.len(), 3);
        assert_eq!(report.failure_summary(), "");
    }

    #[test]
    fn test_breakdown_names_failures() {
        let s = synthesis(vec![(WorkerRole::Research, "ok", ReflectionTag::Unsupported)]);
        let criteria = QualityCriteria {
            min_workers: 2,
            required_roles: vec![WorkerRole::Research, WorkerRole::Finance],
            min_output_length: 5,
            allow_flagged: false,
        };
        let report = criteria.evaluate(&s);
        assert!(!report.passed);

        let failed: Vec<_> = report.failed_checks().map(|c| c.criterion.as_str()).collect();
        assert_eq!(
            failed,
            vec![
                "min_workers",
                "required_role:Finance",
                "min_output_length",
                "no_flagged_results"
            ]
        );
        assert!(report.failure_summary().contains("min_workers (expected >= 2, got 1)"));
    }

    #[test]
    fn test_allow_flagged_skips_check() {
        let s = synthesis(vec![(WorkerRole::Research, "guess", ReflectionTag::Unsupported)]);
        let criteria = QualityCriteria {
            min_workers: 1,
            allow_flagged: true,
            ..QualityCriteria::default()
        };
        let report = criteria.evaluate(&s);
        assert!(report.passed);
        assert!(report.checks.iter().all(|c| c.criterion != "no_flagged_results"));
    }

    #[test]
    fn test_empty_synthesis_fails() {
        let s = synthesis(vec![]);
        let criteria = QualityCriteria {
            min_workers: 0,
            ..QualityCriteria::default()
        };
        let report = criteria.evaluate(&s);
        assert!(!report.passed);
    }
}
