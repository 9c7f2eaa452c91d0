//! Quorum rules and fault-tolerance arithmetic

use serde::{Deserialize, Serialize};

/// Minimum number of required voters that tolerates `max_faulty` faulty ones.
///
/// `N = 3f + 1`.
pub fn min_required_voters(max_faulty: usize) -> usize {
    3 * max_faulty + 1
}

/// Largest `f` with `3f + 1 <= voters`.
pub fn max_tolerated_faults(voters: usize) -> usize {
    voters.saturating_sub(1) / 3
}

/// Rule deriving the quorum threshold from the number of required voters.
///
/// The threshold is the number of matching Approve (or Reject) ballots an
/// outcome needs. It is also the minimum participation for a tally.
///
/// # Example
///
/// ```
/// use brain_domain::quorum::QuorumRule;
///
/// let rule = QuorumRule::SuperMajority;
/// assert_eq!(rule.threshold(4), 3);
/// assert_eq!(rule.threshold(7), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuorumRule {
    /// `ceil(2n/3)`
    #[default]
    SuperMajority,

    /// More than half (`n/2 + 1`)
    Majority,

    /// Every required voter
    Unanimous,

    /// At least this percentage (51-100), rounded up
    Percentage(u8),
}

impl QuorumRule {
    /// Lowest percentage accepted from configuration. At or below half,
    /// Approve and Reject could both reach the threshold.
    pub const MIN_PERCENTAGE: u8 = 51;

    /// Never below 1, so a decision cannot be reached without ballots.
    pub fn threshold(&self, required_voters: usize) -> usize {
        let n = required_voters;
        match self {
            QuorumRule::SuperMajority => (2 * n).div_ceil(3),
            QuorumRule::Majority => n / 2 + 1,
            QuorumRule::Unanimous => n,
            QuorumRule::Percentage(p) => (n * usize::from((*p).min(100))).div_ceil(100),
        }
        .clamp(1, n.max(1))
    }

    /// Whether Approve and Reject can never both reach the threshold.
    pub fn is_exclusive_for(&self, required_voters: usize) -> bool {
        2 * self.threshold(required_voters) > required_voters
    }

    /// Get a human-readable description of this rule
    pub fn description(&self) -> String {
        match self {
            QuorumRule::SuperMajority => "super-majority (two thirds)".to_string(),
            QuorumRule::Majority => "majority (more than half)".to_string(),
            QuorumRule::Unanimous => "unanimous (all required voters)".to_string(),
            QuorumRule::Percentage(p) => format!("at least {}% of required voters", p),
        }
    }
}

impl std::fmt::Display for QuorumRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for QuorumRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "supermajority" | "super_majority" | "two_thirds" => Ok(QuorumRule::SuperMajority),
            "majority" => Ok(QuorumRule::Majority),
            "unanimous" => Ok(QuorumRule::Unanimous),
            s if s.starts_with("percentage:") || s.ends_with('%') => {
                let num_str = s.trim_start_matches("percentage:").trim_end_matches('%');
                let p: u8 = num_str.parse().map_err(|_| "Invalid percentage")?;
                if !(Self::MIN_PERCENTAGE..=100).contains(&p) {
                    return Err(format!(
                        "Percentage out of range: {} (expected {}-100)",
                        p,
                        Self::MIN_PERCENTAGE
                    ));
                }
                Ok(QuorumRule::Percentage(p))
            }
            _ => Err(format!(
                "Unknown quorum rule: {}. Valid: supermajority, majority, unanimous, percentage:N or N%",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_required_voters() {
        assert_eq!(min_required_voters(0), 1);
        assert_eq!(min_required_voters(1), 4);
        assert_eq!(min_required_voters(2), 7);
        assert_eq!(min_required_voters(3), 10);
    }

    #[test]
    fn test_max_tolerated_faults() {
        assert_eq!(max_tolerated_faults(0), 0);
        assert_eq!(max_tolerated_faults(3), 0);
        assert_eq!(max_tolerated_faults(4), 1);
        assert_eq!(max_tolerated_faults(6), 1);
        assert_eq!(max_tolerated_faults(7), 2);
        for f in 0..20 {
            assert_eq!(max_tolerated_faults(min_required_voters(f)), f);
        }
    }

    #[test]
    fn test_super_majority_threshold() {
        let rule = QuorumRule::SuperMajority;
        assert_eq!(rule.threshold(1), 1);
        assert_eq!(rule.threshold(3), 2);
        assert_eq!(rule.threshold(4), 3);
        assert_eq!(rule.threshold(6), 4);
        assert_eq!(rule.threshold(7), 5);
        assert_eq!(rule.threshold(10), 7);
    }

    #[test]
    fn test_other_thresholds() {
        assert_eq!(QuorumRule::Majority.threshold(4), 3);
        assert_eq!(QuorumRule::Majority.threshold(5), 3);
        assert_eq!(QuorumRule::Unanimous.threshold(4), 4);
        assert_eq!(QuorumRule::Percentage(75).threshold(4), 3);
        assert_eq!(QuorumRule::Percentage(75).threshold(5), 4);
    }

    #[test]
    fn test_threshold_never_zero() {
        assert_eq!(QuorumRule::Percentage(0).threshold(5), 1);
        assert_eq!(QuorumRule::Percentage(1).threshold(4), 1);
    }

    #[test]
    fn test_exclusive_rules() {
        for n in 1..=13 {
            assert!(QuorumRule::SuperMajority.is_exclusive_for(n));
            assert!(QuorumRule::Majority.is_exclusive_for(n));
            assert!(QuorumRule::Unanimous.is_exclusive_for(n));
            assert!(QuorumRule::Percentage(51).is_exclusive_for(n));
        }
        assert!(!QuorumRule::Percentage(50).is_exclusive_for(4));
        assert!(!QuorumRule::Percentage(0).is_exclusive_for(4));
    }

    #[test]
    fn test_parse_rule() {
        assert_eq!(
            "supermajority".parse::<QuorumRule>().ok(),
            Some(QuorumRule::SuperMajority)
        );
        assert_eq!(
            "Majority".parse::<QuorumRule>().ok(),
            Some(QuorumRule::Majority)
        );
        assert_eq!(
            "percentage:75".parse::<QuorumRule>().ok(),
            Some(QuorumRule::Percentage(75))
        );
        assert_eq!(
            "80%".parse::<QuorumRule>().ok(),
            Some(QuorumRule::Percentage(80))
        );
        assert!("150%".parse::<QuorumRule>().is_err());
        assert!("0%".parse::<QuorumRule>().is_err());
        assert!("50%".parse::<QuorumRule>().is_err());
        assert_eq!(
            "51%".parse::<QuorumRule>().ok(),
            Some(QuorumRule::Percentage(51))
        );
        assert!("plurality".parse::<QuorumRule>().is_err());
    }

    #[test]
    fn test_default() {
        assert_eq!(QuorumRule::default(), QuorumRule::SuperMajority);
    }
}
