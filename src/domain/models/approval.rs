//! Human approval state machine for the course outline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal operator input that approves the current outline.
pub const APPROVAL_SENTINEL: &str = "approved";

/// Where the outline is in its review cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    /// First outline drafted by the content developer
    InitialDrafted,
    /// Reviewer feedback available
    AiReviewed,
    /// Outline revised with the reviewer feedback
    AiRevised,
    /// Blocked on the operator
    AwaitingHuman,
    /// Revising with operator feedback
    HumanRevising,
    /// Operator approved; outline is frozen
    Approved,
}

impl ApprovalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitialDrafted => "initial_drafted",
            Self::AiReviewed => "ai_reviewed",
            Self::AiRevised => "ai_revised",
            Self::AwaitingHuman => "awaiting_human",
            Self::HumanRevising => "human_revising",
            Self::Approved => "approved",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: ApprovalState) -> bool {
        matches!(
            (self, next),
            (Self::InitialDrafted, Self::AiReviewed)
                | (Self::AiReviewed, Self::AiRevised)
                | (Self::AiRevised, Self::AwaitingHuman)
                | (Self::AwaitingHuman, Self::HumanRevising)
                | (Self::AwaitingHuman, Self::Approved)
                | (Self::HumanRevising, Self::AwaitingHuman)
        )
    }
}

impl fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interpretation of one line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorDecision {
    Approve,
    Revise(String),
    /// Blank input; the operator is asked again
    Empty,
}

impl OperatorDecision {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            Self::Empty
        } else if trimmed.to_lowercase() == APPROVAL_SENTINEL {
            Self::Approve
        } else {
            Self::Revise(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sentinel_case_insensitive() {
        assert_eq!(OperatorDecision::parse("approved"), OperatorDecision::Approve);
        assert_eq!(OperatorDecision::parse("  APPROVED \n"), OperatorDecision::Approve);
        assert_eq!(OperatorDecision::parse("Approved"), OperatorDecision::Approve);
    }

    #[test]
    fn test_parse_near_misses_are_feedback() {
        assert_eq!(
            OperatorDecision::parse("approved!"),
            OperatorDecision::Revise("approved!".into())
        );
        assert_eq!(
            OperatorDecision::parse("not approved"),
            OperatorDecision::Revise("not approved".into())
        );
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(OperatorDecision::parse("   "), OperatorDecision::Empty);
    }

    #[test]
    fn test_transitions() {
        use ApprovalState::*;
        assert!(InitialDrafted.can_transition_to(AiReviewed));
        assert!(AwaitingHuman.can_transition_to(Approved));
        assert!(HumanRevising.can_transition_to(AwaitingHuman));
        assert!(!Approved.can_transition_to(AwaitingHuman));
        assert!(!InitialDrafted.can_transition_to(Approved));
        assert!(Approved.is_terminal());
    }
}
