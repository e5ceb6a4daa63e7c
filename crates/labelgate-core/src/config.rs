//! Approval policy knobs and helpers for normalising their textual inputs.

use serde::{Deserialize, Serialize};

/// Flags that shape the approve/dismiss decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalPolicy {
    /// Approve even when no label requirement is active.
    pub approve_no_requirements: bool,
    /// Ignore approvals from pull request assignees.
    pub skip_assignees: bool,
    /// Distinct eligible approvers needed before approving.
    pub minimum_approvals_required: u32,
}

impl ApprovalPolicy {
    pub fn with_approve_no_requirements(mut self, value: bool) -> Self {
        self.approve_no_requirements = value;
        self
    }

    pub fn with_skip_assignees(mut self, value: bool) -> Self {
        self.skip_assignees = value;
        self
    }

    pub fn with_minimum_approvals(mut self, value: u32) -> Self {
        self.minimum_approvals_required = value;
        self
    }
}

/// Boolean action inputs are enabled only by the exact string `true`.
pub fn parse_flag(value: &str) -> bool {
    value == "true"
}

/// Parse the leading integer of `value`; anything unparsable or negative is 0.
pub fn parse_minimum_approvals(value: &str) -> u32 {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if negative || end == 0 {
        return 0;
    }
    digits[..end].parse().unwrap_or(u32::MAX)
}
