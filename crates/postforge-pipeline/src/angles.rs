//! Fixed angle strategies used to diversify candidate drafts.

/// One rhetorical angle. The label is a stable identifier carried through
/// metadata; the instruction is appended to the drafting prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngleStrategy {
    /// Stable identifier (not a position).
    pub label: &'static str,
    /// Instruction appended to the assembled prompt.
    pub instruction: &'static str,
}

/// The ordered angle list. Candidate order always matches this order.
pub const ANGLE_STRATEGIES: [AngleStrategy; 3] = [
    AngleStrategy {
        label: "contrarian",
        instruction: "Take a clear contrarian stance and challenge a common belief in the first 2 lines.",
    },
    AngleStrategy {
        label: "operational_lesson",
        instruction: "Focus on an operational lesson from execution friction (ownership, process, constraints, tradeoffs).",
    },
    AngleStrategy {
        label: "case_first",
        instruction: "Start with a concrete case/example first, then extract the insight and implication.",
    },
];
