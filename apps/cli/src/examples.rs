//! Built-in static examples and offline mock posts.
//!
//! Used when required arguments are absent or `--run-static-examples` is
//! passed; without an API key the examples render deterministic offline
//! posts so the tool stays usable end to end.

use postforge_core::PostType;

/// One built-in example input.
pub struct StaticExample {
    /// Post topic.
    pub topic: &'static str,
    /// Post type.
    pub post_type: PostType,
    /// Business objective.
    pub business_objective: &'static str,
}

/// The built-in example inputs, one per post type.
pub const STATIC_EXAMPLES: [StaticExample; 3] = [
    StaticExample {
        topic: "Why SME teams fail at AI adoption after pilot success",
        post_type: PostType::ThoughtLeadership,
        business_objective: "Build authority with SME founders and generate inbound consulting leads",
    },
    StaticExample {
        topic: "How to design a 30-day AI workflow rollout for a 20-person services company",
        post_type: PostType::Educational,
        business_objective: "Educate SME operators with practical implementation guidance",
    },
    StaticExample {
        topic: "Shift from AI experimentation to AI operations in small businesses",
        post_type: PostType::TrendCommentary,
        business_objective: "Position as a strategic advisor on SME AI execution",
    },
];

/// Renders a deterministic offline post for an example input.
pub fn mock_post(topic: &str, post_type: PostType) -> String {
    match post_type {
        PostType::ThoughtLeadership => format!(
            "Most SME teams do not fail at AI because of tools.\n\n\
             They fail because ownership is unclear after the pilot.\n\n\
             In one client project on {topic}, the pilot worked, but no one owned handoff to operations. \
             Within two weeks, usage dropped.\n\n\
             The business implication is simple: if adoption accountability is missing, ROI disappears.\n\n\
             Practical takeaway: assign one workflow owner before rollout day.\n\n\
             CTA: Are you assigning AI ownership at the team level or only at leadership level?"
        ),
        PostType::Educational => format!(
            "If AI rollout feels messy, the problem is usually sequence.\n\n\
             Concept: operational adoption beats technical adoption.\n\n\
             Step 1: choose one workflow tied to a KPI.\n\
             Step 2: define owner, trigger, and review cadence.\n\
             Step 3: measure outcome weekly and tighten process.\n\n\
             Example workflow for {topic}: intake -> draft -> review -> client-ready output with clear handoffs.\n\n\
             SME application: start with one team and one measurable outcome to keep resource load realistic.\n\n\
             CTA: Want a one-page rollout checklist I use with SME clients?"
        ),
        PostType::TrendCommentary => format!(
            "Trend summary: {topic}.\n\n\
             What changed is not model quality alone. It is pressure for measurable business outcomes.\n\n\
             For SMEs, this matters because ad-hoc prompting does not scale under limited team capacity.\n\n\
             Tactical implication: standardize one high-frequency workflow first, then expand.\n\n\
             Example: a small services team used a fixed discovery-call summary workflow and cut prep time by 35%.\n\n\
             CTA: Which workflow in your business is ready for standardization this quarter?"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_example_per_post_type() {
        let types: Vec<PostType> = STATIC_EXAMPLES.iter().map(|e| e.post_type).collect();
        assert_eq!(types, PostType::ALL.to_vec());
    }

    #[test]
    fn test_mock_posts_are_nonempty_and_mention_topic() {
        for example in &STATIC_EXAMPLES {
            let post = mock_post(example.topic, example.post_type);
            assert!(!post.trim().is_empty());
            assert!(post.contains(example.topic));
        }
    }
}
