//! Decide whether one profile meets a criterion.

use std::fmt;

use crate::judge::Judge;
use crate::profile::Profile;

/// Result of evaluating one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Evaluated and the profile meets the criterion
    Matched,

    /// Evaluated and the profile does not meet the criterion
    NotMatched,

    /// Not evaluated
    Skipped(SkipReason),

    /// Evaluation was attempted but could not produce a verdict
    Failed(String),
}

impl Outcome {
    /// Only a real match passes; everything else fails closed.
    pub fn is_match(&self) -> bool {
        matches!(self, Outcome::Matched)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Profile text is missing or blank
    EmptyProfile,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyProfile => write!(f, "profile has no text"),
        }
    }
}

/// How a criterion is checked against profile text.
#[derive(Clone)]
pub enum Strategy {
    /// Case-insensitive substring containment
    Substring,

    /// LLM pass/fail judgment
    Judge(Judge),
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Substring => write!(f, "Substring"),
            Strategy::Judge(judge) => write!(f, "Judge({:?})", judge.parse_mode()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Evaluator {
    strategy: Strategy,
}

impl Evaluator {
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    pub fn substring() -> Self {
        Self::new(Strategy::Substring)
    }

    pub fn judge(judge: Judge) -> Self {
        Self::new(Strategy::Judge(judge))
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Evaluate one profile. Profiles without text are skipped before any
    /// strategy runs, so they never cost a model call.
    pub async fn evaluate(&self, profile: &Profile, criterion: &str) -> Outcome {
        let Some(text) = profile.usable_text() else {
            return Outcome::Skipped(SkipReason::EmptyProfile);
        };

        match &self.strategy {
            Strategy::Substring => {
                if contains_ignore_case(text, criterion) {
                    Outcome::Matched
                } else {
                    Outcome::NotMatched
                }
            }
            Strategy::Judge(judge) => judge.judge(text, criterion).await,
        }
    }

    /// `true` only for [`Outcome::Matched`].
    pub async fn passes(&self, profile: &Profile, criterion: &str) -> bool {
        self.evaluate(profile, criterion).await.is_match()
    }
}

/// Case-insensitive substring test. An empty needle matches anything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockChatModel;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_substring_match() {
        let evaluator = Evaluator::substring();
        let profile = Profile::new("https://firm.com/leslie-altus", "Leslie Altus is a partner");

        assert!(evaluator.passes(&profile, "leslie").await);
        assert!(evaluator.passes(&profile, "ALTUS IS").await);
        assert!(!evaluator.passes(&profile, "leslie smith").await);
    }

    #[tokio::test]
    async fn test_empty_profile_never_passes() {
        let model = Arc::new(MockChatModel::new("<answer>Pass</answer>"));
        let evaluators = [
            Evaluator::substring(),
            Evaluator::judge(Judge::new(model.clone())),
        ];
        let profiles = [
            Profile::without_text("https://firm.com/blocked"),
            Profile::new("https://firm.com/blank", ""),
            Profile::new("https://firm.com/spaces", " \n\t"),
        ];

        for evaluator in &evaluators {
            for profile in &profiles {
                for criterion in ["", " ", "leslie"] {
                    assert_eq!(
                        evaluator.evaluate(profile, criterion).await,
                        Outcome::Skipped(SkipReason::EmptyProfile)
                    );
                }
            }
        }
        assert!(model.calls().is_empty(), "no model call for empty profiles");
    }

    #[tokio::test]
    async fn test_judge_strategy_delegates() {
        let model = Arc::new(
            MockChatModel::new("<answer>Fail</answer>")
                .with_response_for("Leslie", "<thinking>ok</thinking><answer>Pass</answer>"),
        );
        let evaluator = Evaluator::judge(Judge::new(model));

        let leslie = Profile::new("u1", "Leslie Altus is a partner");
        let other = Profile::new("u2", "Pat Doe is counsel");

        assert_eq!(evaluator.evaluate(&leslie, "named leslie").await, Outcome::Matched);
        assert_eq!(evaluator.evaluate(&other, "named leslie").await, Outcome::NotMatched);
    }

    #[test]
    fn test_outcome_is_match() {
        assert!(Outcome::Matched.is_match());
        assert!(!Outcome::NotMatched.is_match());
        assert!(!Outcome::Skipped(SkipReason::EmptyProfile).is_match());
        assert!(!Outcome::Failed("bad".into()).is_match());
    }
}
