//! Decides whether a job description is close enough to what the user wants.
//!
//! Two interchangeable strategies, picked once when the matcher is built:
//! a lexical token-sort ratio (`fuzz`) and an LLM-assigned score (`llm`).
//! Both produce a 0-100 score and accept when `score >= threshold`.

pub mod lexical;
pub mod semantic;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ConfigError;
use crate::llm::{LlmError, TextGenerator};

pub use semantic::SemanticMatcher;

pub const DEFAULT_THRESHOLD: u8 = 80;

#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("Text generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("Could not parse similarity score from response '{response}'")]
    UnparseableScore { response: String },

    #[error("Similarity score {0} is outside 0-100")]
    ScoreOutOfRange(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethod {
    #[default]
    Fuzz,
    Llm,
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMethod::Fuzz => write!(f, "fuzz"),
            MatchMethod::Llm => write!(f, "llm"),
        }
    }
}

impl FromStr for MatchMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fuzz" => Ok(MatchMethod::Fuzz),
            "llm" => Ok(MatchMethod::Llm),
            other => Err(ConfigError::UnknownMatchingMethod(other.to_string())),
        }
    }
}

enum Strategy {
    Lexical,
    Semantic(SemanticMatcher),
}

pub struct DescriptionMatcher {
    strategy: Strategy,
    threshold: u8,
}

impl fmt::Debug for DescriptionMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptionMatcher")
            .field("method", &self.method())
            .field("threshold", &self.threshold)
            .finish()
    }
}

fn checked_threshold(threshold: i64) -> Result<u8, ConfigError> {
    u8::try_from(threshold)
        .ok()
        .filter(|t| *t <= 100)
        .ok_or(ConfigError::InvalidThreshold(threshold))
}

impl DescriptionMatcher {
    pub fn lexical(threshold: i64) -> Result<Self, ConfigError> {
        Ok(Self {
            strategy: Strategy::Lexical,
            threshold: checked_threshold(threshold)?,
        })
    }

    pub fn semantic(threshold: i64, generator: Box<dyn TextGenerator>) -> Result<Self, ConfigError> {
        Ok(Self {
            strategy: Strategy::Semantic(SemanticMatcher::new(generator)),
            threshold: checked_threshold(threshold)?,
        })
    }

    /// Builds the matcher for `method`; `llm` requires a generator.
    pub fn new(
        method: MatchMethod,
        threshold: i64,
        generator: Option<Box<dyn TextGenerator>>,
    ) -> Result<Self, ConfigError> {
        match method {
            MatchMethod::Fuzz => Self::lexical(threshold),
            MatchMethod::Llm => {
                let generator = generator.ok_or(ConfigError::MissingTextGenerator)?;
                Self::semantic(threshold, generator)
            }
        }
    }

    /// Like [`new`](Self::new) with the method given by name.
    pub fn from_method_name(
        method: &str,
        threshold: i64,
        generator: Option<Box<dyn TextGenerator>>,
    ) -> Result<Self, ConfigError> {
        Self::new(method.parse()?, threshold, generator)
    }

    pub fn method(&self) -> MatchMethod {
        match self.strategy {
            Strategy::Lexical => MatchMethod::Fuzz,
            Strategy::Semantic(_) => MatchMethod::Llm,
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn score(&self, job_description: &str, wanted_description: &str) -> Result<u8, MatchingError> {
        match &self.strategy {
            Strategy::Lexical => Ok(lexical::token_sort_ratio(job_description, wanted_description)),
            Strategy::Semantic(matcher) => matcher.score(job_description, wanted_description),
        }
    }

    pub fn matches(&self, job_description: &str, wanted_description: &str) -> Result<bool, MatchingError> {
        Ok(self.score(job_description, wanted_description)? >= self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct CannedGenerator {
        reply: String,
        prompts: Rc<RefCell<Vec<String>>>,
    }

    impl TextGenerator for CannedGenerator {
        fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn canned(reply: &str) -> (Box<dyn TextGenerator>, Rc<RefCell<Vec<String>>>) {
        let prompts = Rc::new(RefCell::new(Vec::new()));
        let generator = CannedGenerator {
            reply: reply.to_string(),
            prompts: Rc::clone(&prompts),
        };
        (Box::new(generator), prompts)
    }

    #[test]
    fn test_fuzz_threshold_is_inclusive() {
        let lenient = DescriptionMatcher::lexical(51).unwrap();
        let strict = DescriptionMatcher::lexical(90).unwrap();
        assert!(lenient.matches("Software Engineer", "Software Developer").unwrap());
        assert!(!strict.matches("Software Engineer", "Software Developer").unwrap());

        let exact = DescriptionMatcher::lexical(100).unwrap();
        assert!(exact.matches("rust engineer", "Engineer, Rust").unwrap());
    }

    #[test]
    fn test_llm_accepts_score_at_or_above_threshold() {
        let (generator, prompts) = canned("90");
        let matcher = DescriptionMatcher::new(MatchMethod::Llm, 80, Some(generator)).unwrap();

        assert!(matcher.matches("Build payment APIs", "Backend work").unwrap());
        let prompts = prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Build payment APIs"));
        assert!(prompts[0].contains("Backend work"));
    }

    #[test]
    fn test_llm_rejects_below_threshold() {
        let (generator, _) = canned("79");
        let matcher = DescriptionMatcher::semantic(80, generator).unwrap();
        assert!(!matcher.matches("a", "b").unwrap());
    }

    #[test]
    fn test_llm_unparseable_reply_is_matching_error() {
        let (generator, _) = canned("I'd say roughly eighty");
        let matcher = DescriptionMatcher::semantic(80, generator).unwrap();
        assert!(matches!(
            matcher.matches("a", "b"),
            Err(MatchingError::UnparseableScore { .. })
        ));
    }

    #[test]
    fn test_unknown_method_is_config_error() {
        for method in ["cosine", "", "FUZZ"] {
            let err = DescriptionMatcher::from_method_name(method, 80, None).unwrap_err();
            assert!(
                matches!(err, ConfigError::UnknownMatchingMethod(ref m) if m == method),
                "method {method:?} gave {err}"
            );
        }
    }

    #[test]
    fn test_llm_without_generator_is_config_error() {
        assert!(matches!(
            DescriptionMatcher::new(MatchMethod::Llm, 80, None),
            Err(ConfigError::MissingTextGenerator)
        ));
    }

    #[test]
    fn test_threshold_out_of_range() {
        assert!(matches!(
            DescriptionMatcher::lexical(101),
            Err(ConfigError::InvalidThreshold(101))
        ));
        assert!(matches!(
            DescriptionMatcher::lexical(-1),
            Err(ConfigError::InvalidThreshold(-1))
        ));
        assert_eq!(DescriptionMatcher::lexical(0).unwrap().threshold(), 0);
    }

    #[test]
    fn test_method_reported() {
        let (generator, _) = canned("50");
        assert_eq!(DescriptionMatcher::lexical(80).unwrap().method(), MatchMethod::Fuzz);
        assert_eq!(
            DescriptionMatcher::semantic(80, generator).unwrap().method(),
            MatchMethod::Llm
        );
    }
}
