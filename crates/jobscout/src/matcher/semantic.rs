//! LLM-scored similarity.

use tracing::debug;

use super::MatchingError;
use crate::llm::TextGenerator;
use crate::sanitize::{truncate_for_log, LOG_TEXT_LIMIT};

/// Prompt asking for a single 0-100 integer. Same inputs, same prompt.
pub fn build_prompt(job_description: &str, wanted_description: &str) -> String {
    format!(
        "Rate from 0 to 100 how well the job description matches the wanted description. \
         Respond with the integer score only.\n\n\
         Job description:\n{job_description}\n\n\
         Wanted description:\n{wanted_description}\n"
    )
}

/// Parses a generated reply as a score in 0-100.
pub fn parse_score(response: &str) -> Result<u8, MatchingError> {
    let trimmed = response.trim();
    let score: i64 = trimmed
        .parse()
        .map_err(|_| MatchingError::UnparseableScore {
            response: truncate_for_log(trimmed, LOG_TEXT_LIMIT),
        })?;

    u8::try_from(score)
        .ok()
        .filter(|s| *s <= 100)
        .ok_or(MatchingError::ScoreOutOfRange(score))
}

pub struct SemanticMatcher {
    generator: Box<dyn TextGenerator>,
}

impl SemanticMatcher {
    pub fn new(generator: Box<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn score(&self, job_description: &str, wanted_description: &str) -> Result<u8, MatchingError> {
        let prompt = build_prompt(job_description, wanted_description);
        let response = self.generator.generate_text(&prompt)?;
        debug!(response = %truncate_for_log(&response, LOG_TEXT_LIMIT), "Received similarity score");
        parse_score(&response)
    }
}
