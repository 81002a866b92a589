use serde_json::Value;

use super::domain::{AnswerId, Question};
use super::normalize::parse_answer_ids;

/// Malformed untyped input at the scoring or normalization boundary. Unlike
/// collaborator failures this is surfaced loudly to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("answers must be a list")]
    AnswersNotAList,
    #[error("answer identifiers must be strings")]
    NonStringAnswerId,
    #[error("assessment record must be an object")]
    RecordNotAnObject,
}

/// Sums the canonicalized weight of every selected answer.
///
/// Identifiers are matched by scanning the catalog in order; on a duplicate
/// identifier the first match wins. Unknown identifiers contribute nothing.
/// The result is independent of the selection order, and an empty selection
/// scores zero. The catalog passed in does not have to be the one the quiz
/// was taken against, which is what makes recomputing persisted records
/// against the live catalog possible.
pub fn score_answers(selected: &[AnswerId], questions: &[Question]) -> u32 {
    selected
        .iter()
        .map(|id| catalog_weight(id, questions))
        .sum()
}

/// Scores an untyped answer list as it arrives from a hand-off payload or a
/// remote record.
pub fn score_raw(selected: &Value, questions: &[Question]) -> Result<u32, ValidationError> {
    let ids = parse_answer_ids(selected)?;
    Ok(score_answers(&ids, questions))
}

fn catalog_weight(id: &AnswerId, questions: &[Question]) -> u32 {
    for question in questions {
        for answer in &question.answers {
            if answer.id == *id {
                return answer.weight;
            }
        }
    }
    0
}
