//! Shape canonicalization for records arriving from the assessment service.
//!
//! Fetched records reach this core under several casings and nestings
//! depending on which backend revision produced them. Each logical field has
//! a fixed, ordered list of accepted names, applied once here at the data
//! boundary; nothing deeper in the core branches on wire shape.

use serde_json::{Map, Value};

use super::domain::AnswerId;
use super::scoring::ValidationError;

/// Envelope keys a record may be wrapped under.
const ENVELOPE_KEYS: [&str; 3] = ["data", "assessment", "attributes"];

/// Accepted names for the stored answer-id list, in priority order.
const ANSWER_KEYS: [&str; 5] = [
    "answers",
    "Answers",
    "assessmentAnswers",
    "assessment_answers",
    "answer_ids",
];

/// Accepted names for the stored score, in priority order.
const SCORE_KEYS: [&str; 4] = ["score", "totalScore", "total_score", "Score"];

/// Accepted names for the stored symptom label, in priority order.
const SYMPTOM_KEYS: [&str; 4] = ["symptoms", "Symptoms", "symptom", "symptoms_label"];

/// A fetched record reduced to the three fields the results view needs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedAssessment {
    pub answers: Vec<AnswerId>,
    pub score: Option<u32>,
    pub symptoms: Option<String>,
}

/// Canonicalizes a raw record fetched from the assessment service.
///
/// A record that is not an object (even unwrapped) fails loudly; missing
/// fields are tolerated and surface as empty/absent.
pub fn normalize_record(value: &Value) -> Result<NormalizedAssessment, ValidationError> {
    let record = unwrap_envelope(value).ok_or(ValidationError::RecordNotAnObject)?;

    let answers = match first_present(record, &ANSWER_KEYS) {
        Some(raw) => parse_answer_ids(raw)?,
        None => Vec::new(),
    };

    let score = first_present(record, &SCORE_KEYS).and_then(coerce_u32);

    let symptoms = first_present(record, &SYMPTOM_KEYS)
        .and_then(Value::as_str)
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty());

    Ok(NormalizedAssessment {
        answers,
        score,
        symptoms,
    })
}

/// Parses an untyped answer list into identifiers; non-list input and
/// non-string entries are rejected.
pub(crate) fn parse_answer_ids(value: &Value) -> Result<Vec<AnswerId>, ValidationError> {
    let items = value.as_array().ok_or(ValidationError::AnswersNotAList)?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(|id| AnswerId(id.to_string()))
                .ok_or(ValidationError::NonStringAnswerId)
        })
        .collect()
}

/// Coerces a JSON value into a non-negative integer weight or score.
/// Numeric strings are accepted; negatives and non-numerics are not.
pub(crate) fn coerce_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(raw) => raw.trim().parse::<u32>().ok(),
        _ => None,
    }
}

fn unwrap_envelope(value: &Value) -> Option<&Map<String, Value>> {
    let object = value.as_object()?;
    for key in ENVELOPE_KEYS {
        if let Some(inner) = object.get(key).and_then(Value::as_object) {
            return Some(inner);
        }
    }
    Some(object)
}

fn first_present<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| record.get(*key))
        .filter(|value| !value.is_null())
}
