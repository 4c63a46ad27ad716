//! Map recognizer prediction payloads to domain types.
//!
//! The prediction endpoint answers either with a `prediction` envelope or with
//! the intent map at the top level. Both are captured as variants of
//! [`PredictionResponse`] / [`PredictionShape`] and normalized into [`IntentResult`].

use crate::domain::{Entities, IntentResult, NONE_INTENT, TimeExpression};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Entity name carrying resolved dates and times.
pub const DATETIME_ENTITY: &str = "datetimeV2";

/// Top-level prediction response. Variant order matters: `Enveloped` must be tried first,
/// since `TopLevel` accepts any object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PredictionResponse {
    /// `{"query": .., "prediction": {..}}`
    Enveloped { prediction: PredictionShape },
    /// `{"intents": {..}, "entities": {..}}` with no envelope.
    TopLevel(PredictionShape),
}

impl PredictionResponse {
    pub fn into_intent_result(self) -> IntentResult {
        match self {
            PredictionResponse::Enveloped { prediction } => prediction.into_intent_result(),
            PredictionResponse::TopLevel(shape) => shape.into_intent_result(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IntentScore {
    #[serde(default)]
    pub score: f64,
}

/// The two prediction shapes. Variant order matters: `Ranked` must be tried first.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PredictionShape {
    /// Explicit top intent plus a per-intent score map.
    Ranked {
        #[serde(rename = "topIntent")]
        top_intent: String,
        #[serde(default)]
        intents: HashMap<String, IntentScore>,
        #[serde(default)]
        entities: Entities,
    },
    /// Unordered intent map only; the top intent is picked by maximum score.
    Unranked {
        #[serde(default)]
        intents: HashMap<String, IntentScore>,
        #[serde(default)]
        entities: Entities,
    },
}

impl PredictionShape {
    /// Normalize into the uniform result.
    ///
    /// For `Unranked`, score ties resolve to whichever intent the map yields
    /// first. `HashMap` iteration order is unspecified, so ties are not
    /// deterministic across processes.
    pub fn into_intent_result(self) -> IntentResult {
        match self {
            PredictionShape::Ranked {
                top_intent,
                intents,
                entities,
            } => {
                let score = intents.get(&top_intent).map(|s| s.score).unwrap_or(0.0);
                IntentResult {
                    intent: top_intent,
                    score,
                    entities,
                }
            }
            PredictionShape::Unranked { intents, entities } => {
                let mut best: Option<(String, f64)> = None;
                for (name, s) in intents {
                    if best.as_ref().is_none_or(|(_, top)| s.score > *top) {
                        best = Some((name, s.score));
                    }
                }
                let (intent, score) = best.unwrap_or_else(|| (NONE_INTENT.to_string(), 0.0));
                IntentResult {
                    intent,
                    score,
                    entities,
                }
            }
        }
    }
}

/// Extract a date/time expression from recognized entities.
///
/// Prefers a combined `datetime` entry over a `date` entry and takes the first
/// candidate of the chosen kind. Returns `None` when nothing usable is present.
pub fn get_time_entity(result: &IntentResult) -> Option<TimeExpression> {
    let entries = result.entities.get(DATETIME_ENTITY)?.as_array()?;
    first_of_kind(entries, "datetime").or_else(|| first_of_kind(entries, "date"))
}

fn first_of_kind(entries: &[Value], type_name: &str) -> Option<TimeExpression> {
    entries
        .iter()
        .filter(|e| e.get("type").and_then(Value::as_str) == Some(type_name))
        .find_map(|e| {
            let first = e.get("values")?.as_array()?.first()?;
            let timex = first.get("timex")?.as_str()?.to_string();
            let value = first
                .get("resolution")
                .and_then(Value::as_array)
                .and_then(|r| r.first())
                .and_then(|r| r.get("value"))
                .and_then(Value::as_str)
                .map(String::from);
            Some(TimeExpression { timex, value })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> IntentResult {
        let resp: PredictionResponse = serde_json::from_value(v).unwrap();
        resp.into_intent_result()
    }

    #[test]
    fn test_ranked_shape_uses_top_intent() {
        let r = parse(json!({
            "query": "book me in",
            "prediction": {
                "topIntent": "ScheduleAppointment",
                "intents": {
                    "ScheduleAppointment": {"score": 0.82},
                    "GetAvailability": {"score": 0.1}
                },
                "entities": {}
            }
        }));
        assert_eq!(r.intent, "ScheduleAppointment");
        assert!((r.score - 0.82).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ranked_shape_missing_score_is_zero() {
        let r = parse(json!({
            "prediction": {"topIntent": "GetAvailability", "intents": {}}
        }));
        assert_eq!(r.intent, "GetAvailability");
        assert_eq!(r.score, 0.0);
    }

    #[test]
    fn test_unranked_shape_picks_max() {
        let r = parse(json!({
            "prediction": {
                "intents": {
                    "None": {"score": 0.2},
                    "GetAvailability": {"score": 0.7},
                    "ScheduleAppointment": {"score": 0.4}
                }
            }
        }));
        assert_eq!(r.intent, "GetAvailability");
        assert!((r.score - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unranked_tie_picks_one_of_the_tied() {
        let r = parse(json!({
            "prediction": {
                "intents": {
                    "GetAvailability": {"score": 0.6},
                    "ScheduleAppointment": {"score": 0.6},
                    "None": {"score": 0.1}
                }
            }
        }));
        assert!(r.intent == "GetAvailability" || r.intent == "ScheduleAppointment");
        assert!((r.score - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_top_level_intents_without_envelope() {
        let r = parse(json!({
            "query": "book me in",
            "intents": {
                "ScheduleAppointment": {"score": 0.9},
                "None": {"score": 0.05}
            },
            "entities": {
                "datetimeV2": [{"type": "date", "values": [{"timex": "2026-10-20"}]}]
            }
        }));
        assert_eq!(r.intent, "ScheduleAppointment");
        assert!((r.score - 0.9).abs() < f64::EPSILON);
        assert_eq!(get_time_entity(&r).unwrap().timex, "2026-10-20");
    }

    #[test]
    fn test_top_level_ranked_without_envelope() {
        let r = parse(json!({
            "topIntent": "GetAvailability",
            "intents": {"GetAvailability": {"score": 0.66}}
        }));
        assert_eq!(r.intent, "GetAvailability");
        assert!((r.score - 0.66).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unranked_empty_is_none() {
        let r = parse(json!({"prediction": {}}));
        assert_eq!(r, IntentResult::none());
    }

    #[test]
    fn test_time_entity_prefers_datetime() {
        let mut r = IntentResult::none();
        r.entities.insert(
            DATETIME_ENTITY.to_string(),
            json!([
                {"type": "date", "values": [{"timex": "2026-10-20", "resolution": [{"value": "2026-10-20"}]}]},
                {"type": "datetime", "values": [
                    {"timex": "2026-10-21T15", "resolution": [{"value": "2026-10-21 15:00:00"}]},
                    {"timex": "2026-10-22T15"}
                ]}
            ]),
        );
        let t = get_time_entity(&r).unwrap();
        assert_eq!(t.timex, "2026-10-21T15");
        assert_eq!(t.value.as_deref(), Some("2026-10-21 15:00:00"));
    }

    #[test]
    fn test_time_entity_falls_back_to_date() {
        let mut r = IntentResult::none();
        r.entities.insert(
            DATETIME_ENTITY.to_string(),
            json!([{"type": "date", "values": [{"timex": "XXXX-WXX-2"}]}]),
        );
        let t = get_time_entity(&r).unwrap();
        assert_eq!(t.timex, "XXXX-WXX-2");
        assert_eq!(t.value, None);
    }

    #[test]
    fn test_time_entity_tolerates_missing_fields() {
        let mut r = IntentResult::none();
        assert_eq!(get_time_entity(&r), None);

        r.entities
            .insert(DATETIME_ENTITY.to_string(), json!("not-an-array"));
        assert_eq!(get_time_entity(&r), None);

        r.entities.insert(
            DATETIME_ENTITY.to_string(),
            json!([{"type": "datetime"}, {"type": "datetime", "values": []}, {"values": [{"timex": "x"}]}]),
        );
        assert_eq!(get_time_entity(&r), None);
    }
}
