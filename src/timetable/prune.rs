use serde_json::{Map, Value};

use super::model::{MergedPeriod, Period};

/// Display-only keys the server attaches to every period.
pub const PRESENTATION_FIELDS: [&str; 6] = [
    "can",
    "blockHash",
    "foreColor",
    "backColor",
    "innerForeColor",
    "innerBackColor",
];

/// A period whose untyped fields may be pruned.
pub trait Prunable {
    fn untyped_fields(&mut self) -> &mut Map<String, Value>;
}

impl Prunable for Period {
    fn untyped_fields(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }
}

impl Prunable for MergedPeriod {
    fn untyped_fields(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }
}

/// Drops the presentation-only fields of a period; absent keys are fine.
pub fn prune<P: Prunable>(mut period: P) -> P {
    let fields = period.untyped_fields();
    for key in PRESENTATION_FIELDS {
        fields.remove(key);
    }

    period
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::prune;
    use crate::timetable::model::Period;

    fn period_from(value: serde_json::Value) -> Period {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn removes_presentation_fields() {
        let period = period_from(json!({
            "startDateTime": "2024-09-02T10:00Z",
            "endDateTime": "2024-09-02T10:50Z",
            "elements": [],
            "can": ["ROOM"],
            "blockHash": 123,
            "foreColor": "#000000",
            "backColor": "#ffffff",
            "innerForeColor": "#111111",
            "innerBackColor": "#eeeeee",
            "lessonId": 5,
        }));

        let pruned = prune(period);

        assert_eq!(
            json!({
                "startDateTime": "2024-09-02T10:00Z",
                "endDateTime": "2024-09-02T10:50Z",
                "elements": [],
                "lessonId": 5,
            }),
            serde_json::to_value(pruned).unwrap()
        );
    }

    #[test]
    fn missing_fields_are_not_an_error() {
        let period = period_from(json!({
            "startDateTime": "2024-09-02T10:00Z",
            "endDateTime": "2024-09-02T10:50Z",
            "elements": [],
            "backColor": "#ffffff",
        }));

        let pruned = prune(period.clone());

        assert!(!pruned.fields.contains_key("backColor"));
        assert!(!pruned.fields.contains_key("can"));
        assert_eq!(period.start_date_time, pruned.start_date_time);
    }

    #[test]
    fn keeps_annotations() {
        let period = period_from(json!({
            "startDateTime": "2024-09-02T10:00Z",
            "endDateTime": "2024-09-02T10:50Z",
            "elements": [{"type": "ROOM", "id": 4}],
            "homeWorks": [{"endDate": "2024-09-02", "text": "p. 12"}],
            "text": {"lesson": "quiz"},
            "can": [],
        }));

        let pruned = prune(period.clone());

        assert_eq!(period.elements, pruned.elements);
        assert_eq!(period.home_works, pruned.home_works);
        assert_eq!(period.text, pruned.text);
    }
}
