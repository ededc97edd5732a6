mod merge;
mod model;
mod prune;
mod resolve;

use serde_json::Value;

pub use merge::{merge_periods, parse_timestamp};
pub use model::*;
pub use prune::{prune, Prunable, PRESENTATION_FIELDS};
pub use resolve::resolve_references;

use crate::UntisError;

/// Turns a raw timetable response into the compact form: periods sorted and
/// merged, element ids replaced by names, presentation fields removed.
///
/// The reference tables are consumed here and not part of the output.
pub fn normalize(raw: RawTimetableResult) -> Result<Timetable, UntisError> {
    let RawTimetableResult {
        timetable,
        master_data,
    } = raw;

    let periods = merge_periods(timetable.periods)?;
    let periods = resolve_references(periods, &master_data)
        .into_iter()
        .map(prune)
        .collect();

    Ok(Timetable {
        periods,
        fields: timetable.fields,
    })
}

/// Homeworks due on the day of the lesson they are attached to.
pub fn collect_homeworks(periods: &[MergedPeriod]) -> Vec<Homework> {
    periods
        .iter()
        .flat_map(|period| {
            let lesson_day = period.end_date_time.get(..10).unwrap_or_default();
            period
                .home_works
                .iter()
                .flatten()
                .filter(move |homework| homework.end_date.as_deref() == Some(lesson_day))
        })
        .cloned()
        .collect()
}

/// The text annotations of all periods, in timetable order.
pub fn collect_texts(periods: &[MergedPeriod]) -> Vec<Value> {
    periods
        .iter()
        .filter_map(|period| period.text.clone())
        .filter(|text| !text.is_null())
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{collect_homeworks, collect_texts, normalize, RawTimetableResult};
    use crate::UntisError;

    fn raw_response() -> serde_json::Value {
        json!({
            "timetable": {
                "displayableStartDate": "2024-09-02",
                "displayableEndDate": "2024-09-02",
                "periods": [
                    {
                        "id": 3,
                        "startDateTime": "2024-09-02T09:40Z",
                        "endDateTime": "2024-09-02T10:30Z",
                        "elements": [{"type": "SUBJECT", "id": 10}, {"type": "TEACHER", "id": 7}],
                        "backColor": "#f0f0f0",
                        "foreColor": "#000000",
                        "blockHash": 99,
                    },
                    {
                        "id": 1,
                        "startDateTime": "2024-09-02T08:00Z",
                        "endDateTime": "2024-09-02T08:50Z",
                        "elements": [{"type": "SUBJECT", "id": 10}, {"type": "TEACHER", "id": 7}],
                        "backColor": "#f0f0f0",
                        "can": ["HOMEWORK"],
                        "homeWorks": [
                            {"id": 501, "endDate": "2024-09-02", "text": "Exercise 4"},
                            {"id": 502, "endDate": "2024-09-09", "text": "Read chapter 2"},
                        ],
                    },
                    {
                        "id": 2,
                        "startDateTime": "2024-09-02T08:50Z",
                        "endDateTime": "2024-09-02T09:40Z",
                        "elements": [{"type": "SUBJECT", "id": 10}, {"type": "TEACHER", "id": 7}],
                        "innerBackColor": "#ffffff",
                        "text": {"lesson": "Bring a ruler", "substitution": "", "info": ""},
                    },
                ],
            },
            "masterData": {
                "klassen": [{"id": 1, "name": "5a"}],
                "teachers": [{"id": 7, "name": "Smith", "firstName": "Jane"}],
                "subjects": [{"id": 10, "name": "Math"}],
                "rooms": [],
            },
        })
    }

    #[test]
    fn normalizes_a_timetable_response() {
        let raw = RawTimetableResult::from_value(raw_response()).unwrap();

        let timetable = normalize(raw).unwrap();

        assert_eq!(
            json!({
                "displayableStartDate": "2024-09-02",
                "displayableEndDate": "2024-09-02",
                "periods": [
                    {
                        "id": 1,
                        "startDateTime": "2024-09-02T08:00Z",
                        "endDateTime": "2024-09-02T10:30Z",
                        "elements": {
                            "classes": [],
                            "teachers": ["Smith"],
                            "subjects": ["Math"],
                            "rooms": [],
                        },
                        "homeWorks": [
                            {"id": 501, "endDate": "2024-09-02", "text": "Exercise 4"},
                            {"id": 502, "endDate": "2024-09-09", "text": "Read chapter 2"},
                        ],
                    },
                ],
            }),
            serde_json::to_value(timetable).unwrap()
        );
    }

    #[test]
    fn missing_reference_table_is_malformed() {
        let mut response = raw_response();
        response["masterData"]
            .as_object_mut()
            .unwrap()
            .remove("teachers");

        assert!(matches!(
            RawTimetableResult::from_value(response),
            Err(UntisError::MalformedInput(_))
        ));
    }

    #[test]
    fn missing_timestamp_is_malformed() {
        let mut response = raw_response();
        response["timetable"]["periods"][0]
            .as_object_mut()
            .unwrap()
            .remove("startDateTime");

        assert!(matches!(
            RawTimetableResult::from_value(response),
            Err(UntisError::MalformedInput(_))
        ));
    }

    #[test]
    fn collects_homeworks_due_on_the_lesson_day() {
        let raw = RawTimetableResult::from_value(raw_response()).unwrap();
        let mut timetable = normalize(raw).unwrap();
        // Unmerged lesson ending on the ninth
        let mut later = timetable.periods[0].clone();
        later.end_date_time = "2024-09-09T08:50Z".to_string();
        timetable.periods.push(later);

        let homeworks = collect_homeworks(&timetable.periods);

        let ids: Vec<_> = homeworks.iter().map(|h| h.fields["id"].clone()).collect();
        assert_eq!(vec![json!(501), json!(502)], ids);
    }

    #[test]
    fn collects_texts() {
        let mut response = raw_response();
        // Keep the lessons apart so the annotated one survives merging
        response["timetable"]["periods"][2]["elements"] = json!([{"type": "ROOM", "id": 1}]);
        let timetable = normalize(RawTimetableResult::from_value(response).unwrap()).unwrap();

        assert_eq!(
            vec![json!({"lesson": "Bring a ruler", "substitution": "", "info": ""})],
            collect_texts(&timetable.periods)
        );
    }

    #[test]
    fn null_texts_are_kept_but_not_collected() {
        let mut response = raw_response();
        response["timetable"]["periods"][2]["elements"] = json!([{"type": "ROOM", "id": 1}]);
        response["timetable"]["periods"][0]["text"] = json!(null);
        let timetable = normalize(RawTimetableResult::from_value(response).unwrap()).unwrap();

        assert_eq!(3, timetable.periods.len());
        assert_eq!(Some(json!(null)), timetable.periods[2].text);
        assert_eq!(
            vec![json!({"lesson": "Bring a ruler", "substitution": "", "info": ""})],
            collect_texts(&timetable.periods)
        );
    }
}
