use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::UntisError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementType {
    Class,
    Teacher,
    Subject,
    Room,
    /// Any element kind without a reference table, e.g. `STUDENT`
    Other(String),
}

impl From<String> for ElementType {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "CLASS" => Self::Class,
            "TEACHER" => Self::Teacher,
            "SUBJECT" => Self::Subject,
            "ROOM" => Self::Room,
            _ => Self::Other(kind),
        }
    }
}

impl From<ElementType> for String {
    fn from(kind: ElementType) -> Self {
        match kind {
            ElementType::Class => "CLASS".to_string(),
            ElementType::Teacher => "TEACHER".to_string(),
            ElementType::Subject => "SUBJECT".to_string(),
            ElementType::Room => "ROOM".to_string(),
            ElementType::Other(kind) => kind,
        }
    }
}

/// A reference from a period into one of the master data tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: ElementType,
    pub id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Element {
    pub fn new(kind: ElementType, id: i64) -> Self {
        Self {
            kind,
            id,
            fields: Map::new(),
        }
    }

    /// Whether both elements point at the same table entry.
    pub fn same_reference(&self, other: &Element) -> bool {
        self.kind == other.kind && self.id == other.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Homework {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A single lesson as delivered by the server.
///
/// Everything besides the typed fields is kept verbatim in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start_date_time: String,
    pub end_date_time: String,
    pub elements: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_works: Option<Vec<Homework>>,
    #[serde(
        default,
        deserialize_with = "explicit_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Option<Value>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Period {
    pub fn new(start: &str, end: &str, elements: Vec<Element>) -> Self {
        Self {
            start_date_time: start.to_string(),
            end_date_time: end.to_string(),
            elements,
            home_works: None,
            text: None,
            fields: Map::new(),
        }
    }

    pub(crate) fn into_resolved(self, elements: ResolvedElements) -> MergedPeriod {
        MergedPeriod {
            start_date_time: self.start_date_time,
            end_date_time: self.end_date_time,
            elements,
            home_works: self.home_works,
            text: self.text,
            fields: self.fields,
        }
    }
}

/// Display names of the elements of a period, grouped by table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedElements {
    pub classes: Vec<String>,
    pub teachers: Vec<String>,
    pub subjects: Vec<String>,
    pub rooms: Vec<String>,
}

/// A period after merging and reference resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedPeriod {
    pub start_date_time: String,
    pub end_date_time: String,
    pub elements: ResolvedElements,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_works: Option<Vec<Homework>>,
    #[serde(
        default,
        deserialize_with = "explicit_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Option<Value>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub id: i64,
    pub name: String,
}

impl ReferenceEntry {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only an absent key is `None`.
fn explicit_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// The master data tables elements are resolved against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTables {
    #[serde(rename = "klassen")]
    pub classes: Vec<ReferenceEntry>,
    pub teachers: Vec<ReferenceEntry>,
    pub subjects: Vec<ReferenceEntry>,
    pub rooms: Vec<ReferenceEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTimetable {
    pub periods: Vec<Period>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// The `result` object of a timetable response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTimetableResult {
    pub timetable: RawTimetable,
    pub master_data: ReferenceTables,
}

impl RawTimetableResult {
    pub fn from_value(value: Value) -> Result<Self, UntisError> {
        serde_json::from_value(value)
            .map_err(|e| UntisError::MalformedInput(format!("timetable response: {e}")))
    }
}

/// The normalized timetable handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timetable {
    pub periods: Vec<MergedPeriod>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::{Element, ElementType, Period};

    #[rstest]
    #[case("CLASS", ElementType::Class)]
    #[case("ROOM", ElementType::Room)]
    #[case("STUDENT", ElementType::Other("STUDENT".into()))]
    #[case("GROUP", ElementType::Other("GROUP".into()))]
    fn reads_element_types(#[case] raw: &str, #[case] expected: ElementType) {
        let element: Element = serde_json::from_value(json!({"type": raw, "id": 5})).unwrap();

        assert_eq!(expected, element.kind);
    }

    #[test]
    fn unknown_element_types_keep_their_name() {
        let element: Element =
            serde_json::from_value(json!({"type": "STUDENT", "id": 5, "state": "REGULAR"}))
                .unwrap();

        assert_eq!(
            json!({"type": "STUDENT", "id": 5, "state": "REGULAR"}),
            serde_json::to_value(&element).unwrap()
        );
    }

    #[test]
    fn explicit_null_text_is_kept() {
        let raw = json!({
            "startDateTime": "2024-09-02T07:45Z",
            "endDateTime": "2024-09-02T08:35Z",
            "elements": [],
            "text": null,
        });

        let period: Period = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(Some(serde_json::Value::Null), period.text);
        assert_eq!(raw, serde_json::to_value(&period).unwrap());
    }

    #[test]
    fn absent_text_stays_absent() {
        let period: Period = serde_json::from_value(json!({
            "startDateTime": "2024-09-02T07:45Z",
            "endDateTime": "2024-09-02T08:35Z",
            "elements": [],
        }))
        .unwrap();

        assert_eq!(None, period.text);
        assert!(serde_json::to_value(&period).unwrap().get("text").is_none());
    }
}
