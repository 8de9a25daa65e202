use serde_json::Value;

/// One extracted field value, decoded from JSON exactly once at the boundary.
/// Absence means "the extractor found nothing", not "false".
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawValue {
    #[default]
    Absent,
    Text(String),
    Number(f64),
    Boolean(bool),
}

impl RawValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, RawValue::Absent)
    }

    /// Single-value text view: text passes through trimmed, numbers are
    /// stringified, booleans and absence yield nothing.
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            RawValue::Number(value) => Some(format_number(*value)),
            RawValue::Boolean(_) | RawValue::Absent => None,
        }
    }

    /// Integer view for pass-through numeric fields such as count/start.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RawValue::Number(value) if value.fract() == 0.0 => Some(*value as i64),
            RawValue::Text(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Float view for coordinate fields.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RawValue::Number(value) => Some(*value),
            RawValue::Text(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// The fields the entity extractor may populate, every one optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawExtraction {
    pub location: RawValue,
    pub large_area: RawValue,
    pub middle_area: RawValue,
    pub small_area: RawValue,
    pub genre: RawValue,
    pub budget: RawValue,
    pub keyword: RawValue,
    pub private_room: RawValue,
    pub lunch: RawValue,
    pub free_food: RawValue,
    pub free_drink: RawValue,
    pub midnight: RawValue,
    pub cocktail: RawValue,
    pub sake: RawValue,
    pub wine: RawValue,
    pub lat: RawValue,
    pub lng: RawValue,
    pub range: RawValue,
    pub count: RawValue,
    pub start: RawValue,
}

/// Field names in the extraction payload, paired with accessors. Unknown keys
/// in the payload are ignored.
const FIELDS: &[(&str, fn(&mut RawExtraction) -> &mut RawValue)] = &[
    ("location", |e| &mut e.location),
    ("large_area", |e| &mut e.large_area),
    ("middle_area", |e| &mut e.middle_area),
    ("small_area", |e| &mut e.small_area),
    ("genre", |e| &mut e.genre),
    ("budget", |e| &mut e.budget),
    ("keyword", |e| &mut e.keyword),
    ("private_room", |e| &mut e.private_room),
    ("lunch", |e| &mut e.lunch),
    ("free_food", |e| &mut e.free_food),
    ("free_drink", |e| &mut e.free_drink),
    ("midnight", |e| &mut e.midnight),
    ("cocktail", |e| &mut e.cocktail),
    ("sake", |e| &mut e.sake),
    ("wine", |e| &mut e.wine),
    ("lat", |e| &mut e.lat),
    ("lng", |e| &mut e.lng),
    ("range", |e| &mut e.range),
    ("count", |e| &mut e.count),
    ("start", |e| &mut e.start),
];

/// A field that could not be decoded and was degraded to absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
}

impl RawExtraction {
    /// Decodes an extraction payload. Malformed shapes degrade the affected
    /// field (or, for a non-object payload, every field) to absent and are
    /// reported as issues; this never fails.
    pub fn from_value(value: &Value) -> (Self, Vec<FieldIssue>) {
        let mut extraction = RawExtraction::default();
        let mut issues = Vec::new();

        let Some(object) = value.as_object() else {
            issues.push(FieldIssue { field: "payload" });
            return (extraction, issues);
        };

        for &(name, accessor) in FIELDS {
            let Some(raw) = object.get(name) else {
                continue;
            };
            match decode_value(raw) {
                Some(decoded) => *accessor(&mut extraction) = decoded,
                None => issues.push(FieldIssue { field: name }),
            }
        }

        (extraction, issues)
    }
}

fn decode_value(value: &Value) -> Option<RawValue> {
    match value {
        Value::Null => Some(RawValue::Absent),
        Value::String(text) => Some(RawValue::Text(text.clone())),
        Value::Number(number) => number.as_f64().map(RawValue::Number),
        Value::Bool(flag) => Some(RawValue::Boolean(*flag)),
        // Arrays and objects have no single-value reading.
        Value::Array(_) | Value::Object(_) => None,
    }
}
