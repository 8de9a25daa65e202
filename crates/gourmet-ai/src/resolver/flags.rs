use super::raw::RawValue;

/// Words the extractor may emit for "the user wants this". Matching is
/// case-insensitive; anything outside this vocabulary reads as 0. Negations
/// are not special-cased: closed world, default to 0.
const AFFIRMATIONS: &[&str] = &[
    "あり", "有り", "有", "はい", "yes", "true", "1", "○", "〇", "◯", "✓", "✔", "on",
];

/// Resolves an amenity flag to the 0/1 the search API expects. Numbers pass
/// through (any non-zero reads as 1), booleans map directly, text is tried as
/// an integer and then against the affirmation vocabulary.
pub fn resolve_flag(value: &RawValue) -> u8 {
    match value {
        RawValue::Absent => 0,
        RawValue::Boolean(flag) => u8::from(*flag),
        RawValue::Number(number) => u8::from(*number != 0.0),
        RawValue::Text(text) => {
            let trimmed = text.trim();
            if let Ok(parsed) = trimmed.parse::<i64>() {
                return u8::from(parsed != 0);
            }
            let lowered = trimmed.to_lowercase();
            u8::from(AFFIRMATIONS.contains(&lowered.as_str()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affirmation_words_read_as_one() {
        assert_eq!(resolve_flag(&RawValue::Text("あり".to_string())), 1);
        assert_eq!(resolve_flag(&RawValue::Text("はい".to_string())), 1);
        assert_eq!(resolve_flag(&RawValue::Text("YES".to_string())), 1);
        assert_eq!(resolve_flag(&RawValue::Text(" ○ ".to_string())), 1);
    }

    #[test]
    fn everything_outside_the_vocabulary_reads_as_zero() {
        assert_eq!(resolve_flag(&RawValue::Text("なし".to_string())), 0);
        assert_eq!(resolve_flag(&RawValue::Text("maybe".to_string())), 0);
        assert_eq!(resolve_flag(&RawValue::Text(String::new())), 0);
    }

    #[test]
    fn numbers_pass_through() {
        assert_eq!(resolve_flag(&RawValue::Number(1.0)), 1);
        assert_eq!(resolve_flag(&RawValue::Number(0.0)), 0);
        assert_eq!(resolve_flag(&RawValue::Number(2.0)), 1);
    }

    #[test]
    fn numeric_strings_parse() {
        assert_eq!(resolve_flag(&RawValue::Text("1".to_string())), 1);
        assert_eq!(resolve_flag(&RawValue::Text("0".to_string())), 0);
    }

    #[test]
    fn booleans_and_absence_map_directly() {
        assert_eq!(resolve_flag(&RawValue::Boolean(true)), 1);
        assert_eq!(resolve_flag(&RawValue::Boolean(false)), 0);
        assert_eq!(resolve_flag(&RawValue::Absent), 0);
    }
}
