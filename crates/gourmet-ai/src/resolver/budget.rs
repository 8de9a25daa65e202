use crate::taxonomy::TaxonomyItem;

/// Matches a numeric amount against a budget band whose display name encodes
/// the range as free text ("～3000円", "5000円以上", "3000円～5000円").
pub fn match_budget<'a>(item: &'a TaxonomyItem, amount: i64) -> Option<&'a str> {
    let numbers = extract_numbers(&item.name);
    let matched = match numbers.as_slice() {
        [] => false,
        [value] => {
            if has_upper_marker(&item.name) {
                amount <= *value
            } else if has_lower_marker(&item.name) {
                amount >= *value
            } else {
                // A bare single number reads as a ceiling. Not universally
                // correct; kept pending product sign-off.
                amount <= *value
            }
        }
        // Inclusive on both ends; numbers past the first two are ignored.
        [low, high, ..] => *low <= amount && amount <= *high,
    };
    matched.then(|| item.code.as_str())
}

/// Scans budget bands in taxonomy order and returns the first match.
pub fn first_budget_match(items: &[TaxonomyItem], amount: i64) -> Option<&str> {
    items.iter().find_map(|item| match_budget(item, amount))
}

fn has_upper_marker(name: &str) -> bool {
    name.contains("以下")
        || name.contains("まで")
        || name.trim_start().starts_with(['～', '〜'])
}

fn has_lower_marker(name: &str) -> bool {
    name.contains("以上") || name.trim_end().ends_with(['～', '〜'])
}

/// Collects every integer substring of the band name, in order. Full-width
/// digits count; grouping commas inside a run are ignored.
fn extract_numbers(name: &str) -> Vec<i64> {
    let mut numbers = Vec::new();
    let mut current = String::new();

    let mut chars = name.chars().peekable();
    while let Some(ch) = chars.next() {
        if let Some(digit) = to_ascii_digit(ch) {
            current.push(digit);
        } else if (ch == ',' || ch == '，')
            && !current.is_empty()
            && chars.peek().copied().and_then(to_ascii_digit).is_some()
        {
            // "3,000" is one number, not two.
        } else if !current.is_empty() {
            if let Ok(value) = current.parse::<i64>() {
                numbers.push(value);
            }
            current.clear();
        }
    }
    if !current.is_empty() {
        if let Ok(value) = current.parse::<i64>() {
            numbers.push(value);
        }
    }

    numbers
}

fn to_ascii_digit(ch: char) -> Option<char> {
    match ch {
        '0'..='9' => Some(ch),
        '０'..='９' => char::from_u32(ch as u32 - '０' as u32 + '0' as u32),
        _ => None,
    }
}
