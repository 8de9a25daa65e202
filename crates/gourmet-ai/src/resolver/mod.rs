//! Entity-to-code resolution: turns the extractor's loosely-typed field
//! values into the closed vocabulary of codes the search API accepts.
//!
//! Every step is a table scan over the immutable taxonomy; nothing here
//! blocks, locks, or fails. Unresolvable inputs degrade the affected field to
//! empty and surface as diagnostics.

mod budget;
mod flags;
mod location;
mod matcher;
pub mod normalizer;
pub mod raw;

pub use location::AreaCodes;

use crate::search::SearchParams;
use crate::taxonomy::{Category, Taxonomy};
use normalizer::normalize;
use raw::{RawExtraction, RawValue};
use serde::Serialize;
use tracing::debug;

pub use budget::match_budget;
pub use flags::resolve_flag;
pub use location::resolve_location;
pub use matcher::match_code;

/// What failed to resolve, and why the record may be thinner than the
/// extraction suggested. Informational only; the merge itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The taxonomy could not be loaded; every code lookup degraded.
    TaxonomyUnavailable,
    /// A field value had a shape the boundary decoder rejected.
    MalformedField { field: String },
    /// A present field found no code in its category.
    Unresolved { field: String, value: String },
    /// Nothing usable came out of the merge; the caller owns the decision to
    /// substitute the original utterance as a keyword.
    NothingResolved,
}

/// Outcome of a merge: the flat parameter record plus diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub params: SearchParams,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    pub fn nothing_resolved(&self) -> bool {
        self.diagnostics.contains(&Diagnostic::NothingResolved)
    }
}

/// Combines per-field extractions with the taxonomy into the final record.
///
/// Order matters for the area slots: a `location` phrase resolves first
/// through the hierarchy, then explicit per-level fields overwrite the slot
/// they name. Last write wins per slot.
pub fn merge(extraction: &RawExtraction, taxonomy: &Taxonomy) -> Resolution {
    let mut params = SearchParams::default();
    let mut diagnostics = Vec::new();

    if taxonomy.is_empty() {
        diagnostics.push(Diagnostic::TaxonomyUnavailable);
    }

    if let Some(text) = extraction.location.as_text() {
        let codes = location::resolve_location(taxonomy, &normalize(&text));
        if codes.is_empty() {
            debug!(location = %text, "location phrase resolved to no area");
            diagnostics.push(Diagnostic::Unresolved {
                field: "location".to_string(),
                value: text,
            });
        } else {
            params.large_area = codes.large;
            params.middle_area = codes.middle;
            params.small_area = codes.small;
        }
    }

    let area_fields: [(&str, &RawValue, Category); 3] = [
        ("large_area", &extraction.large_area, Category::LargeArea),
        ("middle_area", &extraction.middle_area, Category::MiddleArea),
        ("small_area", &extraction.small_area, Category::SmallArea),
    ];
    for (field, value, category) in area_fields {
        let Some(text) = value.as_text() else {
            continue;
        };
        match matcher::first_match(taxonomy.items(category), &normalize(&text)) {
            Some(code) => {
                let code = Some(code.to_string());
                match category {
                    Category::LargeArea => params.large_area = code,
                    Category::MiddleArea => params.middle_area = code,
                    Category::SmallArea => params.small_area = code,
                    _ => unreachable!("area fields only"),
                }
            }
            None => diagnostics.push(Diagnostic::Unresolved {
                field: field.to_string(),
                value: text,
            }),
        }
    }

    if let Some(text) = extraction.genre.as_text() {
        match matcher::first_match(taxonomy.items(Category::Genre), &normalize(&text)) {
            Some(code) => params.genre = Some(code.to_string()),
            None => diagnostics.push(Diagnostic::Unresolved {
                field: "genre".to_string(),
                value: text,
            }),
        }
    }

    if let Some(text) = extraction.budget.as_text() {
        match resolve_budget(&text, taxonomy) {
            Some(code) => params.budget = Some(code),
            None => diagnostics.push(Diagnostic::Unresolved {
                field: "budget".to_string(),
                value: text,
            }),
        }
    }

    if let Some(keyword) = extraction.keyword.as_text() {
        params.keyword = Some(keyword);
    }

    params.private_room = resolve_flag(&extraction.private_room);
    params.lunch = resolve_flag(&extraction.lunch);
    params.free_food = resolve_flag(&extraction.free_food);
    params.free_drink = resolve_flag(&extraction.free_drink);
    params.midnight = resolve_flag(&extraction.midnight);
    params.cocktail = resolve_flag(&extraction.cocktail);
    params.sake = resolve_flag(&extraction.sake);
    params.wine = resolve_flag(&extraction.wine);

    // Pass-through geolocation and pagination; the engine does not compute
    // these.
    params.lat = extraction.lat.as_float();
    params.lng = extraction.lng.as_float();
    params.range = extraction
        .range
        .as_integer()
        .and_then(|value| u8::try_from(value).ok());
    params.count = extraction.count.as_integer().and_then(to_u32);
    params.start = extraction.start.as_integer().and_then(to_u32);

    if params.large_area.is_none()
        && params.middle_area.is_none()
        && params.small_area.is_none()
        && params.genre.is_none()
        && params.budget.is_none()
        && params.keyword.is_none()
    {
        diagnostics.push(Diagnostic::NothingResolved);
    }

    Resolution {
        params,
        diagnostics,
    }
}

/// Budget resolution ladder: an already-canonical code passes through
/// untouched, a plain integer goes to the numeric band matcher, anything else
/// is matched by band name.
fn resolve_budget(text: &str, taxonomy: &Taxonomy) -> Option<String> {
    let trimmed = text.trim();
    if taxonomy.has_code(Category::Budget, trimmed) || looks_like_code(trimmed) {
        return Some(trimmed.to_string());
    }
    if let Ok(amount) = trimmed.parse::<i64>() {
        return budget::first_budget_match(taxonomy.items(Category::Budget), amount)
            .map(str::to_string);
    }
    matcher::first_match(taxonomy.items(Category::Budget), &normalize(trimmed))
        .map(str::to_string)
}

/// The search API's code shape: one ASCII uppercase letter, then digits
/// ("B001"-style budget codes).
fn looks_like_code(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_uppercase())
        && {
            let rest = chars.as_str();
            !rest.is_empty() && rest.chars().all(|ch| ch.is_ascii_digit())
        }
}

fn to_u32(value: i64) -> Option<u32> {
    u32::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::testdata;
    use serde_json::json;

    fn extraction(payload: serde_json::Value) -> RawExtraction {
        let (extraction, issues) = RawExtraction::from_value(&payload);
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
        extraction
    }

    #[test]
    fn location_populates_the_area_hierarchy() {
        let taxonomy = testdata::sample();
        let resolution = merge(&extraction(json!({ "location": "秋葉原" })), &taxonomy);
        assert_eq!(resolution.params.small_area.as_deref(), Some("X005"));
        assert_eq!(resolution.params.middle_area.as_deref(), Some("Y010"));
        assert_eq!(resolution.params.large_area.as_deref(), Some("Z011"));
    }

    #[test]
    fn explicit_area_field_overrides_the_inferred_slot() {
        let taxonomy = testdata::sample();
        let resolution = merge(
            &extraction(json!({ "location": "秋葉原", "middle_area": "渋谷区" })),
            &taxonomy,
        );
        // Location back-fill first, then the explicit field wins its slot;
        // the other slots keep the inferred codes.
        assert_eq!(resolution.params.middle_area.as_deref(), Some("Y020"));
        assert_eq!(resolution.params.small_area.as_deref(), Some("X005"));
        assert_eq!(resolution.params.large_area.as_deref(), Some("Z011"));
    }

    #[test]
    fn genre_resolves_by_name() {
        let taxonomy = testdata::sample();
        let resolution = merge(&extraction(json!({ "genre": "居酒屋" })), &taxonomy);
        assert_eq!(resolution.params.genre.as_deref(), Some("G001"));
    }

    #[test]
    fn budget_code_passes_through_untouched() {
        let taxonomy = testdata::sample();
        let resolution = merge(&extraction(json!({ "budget": "B011" })), &taxonomy);
        assert_eq!(resolution.params.budget.as_deref(), Some("B011"));
    }

    #[test]
    fn numeric_budget_goes_through_the_band_matcher() {
        let taxonomy = testdata::sample();
        let resolution = merge(&extraction(json!({ "budget": 4000 })), &taxonomy);
        assert_eq!(resolution.params.budget.as_deref(), Some("B003"));
    }

    #[test]
    fn budget_name_falls_back_to_the_code_matcher() {
        let taxonomy = testdata::sample();
        let resolution = merge(&extraction(json!({ "budget": "5000円以上" })), &taxonomy);
        assert_eq!(resolution.params.budget.as_deref(), Some("B005"));
    }

    #[test]
    fn unresolvable_fields_surface_as_diagnostics() {
        let taxonomy = testdata::sample();
        let resolution = merge(
            &extraction(json!({ "location": "火星", "genre": "居酒屋" })),
            &taxonomy,
        );
        assert_eq!(resolution.params.genre.as_deref(), Some("G001"));
        assert!(resolution.diagnostics.contains(&Diagnostic::Unresolved {
            field: "location".to_string(),
            value: "火星".to_string(),
        }));
        assert!(!resolution.nothing_resolved());
    }

    #[test]
    fn empty_extraction_reports_nothing_resolved() {
        let taxonomy = testdata::sample();
        let resolution = merge(&RawExtraction::default(), &taxonomy);
        assert_eq!(resolution.params, SearchParams::default());
        assert!(resolution.nothing_resolved());
    }

    #[test]
    fn empty_taxonomy_degrades_everything_with_a_diagnostic() {
        let resolution = merge(
            &extraction(json!({ "genre": "居酒屋", "keyword": "個室" })),
            &Taxonomy::empty(),
        );
        assert!(resolution
            .diagnostics
            .contains(&Diagnostic::TaxonomyUnavailable));
        assert_eq!(resolution.params.genre, None);
        // The keyword still carries through, so the search is not empty.
        assert_eq!(resolution.params.keyword.as_deref(), Some("個室"));
        assert!(!resolution.nothing_resolved());
    }

    #[test]
    fn flags_and_pagination_carry_through() {
        let taxonomy = testdata::sample();
        let resolution = merge(
            &extraction(json!({
                "genre": "居酒屋",
                "private_room": "あり",
                "lunch": false,
                "sake": 1,
                "count": 20,
                "start": "5"
            })),
            &taxonomy,
        );
        assert_eq!(resolution.params.private_room, 1);
        assert_eq!(resolution.params.lunch, 0);
        assert_eq!(resolution.params.sake, 1);
        assert_eq!(resolution.params.count, Some(20));
        assert_eq!(resolution.params.start, Some(5));
    }

    #[test]
    fn geolocation_carries_through() {
        let taxonomy = testdata::sample();
        let resolution = merge(
            &extraction(json!({
                "genre": "居酒屋",
                "lat": 33.5902,
                "lng": "130.4017",
                "range": 3
            })),
            &taxonomy,
        );
        assert_eq!(resolution.params.lat, Some(33.5902));
        assert_eq!(resolution.params.lng, Some(130.4017));
        assert_eq!(resolution.params.range, Some(3));
    }

    #[test]
    fn code_shape_detection() {
        assert!(looks_like_code("B001"));
        assert!(looks_like_code("G1"));
        assert!(!looks_like_code("b001"));
        assert!(!looks_like_code("B"));
        assert!(!looks_like_code("3000"));
        assert!(!looks_like_code("居酒屋"));
    }
}
