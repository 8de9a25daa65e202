use super::normalizer::normalize;
use crate::taxonomy::TaxonomyItem;

/// Matches one taxonomy item against an already-normalized candidate name.
/// Exact equality wins, then bidirectional substring containment, then the
/// item's nested name/code sub-records under the same two rules.
pub fn match_code<'a>(item: &'a TaxonomyItem, candidate: &str) -> Option<&'a str> {
    if candidate.is_empty() {
        return None;
    }

    if let Some(code) = match_pair(&item.name, &item.code, candidate) {
        return Some(code);
    }

    item.nested
        .iter()
        .find_map(|nested| match_pair(&nested.name, &nested.code, candidate))
}

fn match_pair<'a>(name: &str, code: &'a str, candidate: &str) -> Option<&'a str> {
    let name = normalize(name);
    if name.is_empty() {
        return None;
    }
    if name == candidate {
        return Some(code);
    }
    if name.contains(candidate) || candidate.contains(name.as_str()) {
        return Some(code);
    }
    None
}

/// Scans items in taxonomy order and returns the first match.
///
/// First-match-wins, not best-match: an early substring hit beats a later
/// exact hit on a different item. Callers rely on the document order of the
/// taxonomy, so keep this order-dependent policy as is pending product
/// sign-off.
pub fn first_match<'a>(items: &'a [TaxonomyItem], candidate: &str) -> Option<&'a str> {
    items.iter().find_map(|item| match_code(item, candidate))
}
