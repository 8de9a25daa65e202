use super::normalizer::normalize;
use crate::taxonomy::{Category, Taxonomy, TaxonomyItem};
use tracing::debug;

/// The three area hierarchy levels a single location phrase can populate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaCodes {
    pub large: Option<String>,
    pub middle: Option<String>,
    pub small: Option<String>,
}

impl AreaCodes {
    pub fn is_empty(&self) -> bool {
        self.large.is_none() && self.middle.is_none() && self.small.is_none()
    }
}

/// Resolves a single already-normalized location phrase bottom-up: small
/// areas first, then middle, then large, back-filling parent codes through
/// the taxonomy's lookup keys. Users name the most specific place they know,
/// so a matched ward or station fills the whole hierarchy.
pub fn resolve_location(taxonomy: &Taxonomy, candidate: &str) -> AreaCodes {
    if candidate.is_empty() {
        return AreaCodes::default();
    }

    if let Some(small) = find_by_name(taxonomy.items(Category::SmallArea), candidate) {
        let middle = small.parent.clone();
        let large = middle.as_deref().and_then(|code| {
            taxonomy
                .find_by_code(Category::MiddleArea, code)
                .and_then(|item| item.parent.clone())
        });
        debug!(small = %small.code, "location matched a small area");
        return AreaCodes {
            large,
            middle,
            small: Some(small.code.clone()),
        };
    }

    if let Some(middle) = find_by_name(taxonomy.items(Category::MiddleArea), candidate) {
        debug!(middle = %middle.code, "location matched a middle area");
        return AreaCodes {
            large: middle.parent.clone(),
            middle: Some(middle.code.clone()),
            small: None,
        };
    }

    if let Some(large) = find_by_name(taxonomy.items(Category::LargeArea), candidate) {
        debug!(large = %large.code, "location matched a large area");
        return AreaCodes {
            large: Some(large.code.clone()),
            middle: None,
            small: None,
        };
    }

    AreaCodes::default()
}

/// First item whose own display name matches exactly or by bidirectional
/// substring. Nested sub-records are deliberately not consulted here: a
/// parent's name hit must attach to the parent's level, which the dedicated
/// scan of that level already covers.
fn find_by_name<'a>(items: &'a [TaxonomyItem], candidate: &str) -> Option<&'a TaxonomyItem> {
    items.iter().find(|item| {
        let name = normalize(&item.name);
        !name.is_empty()
            && (name == candidate || name.contains(candidate) || candidate.contains(name.as_str()))
    })
}
