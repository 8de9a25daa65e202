//! Reference taxonomy: the closed vocabulary mapping display names to the
//! categorical codes the gourmet search API accepts.
//!
//! Loaded once, immutable afterwards. Item order within a category is the
//! insertion order of the source document; matching is first-match-wins over
//! that order, so the order is part of the observable behavior.

mod loader;

pub use loader::{load_default, load_from_path, load_from_str, TaxonomyError};

/// Taxonomy categories, one per code-typed search parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    LargeArea,
    MiddleArea,
    SmallArea,
    Genre,
    Budget,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::LargeArea,
        Category::MiddleArea,
        Category::SmallArea,
        Category::Genre,
        Category::Budget,
    ];

    /// Key of this category in the taxonomy document.
    pub fn key(self) -> &'static str {
        match self {
            Category::LargeArea => "large_area",
            Category::MiddleArea => "middle_area",
            Category::SmallArea => "small_area",
            Category::Genre => "genre",
            Category::Budget => "budget",
        }
    }

    /// The category one level up the area hierarchy, if any.
    pub fn parent(self) -> Option<Category> {
        match self {
            Category::SmallArea => Some(Category::MiddleArea),
            Category::MiddleArea => Some(Category::LargeArea),
            _ => None,
        }
    }
}

/// A bare name/code pair nested inside a taxonomy entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedCode {
    pub name: String,
    pub code: String,
}

/// One entry in the reference data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyItem {
    /// Display label, source of truth for matching.
    pub name: String,
    /// Canonical code consumed by the search API.
    pub code: String,
    /// Code of the owning item in the parent category. A lookup key, not an
    /// embedded copy, so reloads stay atomic and data is never duplicated.
    pub parent: Option<String>,
    /// Nested name/code sub-records carried by the source entry (parent
    /// references included); the matcher falls back to these.
    pub nested: Vec<NamedCode>,
}

/// Process-wide reference data, read-only after load.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    large_areas: Vec<TaxonomyItem>,
    middle_areas: Vec<TaxonomyItem>,
    small_areas: Vec<TaxonomyItem>,
    genres: Vec<TaxonomyItem>,
    budgets: Vec<TaxonomyItem>,
}

impl Taxonomy {
    /// A taxonomy with no entries. Every resolution against it degrades to
    /// unresolved; used when the source document cannot be loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL
            .iter()
            .all(|category| self.items(*category).is_empty())
    }

    /// Items of a category in document order.
    pub fn items(&self, category: Category) -> &[TaxonomyItem] {
        match category {
            Category::LargeArea => &self.large_areas,
            Category::MiddleArea => &self.middle_areas,
            Category::SmallArea => &self.small_areas,
            Category::Genre => &self.genres,
            Category::Budget => &self.budgets,
        }
    }

    pub fn find_by_code(&self, category: Category, code: &str) -> Option<&TaxonomyItem> {
        self.items(category).iter().find(|item| item.code == code)
    }

    /// Whether `code` exists verbatim in the given category.
    pub fn has_code(&self, category: Category, code: &str) -> bool {
        self.find_by_code(category, code).is_some()
    }

    pub(crate) fn push(&mut self, category: Category, item: TaxonomyItem) {
        let items = match category {
            Category::LargeArea => &mut self.large_areas,
            Category::MiddleArea => &mut self.middle_areas,
            Category::SmallArea => &mut self.small_areas,
            Category::Genre => &mut self.genres,
            Category::Budget => &mut self.budgets,
        };
        items.push(item);
    }
}

#[cfg(test)]
pub(crate) mod testdata {
    use super::Taxonomy;

    pub(crate) const SAMPLE_DOCUMENT: &str = r#"{
        "large_area": [
            { "name": "東京", "code": "Z011" },
            { "name": "福岡", "code": "Z092" }
        ],
        "middle_area": [
            { "name": "千代田区", "code": "Y010", "large_area": { "name": "東京", "code": "Z011" } },
            { "name": "渋谷区", "code": "Y020", "large_area": { "name": "東京", "code": "Z011" } },
            { "name": "天神", "code": "Y770", "large_area": { "name": "福岡", "code": "Z092" } }
        ],
        "small_area": [
            { "name": "秋葉原", "code": "X005", "middle_area": { "name": "千代田区", "code": "Y010" } },
            { "name": "神田", "code": "X006", "middle_area": { "name": "千代田区", "code": "Y010" } }
        ],
        "genre": [
            { "name": "居酒屋", "code": "G001" },
            { "name": "イタリアン・フレンチ", "code": "G006" },
            { "name": "ラーメン", "code": "G013" }
        ],
        "budget": [
            { "name": "～2000円", "code": "B001" },
            { "name": "3000円～5000円", "code": "B003" },
            { "name": "5000円以上", "code": "B005" }
        ]
    }"#;

    pub(crate) fn sample() -> Taxonomy {
        super::load_from_str(SAMPLE_DOCUMENT).expect("sample document parses")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_preserve_document_order() {
        let taxonomy = testdata::sample();
        let genres: Vec<&str> = taxonomy
            .items(Category::Genre)
            .iter()
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(genres, ["居酒屋", "イタリアン・フレンチ", "ラーメン"]);
    }

    #[test]
    fn small_area_carries_parent_lookup_key() {
        let taxonomy = testdata::sample();
        let akihabara = taxonomy
            .find_by_code(Category::SmallArea, "X005")
            .expect("akihabara present");
        assert_eq!(akihabara.parent.as_deref(), Some("Y010"));

        let chiyoda = taxonomy
            .find_by_code(Category::MiddleArea, "Y010")
            .expect("chiyoda present");
        assert_eq!(chiyoda.parent.as_deref(), Some("Z011"));
    }

    #[test]
    fn empty_taxonomy_reports_empty() {
        assert!(Taxonomy::empty().is_empty());
        assert!(!testdata::sample().is_empty());
    }

    #[test]
    fn category_parents_follow_area_hierarchy() {
        assert_eq!(Category::SmallArea.parent(), Some(Category::MiddleArea));
        assert_eq!(Category::MiddleArea.parent(), Some(Category::LargeArea));
        assert_eq!(Category::LargeArea.parent(), None);
        assert_eq!(Category::Genre.parent(), None);
    }
}
