//! Fixed lookup tables used by the normalizer.
//!
//! Both tables are ordered: for cities the longest matching key wins, for
//! sub-categories the first matching keyword wins. Reordering an entry changes
//! which label a listing receives.

/// Upper-cased spellings seen in location labels, mapped to the canonical city.
pub const CITY_SYNONYMS: &[(&str, &str)] = &[
    ("DAKAR", "Dakar"),
    ("DKR", "Dakar"),
    ("THIES", "Thiès"),
    ("THIÈS", "Thiès"),
    ("SAINT-LOUIS", "Saint-Louis"),
    ("SAINT LOUIS", "Saint-Louis"),
    ("ST-LOUIS", "Saint-Louis"),
    ("KAOLACK", "Kaolack"),
    ("ZIGUINCHOR", "Ziguinchor"),
    ("MBOUR", "Mbour"),
];

/// Stored when a location label is blank.
pub const UNKNOWN_CITY: &str = "Unknown";

/// Sub-category keywords, matched case-insensitively against the title in
/// declared order.
///
/// More specific keywords come first: a "robe enfant" is children's clothing,
/// a "chaussure bébé" is baby clothing.
pub const SUB_CATEGORY_KEYWORDS: &[(&str, &str)] = &[
    ("bébé", "Baby Clothing"),
    ("enfant", "Children's Clothing"),
    ("jupe", "Skirts"),
    ("robe", "Dresses"),
    ("sandale", "Sandals"),
    ("basket", "Sneakers"),
    ("chaussure", "Shoes"),
    ("costume", "Suits"),
    ("t-shirt", "T-Shirts"),
    ("jean", "Jeans"),
    ("pantalon", "Trousers"),
    ("chemise", "Shirts"),
];

/// Sub-category assigned when no keyword matches.
pub const OTHER_SUB_CATEGORY: &str = "Other";
