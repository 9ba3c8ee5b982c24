//! Furniture suggestions shown after a room scan.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;

/// Upper bound on suggestions returned for one scan.
pub const MAX_SUGGESTIONS: usize = 3;
/// Placeholder artwork used until suggestions carry real imagery.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.jpg";

/// A product idea for the scanned room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub name: String,
    pub description: String,
    pub image: String,
    pub category: String,
}

impl Suggestion {
    fn placeholder(name: &str, description: &str, category: &str) -> Self {
        Self {
            name: name.to_owned(),
            description: description.to_owned(),
            image: PLACEHOLDER_IMAGE.to_owned(),
            category: category.to_owned(),
        }
    }
}

/// Static suggestions served when the detector catalogue is unavailable.
#[must_use]
pub fn fallback_suggestions() -> Vec<Suggestion> {
    vec![
        Suggestion::placeholder(
            "Minimalist Lamp",
            "A stylish lamp perfect for modern interiors.",
            "lighting",
        ),
        Suggestion::placeholder(
            "Wooden Shelf",
            "Rustic wooden shelf to enhance your storage space.",
            "furniture",
        ),
        Suggestion::placeholder(
            "Indoor Plant",
            "Low-maintenance plant to bring greenery inside.",
            "plants",
        ),
    ]
}

/// Turn a detector label such as `coffee_table` into `Coffee table`.
///
/// # Examples
/// ```
/// use redecor_backend::domain::display_name;
///
/// assert_eq!(display_name("coffee_table"), "Coffee table");
/// assert_eq!(display_name("tv"), "Tv");
/// ```
#[must_use]
pub fn display_name(label: &str) -> String {
    let spaced = label.trim().replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Pick one random item per category, capped at [`MAX_SUGGESTIONS`].
///
/// Categories without items are skipped. Category order follows the map's
/// key order so results are stable for a given random source.
pub fn suggestions_from_catalogue<R: Rng + ?Sized>(
    catalogue: &BTreeMap<String, Vec<String>>,
    rng: &mut R,
) -> Vec<Suggestion> {
    catalogue
        .iter()
        .filter_map(|(category, items)| {
            let item = items.choose(rng)?;
            Some(Suggestion {
                name: display_name(item),
                description: format!("A stylish {item} perfect for modern interiors."),
                image: PLACEHOLDER_IMAGE.to_owned(),
                category: category.clone(),
            })
        })
        .take(MAX_SUGGESTIONS)
        .collect()
}
