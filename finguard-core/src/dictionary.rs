//! Static keyword dictionaries mapping categories to description fragments.
//!
//! These cover the common merchants out of the box; per-user learning in
//! [`crate::matcher`] takes over for everything else.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category name -> lowercase keyword patterns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDictionary {
    entries: BTreeMap<String, Vec<String>>,
}

impl CategoryDictionary {
    /// An empty dictionary; suggestions then come from learning only
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add (or extend) a category with keyword patterns
    pub fn with_category<I, S>(mut self, category: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list = self.entries.entry(category.into()).or_default();
        for p in patterns {
            let p = p.as_ref().trim().to_lowercase();
            if !p.is_empty() && !list.contains(&p) {
                list.push(p);
            }
        }
        self
    }

    /// Merge another dictionary into this one
    pub fn merge(mut self, other: CategoryDictionary) -> Self {
        for (category, patterns) in other.entries {
            self = self.with_category(category, patterns);
        }
        self
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(c, p)| (c.as_str(), p.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CategoryDictionary {
    fn default() -> Self {
        CategoryDictionary::empty()
            .with_category(
                "Food & Dining",
                [
                    "restaurant", "cafe", "coffee", "starbucks", "mcdonald", "pizza", "burger",
                    "doordash", "grubhub", "ubereats", "chipotle", "subway", "diner", "bakery",
                ],
            )
            .with_category(
                "Groceries",
                [
                    "grocery", "market", "safeway", "kroger", "walmart", "costco", "aldi",
                    "trader", "wholefds", "whole", "foods", "supermarket",
                ],
            )
            .with_category(
                "Transportation",
                [
                    "uber", "lyft", "taxi", "gas", "fuel", "shell", "chevron", "exxon", "parking",
                    "transit", "metro", "toll", "clipper",
                ],
            )
            .with_category(
                "Shopping",
                [
                    "amazon", "amzn", "target", "ebay", "etsy", "bestbuy", "clothing", "mall",
                    "ikea", "store",
                ],
            )
            .with_category(
                "Entertainment",
                [
                    "netflix", "spotify", "hulu", "disney", "youtube", "cinema", "movie",
                    "theater", "steam", "playstation", "xbox", "concert", "ticketmaster",
                ],
            )
            .with_category(
                "Bills & Utilities",
                [
                    "electric", "utility", "water", "internet", "comcast", "verizon",
                    "tmobile", "phone", "insurance", "pge", "xfinity",
                ],
            )
            .with_category(
                "Housing",
                ["rent", "lease", "mortgage", "landlord", "apartment", "property", "hoa"],
            )
            .with_category(
                "Healthcare",
                [
                    "pharmacy", "cvs", "walgreens", "doctor", "dental", "clinic", "hospital",
                    "medical", "health",
                ],
            )
            .with_category(
                "Education",
                ["tuition", "university", "college", "school", "course", "udemy", "coursera"],
            )
            .with_category(
                "Travel",
                ["airline", "airbnb", "hotel", "marriott", "hilton", "expedia", "delta", "united"],
            )
            .with_category(
                "Fitness",
                ["gym", "fitness", "yoga", "peloton", "planet"],
            )
            .with_category(
                "Income",
                ["payroll", "salary", "deposit", "paycheck", "refund", "dividend", "interest"],
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dictionary_has_categories() {
        let dict = CategoryDictionary::default();
        assert!(dict.len() >= 10);
        assert!(dict.categories().any(|c| c == "Entertainment"));
    }

    #[test]
    fn test_with_category_dedups_and_lowercases() {
        let dict = CategoryDictionary::empty()
            .with_category("Pets", ["Chewy", "chewy", " petco "])
            .with_category("Pets", ["PETSMART"]);
        let (_, patterns) = dict.iter().next().unwrap();
        assert_eq!(patterns, ["chewy", "petco", "petsmart"]);
    }

    #[test]
    fn test_merge() {
        let extra = CategoryDictionary::empty().with_category("Pets", ["chewy"]);
        let dict = CategoryDictionary::default().merge(extra);
        assert!(dict.categories().any(|c| c == "Pets"));
    }
}
