//! Vendor catalog: every vendor in an index with the versions it publishes.
//!
//! Vendors are keyed by their lower-cased name. Both vendors and versions
//! are ordered as plain strings, so `"10.0.0"` sorts before `"2.0.0"`.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::index::Index;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VendorCatalog {
    vendors: BTreeMap<String, BTreeSet<String>>,
}

impl VendorCatalog {
    /// Fold every pack entry of the index into the catalog
    pub fn build(index: &Index) -> Self {
        let mut vendors: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for entry in index.packages() {
            vendors
                .entry(entry.vendor.to_lowercase())
                .or_default()
                .insert(entry.version.clone());
        }
        Self { vendors }
    }

    /// Vendors in ascending order with their ascending versions
    pub fn iter(&self) -> impl Iterator<Item = (&str, Vec<&str>)> {
        self.vendors
            .iter()
            .map(|(vendor, versions)| (vendor.as_str(), versions.iter().map(String::as_str).collect()))
    }

    pub fn vendors(&self) -> impl Iterator<Item = &str> {
        self.vendors.keys().map(String::as_str)
    }

    /// Versions published by `vendor` (any casing)
    pub fn versions(&self, vendor: &str) -> Option<Vec<&str>> {
        self.vendors
            .get(&vendor.to_lowercase())
            .map(|versions| versions.iter().map(String::as_str).collect())
    }

    pub fn contains_vendor(&self, vendor: &str) -> bool {
        self.vendors.contains_key(&vendor.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.vendors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{PackageEntry, PackageGroup};

    fn index_of(entries: &[(&str, &str)]) -> Index {
        Index {
            package_groups: vec![PackageGroup {
                entries: entries
                    .iter()
                    .enumerate()
                    .map(|(i, (vendor, version))| {
                        PackageEntry::new("https://packs.example.com/", *vendor, format!("Pack{}", i), *version)
                    })
                    .collect(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicates_collapse() {
        let catalog = VendorCatalog::build(&index_of(&[("A", "1.0"), ("A", "1.0"), ("A", "2.0")]));
        assert_eq!(catalog.versions("A"), Some(vec!["1.0", "2.0"]));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_vendor_names_are_lowercased_and_merged() {
        let catalog = VendorCatalog::build(&index_of(&[("SiliconLabs", "1.0"), ("siliconlabs", "2.0")]));
        assert_eq!(catalog.vendors().collect::<Vec<_>>(), vec!["siliconlabs"]);
        assert_eq!(catalog.versions("SILICONLABS"), Some(vec!["1.0", "2.0"]));
        assert!(catalog.contains_vendor("SiliconLabs"));
    }

    #[test]
    fn test_vendors_and_versions_sorted() {
        let catalog = VendorCatalog::build(&index_of(&[("Beta", "2.0"), ("Beta", "1.0"), ("Alpha", "1.0")]));
        let listing: Vec<_> = catalog.iter().collect();
        assert_eq!(listing, vec![("alpha", vec!["1.0"]), ("beta", vec!["1.0", "2.0"])]);
    }

    #[test]
    fn test_versions_sort_as_strings() {
        let catalog = VendorCatalog::build(&index_of(&[("A", "2.0.0"), ("A", "10.0.0"), ("A", "1.9.0")]));
        assert_eq!(catalog.versions("a"), Some(vec!["1.9.0", "10.0.0", "2.0.0"]));
    }

    #[test]
    fn test_build_is_idempotent() {
        let index = index_of(&[("B", "3"), ("A", "1"), ("B", "1"), ("A", "1")]);
        assert_eq!(VendorCatalog::build(&index), VendorCatalog::build(&index));
    }

    #[test]
    fn test_deprecated_entries_are_listed() {
        let mut index = index_of(&[("A", "1.0")]);
        index.package_groups[0]
            .entries
            .push(PackageEntry::new("u/", "A", "Old", "0.9").with_deprecated("2019-01-01"));
        assert_eq!(VendorCatalog::build(&index).versions("a"), Some(vec!["0.9", "1.0"]));
    }

    #[test]
    fn test_empty_index() {
        let catalog = VendorCatalog::build(&Index::default());
        assert!(catalog.is_empty());
        assert_eq!(catalog.versions("anything"), None);
    }
}
