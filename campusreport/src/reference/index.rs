//! Region to campus lookup

use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Placeholder shown as the first option of every select
pub const UNSET: &str = "Select";

/// Mapping from region to its ordered, distinct campuses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionIndex {
    regions: Vec<String>,
    campuses: HashMap<String, Vec<String>>,
    pairs: HashSet<(String, String)>,
}

impl RegionIndex {
    /// Build the index from (region, campus) pairs in source order.
    ///
    /// Duplicate pairs collapse. Blank regions or campuses are skipped.
    /// A campus name may be listed under more than one region.
    pub fn from_pairs<I, R, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (R, C)>,
        R: AsRef<str>,
        C: AsRef<str>,
    {
        let mut index = RegionIndex::default();
        for (region, campus) in pairs {
            let region = region.as_ref().trim();
            let campus = campus.as_ref().trim();
            if region.is_empty() || campus.is_empty() {
                continue;
            }
            index.insert(region, campus);
        }
        index
    }

    fn insert(&mut self, region: &str, campus: &str) {
        if !self.pairs.insert((region.to_string(), campus.to_string())) {
            return;
        }
        if self.pairs.iter().any(|(r, c)| c == campus && r != region) {
            warn!(campus, region, "campus name listed under more than one region");
        }

        if !self.campuses.contains_key(region) {
            self.regions.push(region.to_string());
        }
        self.campuses
            .entry(region.to_string())
            .or_default()
            .push(campus.to_string());
    }

    /// Regions in first-appearance order
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Campuses of a region; empty for the placeholder or an unknown region
    pub fn campuses_for(&self, region: &str) -> &[String] {
        self.campuses
            .get(region)
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, region: &str, campus: &str) -> bool {
        self.pairs.contains(&(region.to_string(), campus.to_string()))
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Distinct (region, campus) pairs
    pub fn campus_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Options for the region select, placeholder first
    pub fn region_options(&self) -> Vec<String> {
        with_placeholder(&self.regions)
    }

    /// Options for the campus select of the given region, placeholder first
    pub fn campus_options(&self, region: &str) -> Vec<String> {
        with_placeholder(self.campuses_for(region))
    }
}

fn with_placeholder(items: &[String]) -> Vec<String> {
    let mut options = Vec::with_capacity(items.len() + 1);
    options.push(UNSET.to_string());
    options.extend(items.iter().cloned());
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RegionIndex {
        RegionIndex::from_pairs([
            ("North", "Alpha"),
            ("North", "Beta"),
            ("South", "Gamma"),
            ("North", "Alpha"),
        ])
    }

    #[test]
    fn test_pairs_collapse_in_source_order() {
        let index = sample();
        assert_eq!(index.regions(), ["North", "South"]);
        assert_eq!(index.campuses_for("North"), ["Alpha", "Beta"]);
        assert_eq!(index.campus_count(), 3);
    }

    #[test]
    fn test_unknown_region_has_only_placeholder() {
        let index = sample();
        assert!(index.campuses_for("East").is_empty());
        assert_eq!(index.campus_options("East"), vec![UNSET.to_string()]);
        assert_eq!(index.campus_options(UNSET), vec![UNSET.to_string()]);
    }

    #[test]
    fn test_campus_listed_under_two_regions() {
        let index = RegionIndex::from_pairs([
            ("North", "Central"),
            ("South", "Central"),
            ("South", "Gamma"),
        ]);
        assert_eq!(index.campuses_for("North"), ["Central"]);
        assert_eq!(index.campuses_for("South"), ["Central", "Gamma"]);
        assert!(index.contains("North", "Central"));
        assert!(index.contains("South", "Central"));
        assert_eq!(index.campus_count(), 3);
    }

    #[test]
    fn test_blank_cells_are_skipped() {
        let index = RegionIndex::from_pairs([("North", " "), ("", "Alpha"), ("North", "Beta")]);
        assert_eq!(index.regions(), ["North"]);
        assert_eq!(index.campuses_for("North"), ["Beta"]);
    }

    #[test]
    fn test_contains() {
        let index = sample();
        assert!(index.contains("North", "Alpha"));
        assert!(!index.contains("South", "Alpha"));
    }
}
