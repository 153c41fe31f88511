//! # Zone Classification
//!
//! Decides whether a destination city ships at the local or the remote
//! base rate.
//!
//! The storefront has always classified by substring: any city text that
//! contains the marker token (e.g. "dhaka") is local. That means
//! "New Dhakapur" is local too. [`MarkerZoneClassifier`] keeps that
//! behavior so quoted prices stay identical; [`CityListClassifier`] is the
//! exact-match alternative for when the pricing change is approved.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::Zone;

/// Which classifier `[pricing]` selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneClassifierKind {
    /// Substring match on `local_zone_marker`.
    #[default]
    Marker,
    /// Exact match against `local_zone_cities`.
    CityList,
}

/// Maps a free-text destination city to a shipping zone.
pub trait ZoneClassifier: Send + Sync {
    fn classify(&self, destination_city: &str) -> Zone;
}

/// Local if the lowercased city contains the lowercased marker.
#[derive(Debug, Clone)]
pub struct MarkerZoneClassifier {
    marker: String,
}

impl MarkerZoneClassifier {
    pub fn new(marker: impl AsRef<str>) -> Self {
        MarkerZoneClassifier {
            marker: marker.as_ref().trim().to_lowercase(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl ZoneClassifier for MarkerZoneClassifier {
    fn classify(&self, destination_city: &str) -> Zone {
        // An empty marker would match every string
        if !self.marker.is_empty() && destination_city.to_lowercase().contains(&self.marker) {
            Zone::Local
        } else {
            Zone::Remote
        }
    }
}

/// Local only if the trimmed city equals one of the listed names
/// (case-insensitive).
#[derive(Debug, Clone, Default)]
pub struct CityListClassifier {
    cities: HashSet<String>,
}

impl CityListClassifier {
    pub fn new<I, S>(cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        CityListClassifier {
            cities: cities
                .into_iter()
                .map(|c| c.as_ref().trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }
}

impl ZoneClassifier for CityListClassifier {
    fn classify(&self, destination_city: &str) -> Zone {
        if self.cities.contains(&destination_city.trim().to_lowercase()) {
            Zone::Local
        } else {
            Zone::Remote
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_matches_case_insensitively() {
        let classifier = MarkerZoneClassifier::new("Dhaka");
        assert_eq!(classifier.classify("Dhaka"), Zone::Local);
        assert_eq!(classifier.classify("DHAKA-1207"), Zone::Local);
        assert_eq!(classifier.classify("Chattogram"), Zone::Remote);
    }

    #[test]
    fn test_marker_is_trimmed() {
        let classifier = MarkerZoneClassifier::new(" Dhaka ");
        assert_eq!(classifier.marker(), "dhaka");
        assert_eq!(classifier.classify("Dhaka"), Zone::Local);
    }

    #[test]
    fn test_marker_substring_ambiguity_is_preserved() {
        let classifier = MarkerZoneClassifier::new("dhaka");
        assert_eq!(classifier.classify("New Dhakapur"), Zone::Local);
    }

    #[test]
    fn test_marker_malformed_city_is_remote() {
        let classifier = MarkerZoneClassifier::new("dhaka");
        assert_eq!(classifier.classify(""), Zone::Remote);
        assert_eq!(classifier.classify("%%%"), Zone::Remote);
    }

    #[test]
    fn test_empty_marker_never_matches() {
        let classifier = MarkerZoneClassifier::new("");
        assert_eq!(classifier.classify("Dhaka"), Zone::Remote);
    }

    #[test]
    fn test_city_list_is_exact() {
        let classifier = CityListClassifier::new(["Dhaka", " Narayanganj "]);
        assert_eq!(classifier.classify(" dhaka "), Zone::Local);
        assert_eq!(classifier.classify("narayanganj"), Zone::Local);
        assert_eq!(classifier.classify("New Dhakapur"), Zone::Remote);
    }
}
