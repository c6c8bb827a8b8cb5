//! Coarse ocean / desert / land classification.
//!
//! Only good enough to look plausible on a 2048x1024 globe texture. A point
//! is desert when its country is on the desert list and the point falls in
//! one of the named desert boxes. A few small, almost entirely arid
//! countries have no box of their own and count as desert everywhere.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Biome {
    Ocean,
    Desert,
    Land,
}

impl Biome {
    pub fn as_str(self) -> &'static str {
        match self {
            Biome::Ocean => "ocean",
            Biome::Desert => "desert",
            Biome::Land => "land",
        }
    }
}

/// Inclusive lat/lon box around a named desert.
#[derive(Debug, Clone, Copy)]
pub struct DesertRegion {
    pub name: &'static str,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl DesertRegion {
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

const fn region(name: &'static str, min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> DesertRegion {
    DesertRegion { name, min_lat, max_lat, min_lon, max_lon }
}

pub const DESERT_REGIONS: [DesertRegion; 15] = [
    region("Sahara", 10.0, 30.0, -15.0, 40.0),
    region("Arabian", 12.0, 30.0, 35.0, 60.0),
    region("Gobi", 40.0, 50.0, 90.0, 120.0),
    region("Australian Outback", -30.0, -15.0, 110.0, 150.0),
    region("Kalahari", -25.0, -20.0, 19.0, 25.0),
    region("Atacama", -30.0, -15.0, -75.0, -70.0),
    region("Sonoran/Mojave", 25.0, 40.0, -120.0, -110.0),
    region("Thar", 24.0, 30.0, 68.0, 75.0),
    region("Patagonian", -50.0, -40.0, -75.0, -65.0),
    region("Namib", -25.0, -15.0, 12.0, 20.0),
    region("Taklamakan", 37.0, 42.0, 75.0, 90.0),
    region("Karakum", 37.0, 42.0, 55.0, 65.0),
    region("Syrian", 32.0, 37.0, 37.0, 42.0),
    region("Great Basin", 35.0, 42.0, -120.0, -110.0),
    region("Chihuahuan", 25.0, 35.0, -110.0, -100.0),
];

/// Countries that host one of the desert boxes above.
pub const DESERT_COUNTRIES: &[&str] = &[
    "Algeria",
    "Libya",
    "Egypt",
    "Mali",
    "Niger",
    "Chad",
    "Sudan",
    "Mauritania",
    "Morocco",
    "Tunisia",
    "Saudi Arabia",
    "Yemen",
    "Oman",
    "Jordan",
    "Iraq",
    "Syria",
    "Mongolia",
    "China",
    "Australia",
    "Botswana",
    "Namibia",
    "South Africa",
    "Angola",
    "Chile",
    "Peru",
    "Argentina",
    "United States",
    "United States of America",
    "USA",
    "Mexico",
    "India",
    "Pakistan",
    "Turkmenistan",
    "Uzbekistan",
    "Iran",
];

/// Desert-listed countries without a box of their own: desert everywhere.
pub const CATCH_ALL_DESERT_COUNTRIES: &[&str] = &[
    "Western Sahara",
    "W. Sahara",
    "Qatar",
    "Kuwait",
    "United Arab Emirates",
    "Bahrain",
    "Djibouti",
];

fn listed(list: &[&str], country: &str) -> bool {
    list.iter().any(|name| name.eq_ignore_ascii_case(country))
}

pub fn is_desert_country(country: &str) -> bool {
    listed(DESERT_COUNTRIES, country) || listed(CATCH_ALL_DESERT_COUNTRIES, country)
}

/// Named desert box containing the point, if any.
pub fn desert_region_at(lon: f64, lat: f64) -> Option<&'static DesertRegion> {
    DESERT_REGIONS.iter().find(|r| r.contains(lon, lat))
}

pub fn classify(country: Option<&str>, lon: f64, lat: f64) -> Biome {
    let country = match country {
        Some(country) => country,
        None => return Biome::Ocean,
    };

    if listed(CATCH_ALL_DESERT_COUNTRIES, country) {
        return Biome::Desert;
    }
    if listed(DESERT_COUNTRIES, country) && desert_region_at(lon, lat).is_some() {
        return Biome::Desert;
    }
    Biome::Land
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_country_is_ocean() {
        assert_eq!(classify(None, 10.0, 20.0), Biome::Ocean);
    }

    #[test]
    fn algeria_in_sahara_is_desert() {
        assert_eq!(classify(Some("Algeria"), 10.0, 20.0), Biome::Desert);
        assert_eq!(desert_region_at(10.0, 20.0).map(|r| r.name), Some("Sahara"));
    }

    #[test]
    fn algeria_outside_boxes_is_land() {
        // Mediterranean coast, north of the Sahara box
        assert_eq!(classify(Some("Algeria"), 3.0, 36.0), Biome::Land);
    }

    #[test]
    fn catch_all_country_is_desert_anywhere() {
        assert_eq!(classify(Some("Qatar"), 51.2, 25.3), Biome::Desert);
        assert_eq!(classify(Some("Kuwait"), 47.5, 29.5), Biome::Desert);
        // Outside every box and still desert
        assert_eq!(classify(Some("Western Sahara"), -16.5, 23.0), Biome::Desert);
        assert!(desert_region_at(-16.5, 23.0).is_none());
    }

    #[test]
    fn unlisted_country_in_box_is_land() {
        // Sahara box but the country is not on the desert list
        assert_eq!(classify(Some("Nigeria"), 8.0, 12.0), Biome::Land);
        assert_eq!(classify(Some("Unknown"), 10.0, 20.0), Biome::Land);
    }

    #[test]
    fn country_match_ignores_case() {
        assert_eq!(classify(Some("ALGERIA"), 10.0, 20.0), Biome::Desert);
        assert!(is_desert_country("saudi arabia"));
        assert!(!is_desert_country("Norway"));
    }

    #[test]
    fn box_bounds_are_inclusive() {
        assert_eq!(classify(Some("Libya"), 40.0, 30.0), Biome::Desert);
        assert_eq!(classify(Some("Libya"), 20.0, 30.0001), Biome::Land);
    }

    #[test]
    fn biome_labels() {
        assert_eq!(Biome::Desert.as_str(), "desert");
        assert_eq!(serde_json::to_string(&Biome::Ocean).unwrap(), "\"ocean\"");
    }
}
