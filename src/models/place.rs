use serde::{Deserialize, Serialize};

use crate::format::format_coordinate;
use crate::geo::Coordinate;

/// Geotag attached to a captured memory, as resolved by reverse geocoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
}

/// One reverse-geocoding result, field names as the platform geocoder reports them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodedAddress {
    pub street: Option<String>,
    pub street_number: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub subregion: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Place {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            ..Default::default()
        }
    }

    /// Geotag for a fix. Without a geocoder answer only the coordinates are kept.
    pub fn from_geocoded(coordinate: Coordinate, address: Option<&GeocodedAddress>) -> Self {
        let Some(found) = address else {
            return Self::at(coordinate.latitude, coordinate.longitude);
        };

        let street = [&found.street, &found.street_number]
            .into_iter()
            .filter_map(non_blank)
            .collect::<Vec<_>>()
            .join(" ");
        let city = [&found.city, &found.district, &found.subregion]
            .into_iter()
            .find_map(non_blank)
            .map(str::to_string);

        Self {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            address: Some(street).filter(|s| !s.is_empty()),
            city,
            country: found.country.clone(),
            region: found.region.clone(),
            postal_code: found.postal_code.clone(),
        }
    }

    /// Full label: address, city and country, comma separated.
    pub fn describe(&self) -> String {
        let parts: Vec<&str> = [&self.address, &self.city, &self.country]
            .into_iter()
            .filter_map(non_blank)
            .collect();

        if parts.is_empty() {
            return format_coordinate(self.latitude, self.longitude);
        }
        parts.join(", ")
    }

    /// Short label for lists and headers.
    pub fn display_name(&self) -> String {
        match (non_blank(&self.city), non_blank(&self.country)) {
            (Some(city), Some(country)) => format!("{}, {}", city, country),
            (Some(city), None) => city.to_string(),
            (None, Some(country)) => country.to_string(),
            (None, None) => format_coordinate(self.latitude, self.longitude),
        }
    }
}

pub fn describe_place(place: Option<&Place>) -> String {
    place
        .map(Place::describe)
        .unwrap_or_else(|| "Location unavailable".to_string())
}

pub fn display_place_name(place: Option<&Place>) -> String {
    place
        .map(Place::display_name)
        .unwrap_or_else(|| "Unknown Location".to_string())
}
