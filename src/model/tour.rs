use serde::{Deserialize, Serialize};

use super::{Draft, Entity, EntityId, ValidationErrors};

/// A bookable tour as served by `GET /tours`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    pub id: EntityId,
    pub name: String,
    pub country: String,
    pub city: String,
    pub hotel: String,
    pub description: String,
    pub price: f64,
    pub max_capacity: u32,
    pub available_spots: u32,
    pub rating: u8,
    pub check_in_date: String,
    pub check_out_date: String,
    #[serde(default)]
    pub images_url: Vec<String>,
    #[serde(default)]
    pub activities: Vec<String>,
}

impl Entity for Tour {
    const COLLECTION: &'static str = "tours";
    const LABEL: &'static str = "tour";
    type Draft = TourDraft;

    fn id(&self) -> EntityId {
        self.id
    }
}

/// Body of `POST /tours`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourDraft {
    pub name: String,
    pub country: String,
    pub city: String,
    pub hotel: String,
    pub description: String,
    pub price: f64,
    pub max_capacity: u32,
    pub available_spots: u32,
    pub rating: u8,
    pub check_in_date: String,
    pub check_out_date: String,
    #[serde(default)]
    pub images_url: Vec<String>,
    #[serde(default)]
    pub activities: Vec<String>,
}

impl Draft for TourDraft {
    type Entity = Tour;

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for url in &self.images_url {
            let url = url.trim();
            if url.is_empty() {
                errors.push("imagesUrl", "The image is required");
            } else if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push("imagesUrl", "Must be an URL");
            }
        }

        errors.require("name", &self.name, "Name is required!");
        errors.require("country", &self.country, "Country is required!");
        errors.require("city", &self.city, "City is required!");
        errors.require("hotel", &self.hotel, "Hotel is required!");

        let description = self.description.trim();
        if description.is_empty() {
            errors.push("description", "Description is required!");
        } else if description.chars().count() < 10 {
            errors.push(
                "description",
                "The description should consist of at least 10 symbols",
            );
        } else if description.chars().count() > 1000 {
            errors.push(
                "description",
                "The description should consist maximum of 1000 symbols",
            );
        }

        if !self.price.is_finite() {
            errors.push("price", "Price must be a number!");
        } else if self.price < 0.0 {
            errors.push("price", "Price must be a positive number!");
        }

        if self.rating < 1 {
            errors.push("rating", "Minimum 1 star");
        } else if self.rating > 5 {
            errors.push("rating", "Maximum 5 stars");
        }

        errors.require("checkInDate", &self.check_in_date, "Check-in date is required!");
        errors.require(
            "checkOutDate",
            &self.check_out_date,
            "Check-out date is required!",
        );
        if is_iso_date(&self.check_in_date)
            && is_iso_date(&self.check_out_date)
            && self.check_out_date < self.check_in_date
        {
            errors.push(
                "checkOutDate",
                "Check-out date must be after check-in date!",
            );
        }

        if self.activities.iter().any(|a| a.trim().is_empty()) {
            errors.push("activities", "At least one activity is required");
        }

        errors.into_result()
    }

    fn into_entity(self, id: EntityId) -> Tour {
        Tour {
            id,
            name: self.name,
            country: self.country,
            city: self.city,
            hotel: self.hotel,
            description: self.description,
            price: self.price,
            max_capacity: self.max_capacity,
            available_spots: self.available_spots,
            rating: self.rating,
            check_in_date: self.check_in_date,
            check_out_date: self.check_out_date,
            images_url: self.images_url,
            activities: self.activities,
        }
    }
}

/// Query for `GET /tours/search`. Unset fields are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourSearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_from: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_to: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_spots: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
}

impl TourSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = non_blank(country.into());
        self
    }

    pub fn price_between(mut self, from: Option<f64>, to: Option<f64>) -> Self {
        self.price_from = from;
        self.price_to = to;
        self
    }

    pub fn min_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn min_available_spots(mut self, spots: u32) -> Self {
        self.available_spots = Some(spots);
        self
    }

    pub fn dates(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.date_from = non_blank(from.into());
        self.date_to = non_blank(to.into());
        self
    }

    /// True when no criterion is set, i.e. the search lists every tour.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Local evaluation of the search, mirroring the backend's filter.
    pub fn matches(&self, tour: &Tour) -> bool {
        if let Some(country) = &self.country {
            if !tour.country.eq_ignore_ascii_case(country.trim()) {
                return false;
            }
        }
        if self.price_from.is_some_and(|from| tour.price < from) {
            return false;
        }
        if self.price_to.is_some_and(|to| tour.price > to) {
            return false;
        }
        if self.rating.is_some_and(|rating| tour.rating < rating) {
            return false;
        }
        if self
            .available_spots
            .is_some_and(|spots| tour.available_spots < spots)
        {
            return false;
        }
        if let Some(from) = &self.date_from {
            if tour.check_in_date.as_str() < from.as_str() {
                return false;
            }
        }
        if let Some(to) = &self.date_to {
            if tour.check_out_date.as_str() > to.as_str() {
                return false;
            }
        }
        true
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// `yyyy-mm-dd`, which orders correctly as a plain string.
fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
