use serde::{Deserialize, Serialize};

use super::{Draft, Entity, EntityId, Tour, ValidationErrors};

/// A reservation of seats on a tour, as served by `GET /bookings`.
///
/// The backend embeds the booked tour when listing; a freshly created
/// booking may only carry the tour id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tour_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tour: Option<Tour>,
    pub seats_booked: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Booking {
    /// The booked tour's id, from the embedded tour if present.
    pub fn booked_tour_id(&self) -> Option<EntityId> {
        self.tour.as_ref().map(|t| t.id).or(self.tour_id)
    }

    /// Tour price times seats, when the tour is embedded.
    pub fn total_price(&self) -> Option<f64> {
        self.tour
            .as_ref()
            .map(|t| t.price * f64::from(self.seats_booked))
    }
}

impl Entity for Booking {
    const COLLECTION: &'static str = "bookings";
    const LABEL: &'static str = "booking";
    type Draft = BookingDraft;

    fn id(&self) -> EntityId {
        self.id
    }
}

/// Body of `POST /bookings`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub tour_id: EntityId,
    pub seats_booked: u32,
    /// Seats still free on the tour, when known. Not sent.
    #[serde(skip)]
    pub available_spots: Option<u32>,
}

impl BookingDraft {
    pub fn new(tour_id: EntityId, seats_booked: u32) -> Self {
        Self {
            tour_id,
            seats_booked,
            available_spots: None,
        }
    }

    /// Draft checked against `tour`'s free seats.
    pub fn for_tour(tour: &Tour, seats_booked: u32) -> Self {
        Self {
            tour_id: tour.id,
            seats_booked,
            available_spots: Some(tour.available_spots),
        }
    }
}

impl Draft for BookingDraft {
    type Entity = Booking;

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match self.available_spots {
            Some(spots) if self.seats_booked < 1 || self.seats_booked > spots => errors.push(
                "seatsBooked",
                format!("Please select between 1 and {} seats", spots),
            ),
            None if self.seats_booked < 1 => {
                errors.push("seatsBooked", "Please select at least 1 seat")
            }
            _ => {}
        }
        errors.into_result()
    }

    fn into_entity(self, id: EntityId) -> Booking {
        Booking {
            id,
            tour_id: Some(self.tour_id),
            seats_booked: self.seats_booked,
            ..Booking::default()
        }
    }
}
