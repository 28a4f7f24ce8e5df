use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Three-letter IATA airport identifier, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IataCode(String);

impl IataCode {
    pub fn parse(raw: &str) -> Result<Self, FlightLegError> {
        let trimmed = raw.trim();
        if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(FlightLegError::InvalidIata(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IataCode {
    type Error = FlightLegError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IataCode> for String {
    fn from(value: IataCode) -> Self {
        value.0
    }
}

impl fmt::Display for IataCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Airport record as returned by the airport search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub iata_code: IataCode,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// What the user picked in an origin/destination field.
///
/// The funnel sometimes only knows a code (typed or restored from a link) and
/// sometimes the full search record including coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AirportSelection {
    #[default]
    Unset,
    Code { iata_code: IataCode },
    Full(Airport),
}

impl AirportSelection {
    pub fn iata(&self) -> Option<&IataCode> {
        match self {
            AirportSelection::Unset => None,
            AirportSelection::Code { iata_code } => Some(iata_code),
            AirportSelection::Full(airport) => Some(&airport.iata_code),
        }
    }

    pub fn airport(&self) -> Option<&Airport> {
        match self {
            AirportSelection::Full(airport) => Some(airport),
            _ => None,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, AirportSelection::Unset)
    }
}

/// Great-circle (haversine) distance between two airports in kilometers.
pub fn great_circle_km(from: &Airport, to: &Airport) -> f64 {
    let (lat1, lat2) = (from.lat.to_radians(), to.lat.to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// One scheduled (and possibly flown) flight segment attached to a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightLeg {
    #[serde(default)]
    pub flight_id: Option<String>,
    pub origin: IataCode,
    pub destination: IataCode,
    pub scheduled_departure: DateTime<Utc>,
    pub scheduled_arrival: DateTime<Utc>,
    #[serde(default)]
    pub actual_departure: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actual_arrival: Option<DateTime<Utc>>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    pub carrier: String,
}

impl FlightLeg {
    /// Check the leg invariants: distinct endpoints and a non-negative distance.
    pub fn validate(&self) -> Result<(), FlightLegError> {
        if self.origin == self.destination {
            return Err(FlightLegError::SameAirport(self.origin.clone()));
        }
        if let Some(distance) = self.distance_km {
            if !distance.is_finite() || distance < 0.0 {
                return Err(FlightLegError::InvalidDistance(distance));
            }
        }
        Ok(())
    }

    /// Fill a missing distance from full airport selections matching this leg.
    pub fn resolve_distance(&mut self, origin: &AirportSelection, destination: &AirportSelection) {
        if self.distance_km.is_some() {
            return;
        }
        if let (Some(from), Some(to)) = (origin.airport(), destination.airport()) {
            if from.iata_code == self.origin && to.iata_code == self.destination {
                self.distance_km = Some(great_circle_km(from, to));
            }
        }
    }

    /// Arrival delay in whole minutes when the actual arrival is known.
    pub fn arrival_delay_minutes(&self) -> Option<u32> {
        let actual = self.actual_arrival?;
        let minutes = (actual - self.scheduled_arrival).num_minutes();
        Some(minutes.clamp(0, i64::from(u32::MAX)) as u32)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlightLegError {
    #[error("'{0}' is not a three letter IATA code")]
    InvalidIata(String),
    #[error("origin and destination are both {0}")]
    SameAirport(IataCode),
    #[error("flight distance must be a non-negative number of kilometers, got {0}")]
    InvalidDistance(f64),
}

/// A single raw answer from the assessment wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardAnswer {
    pub question_id: String,
    pub value: String,
}

impl WizardAnswer {
    pub fn new(question_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            value: value.into(),
        }
    }
}
