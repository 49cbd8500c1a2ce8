use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ShipId = i32;
pub type CaptainId = i32;
pub type CruiseNumber = i32;
pub type CustomerId = i32;
pub type RepairId = i32;
pub type ReservationId = i64;

// ============================================================================
// Fleet
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ship {
    pub id: ShipId,
    pub age: i32,
    pub seat_capacity: u32,
    pub make: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Captain {
    pub id: CaptainId,
    pub name: String,
    pub nationality: String,
}

/// A scheduled sailing. `ship_id` fixes the seat capacity for the cruise's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cruise {
    pub number: CruiseNumber,
    pub ship_id: ShipId,
    pub captain_id: Option<CaptainId>,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub arrival_date: NaiveDate,
    pub arrival_time: NaiveTime,
    pub num_stops: i32,
    pub ticket_cost_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repair {
    pub id: RepairId,
    pub ship_id: ShipId,
    pub captain_id: Option<CaptainId>,
    pub repair_date: NaiveDate,
    pub repair_code: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShipRepairCount {
    pub ship_id: ShipId,
    pub repair_count: u64,
}

// ============================================================================
// Reservations
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Reserved,
    Waitlisted,
    Cancelled,
}

impl ReservationStatus {
    /// Single-letter code used in the reservation table.
    pub fn code(&self) -> char {
        match self {
            ReservationStatus::Reserved => 'R',
            ReservationStatus::Waitlisted => 'W',
            ReservationStatus::Cancelled => 'C',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'R' => Some(ReservationStatus::Reserved),
            'W' => Some(ReservationStatus::Waitlisted),
            'C' => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }

    /// Only live reservations may be cancelled; nothing else ever changes status.
    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        matches!(
            (self, next),
            (ReservationStatus::Reserved, ReservationStatus::Cancelled)
                | (ReservationStatus::Waitlisted, ReservationStatus::Cancelled)
        )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReservationStatus::Reserved => "RESERVED",
            ReservationStatus::Waitlisted => "WAITLISTED",
            ReservationStatus::Cancelled => "CANCELLED",
        };
        f.write_str(name)
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Self::from_code(c).ok_or_else(|| format!("unknown reservation status: {}", s));
        }

        match trimmed.to_ascii_uppercase().as_str() {
            "RESERVED" => Ok(ReservationStatus::Reserved),
            "WAITLISTED" => Ok(ReservationStatus::Waitlisted),
            "CANCELLED" => Ok(ReservationStatus::Cancelled),
            _ => Err(format!("unknown reservation status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reservation {
    pub id: ReservationId,
    pub cruise_number: CruiseNumber,
    pub customer_id: CustomerId,
    pub status: ReservationStatus,
}

/// Outcome of a booking request as seen by the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Allocation {
    pub reservation_id: ReservationId,
    pub status: ReservationStatus,
}

impl From<&Reservation> for Allocation {
    fn from(reservation: &Reservation) -> Self {
        Self {
            reservation_id: reservation.id,
            status: reservation.status,
        }
    }
}
