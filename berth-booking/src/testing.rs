use chrono::{NaiveDate, NaiveTime};

use berth_core::{Cruise, CruiseNumber, Repair, RepairId, Ship, ShipId};

pub fn ship(id: ShipId, seat_capacity: u32) -> Ship {
    Ship {
        id,
        age: 12,
        seat_capacity,
        make: "Meyer Werft".to_string(),
        model: "Quantum".to_string(),
    }
}

pub fn cruise(number: CruiseNumber, ship_id: ShipId) -> Cruise {
    let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    Cruise {
        number,
        ship_id,
        captain_id: None,
        destination: "Juneau".to_string(),
        departure_date: day,
        departure_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        arrival_date: day + chrono::Duration::days(7),
        arrival_time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
        num_stops: 3,
        ticket_cost_cents: 129_900,
    }
}

pub fn repair(id: RepairId, ship_id: ShipId) -> Repair {
    Repair {
        id,
        ship_id,
        captain_id: None,
        repair_date: NaiveDate::from_ymd_opt(2024, 11, 3).unwrap(),
        repair_code: "HULL".to_string(),
    }
}
