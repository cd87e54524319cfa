//! Canonical domain model produced from the provider's payloads.
//!
//! Numeric fields are `Option`s: the provider sends everything as text and a
//! value that does not parse is reported as `None` rather than dropped.

use chrono::NaiveTime;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Direction {
    pub id: Option<i64>,
    pub name: String,
}

/// One route/direction pair served by a stop.
///
/// `route_number` plus `direction.name` is the join key against trip data;
/// direction ids are only unique within a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub route_number: Option<i64>,
    pub direction: Direction,
    pub heading: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopSummary {
    pub stop_number: Option<i64>,
    pub description: String,
    pub routes: Vec<RouteSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gps {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub speed_kmh: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ManufacturerFamily {
    Inviro,
    Orion,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classification {
    #[serde(rename = "Double Decker")]
    DoubleDecker,
    #[serde(rename = "Diesel Electric Hybrid")]
    Hybrid,
    Inviro,
    Orion,
    Stretch,
    Regular,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Classification::DoubleDecker => "Double Decker",
            Classification::Hybrid => "Diesel Electric Hybrid",
            Classification::Inviro => "Inviro",
            Classification::Orion => "Orion",
            Classification::Stretch => "Stretch",
            Classification::Regular => "Regular",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleInfo {
    pub has_bike_rack: bool,
    pub is_low_floor_easy_access: bool,
    pub is_double_decker: bool,
    pub is_hybrid: bool,
    pub manufacturer_family: ManufacturerFamily,
    /// 40 or 60 when the code carries a recognised length.
    pub length_feet: Option<u8>,
    pub classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub destination: String,
    pub arrival_time_offset_minutes: Option<i64>,
    /// Milliseconds since the vehicle last reported, or [`crate::parser::STALE`].
    pub last_updated_ms: Option<i64>,
    pub is_last_trip_of_schedule: bool,
    pub scheduled_start_time: Option<NaiveTime>,
    pub vehicle: Option<VehicleInfo>,
    /// Present only while the vehicle is reporting.
    pub gps: Option<Gps>,
}

impl Trip {
    pub fn is_live(&self) -> bool {
        matches!(self.last_updated_ms, Some(ms) if ms >= 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteTrips {
    pub route_number: Option<i64>,
    pub direction: Direction,
    pub heading: Option<String>,
    pub trips: Vec<Trip>,
}

/// Upcoming trips at a stop, grouped by route and direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopTrips {
    pub stop_number: Option<i64>,
    pub description: Option<String>,
    pub routes: Vec<RouteTrips>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

/// A route and direction name to resolve against a stop summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDirection {
    pub route_number: Option<i64>,
    pub direction: Direction,
}

impl RouteDirection {
    pub fn new(route_number: i64, direction_name: impl Into<String>) -> Self {
        Self {
            route_number: Some(route_number),
            direction: Direction {
                id: None,
                name: direction_name.into(),
            },
        }
    }
}

/// Per-call options shared by the three fetching operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Attach the untouched upstream payload (and raw vehicle codes).
    pub include_raw: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(last_updated_ms: Option<i64>) -> Trip {
        Trip {
            destination: "Blair".to_string(),
            arrival_time_offset_minutes: Some(4),
            last_updated_ms,
            is_last_trip_of_schedule: false,
            scheduled_start_time: None,
            vehicle: None,
            gps: None,
        }
    }

    #[test]
    fn test_is_live() {
        assert!(trip(Some(0)).is_live());
        assert!(trip(Some(150_000)).is_live());
        assert!(!trip(Some(crate::parser::STALE)).is_live());
        assert!(!trip(None).is_live());
    }

    #[test]
    fn test_classification_serializes_as_label() {
        let json = serde_json::to_string(&Classification::Hybrid).unwrap();
        assert_eq!(json, "\"Diesel Electric Hybrid\"");
    }
}
