//! Turns decoded upstream payloads into the canonical model.
//!
//! Each assembler checks the envelope, surfaces a provider error code if one
//! is present, then walks the payload through [`crate::shape`] and the scalar
//! parsers. None of them perform I/O.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::fetch::Operation;
use crate::model::{
    Direction, Gps, QueryOptions, RouteSummary, RouteTrips, StopSummary, StopTrips, Trip,
};
use crate::parser::{
    lookup_error_code, parse_boolean, parse_clock_time, parse_elapsed_minutes_to_ms, parse_float,
    parse_integer, title_case,
};
use crate::shape::{collection, is_padding, text, text_or_empty};
use crate::vehicle::decode_vehicle_type;

/// Keys the provider wraps each operation's result in. The all-routes
/// operation answers under the summary key.
fn result_keys(operation: Operation) -> &'static [&'static str] {
    match operation {
        Operation::GetRouteSummaryForStop => &["GetRouteSummaryForStopResult"],
        Operation::GetNextTripsForStop => &["GetNextTripsForStopResult"],
        Operation::GetNextTripsForStopAllRoutes => &[
            "GetNextTripsForStopAllRoutesResult",
            "GetRouteSummaryForStopResult",
        ],
    }
}

/// Unwraps the operation's result object and fails on a provider error code.
fn result_body(payload: &Value, operation: Operation) -> Result<&Value> {
    let malformed = || Error::MalformedResponse {
        operation: operation.as_str(),
    };

    let envelope = payload.as_object().ok_or_else(malformed)?;
    let body = result_keys(operation)
        .iter()
        .filter_map(|key| envelope.get(*key))
        .find(|value| value.is_object())
        .ok_or_else(malformed)?;

    if let Some(code) = text(body, "Error") {
        if !code.trim().is_empty() {
            return Err(lookup_error_code(&code).into());
        }
    }

    Ok(body)
}

fn integer(value: &Value, key: &str) -> Option<i64> {
    text(value, key).and_then(|s| parse_integer(&s))
}

fn float(value: &Value, key: &str) -> Option<f64> {
    text(value, key).and_then(|s| parse_float(&s))
}

/// Builds a [`StopSummary`] from a `GetRouteSummaryForStop` payload.
///
/// # Errors
///
/// [`Error::MalformedResponse`] for a payload without the result object, or
/// [`Error::Upstream`] when the provider reported an error code.
pub fn stop_summary(payload: &Value, options: QueryOptions) -> Result<StopSummary> {
    let body = result_body(payload, Operation::GetRouteSummaryForStop)?;

    let routes = collection(body.get("Routes"), "Route")
        .into_iter()
        .filter(|route| {
            let padding = is_padding(route);
            if padding {
                debug!("Skipping empty route element");
            }
            !padding
        })
        .map(|route| RouteSummary {
            route_number: integer(route, "RouteNo"),
            direction: Direction {
                id: integer(route, "DirectionID"),
                name: text_or_empty(route, "Direction"),
            },
            heading: text_or_empty(route, "RouteHeading"),
        })
        .collect();

    Ok(StopSummary {
        stop_number: integer(body, "StopNo"),
        description: title_case(&text_or_empty(body, "StopDescription")),
        routes,
        raw: options.include_raw.then(|| payload.clone()),
    })
}

/// Builds [`StopTrips`] from a `GetNextTripsForStop` payload. Direction ids
/// are only present if the provider happened to include them.
///
/// # Errors
///
/// As for [`stop_summary`].
pub fn route_trips(payload: &Value, options: QueryOptions) -> Result<StopTrips> {
    let body = result_body(payload, Operation::GetNextTripsForStop)?;
    let routes = collection(body.get("Route"), "RouteDirection");
    Ok(stop_trips(payload, body, routes, options))
}

/// Builds [`StopTrips`] from a `GetNextTripsForStopAllRoutes` payload.
///
/// # Errors
///
/// As for [`stop_summary`].
pub fn all_route_trips(payload: &Value, options: QueryOptions) -> Result<StopTrips> {
    let body = result_body(payload, Operation::GetNextTripsForStopAllRoutes)?;
    let routes = collection(body.get("Routes"), "Route");
    Ok(stop_trips(payload, body, routes, options))
}

fn stop_trips(
    payload: &Value,
    body: &Value,
    routes: Vec<&Value>,
    options: QueryOptions,
) -> StopTrips {
    let description = text(body, "StopLabel")
        .or_else(|| text(body, "StopDescription"))
        .map(|d| title_case(&d));

    let routes = routes
        .into_iter()
        .filter(|route| {
            let padding = is_padding(route);
            if padding {
                debug!("Skipping empty route element");
            }
            !padding
        })
        .map(|route| route_with_trips(route, options))
        .collect();

    StopTrips {
        stop_number: integer(body, "StopNo"),
        description,
        routes,
        raw: options.include_raw.then(|| payload.clone()),
    }
}

fn route_with_trips(route: &Value, options: QueryOptions) -> RouteTrips {
    let heading = text(route, "RouteLabel")
        .or_else(|| text(route, "RouteHeading"))
        .map(|h| h.into_owned());

    let trips = collection(route.get("Trips"), "Trip")
        .into_iter()
        .filter(|trip| {
            let padding = is_padding(trip);
            if padding {
                debug!("Skipping empty trip element");
            }
            !padding
        })
        .map(|t| trip(t, options))
        .collect();

    RouteTrips {
        route_number: integer(route, "RouteNo"),
        direction: Direction {
            id: integer(route, "DirectionID"),
            name: text_or_empty(route, "Direction"),
        },
        heading,
        trips,
    }
}

fn trip(value: &Value, options: QueryOptions) -> Trip {
    let last_updated_ms =
        text(value, "AdjustmentAge").and_then(|s| parse_elapsed_minutes_to_ms(&s));

    // A bad start time only costs us a display field.
    let scheduled_start_time = match text(value, "TripStartTime") {
        Some(raw) if !raw.trim().is_empty() => {
            let parsed = parse_clock_time(&raw);
            if parsed.is_none() {
                warn!(value = %raw, "Unparseable trip start time");
            }
            parsed
        }
        _ => None,
    };

    let vehicle =
        text(value, "BusType").and_then(|code| decode_vehicle_type(&code, options.include_raw));

    let mut trip = Trip {
        destination: text_or_empty(value, "TripDestination"),
        arrival_time_offset_minutes: integer(value, "AdjustedScheduleTime"),
        last_updated_ms,
        is_last_trip_of_schedule: text(value, "LastTripOfSchedule")
            .and_then(|s| parse_boolean(&s))
            .unwrap_or(false),
        scheduled_start_time,
        vehicle,
        gps: None,
    };

    if trip.is_live() {
        trip.gps = Some(Gps {
            latitude: float(value, "Latitude"),
            longitude: float(value, "Longitude"),
            speed_kmh: float(value, "GPSSpeed"),
        });
    }

    trip
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Classification;
    use crate::parser::STALE;
    use chrono::NaiveTime;
    use serde_json::json;

    fn trips_payload(trips: Value) -> Value {
        json!({
            "GetNextTripsForStopResult": {
                "StopNo": "3017",
                "StopLabel": "RIDEAU CENTRE",
                "Error": "",
                "Route": {
                    "RouteDirection": {
                        "RouteNo": "95",
                        "RouteLabel": "Barrhaven Centre",
                        "Direction": "Westbound",
                        "Trips": { "Trip": trips }
                    }
                }
            }
        })
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        let err = stop_summary(&json!("oops"), QueryOptions::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid server response for GetRouteSummaryForStop."
        );

        let err = route_trips(&json!({"Unexpected": {}}), QueryOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedResponse {
                operation: "GetNextTripsForStop"
            }
        ));
    }

    #[test]
    fn test_upstream_error_wins_over_data() {
        let payload = json!({
            "GetRouteSummaryForStopResult": {
                "StopNo": "3017",
                "Error": "1",
                "Routes": { "Route": { "RouteNo": "95", "Direction": "East" } }
            }
        });
        let err = stop_summary(&payload, QueryOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid API key");
        assert_eq!(err.code(), Some(1));
    }

    #[test]
    fn test_summary_single_route_and_padding() {
        let payload = json!({
            "GetRouteSummaryForStopResult": {
                "StopNo": "3017",
                "StopDescription": "RIDEAU CENTRE",
                "Error": "",
                "Routes": {
                    "Route": [
                        { "RouteNo": "95", "DirectionID": "1", "Direction": "Westbound", "RouteHeading": "Barrhaven" },
                        {},
                        { "RouteNo": "1", "DirectionID": "0", "Direction": "Southbound", "RouteHeading": "Billings Bridge" }
                    ]
                }
            }
        });
        let summary = stop_summary(&payload, QueryOptions::default()).unwrap();
        assert_eq!(summary.stop_number, Some(3017));
        assert_eq!(summary.description, "Rideau Centre");
        assert_eq!(summary.routes.len(), 2);
        assert_eq!(summary.routes[0].route_number, Some(95));
        assert_eq!(summary.routes[0].direction.id, Some(1));
        assert_eq!(summary.routes[1].heading, "Billings Bridge");
        assert!(summary.raw.is_none());
    }

    #[test]
    fn test_summary_without_routes() {
        let payload = json!({
            "GetRouteSummaryForStopResult": { "StopNo": "3017", "StopDescription": "X", "Error": "", "Routes": "" }
        });
        let summary = stop_summary(&payload, QueryOptions { include_raw: true }).unwrap();
        assert!(summary.routes.is_empty());
        assert_eq!(summary.raw, Some(payload));
    }

    #[test]
    fn test_live_trip_gets_gps() {
        let payload = trips_payload(json!({
            "TripDestination": "Barrhaven Centre",
            "TripStartTime": "14:30",
            "AdjustedScheduleTime": "7",
            "AdjustmentAge": "0.5",
            "LastTripOfSchedule": "false",
            "BusType": "DEH60",
            "Latitude": "45.4215",
            "Longitude": "-75.6972",
            "GPSSpeed": "31.5"
        }));

        let stop = route_trips(&payload, QueryOptions::default()).unwrap();
        assert_eq!(stop.description.as_deref(), Some("Rideau Centre"));

        let route = &stop.routes[0];
        assert_eq!(route.route_number, Some(95));
        assert_eq!(route.heading.as_deref(), Some("Barrhaven Centre"));
        assert_eq!(route.direction.id, None);

        let trip = &route.trips[0];
        assert_eq!(trip.arrival_time_offset_minutes, Some(7));
        assert_eq!(trip.last_updated_ms, Some(30_000));
        assert_eq!(trip.scheduled_start_time, NaiveTime::from_hms_opt(14, 30, 0));
        assert_eq!(
            trip.vehicle.as_ref().map(|v| v.classification),
            Some(Classification::Hybrid)
        );

        let gps = trip.gps.unwrap();
        assert_eq!(gps.latitude, Some(45.4215));
        assert_eq!(gps.longitude, Some(-75.6972));
        assert_eq!(gps.speed_kmh, Some(31.5));
    }

    #[test]
    fn test_stale_trip_has_no_gps() {
        let payload = trips_payload(json!([{
            "TripDestination": "Barrhaven Centre",
            "AdjustedScheduleTime": "12",
            "AdjustmentAge": "-1",
            "Latitude": "45.4215",
            "Longitude": "-75.6972",
            "GPSSpeed": ""
        }]));

        let stop = route_trips(&payload, QueryOptions::default()).unwrap();
        let trip = &stop.routes[0].trips[0];
        assert_eq!(trip.last_updated_ms, Some(STALE));
        assert!(trip.gps.is_none());
        assert!(trip.vehicle.is_none());
    }

    #[test]
    fn test_bad_start_time_is_swallowed() {
        let payload = trips_payload(json!({
            "TripDestination": "Barrhaven Centre",
            "TripStartTime": "half past",
            "AdjustedScheduleTime": "3",
            "AdjustmentAge": "1"
        }));

        let stop = route_trips(&payload, QueryOptions::default()).unwrap();
        let trip = &stop.routes[0].trips[0];
        assert_eq!(trip.scheduled_start_time, None);
        assert_eq!(trip.arrival_time_offset_minutes, Some(3));
    }

    #[test]
    fn test_labels_override_description_and_heading() {
        let payload = json!({
            "GetNextTripsForStopResult": {
                "StopNo": "3017",
                "StopDescription": "AAA",
                "StopLabel": "BBB",
                "Error": "",
                "Route": {
                    "RouteDirection": {
                        "RouteNo": "95",
                        "RouteHeading": "H1",
                        "RouteLabel": "L1",
                        "DirectionID": "3",
                        "Direction": "Westbound",
                        "Trips": ""
                    }
                }
            }
        });

        let stop = route_trips(&payload, QueryOptions::default()).unwrap();
        assert_eq!(stop.description.as_deref(), Some("Bbb"));

        let route = &stop.routes[0];
        assert_eq!(route.heading.as_deref(), Some("L1"));
        assert_eq!(route.direction.id, Some(3));
        assert!(route.trips.is_empty());
    }

    #[test]
    fn test_description_and_heading_without_labels() {
        let payload = json!({
            "GetNextTripsForStopResult": {
                "StopNo": "3017",
                "StopDescription": "AAA",
                "Error": "",
                "Route": {
                    "RouteDirection": { "RouteNo": "95", "RouteHeading": "H1", "Direction": "Westbound" }
                }
            }
        });

        let stop = route_trips(&payload, QueryOptions::default()).unwrap();
        assert_eq!(stop.description.as_deref(), Some("Aaa"));
        assert_eq!(stop.routes[0].heading.as_deref(), Some("H1"));
        assert_eq!(stop.routes[0].direction.id, None);
    }

    #[test]
    fn test_trip_order_is_preserved() {
        let payload = trips_payload(json!([
            { "TripDestination": "A", "AdjustedScheduleTime": "2", "AdjustmentAge": "-1" },
            {},
            { "TripDestination": "B", "AdjustedScheduleTime": "9", "AdjustmentAge": "-1" },
            { "TripDestination": "C", "AdjustedScheduleTime": "21", "AdjustmentAge": "-1" }
        ]));

        let stop = route_trips(&payload, QueryOptions::default()).unwrap();
        let destinations: Vec<_> = stop.routes[0]
            .trips
            .iter()
            .map(|t| t.destination.as_str())
            .collect();
        assert_eq!(destinations, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_all_routes_answers_under_summary_key() {
        let payload = json!({
            "GetRouteSummaryForStopResult": {
                "StopNo": "3017",
                "StopDescription": "RIDEAU CENTRE",
                "Error": "",
                "Routes": {
                    "Route": [
                        {
                            "RouteNo": "95",
                            "DirectionID": "1",
                            "Direction": "Westbound",
                            "RouteHeading": "Barrhaven",
                            "Trips": [{ "TripDestination": "Barrhaven", "AdjustedScheduleTime": "5", "AdjustmentAge": "-1" }]
                        },
                        {
                            "RouteNo": "1",
                            "DirectionID": "0",
                            "Direction": "Southbound",
                            "RouteHeading": "Billings Bridge",
                            "Trips": { "Trip": { "TripDestination": "Billings Bridge", "AdjustedScheduleTime": "8", "AdjustmentAge": "-1" } }
                        }
                    ]
                }
            }
        });

        let stop = all_route_trips(&payload, QueryOptions::default()).unwrap();
        assert_eq!(stop.routes.len(), 2);
        assert_eq!(stop.routes[0].direction.id, Some(1));
        assert_eq!(stop.routes[1].trips[0].destination, "Billings Bridge");
        assert_eq!(stop.routes[1].heading.as_deref(), Some("Billings Bridge"));
    }
}
