//! Decoder for the provider's short bus equipment codes (`"D40LFB"`, `"DEH60"`, ...).

use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::model::{Classification, ManufacturerFamily, VehicleInfo};

lazy_static! {
    static ref BIKE_RACK: Regex = Regex::new(r"(?i)b").unwrap();
    static ref LOW_FLOOR: Regex = Regex::new(r"(?i)[^d][ela]{1,3}[^h]").unwrap();
    static ref DOUBLE_DECKER: Regex = Regex::new(r"(?i)dd").unwrap();
    static ref HYBRID: Regex = Regex::new(r"(?i)deh").unwrap();
    static ref INVIRO: Regex = Regex::new(r"(?i)in").unwrap();
    static ref ORION: Regex = Regex::new(r"(?i)on").unwrap();
    static ref LENGTH: Regex = Regex::new(r"([46])0?").unwrap();
    static ref DIGITS: Regex = Regex::new(r"[0-9]+").unwrap();
}

/// Independent feature flags read off an equipment code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Flags {
    bike_rack: bool,
    low_floor: bool,
    double_decker: bool,
    hybrid: bool,
    inviro: bool,
    orion: bool,
}

impl Flags {
    fn read(code: &str) -> Self {
        Self {
            bike_rack: BIKE_RACK.is_match(code),
            low_floor: LOW_FLOOR.is_match(code),
            double_decker: DOUBLE_DECKER.is_match(code),
            hybrid: HYBRID.is_match(code),
            inviro: INVIRO.is_match(code),
            orion: ORION.is_match(code),
        }
    }
}

fn length_feet(code: &str) -> Option<u8> {
    if let Some(caps) = LENGTH.captures(code) {
        return match &caps[1] {
            "4" => Some(40),
            "6" => Some(60),
            _ => None,
        };
    }

    if let Some(found) = DIGITS.find(code) {
        warn!(value = found.as_str(), code, "Unexpected bus length value");
    }

    None
}

/// Decodes an equipment code. Blank codes yield `None`.
///
/// With `include_raw` the original code is kept on the result.
pub fn decode_vehicle_type(code: &str, include_raw: bool) -> Option<VehicleInfo> {
    if code.trim().is_empty() {
        return None;
    }

    let flags = Flags::read(code);
    let length_feet = length_feet(code);

    let manufacturer_family = if flags.inviro {
        ManufacturerFamily::Inviro
    } else if flags.orion {
        ManufacturerFamily::Orion
    } else {
        ManufacturerFamily::Unknown
    };

    let classification = if flags.double_decker {
        Classification::DoubleDecker
    } else if flags.hybrid {
        Classification::Hybrid
    } else if flags.inviro {
        Classification::Inviro
    } else if flags.orion {
        Classification::Orion
    } else if length_feet == Some(60) {
        Classification::Stretch
    } else {
        Classification::Regular
    };

    Some(VehicleInfo {
        has_bike_rack: flags.bike_rack,
        is_low_floor_easy_access: flags.low_floor,
        is_double_decker: flags.double_decker,
        is_hybrid: flags.hybrid,
        manufacturer_family,
        length_feet,
        classification,
        raw: include_raw.then(|| code.to_string()),
    })
}
