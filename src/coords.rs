//! Coordinate text parsing and formatting.
//!
//! Two input grammars are accepted:
//!
//! - decimal pairs, latitude first: `-1.9441, 30.0619` or `-1.9441 30.0619`
//! - degree-minute-second pairs with hemisphere letters, in either order:
//!   `1°56'38.8"S 30°03'42.8"E`
//!
//! The DMS grammar tolerates `º` for degrees, `′`/`’` for minutes, `″`/`”`/`''`
//! for seconds, optional spaces between components, and omitted minutes or
//! seconds. Formatting produces the canonical DMS form, which parses back to
//! within 0.1 arc-second.

use crate::error::CoordError;
use crate::types::Location;
use regex::{Captures, Regex};
use std::sync::OnceLock;

const DMS_COMPONENT: &str = r#"(\d+(?:\.\d+)?)\s*[°º]\s*(?:(\d+(?:\.\d+)?)\s*['′’]\s*)?(?:(\d+(?:\.\d+)?)\s*(?:''|"|″|”)\s*)?([NSEW])"#;

fn decimal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*([+-]?\d+(?:\.\d+)?)\s*(?:,\s*|\s+)([+-]?\d+(?:\.\d+)?)\s*$")
            .expect("decimal coordinate pattern is valid")
    })
}

fn dms_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)^\s*{DMS_COMPONENT}\s*,?\s*{DMS_COMPONENT}\s*$"
        ))
        .expect("DMS coordinate pattern is valid")
    })
}

/// Parses decimal or DMS coordinate text into a validated [`Location`].
///
/// # Examples
///
/// ```
/// use imbibi::coords::parse_coordinates;
///
/// let kigali = parse_coordinates("-1.9441, 30.0619").unwrap();
/// assert_eq!(kigali.latitude, -1.9441);
///
/// let dms = parse_coordinates(r#"1°56'38.8"S 30°03'42.8"E"#).unwrap();
/// assert!((dms.latitude + 1.944111).abs() < 1e-5);
/// assert!((dms.longitude - 30.061889).abs() < 1e-5);
///
/// assert!(parse_coordinates("somewhere").is_err());
/// ```
pub fn parse_coordinates(input: &str) -> Result<Location, CoordError> {
    if input.trim().is_empty() {
        return Err(CoordError::Empty);
    }

    let location = if let Some(caps) = decimal_pattern().captures(input) {
        Location::new(parse_number(&caps[1])?, parse_number(&caps[2])?)
    } else if let Some(caps) = dms_pattern().captures(input) {
        parse_dms_pair(input, &caps)?
    } else {
        return Err(CoordError::InvalidFormat(input.trim().to_string()));
    };

    validate(location)
}

fn parse_dms_pair(input: &str, caps: &Captures<'_>) -> Result<Location, CoordError> {
    let first = dms_component(caps, 1)?;
    let second = dms_component(caps, 5)?;

    match (first, second) {
        (Axis::Latitude(latitude), Axis::Longitude(longitude))
        | (Axis::Longitude(longitude), Axis::Latitude(latitude)) => {
            Ok(Location::new(latitude, longitude))
        }
        _ => Err(CoordError::InvalidFormat(input.trim().to_string())),
    }
}

enum Axis {
    Latitude(f64),
    Longitude(f64),
}

/// Reads one DMS component whose degree group starts at capture `offset`.
fn dms_component(caps: &Captures<'_>, offset: usize) -> Result<Axis, CoordError> {
    let degrees = parse_number(&caps[offset])?;
    let minutes = optional_part(caps, offset + 1, "minutes")?;
    let seconds = optional_part(caps, offset + 2, "seconds")?;
    let magnitude = degrees + minutes / 60.0 + seconds / 3600.0;

    let axis = match caps[offset + 3].to_ascii_uppercase().as_str() {
        "N" => Axis::Latitude(magnitude),
        "S" => Axis::Latitude(-magnitude),
        "E" => Axis::Longitude(magnitude),
        _ => Axis::Longitude(-magnitude),
    };
    Ok(axis)
}

fn optional_part(
    caps: &Captures<'_>,
    group: usize,
    component: &'static str,
) -> Result<f64, CoordError> {
    let Some(text) = caps.get(group) else {
        return Ok(0.0);
    };
    let value = parse_number(text.as_str())?;
    if value >= 60.0 {
        return Err(CoordError::InvalidComponent { component, value });
    }
    Ok(value)
}

fn parse_number(text: &str) -> Result<f64, CoordError> {
    text.parse::<f64>()
        .map_err(|_| CoordError::InvalidFormat(text.to_string()))
}

fn validate(location: Location) -> Result<Location, CoordError> {
    if !(-90.0..=90.0).contains(&location.latitude) {
        return Err(CoordError::LatitudeOutOfRange(location.latitude));
    }
    if !(-180.0..=180.0).contains(&location.longitude) {
        return Err(CoordError::LongitudeOutOfRange(location.longitude));
    }
    Ok(location)
}

/// Formats a pair as `D°MM'SS.s"H D°MM'SS.s"H`, latitude first.
///
/// ```
/// use imbibi::coords::format_coordinates;
///
/// assert_eq!(
///     format_coordinates(-1.944111, 30.061889),
///     r#"1°56'38.8"S 30°03'42.8"E"#
/// );
/// ```
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    format!(
        "{} {}",
        format_latitude(latitude),
        format_longitude(longitude)
    )
}

/// Formats a latitude as `D°MM'SS.s"N` or `...S`.
pub fn format_latitude(latitude: f64) -> String {
    format_dms(latitude, if latitude < 0.0 { 'S' } else { 'N' })
}

/// Formats a longitude as `D°MM'SS.s"E` or `...W`.
pub fn format_longitude(longitude: f64) -> String {
    format_dms(longitude, if longitude < 0.0 { 'W' } else { 'E' })
}

fn format_dms(value: f64, hemisphere: char) -> String {
    // Round once in tenths of an arc-second so 59.96" carries into the minute
    let tenths = (value.abs() * 36_000.0).round() as u64;
    let degrees = tenths / 36_000;
    let minutes = (tenths % 36_000) / 600;
    let seconds = tenths % 600;
    format!(
        "{}°{:02}'{:02}.{}\"{}",
        degrees,
        minutes,
        seconds / 10,
        seconds % 10,
        hemisphere
    )
}

/// Plain decimal text for copying to the clipboard: `"lat, lon"` with six
/// decimals. Parses back with [`parse_coordinates`].
pub fn format_decimal(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.6}, {longitude:.6}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_variants() {
        let expected = Location::new(-1.5, 29.25);
        assert_eq!(parse_coordinates("-1.5, 29.25").unwrap(), expected);
        assert_eq!(parse_coordinates("-1.5 29.25").unwrap(), expected);
        assert_eq!(parse_coordinates("  -1.5 ,29.25  ").unwrap(), expected);
        assert_eq!(parse_coordinates("+45, -120").unwrap(), Location::new(45.0, -120.0));
    }

    #[test]
    fn test_dms_variants() {
        let expected = parse_coordinates(r#"1°56'38.8"S 30°03'42.8"E"#).unwrap();
        for text in [
            r#"1° 56' 38.8" S, 30° 03' 42.8" E"#,
            "1°56′38.8″S 30°03′42.8″E",
            "1º56'38.8''s 30º03'42.8''e",
            r#"30°03'42.8"E 1°56'38.8"S"#,
        ] {
            assert_eq!(parse_coordinates(text).unwrap(), expected, "{text}");
        }
    }

    #[test]
    fn test_dms_without_seconds() {
        let loc = parse_coordinates("2°30'N 29°E").unwrap();
        assert_eq!(loc, Location::new(2.5, 29.0));
    }

    #[test]
    fn test_zero_is_not_a_fallback() {
        assert_eq!(parse_coordinates(""), Err(CoordError::Empty));
        assert!(matches!(
            parse_coordinates("1.5, abc"),
            Err(CoordError::InvalidFormat(_))
        ));
        assert_eq!(parse_coordinates("0, 0").unwrap(), Location::new(0.0, 0.0));
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            parse_coordinates("91, 0"),
            Err(CoordError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            parse_coordinates("0, -180.5"),
            Err(CoordError::LongitudeOutOfRange(-180.5))
        );
        assert!(matches!(
            parse_coordinates(r#"1°75'00"N 30°00'00"E"#),
            Err(CoordError::InvalidComponent {
                component: "minutes",
                ..
            })
        ));
    }

    #[test]
    fn test_two_latitudes_rejected() {
        assert!(matches!(
            parse_coordinates(r#"1°00'00"N 2°00'00"S"#),
            Err(CoordError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_format_pads_and_rounds() {
        assert_eq!(format_latitude(0.0), "0°00'00.0\"N");
        assert_eq!(format_longitude(-0.5), "0°30'00.0\"W");
        assert_eq!(format_latitude(10.0 + 59.0 / 60.0 + 59.99 / 3600.0), "11°00'00.0\"N");
        assert_eq!(format_longitude(180.0), "180°00'00.0\"E");
    }

    #[test]
    fn test_round_trip_within_tenth_of_arcsecond() {
        let tolerance = 0.05 / 3600.0 + 1e-9;
        let mut lat = -90.0;
        while lat <= 90.0 {
            let mut lon = -180.0;
            while lon <= 180.0 {
                let parsed = parse_coordinates(&format_coordinates(lat, lon)).unwrap();
                assert!((parsed.latitude - lat).abs() <= tolerance, "{lat}");
                assert!((parsed.longitude - lon).abs() <= tolerance, "{lon}");
                lon += 7.123_457;
            }
            lat += 3.987_654;
        }
    }

    #[test]
    fn test_decimal_text_round_trips() {
        let text = format_decimal(-2.0123456, 29.7);
        assert_eq!(text, "-2.012346, 29.700000");
        assert_eq!(parse_coordinates(&text).unwrap(), Location::new(-2.012346, 29.7));
    }
}
