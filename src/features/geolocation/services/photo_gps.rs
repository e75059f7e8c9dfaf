//! GPS position embedded in photo EXIF metadata.

use std::io::Cursor;

use exif::{In, Tag, Value};
use validator::Validate;

use crate::features::geolocation::models::Coordinates;

/// Convert degrees/minutes/seconds plus a hemisphere reference to signed decimal degrees.
///
/// `S` and `W` references yield negative values.
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64, reference: char) -> f64 {
    let decimal = degrees + minutes / 60.0 + seconds / 3600.0;
    match reference.to_ascii_uppercase() {
        'S' | 'W' => -decimal,
        _ => decimal,
    }
}

/// Read the GPS position from image bytes.
///
/// Returns `None` when the file has no EXIF block, no GPS tags, or tags
/// that decode to an out-of-range position.
pub fn read_gps_coordinates(bytes: &[u8]) -> Option<Coordinates> {
    let mut cursor = Cursor::new(bytes);
    let exif = exif::Reader::new().read_from_container(&mut cursor).ok()?;

    let lat = read_axis(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef)?;
    let lng = read_axis(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef)?;

    let coords = Coordinates::new(lat, lng);
    coords.validate().ok()?;
    Some(coords)
}

fn read_axis(exif: &exif::Exif, value_tag: Tag, ref_tag: Tag) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let [deg, min, sec] = match &field.value {
        Value::Rational(parts) if parts.len() >= 3 => {
            [parts[0].to_f64(), parts[1].to_f64(), parts[2].to_f64()]
        }
        _ => return None,
    };

    // A missing reference is read as north/east
    let reference = exif
        .get_field(ref_tag, In::PRIMARY)
        .and_then(|f| match &f.value {
            Value::Ascii(values) => values.first().and_then(|v| v.first()).map(|b| *b as char),
            _ => None,
        })
        .unwrap_or('N');

    Some(dms_to_decimal(deg, min, sec, reference))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::gps_tagged_tiff;

    #[test]
    fn test_dms_to_decimal() {
        let lat = dms_to_decimal(27.0, 43.0, 1.92, 'N');
        assert!((lat - 27.7172).abs() < 1e-4);

        let south = dms_to_decimal(33.0, 52.0, 4.0, 'S');
        assert!((south + 33.867_777).abs() < 1e-4);

        let west = dms_to_decimal(74.0, 0.0, 21.0, 'w');
        assert!((west + 74.005_833).abs() < 1e-4);
    }

    #[test]
    fn test_no_exif_returns_none() {
        assert_eq!(read_gps_coordinates(b"not an image"), None);
        assert_eq!(read_gps_coordinates(&[]), None);
    }

    #[test]
    fn test_reads_gps_from_tiff() {
        let tiff = gps_tagged_tiff(
            [(27, 1), (43, 1), (192, 100)],
            "N",
            [(85, 1), (19, 1), (2640, 100)],
            "E",
        );

        let coords = read_gps_coordinates(&tiff).unwrap();
        assert!((coords.lat - 27.7172).abs() < 1e-4);
        assert!((coords.lng - 85.3240).abs() < 1e-4);
    }
}
