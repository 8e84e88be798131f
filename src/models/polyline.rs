//! Encoded polyline codec (precision 5), wire-compatible with the routing
//! service's geometry format.

use crate::models::Coordinates;

const PRECISION: f64 = 1e5;

/// Encode a point sequence as a precision-5 polyline string.
pub fn encode(points: &[Coordinates]) -> String {
    let mut encoded = String::with_capacity(points.len() * 6);
    let mut prev_lat = 0i64;
    let mut prev_lng = 0i64;

    for point in points {
        let lat = (point.lat * PRECISION).round() as i64;
        let lng = (point.lng * PRECISION).round() as i64;
        encode_value(lat - prev_lat, &mut encoded);
        encode_value(lng - prev_lng, &mut encoded);
        prev_lat = lat;
        prev_lng = lng;
    }

    encoded
}

/// Decode a precision-5 polyline string.
///
/// Malformed input (truncated chunks, characters outside the encoding
/// alphabet, out-of-range coordinates) yields an empty sequence rather than
/// an error; a degenerate routing response must not take down a whole
/// generation request.
pub fn decode(encoded: &str) -> Vec<Coordinates> {
    let mut points = Vec::new();
    let mut bytes = encoded.bytes();
    let mut lat = 0i64;
    let mut lng = 0i64;

    loop {
        let d_lat = match decode_value(&mut bytes) {
            DecodeStep::Value(v) => v,
            DecodeStep::End => break,
            DecodeStep::Malformed => return Vec::new(),
        };
        let d_lng = match decode_value(&mut bytes) {
            DecodeStep::Value(v) => v,
            // A latitude without its longitude is a truncated stream.
            DecodeStep::End | DecodeStep::Malformed => return Vec::new(),
        };

        lat += d_lat;
        lng += d_lng;

        match Coordinates::new(lat as f64 / PRECISION, lng as f64 / PRECISION) {
            Ok(point) => points.push(point),
            Err(_) => return Vec::new(),
        }
    }

    points
}

fn encode_value(value: i64, out: &mut String) {
    let mut v = value << 1;
    if value < 0 {
        v = !v;
    }
    let mut v = v as u64;
    while v >= 0x20 {
        out.push((((v & 0x1f) as u8 | 0x20) + 63) as char);
        v >>= 5;
    }
    out.push((v as u8 + 63) as char);
}

enum DecodeStep {
    Value(i64),
    End,
    Malformed,
}

fn decode_value(bytes: &mut impl Iterator<Item = u8>) -> DecodeStep {
    let mut result = 0u64;
    let mut shift = 0u32;
    let mut read_any = false;

    loop {
        let byte = match bytes.next() {
            Some(b) => b,
            None if read_any => return DecodeStep::Malformed,
            None => return DecodeStep::End,
        };
        if !(63..=127).contains(&byte) || shift > 60 {
            return DecodeStep::Malformed;
        }
        read_any = true;

        let chunk = (byte - 63) as u64;
        result |= (chunk & 0x1f) << shift;
        if chunk & 0x20 == 0 {
            break;
        }
        shift += 5;
    }

    let value = if result & 1 == 1 {
        !(result >> 1) as i64
    } else {
        (result >> 1) as i64
    };
    DecodeStep::Value(value)
}
