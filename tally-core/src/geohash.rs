//! Geohash encoding for coarse merchant-location buckets.
//!
//! Classic interleaved bisection: even bits refine longitude, odd bits latitude,
//! every 5 bits emit one base-32 character. Output is compatible with the public
//! geohash algorithm, so hashes can be compared against external tools.

use crate::enrichment::UNKNOWN;

/// Characters used in the output, indexed by 5-bit value
pub const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Precision used for merchant features
pub const DEFAULT_PRECISION: usize = 6;

/// Latitude/longitude rectangle covered by a geohash
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    fn world() -> Self {
        Self {
            min_lat: -90.0,
            max_lat: 90.0,
            min_lon: -180.0,
            max_lon: 180.0,
        }
    }
}

/// Encode at [`DEFAULT_PRECISION`]; `"unknown"` when either coordinate is missing.
///
/// Non-finite coordinates are not checked; callers must filter them.
pub fn encode(lat: Option<f64>, lon: Option<f64>) -> String {
    match (lat, lon) {
        (Some(lat), Some(lon)) => encode_with_precision(lat, lon, DEFAULT_PRECISION),
        _ => UNKNOWN.to_string(),
    }
}

pub fn encode_with_precision(lat: f64, lon: f64, precision: usize) -> String {
    let mut bounds = Bounds::world();
    let mut hash = String::with_capacity(precision);
    let mut even = true;
    let mut bits = 0u8;
    let mut index = 0usize;

    while hash.len() < precision {
        if even {
            let mid = (bounds.min_lon + bounds.max_lon) / 2.0;
            if lon >= mid {
                index = index * 2 + 1;
                bounds.min_lon = mid;
            } else {
                index *= 2;
                bounds.max_lon = mid;
            }
        } else {
            let mid = (bounds.min_lat + bounds.max_lat) / 2.0;
            if lat >= mid {
                index = index * 2 + 1;
                bounds.min_lat = mid;
            } else {
                index *= 2;
                bounds.max_lat = mid;
            }
        }
        even = !even;

        bits += 1;
        if bits == 5 {
            hash.push(BASE32[index] as char);
            bits = 0;
            index = 0;
        }
    }

    hash
}

/// Rectangle covered by `hash`, or `None` if it contains a character outside the alphabet
pub fn decode_bounds(hash: &str) -> Option<Bounds> {
    let mut bounds = Bounds::world();
    let mut even = true;

    for c in hash.bytes() {
        let value = BASE32.iter().position(|&b| b == c.to_ascii_lowercase())?;
        for shift in (0..5).rev() {
            let bit = (value >> shift) & 1 == 1;
            if even {
                let mid = (bounds.min_lon + bounds.max_lon) / 2.0;
                if bit {
                    bounds.min_lon = mid;
                } else {
                    bounds.max_lon = mid;
                }
            } else {
                let mid = (bounds.min_lat + bounds.max_lat) / 2.0;
                if bit {
                    bounds.min_lat = mid;
                } else {
                    bounds.max_lat = mid;
                }
            }
            even = !even;
        }
    }

    Some(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center(b: &Bounds) -> (f64, f64) {
        ((b.min_lat + b.max_lat) / 2.0, (b.min_lon + b.max_lon) / 2.0)
    }

    fn contains(b: &Bounds, lat: f64, lon: f64) -> bool {
        lat >= b.min_lat && lat <= b.max_lat && lon >= b.min_lon && lon <= b.max_lon
    }

    #[test]
    fn test_reference_vectors() {
        assert_eq!(encode(Some(37.8324), Some(112.5584)), "ww8p1r");
        assert_eq!(encode(Some(57.64911), Some(10.40744)), "u4pruy");
        assert_eq!(encode(Some(-25.382708), Some(-49.265506)), "6gkzwg");
        assert_eq!(encode(Some(0.0), Some(0.0)), "s00000");
    }

    #[test]
    fn test_missing_coordinates() {
        assert_eq!(encode(None, Some(10.0)), "unknown");
        assert_eq!(encode(Some(10.0), None), "unknown");
        assert_eq!(encode(None, None), "unknown");
    }

    #[test]
    fn test_longer_precision_extends_prefix() {
        let long = encode_with_precision(57.64911, 10.40744, 11);
        assert_eq!(long, "u4pruydqqvj");
        assert!(long.starts_with(&encode(Some(57.64911), Some(10.40744))));
    }

    #[test]
    fn test_deterministic() {
        let a = encode(Some(47.6062), Some(-122.3321));
        let b = encode(Some(47.6062), Some(-122.3321));
        assert_eq!(a, b);
        assert_eq!(a.len(), DEFAULT_PRECISION);
    }

    #[test]
    fn test_decode_bounds_contains_point() {
        let hash = encode(Some(37.8324), Some(112.5584));
        let bounds = decode_bounds(&hash).unwrap();
        assert!(contains(&bounds, 37.8324, 112.5584));
        let (lat, lon) = center(&bounds);
        assert_eq!(encode_with_precision(lat, lon, 6), hash);
    }

    #[test]
    fn test_decode_rejects_invalid_characters() {
        // 'a', 'i', 'l', 'o' are not in the alphabet
        assert!(decode_bounds("ww8a").is_none());
        assert_eq!(decode_bounds(""), Some(Bounds::world()));
    }
}
