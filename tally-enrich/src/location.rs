//! Location summary assembled from the optional address fields. No lookups.

use tally_core::{LocationContext, RawTransactionView, UNKNOWN_LOCATION};

pub fn format_location(txn: &RawTransactionView) -> LocationContext {
    let loc = &txn.location;
    let field = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or("").to_string();

    let address = field(&loc.address);
    let city = field(&loc.city);
    let region = field(&loc.region);
    let country = field(&loc.country);

    let coordinates = match (loc.lat, loc.lon) {
        (Some(lat), Some(lon)) => format!("{lat}, {lon}"),
        _ => String::new(),
    };

    let parts: Vec<&str> = [&address, &city, &region, &country]
        .into_iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();
    let formatted = if parts.is_empty() {
        UNKNOWN_LOCATION.to_string()
    } else {
        parts.join(", ")
    };

    LocationContext {
        address,
        city,
        region,
        country,
        coordinates,
        formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tally_core::TransactionLocation;

    fn txn(location: TransactionLocation) -> RawTransactionView {
        let date = NaiveDate::from_ymd_opt(2026, 2, 16).unwrap();
        RawTransactionView::new("t1", "chk", date, -5.0, "X").with_location(location)
    }

    #[test]
    fn test_fallback_when_no_fields() {
        let ctx = format_location(&txn(TransactionLocation::default()));
        assert_eq!(ctx.formatted, "Unknown Location");
        assert_eq!(ctx.coordinates, "");
    }

    #[test]
    fn test_blank_fields_are_skipped() {
        let ctx = format_location(&txn(TransactionLocation {
            address: Some("  ".to_string()),
            city: Some("Seattle".to_string()),
            region: None,
            country: Some("US".to_string()),
            ..Default::default()
        }));
        assert_eq!(ctx.formatted, "Seattle, US");
        assert_eq!(ctx.address, "");
    }

    #[test]
    fn test_full_location_and_coordinates() {
        let ctx = format_location(&txn(TransactionLocation {
            address: Some("1912 Pike Pl".to_string()),
            city: Some("Seattle".to_string()),
            region: Some("WA".to_string()),
            country: Some("US".to_string()),
            lat: Some(47.6097),
            lon: Some(-122.3422),
        }));
        assert_eq!(ctx.formatted, "1912 Pike Pl, Seattle, WA, US");
        assert_eq!(ctx.coordinates, "47.6097, -122.3422");
    }

    #[test]
    fn test_coordinates_need_both_values() {
        let ctx = format_location(&txn(TransactionLocation {
            lat: Some(10.0),
            ..Default::default()
        }));
        assert_eq!(ctx.coordinates, "");
    }
}
