//! Validation for grid coordinates, visit dates and ratings.

use chrono::NaiveDate;

use crate::error::{RegistryError, Result};
use crate::model::{Coordinate, MAP_SIZE, VisitDate};

/// Validates a grid coordinate.
///
/// Both components must lie in `[0, 1000)`.
///
/// # Examples
///
/// ```
/// use poi_registry::compute::validation::validate_coordinate;
///
/// let c = validate_coordinate(10, 999).unwrap();
/// assert_eq!((c.x(), c.y()), (10, 999));
///
/// assert!(validate_coordinate(-1, 0).is_err());
/// assert!(validate_coordinate(0, 1000).is_err());
/// ```
pub fn validate_coordinate(x: i64, y: i64) -> Result<Coordinate> {
    let in_range = |v: i64| (0..MAP_SIZE).contains(&v);
    if !in_range(x) || !in_range(y) {
        return Err(RegistryError::InvalidCoordinate {
            x: x as f64,
            y: y as f64,
        });
    }
    Ok(Coordinate::new_unchecked(x, y))
}

/// Parses a `dd/mm/yyyy` date.
///
/// Day and month may omit their leading zero; the year must have four
/// digits. Calendar validity is checked, so `31/02/2025` fails.
///
/// # Examples
///
/// ```
/// use poi_registry::compute::validation::validate_date;
///
/// assert_eq!(validate_date("1/9/2025").unwrap().to_string(), "01/09/2025");
/// assert!(validate_date("31/02/2025").is_err());
/// assert!(validate_date("01-10-2025").is_err());
/// ```
pub fn validate_date(input: &str) -> Result<VisitDate> {
    let invalid = || RegistryError::InvalidDate(input.to_string());

    let mut parts = input.trim().split('/');
    let (Some(day), Some(month), Some(year), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let digits = |s: &str, min: usize, max: usize| {
        (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };
    if !digits(day, 1, 2) || !digits(month, 1, 2) || !digits(year, 4, 4) {
        return Err(invalid());
    }

    let day: u32 = day.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    if year < 1 {
        return Err(invalid());
    }

    NaiveDate::from_ymd_opt(year, month, day)
        .map(VisitDate::from_naive)
        .ok_or_else(invalid)
}

/// Reduces a rating to an integer in `[1, 10]`.
///
/// Whole-valued floats are accepted (`7.0` becomes `7`); anything with a
/// fractional part, non-finite, or out of range fails.
pub fn validate_rating(rating: f64) -> Result<u8> {
    if !rating.is_finite() || rating.fract() != 0.0 || !(1.0..=10.0).contains(&rating) {
        return Err(RegistryError::InvalidRating(rating));
    }
    Ok(rating as u8)
}

/// Normalizes a type name into its lookup key (trimmed, lowercase).
pub fn normalize_type_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trims an attribute name, rejecting empty results.
pub fn validate_attribute_name(attribute: &str) -> Result<String> {
    let trimmed = attribute.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::InvalidArgument(
            "Attribute name cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
