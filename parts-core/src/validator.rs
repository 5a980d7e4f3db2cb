//! Validation of raw form payloads
//!
//! Pure functions: no store access, no side effects.

use crate::error::ValidationError;
use crate::models::{Field, PartForm, SparePart};

/// Checks a raw form payload and turns it into a typed spare part.
///
/// Empty fields are reported before any numeric check, all of them at once.
/// String fields are returned trimmed.
pub fn validate(form: &PartForm) -> Result<SparePart, ValidationError> {
    let missing: Vec<Field> = Field::ALL
        .into_iter()
        .filter(|f| form.get(*f).trim().is_empty())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let price = parse_price(&form.price)?;
    let stock = parse_stock(&form.stock)?;

    Ok(SparePart {
        part_id: form.part_id.trim().to_string(),
        name: form.name.trim().to_string(),
        car_model: form.car_model.trim().to_string(),
        price,
        stock,
    })
}

/// Parses price text as a finite, non-negative number
pub fn parse_price(text: &str) -> Result<f64, ValidationError> {
    let text = text.trim();
    match text.parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => {
            // Collapse -0.0
            Ok(if price == 0.0 { 0.0 } else { price })
        }
        _ => Err(ValidationError::InvalidNumber {
            field: Field::Price,
            value: text.to_string(),
        }),
    }
}

/// Parses stock text as a non-negative integer. Fractional text is rejected.
pub fn parse_stock(text: &str) -> Result<u32, ValidationError> {
    let text = text.trim();
    text.parse::<u32>()
        .map_err(|_| ValidationError::InvalidNumber {
            field: Field::Stock,
            value: text.to_string(),
        })
}
