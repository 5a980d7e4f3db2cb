//! Single-line rendering of spare parts for listings
//!
//! The line format is `<part_id> | <name> | <car_model> | Rs.<price> | Stock: <stock>`.
//! [`from_display_line`] reverses it into raw form text. The inverse breaks
//! when a field itself contains `" | "`, so callers that can keep the part ID
//! next to the line (see [`DisplayRow`]) should select by key instead.

use crate::error::InventoryError;
use crate::models::{PartForm, SparePart};

/// Column separator in a display line
pub const SEPARATOR: &str = " | ";
/// Prefix of the price column
pub const PRICE_PREFIX: &str = "Rs.";
/// Prefix of the stock column
pub const STOCK_PREFIX: &str = "Stock: ";

/// Formats a price the way it is shown and edited.
/// Whole amounts keep one decimal place (`50.0`), others use the shortest
/// text that parses back to the same value (`49.99`).
pub fn format_price(price: f64) -> String {
    if price.is_finite() && price.fract() == 0.0 && price.abs() < 1e15 {
        format!("{:.1}", price)
    } else {
        price.to_string()
    }
}

/// Renders a part as one listing line
pub fn to_display_line(part: &SparePart) -> String {
    format!(
        "{}{sep}{}{sep}{}{sep}{}{}{sep}{}{}",
        part.part_id,
        part.name,
        part.car_model,
        PRICE_PREFIX,
        format_price(part.price),
        STOCK_PREFIX,
        part.stock,
        sep = SEPARATOR,
    )
}

/// Parses a listing line back into raw form text.
///
/// The line must split into exactly five columns, the fourth starting with
/// `Rs.` and the fifth with `Stock: `. The returned text is not validated.
pub fn from_display_line(line: &str) -> Result<PartForm, InventoryError> {
    let malformed = |reason: String| InventoryError::MalformedLine {
        line: line.to_string(),
        reason,
    };

    let columns: Vec<&str> = line.split(SEPARATOR).collect();
    let [part_id, name, car_model, price, stock] = columns.as_slice() else {
        return Err(malformed(format!(
            "expected 5 columns, found {}",
            columns.len()
        )));
    };

    let price = price
        .strip_prefix(PRICE_PREFIX)
        .ok_or_else(|| malformed(format!("price column does not start with '{}'", PRICE_PREFIX)))?;
    let stock = stock
        .strip_prefix(STOCK_PREFIX)
        .ok_or_else(|| malformed(format!("stock column does not start with '{}'", STOCK_PREFIX)))?;

    Ok(PartForm::new(*part_id, *name, *car_model, price, stock))
}

/// A listing line together with the key of the part it shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub part_id: String,
    pub line: String,
}

impl From<&SparePart> for DisplayRow {
    fn from(part: &SparePart) -> Self {
        Self {
            part_id: part.part_id.clone(),
            line: to_display_line(part),
        }
    }
}
