use crate::error::RowError;
use crate::models::{Cents, Discount, ProductPrice, RawDiscountRow, RawPriceRow};
use chrono::NaiveDate;

pub const PRICE_COLUMNS: usize = 8;
pub const DISCOUNT_COLUMNS: usize = 9;

// ── Parsers ───────────────────────────────────────────────────────────────────

/// Parse a major-unit price into cents, truncating past the second decimal.
/// Works on the decimal digits directly so the result is exact:
/// "10.129" → 1012 | "3.005" → 300 | "0.29" → 29 | "7,5" → 750
pub fn parse_price_cents(s: &str) -> Result<Cents, RowError> {
    let invalid = || RowError::InvalidPrice(s.to_string());

    let t = s.trim().replace(',', ".");
    let t = t.strip_prefix('+').unwrap_or(t.as_str());
    let (whole, frac) = t.split_once('.').unwrap_or((t, ""));

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let whole: Cents = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| invalid())? };
    let mut frac_digits = frac.bytes().map(|b| (b - b'0') as Cents);
    let tenths = frac_digits.next().unwrap_or(0);
    let hundredths = frac_digits.next().unwrap_or(0);

    whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(tenths * 10 + hundredths))
        .ok_or_else(invalid)
}

pub fn parse_quantity(field: &'static str, s: &str) -> Result<f64, RowError> {
    let t = s.trim().replace(',', ".");
    match t.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(RowError::InvalidNumber { field, value: s.trim().to_string() }),
    }
}

pub fn parse_percentage(s: &str) -> Result<f64, RowError> {
    let t = s.trim().trim_end_matches('%');
    let pct = parse_quantity("percentage", t)?;
    if !(0.0..=100.0).contains(&pct) {
        return Err(RowError::PercentageOutOfRange(pct));
    }
    Ok(pct)
}

pub fn parse_date(field: &'static str, s: &str) -> Result<NaiveDate, RowError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| RowError::InvalidDate { field, value: s.trim().to_string() })
}

/// Lookup keys are compared lowercased.
pub fn normalise_key(s: &str) -> String {
    s.trim().to_lowercase()
}

// ── Raw rows → records ────────────────────────────────────────────────────────

pub fn price_row_to_record(row: &RawPriceRow) -> Result<ProductPrice, RowError> {
    Ok(ProductPrice {
        product_id: row.product_id.trim().to_string(),
        product_name: row.product_name.trim().to_string(),
        category: row.category.trim().to_string(),
        brand: row.brand.trim().to_string(),
        package_quantity: parse_quantity("package_quantity", &row.package_quantity)?,
        package_unit: row.package_unit.trim().to_string(),
        price: parse_price_cents(&row.price)?,
        currency: row.currency.trim().to_string(),
    })
}

pub fn discount_row_to_record(row: &RawDiscountRow) -> Result<Discount, RowError> {
    let package_quantity = parse_quantity("package_quantity", &row.package_quantity)?;
    let valid_from = parse_date("from", &row.from_date)?;
    let valid_to = parse_date("to", &row.to_date)?;
    let percentage = parse_percentage(&row.percentage)?;

    if valid_to < valid_from {
        return Err(RowError::InvertedInterval {
            from: valid_from.to_string(),
            to: valid_to.to_string(),
        });
    }

    Ok(Discount {
        product_id: row.product_id.trim().to_string(),
        product_name: row.product_name.trim().to_string(),
        brand: row.brand.trim().to_string(),
        package_quantity,
        package_unit: row.package_unit.trim().to_string(),
        category: row.category.trim().to_string(),
        valid_from,
        valid_to,
        percentage,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
