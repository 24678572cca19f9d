// Parsing and number formatting helpers.
//
// Storm exports are dirty: counts arrive as "0.00", monetary bases carry
// thousands separators, dates mix `M/D/YYYY H:MM:SS` and ISO forms. This
// module turns raw text into typed values so the aggregators never see text.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Outcome of reading one numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericField {
    /// Column absent or the cell is blank.
    Missing,
    Value(f64),
    /// Non-empty text that is not a finite number.
    Invalid,
}

impl NumericField {
    pub fn value(self) -> Option<f64> {
        match self {
            NumericField::Value(v) => Some(v),
            NumericField::Missing | NumericField::Invalid => None,
        }
    }
}

/// Parse a numeric cell.
///
/// - Trims whitespace and strips `","` thousands separators.
/// - Blank cells are `Missing`, not an error.
/// - `NaN` and infinities are rejected as `Invalid` so sums stay finite.
pub fn parse_numeric(s: Option<&str>) -> NumericField {
    let Some(s) = s else {
        return NumericField::Missing;
    };
    let s = s.trim();
    if s.is_empty() {
        return NumericField::Missing;
    }
    match s.replace(',', "").parse::<f64>() {
        Ok(v) if v.is_finite() => NumericField::Value(v),
        _ => NumericField::Invalid,
    }
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // `BGN_DATE` looks like `4/18/1950 0:00:00`; only the date part matters.
    let s = s?.trim();
    let date_part = s.split_whitespace().next()?;
    NaiveDate::parse_from_str(date_part, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y-%m-%d"))
        .ok()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with locale-aware thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Past u64 range the digits are kept as-is, without separators.
    let mut res = match int_part.parse::<u64>() {
        Ok(int_val) => int_val.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
