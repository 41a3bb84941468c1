use crate::errors::FieldError;

/// Parses free-form field text into a finite, strictly positive decimal.
/// Plain decimal point only; surrounding whitespace is ignored.
pub fn parse_field(text: &str) -> Result<f64, FieldError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(FieldError::EmptyField);
    }

    let value = text.parse::<f64>().map_err(|_| FieldError::NotANumber)?;

    // "inf" and "NaN" parse as f64 but are not numbers a user can trade
    if !value.is_finite() {
        return Err(FieldError::NotANumber);
    }
    if value <= 0.0 {
        return Err(FieldError::NonPositive);
    }

    Ok(value)
}
