use super::draft::{Field, OrderDraft};
use crate::errors::FieldErrors;
use crate::models::OrderKind;
use crate::numeric::parse_field;

/// Numeric values of a draft that passed validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidDraft {
    pub quantity: f64,
    pub price: Option<f64>,
    pub notional: f64,
}

/// Checks quantity and notional, and price only for LIMIT orders.
/// MARKET orders never carry a price, whatever the price field holds.
pub fn validate(draft: &OrderDraft, kind: OrderKind) -> Result<ValidDraft, FieldErrors> {
    let mut errors = FieldErrors::default();

    let mut check = |field: Field| match parse_field(draft.text(field)) {
        Ok(value) => Some(value),
        Err(e) => {
            errors.insert(field.name(), field.label(), e);
            None
        }
    };

    let quantity = check(Field::Quantity);
    let notional = check(Field::Notional);
    let price = match kind {
        OrderKind::Limit => check(Field::Price),
        OrderKind::Market => None,
    };

    match (quantity, notional) {
        (Some(quantity), Some(notional)) if errors.is_empty() => Ok(ValidDraft {
            quantity,
            price,
            notional,
        }),
        _ => Err(errors),
    }
}

pub fn is_submit_ready(draft: &OrderDraft, kind: OrderKind) -> bool {
    validate(draft, kind).is_ok()
}
