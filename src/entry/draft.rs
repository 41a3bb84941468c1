use crate::numeric::parse_field;
use serde::{Deserialize, Serialize};

/// One of the three interdependent order fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Quantity,
    Price,
    Notional,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Quantity => "quantity",
            Field::Price => "price",
            Field::Notional => "notional",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Quantity => "Quantity",
            Field::Price => "Price",
            Field::Notional => "Notional",
        }
    }
}

/// In-progress order text, kept consistent by auto-calculation.
///
/// The field the user edited last, together with price, drives the third:
/// quantity or price edits derive notional, notional edits derive quantity.
/// Stored text is exactly what the user typed unless it was derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderDraft {
    quantity: String,
    price: String,
    notional: String,
    last_edited: Option<Field>,
}

impl OrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quantity(&self) -> &str {
        &self.quantity
    }

    pub fn price(&self) -> &str {
        &self.price
    }

    pub fn notional(&self) -> &str {
        &self.notional
    }

    pub fn last_edited(&self) -> Option<Field> {
        self.last_edited
    }

    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::Quantity => &self.quantity,
            Field::Price => &self.price,
            Field::Notional => &self.notional,
        }
    }

    fn set(&mut self, field: Field, text: impl Into<String>) {
        let text = text.into();
        match field {
            Field::Quantity => self.quantity = text,
            Field::Price => self.price = text,
            Field::Notional => self.notional = text,
        }
        self.last_edited = Some(field);
        self.recompute();
    }

    pub fn set_quantity(&mut self, text: impl Into<String>) {
        self.set(Field::Quantity, text);
    }

    pub fn set_price(&mut self, text: impl Into<String>) {
        self.set(Field::Price, text);
    }

    pub fn set_notional(&mut self, text: impl Into<String>) {
        self.set(Field::Notional, text);
    }

    /// Clears all fields. The next edit, whichever field it hits, becomes the driver.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.quantity.is_empty() && self.price.is_empty() && self.notional.is_empty()
    }

    /// Writes the dependent field. Derived writes never touch `last_edited`.
    /// A result that overflows to infinity is not written, so the field keeps its text.
    fn recompute(&mut self) {
        let Some(price) = available(&self.price) else {
            return;
        };

        match self.last_edited {
            Some(Field::Quantity | Field::Price) => {
                if let Some(quantity) = available(&self.quantity) {
                    let notional = quantity * price;
                    if notional.is_finite() {
                        self.notional = format!("{:.2}", notional);
                    }
                }
            }
            Some(Field::Notional) => {
                if let Some(notional) = available(&self.notional) {
                    let quantity = notional / price;
                    if quantity.is_finite() {
                        self.quantity = format!("{:.8}", quantity);
                    }
                }
            }
            None => {}
        }
    }
}

/// A usable operand for calculation; invalid text simply isn't one yet.
fn available(text: &str) -> Option<f64> {
    parse_field(text).ok()
}
