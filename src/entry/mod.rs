pub mod draft;
pub mod validate;

use crate::errors::FieldErrors;
use crate::models::{Asset, OrderKind, OrderRequest, Side};
pub use draft::{Field, OrderDraft};
use serde::Serialize;

/// The order entry form: kind and side toggles around an auto-calculating draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderForm {
    pub kind: OrderKind,
    pub side: Side,
    pub draft: OrderDraft,
}

impl Default for OrderForm {
    fn default() -> Self {
        Self {
            kind: OrderKind::Limit,
            side: Side::Buy,
            draft: OrderDraft::new(),
        }
    }
}

impl OrderForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills the form from a clicked book level: its price becomes the limit price
    /// and its side becomes the order side.
    pub fn prefill(&mut self, price: f64, side: Side) {
        self.draft.set_price(price.to_string());
        self.kind = OrderKind::Limit;
        self.side = side;
    }

    pub fn is_submit_ready(&self) -> bool {
        validate::is_submit_ready(&self.draft, self.kind)
    }

    /// Builds the immutable request for `asset`, or every field's complaint.
    pub fn to_request(&self, asset: &Asset) -> Result<OrderRequest, FieldErrors> {
        let valid = validate::validate(&self.draft, self.kind)?;

        Ok(OrderRequest {
            asset: asset.clone(),
            side: self.side,
            kind: self.kind,
            quantity: valid.quantity,
            price: valid.price,
            notional: valid.notional,
        })
    }
}
