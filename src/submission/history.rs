use crate::models::OrderRecord;
use serde::Serialize;
use std::collections::VecDeque;

/// Accepted orders of a session, newest first. Lives until explicitly cleared.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct TradeHistory {
    records: VecDeque<OrderRecord>,
}

impl TradeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: OrderRecord) {
        self.records.push_front(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrderRecord> {
        self.records.iter()
    }
}
