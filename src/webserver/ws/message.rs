/// Live update message schema
///
/// Every frame pushed to a dashboard is one JSON object tagged by `kind`:
/// - `{"kind": "new_order", "order": {...}}`
/// - `{"kind": "order_status_updated", "order": {...}}`
///
/// Clients merge `order` into their local list by `id`.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::orders::Order;

/// Domain events published after a committed order mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LiveEvent {
    /// An order was created
    NewOrder { order: Order },

    /// An order's status changed
    OrderStatusUpdated { order: Order },
}

impl LiveEvent {
    /// Wire value of the `kind` field
    pub fn kind(&self) -> &'static str {
        match self {
            LiveEvent::NewOrder { .. } => "new_order",
            LiveEvent::OrderStatusUpdated { .. } => "order_status_updated",
        }
    }

    pub fn order(&self) -> &Order {
        match self {
            LiveEvent::NewOrder { order } | LiveEvent::OrderStatusUpdated { order } => order,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for LiveEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (order {})", self.kind(), self.order().id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn order() -> Order {
        Order {
            id: 1,
            customer_name: "Ada".to_string(),
            product_id: None,
            total: 10.0,
            status: "Pending".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_wire_shape() {
        let event = LiveEvent::NewOrder { order: order() };
        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();

        assert_eq!(value["kind"], "new_order");
        assert_eq!(value["order"]["id"], 1);
        assert_eq!(value["order"]["status"], "Pending");
        assert_eq!(value.as_object().unwrap().len(), 2);

        let event = LiveEvent::OrderStatusUpdated { order: order() };
        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(value["kind"], event.kind());
    }
}
