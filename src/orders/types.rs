/// Order and order status records
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::OrderError;

/// Status given to orders created without one
pub const DEFAULT_STATUS: &str = "Pending";

/// Statuses seeded into an empty database (name, color)
pub const DEFAULT_STATUSES: &[(&str, &str)] = &[
    ("Pending", "#f59e0b"),
    ("Processing", "#3b82f6"),
    ("Completed", "#22c55e"),
    ("Cancelled", "#ef4444"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    pub product_id: Option<i64>,
    pub total: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// POST /api/orders body
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub customer_name: String,
    #[serde(default)]
    pub product_id: Option<i64>,
    pub total: f64,
    #[serde(default)]
    pub status: Option<String>,
}

impl NewOrder {
    /// Validate and normalize (trimmed name, default status)
    pub fn validated(self) -> Result<NewOrder, OrderError> {
        let customer_name = self.customer_name.trim().to_string();
        if customer_name.is_empty() {
            return Err(OrderError::Validation(
                "customer_name must not be empty".to_string(),
            ));
        }
        if !self.total.is_finite() || self.total < 0.0 {
            return Err(OrderError::Validation(format!(
                "total must be a non-negative amount, got {}",
                self.total
            )));
        }
        let status = match self.status {
            Some(status) => validate_status(&status)?.to_string(),
            None => DEFAULT_STATUS.to_string(),
        };

        Ok(NewOrder {
            customer_name,
            product_id: self.product_id,
            total: self.total,
            status: Some(status),
        })
    }
}

/// PATCH /api/orders/:id/status body
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatus {
    pub id: i64,
    pub name: String,
    pub color: Option<String>,
}

/// POST /api/order-statuses body
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderStatus {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Trimmed, non-empty status name
pub fn validate_status(status: &str) -> Result<&str, OrderError> {
    let status = status.trim();
    if status.is_empty() {
        return Err(OrderError::Validation("status must not be empty".to_string()));
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_order(name: &str, total: f64, status: Option<&str>) -> NewOrder {
        NewOrder {
            customer_name: name.to_string(),
            product_id: None,
            total,
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn test_validation_normalizes() {
        let order = new_order("  Ada  ", 12.5, None).validated().unwrap();
        assert_eq!(order.customer_name, "Ada");
        assert_eq!(order.status.as_deref(), Some(DEFAULT_STATUS));

        let order = new_order("Ada", 0.0, Some(" Processing ")).validated().unwrap();
        assert_eq!(order.status.as_deref(), Some("Processing"));
    }

    #[test]
    fn test_validation_rejects() {
        assert!(matches!(
            new_order(" ", 1.0, None).validated(),
            Err(OrderError::Validation(_))
        ));
        assert!(matches!(
            new_order("Ada", -1.0, None).validated(),
            Err(OrderError::Validation(_))
        ));
        assert!(matches!(
            new_order("Ada", f64::NAN, None).validated(),
            Err(OrderError::Validation(_))
        ));
        assert!(matches!(
            new_order("Ada", 1.0, Some("")).validated(),
            Err(OrderError::Validation(_))
        ));
    }
}
