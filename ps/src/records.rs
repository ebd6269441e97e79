//! Record types stored in the pantry database

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single tracked household item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique record ID
    pub id: String,

    /// Item name (unique within a store)
    pub name: String,

    /// Current quantity on hand
    pub quantity: f64,

    /// Unit of measure ("rolls", "liters", "count", ...)
    pub unit: String,

    /// Restock threshold - at or below this the item counts as low stock
    pub min_quantity: f64,

    /// Average consumption per day, used for depletion forecasts
    pub avg_daily_use: f64,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Create a new item with a fresh ID and current timestamp
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            name: name.into(),
            quantity,
            unit: unit.into(),
            min_quantity: 0.0,
            avg_daily_use: 0.0,
            updated_at: Utc::now(),
        }
    }

    /// Set the restock threshold
    pub fn with_min_quantity(mut self, min_quantity: f64) -> Self {
        self.min_quantity = min_quantity;
        self
    }

    /// Set the average daily consumption
    pub fn with_avg_daily_use(mut self, avg_daily_use: f64) -> Self {
        self.avg_daily_use = avg_daily_use;
        self
    }

    /// Whether this item is at or below its restock threshold
    pub fn is_low(&self) -> bool {
        self.quantity <= self.min_quantity
    }

    /// Days until depletion at the average consumption rate
    ///
    /// Returns None when no consumption rate is known.
    pub fn days_remaining(&self) -> Option<f64> {
        if self.avg_daily_use > 0.0 {
            Some(self.quantity / self.avg_daily_use)
        } else {
            None
        }
    }
}

/// A named household preference value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preference {
    pub key: String,

    /// JSON-encoded value (string, number, or bool)
    pub value: serde_json::Value,

    pub updated_at: DateTime<Utc>,
}

impl Preference {
    pub fn new(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            value,
            updated_at: Utc::now(),
        }
    }
}

/// Status of a placed order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Failed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

/// A vendor order placed on behalf of the household
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    pub item_name: String,
    pub quantity: f64,
    pub total_usd: f64,

    /// Vendor-side confirmation reference, if the order was accepted
    pub vendor_ref: Option<String>,

    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    pub fn new(item_name: impl Into<String>, quantity: f64, total_usd: f64) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            item_name: item_name.into(),
            quantity,
            total_usd,
            vendor_ref: None,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// A persisted autonomous-cycle summary
///
/// The actions field is the JSON-encoded action list as produced by the cycle
/// runner; the store does not interpret it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleRecord {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: String,
    pub actions: serde_json::Value,
}
