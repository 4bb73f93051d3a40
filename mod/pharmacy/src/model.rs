use serde::{Deserialize, Serialize};

/// Inventory item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemCategory {
    Medicine,
    Equipment,
    Supply,
}

impl ItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medicine => "MEDICINE",
            Self::Equipment => "EQUIPMENT",
            Self::Supply => "SUPPLY",
        }
    }
}

/// InventoryItem — a stocked pharmacy item. PK = id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,

    pub name: String,

    pub category: ItemCategory,

    /// Units on hand, never negative.
    #[serde(default)]
    pub quantity: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Price per unit, non-negative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,

    /// ISO date (YYYY-MM-DD), for perishables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,

    pub create_at: String,
    pub update_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_json_roundtrip() {
        let item = InventoryItem {
            id: "i1".into(),
            name: "Paracetamol 500mg".into(),
            category: ItemCategory::Medicine,
            quantity: 240,
            unit: Some("tablet".into()),
            unit_price: Some(0.12),
            supplier: None,
            expiry_date: Some("2027-03-31".into()),
            create_at: "2026-01-01T00:00:00Z".into(),
            update_at: "2026-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"MEDICINE\""));
        assert!(json.contains("\"expiryDate\""));
        let back: InventoryItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }
}
