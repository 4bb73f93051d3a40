use std::sync::Arc;

use chrono::NaiveDate;

use clinic_core::{ListParams, ListResult, ServiceError, merge_patch, new_id, now_rfc3339};
use clinic_sql::{Row, SQLStore, Value};

use crate::model::{InventoryItem, ItemCategory};

/// SQL schema for the inventory table.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS inventory_items (
    id          TEXT PRIMARY KEY,
    data        TEXT NOT NULL,
    name        TEXT,
    category    TEXT,
    quantity    INTEGER,
    create_at   TEXT,
    update_at   TEXT
)";

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_inv_category ON inventory_items(category)",
    "CREATE INDEX IF NOT EXISTS idx_inv_name ON inventory_items(name)",
];

/// Input for creating an inventory item.
#[derive(Debug)]
pub struct CreateItemInput {
    pub name: String,
    pub category: ItemCategory,
    pub quantity: i64,
    pub unit: Option<String>,
    pub unit_price: Option<f64>,
    pub supplier: Option<String>,
    pub expiry_date: Option<String>,
}

/// Pharmacy service — inventory item records over the SQL store.
pub struct PharmacyService {
    sql: Arc<dyn SQLStore>,
}

impl PharmacyService {
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        sql.exec(SCHEMA, &[])
            .map_err(|e| ServiceError::Storage(format!("pharmacy schema init failed: {}", e)))?;
        for stmt in INDEXES {
            sql.exec(stmt, &[])
                .map_err(|e| ServiceError::Storage(format!("pharmacy schema init failed: {}", e)))?;
        }
        Ok(Self { sql })
    }

    pub fn create_item(&self, input: CreateItemInput) -> Result<InventoryItem, ServiceError> {
        let now = now_rfc3339();
        let item = InventoryItem {
            id: new_id(),
            name: input.name,
            category: input.category,
            quantity: input.quantity,
            unit: input.unit,
            unit_price: input.unit_price,
            supplier: input.supplier,
            expiry_date: input.expiry_date,
            create_at: now.clone(),
            update_at: now,
        };
        validate_item(&item)?;

        let data = serde_json::to_string(&item)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        self.sql
            .exec(
                "INSERT INTO inventory_items (id, data, name, category, quantity, create_at, update_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                &[
                    Value::Text(item.id.clone()),
                    Value::Text(data),
                    Value::Text(item.name.clone()),
                    Value::Text(item.category.as_str().to_string()),
                    Value::Integer(item.quantity),
                    Value::Text(item.create_at.clone()),
                    Value::Text(item.update_at.clone()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok(item)
    }

    pub fn get_item(&self, id: &str) -> Result<InventoryItem, ServiceError> {
        let rows = self.sql
            .query(
                "SELECT data FROM inventory_items WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("inventory item {}", id)))?;
        row_to_item(row)
    }

    pub fn list_items(
        &self,
        params: &ListParams,
        category: Option<&str>,
    ) -> Result<ListResult<InventoryItem>, ServiceError> {
        let limit = params.limit.min(500);

        let (where_sql, mut sql_params) = match category {
            Some(cat) => (
                " WHERE category = ?1".to_string(),
                vec![Value::Text(cat.to_string())],
            ),
            None => (String::new(), Vec::new()),
        };

        let count_sql = format!("SELECT COUNT(*) as cnt FROM inventory_items{}", where_sql);
        let count_rows = self.sql
            .query(&count_sql, &sql_params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let total = count_rows
            .first()
            .and_then(|r| r.get_i64("cnt"))
            .unwrap_or(0) as usize;

        let limit_idx = sql_params.len() + 1;
        let offset_idx = sql_params.len() + 2;
        sql_params.push(Value::Integer(limit as i64));
        sql_params.push(Value::Integer(params.offset as i64));

        let select_sql = format!(
            "SELECT data FROM inventory_items{} ORDER BY create_at DESC LIMIT ?{} OFFSET ?{}",
            where_sql, limit_idx, offset_idx,
        );
        let rows = self.sql
            .query(&select_sql, &sql_params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let items = rows
            .iter()
            .map(row_to_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ListResult { items, total })
    }

    /// Update with JSON merge-patch semantics. `id` and `createAt` are
    /// immutable; `updateAt` is forced.
    pub fn update_item(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<InventoryItem, ServiceError> {
        let current = self.get_item(id)?;
        let now = now_rfc3339();

        let mut base = serde_json::to_value(&current)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let mut patch_filtered = patch;
        if let Some(obj) = patch_filtered.as_object_mut() {
            obj.remove("id");
            obj.remove("createAt");
            obj.insert("updateAt".into(), serde_json::json!(now));
        }
        merge_patch(&mut base, &patch_filtered);

        let updated: InventoryItem = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        validate_item(&updated)?;

        let data = serde_json::to_string(&updated)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let affected = self.sql
            .exec(
                "UPDATE inventory_items SET data = ?1, name = ?2, category = ?3, \
                 quantity = ?4, update_at = ?5 WHERE id = ?6",
                &[
                    Value::Text(data),
                    Value::Text(updated.name.clone()),
                    Value::Text(updated.category.as_str().to_string()),
                    Value::Integer(updated.quantity),
                    Value::Text(updated.update_at.clone()),
                    Value::Text(id.to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(ServiceError::NotFound(format!("inventory item {}", id)));
        }
        Ok(updated)
    }

    pub fn delete_item(&self, id: &str) -> Result<(), ServiceError> {
        let affected = self.sql
            .exec(
                "DELETE FROM inventory_items WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("inventory item {}", id)));
        }
        Ok(())
    }
}

fn validate_item(item: &InventoryItem) -> Result<(), ServiceError> {
    if item.name.trim().is_empty() {
        return Err(ServiceError::Validation("item name is required".into()));
    }
    if item.quantity < 0 {
        return Err(ServiceError::Validation("quantity must be non-negative".into()));
    }
    if let Some(price) = item.unit_price {
        if price < 0.0 || !price.is_finite() {
            return Err(ServiceError::Validation("unit price must be non-negative".into()));
        }
    }
    if let Some(ref expiry) = item.expiry_date {
        NaiveDate::parse_from_str(expiry, "%Y-%m-%d")
            .map_err(|_| ServiceError::Validation("expiryDate must be a YYYY-MM-DD date".into()))?;
    }
    Ok(())
}

fn row_to_item(row: &Row) -> Result<InventoryItem, ServiceError> {
    let json = row
        .get_str("data")
        .ok_or_else(|| ServiceError::Storage("missing data column".into()))?;
    serde_json::from_str(json)
        .map_err(|e| ServiceError::Storage(format!("bad inventory json: {}", e)))
}
