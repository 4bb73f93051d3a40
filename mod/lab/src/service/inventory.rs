use clinic_core::{ListParams, ListResult, ServiceError, merge_patch, new_id, now_rfc3339};
use clinic_sql::Value;

use crate::model::{LabItem, StockEntry, StockOp, StockStatus};
use super::LabService;

/// Input for creating a lab inventory item.
#[derive(Debug)]
pub struct CreateLabItemInput {
    pub name: String,
    pub category: Option<String>,
    pub current_stock: i64,
    pub min_required: i64,
    pub unit: Option<String>,
}

/// Input for a manual stock adjustment.
#[derive(Debug)]
pub struct AdjustStockInput {
    pub op: StockOp,
    pub quantity: i64,
    pub by: String,
    pub note: Option<String>,
}

/// Optional list filters for lab items.
#[derive(Debug, Default)]
pub struct LabItemFilters {
    pub status: Option<String>,
    pub category: Option<String>,
}

impl LabService {
    pub fn create_item(&self, input: CreateLabItemInput) -> Result<LabItem, ServiceError> {
        validate_stock_fields(&input.name, input.current_stock, input.min_required)?;

        let now = now_rfc3339();
        let item = LabItem {
            id: new_id(),
            name: input.name,
            category: input.category,
            current_stock: input.current_stock,
            min_required: input.min_required,
            unit: input.unit,
            status: StockStatus::classify(input.current_stock, input.min_required),
            history: Vec::new(),
            last_restocked: None,
            create_at: now.clone(),
            update_at: now,
        };

        self.insert_record("lab_items", &item.id, &item, &item_indexes(&item))?;
        Ok(item)
    }

    pub fn get_item(&self, id: &str) -> Result<LabItem, ServiceError> {
        self.get_record("lab_items", id)
    }

    pub fn list_items(
        &self,
        params: &ListParams,
        filters: &LabItemFilters,
    ) -> Result<ListResult<LabItem>, ServiceError> {
        let mut where_filters: Vec<(&str, Value)> = Vec::new();
        if let Some(ref status) = filters.status {
            where_filters.push(("status", Value::Text(status.clone())));
        }
        if let Some(ref category) = filters.category {
            where_filters.push(("category", Value::Text(category.clone())));
        }

        let limit = params.limit.min(500);
        self.list_records("lab_items", &where_filters, limit, params.offset)
    }

    /// Update with JSON merge-patch semantics.
    ///
    /// `id`, `createAt`, `history`, and `status` never come from the patch:
    /// the history is append-only (only `@adjust` touches it) and the status
    /// is recomputed from the driving fields before the write.
    pub fn update_item(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<LabItem, ServiceError> {
        let current: LabItem = self.get_record("lab_items", id)?;
        let now = now_rfc3339();

        let mut base = serde_json::to_value(&current)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let mut patch_filtered = patch;
        if let Some(obj) = patch_filtered.as_object_mut() {
            obj.remove("id");
            obj.remove("createAt");
            obj.remove("history");
            obj.remove("status");
            obj.insert("updateAt".into(), serde_json::json!(now));
        }
        merge_patch(&mut base, &patch_filtered);

        let mut updated: LabItem = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        validate_stock_fields(&updated.name, updated.current_stock, updated.min_required)?;

        self.persist_item(&mut updated)?;
        Ok(updated)
    }

    pub fn delete_item(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_record("lab_items", id)
    }

    /// Apply a manual stock adjustment: append an audit entry, move the
    /// stock level, and re-derive the status.
    ///
    /// A REMOVE that would take the stock below zero is rejected without
    /// touching the record or its history.
    pub fn adjust_stock(&self, id: &str, input: AdjustStockInput) -> Result<LabItem, ServiceError> {
        if input.quantity <= 0 {
            return Err(ServiceError::Validation(
                "adjustment quantity must be positive".into(),
            ));
        }

        let mut item: LabItem = self.get_record("lab_items", id)?;
        let now = now_rfc3339();

        let new_stock = match input.op {
            StockOp::Add => item.current_stock + input.quantity,
            StockOp::Remove => {
                let remaining = item.current_stock - input.quantity;
                if remaining < 0 {
                    return Err(ServiceError::Validation(format!(
                        "cannot remove {} units, only {} in stock",
                        input.quantity, item.current_stock
                    )));
                }
                remaining
            }
        };

        item.current_stock = new_stock;
        if input.op == StockOp::Add {
            item.last_restocked = Some(now.clone());
        }
        item.history.push(StockEntry {
            op: input.op,
            quantity: input.quantity,
            at: now.clone(),
            by: input.by,
            note: input.note,
        });
        item.update_at = now;

        self.persist_item(&mut item)?;
        Ok(item)
    }

    /// Write a lab item back, re-deriving the status first.
    ///
    /// Every persist path funnels through here so the stored status is
    /// always consistent with the driving fields at rest.
    fn persist_item(&self, item: &mut LabItem) -> Result<(), ServiceError> {
        item.status = StockStatus::classify(item.current_stock, item.min_required);
        let id = item.id.clone();
        let indexes = item_indexes(item);
        self.update_record("lab_items", &id, &*item, &indexes)
    }
}

fn item_indexes(item: &LabItem) -> Vec<(&'static str, Value)> {
    vec![
        ("name", Value::Text(item.name.clone())),
        (
            "category",
            match &item.category {
                Some(c) => Value::Text(c.clone()),
                None => Value::Null,
            },
        ),
        ("status", Value::Text(item.status.as_str().to_string())),
        ("create_at", Value::Text(item.create_at.clone())),
        ("update_at", Value::Text(item.update_at.clone())),
    ]
}

fn validate_stock_fields(name: &str, current_stock: i64, min_required: i64) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::Validation("item name is required".into()));
    }
    if current_stock < 0 {
        return Err(ServiceError::Validation(
            "currentStock must be non-negative".into(),
        ));
    }
    if min_required <= 0 {
        return Err(ServiceError::Validation(
            "minRequired must be positive".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::make_service;

    fn reagent(current: i64, min: i64) -> CreateLabItemInput {
        CreateLabItemInput {
            name: "Reagent A".into(),
            category: Some("reagent".into()),
            current_stock: current,
            min_required: min,
            unit: Some("vial".into()),
        }
    }

    #[test]
    fn create_derives_status() {
        let (_dir, svc) = make_service();

        let adequate = svc.create_item(reagent(100, 40)).unwrap();
        assert_eq!(adequate.status, StockStatus::Adequate);

        let low = svc.create_item(reagent(20, 40)).unwrap();
        assert_eq!(low.status, StockStatus::Low);

        let critical = svc.create_item(reagent(10, 40)).unwrap();
        assert_eq!(critical.status, StockStatus::Critical);
    }

    #[test]
    fn create_validates_driving_fields() {
        let (_dir, svc) = make_service();
        assert!(svc.create_item(reagent(-1, 40)).is_err());
        assert!(svc.create_item(reagent(10, 0)).is_err());
        let mut unnamed = reagent(10, 40);
        unnamed.name = "".into();
        assert!(svc.create_item(unnamed).is_err());
    }

    #[test]
    fn update_recomputes_status() {
        let (_dir, svc) = make_service();
        let item = svc.create_item(reagent(100, 40)).unwrap();
        assert_eq!(item.status, StockStatus::Adequate);

        // Raising the minimum past the stock level flips the status.
        let updated = svc
            .update_item(&item.id, serde_json::json!({"minRequired": 150}))
            .unwrap();
        assert_eq!(updated.status, StockStatus::Low);

        let stored = svc.get_item(&item.id).unwrap();
        assert_eq!(stored.status, StockStatus::Low);
    }

    #[test]
    fn patch_cannot_override_status_or_history() {
        let (_dir, svc) = make_service();
        let item = svc.create_item(reagent(100, 40)).unwrap();

        let updated = svc
            .update_item(
                &item.id,
                serde_json::json!({
                    "status": "critical",
                    "history": [{"op": "remove", "quantity": 9, "at": "x", "by": "y"}],
                }),
            )
            .unwrap();
        // Status stays derived; history stays untouched.
        assert_eq!(updated.status, StockStatus::Adequate);
        assert!(updated.history.is_empty());
    }

    #[test]
    fn resave_unchanged_is_idempotent() {
        let (_dir, svc) = make_service();
        let item = svc.create_item(reagent(20, 40)).unwrap();
        assert_eq!(item.status, StockStatus::Low);

        // An empty patch re-persists without changing the classification.
        let resaved = svc.update_item(&item.id, serde_json::json!({})).unwrap();
        assert_eq!(resaved.status, StockStatus::Low);
        assert_eq!(resaved.current_stock, 20);
        assert_eq!(resaved.min_required, 40);
    }

    #[test]
    fn adjust_add_appends_history_and_restocks() {
        let (_dir, svc) = make_service();
        let item = svc.create_item(reagent(10, 40)).unwrap();
        assert_eq!(item.status, StockStatus::Critical);

        let adjusted = svc
            .adjust_stock(
                &item.id,
                AdjustStockInput {
                    op: StockOp::Add,
                    quantity: 50,
                    by: "tech-1".into(),
                    note: Some("weekly order".into()),
                },
            )
            .unwrap();

        assert_eq!(adjusted.current_stock, 60);
        assert_eq!(adjusted.status, StockStatus::Adequate);
        assert!(adjusted.last_restocked.is_some());
        assert_eq!(adjusted.history.len(), 1);
        assert_eq!(adjusted.history[0].op, StockOp::Add);
        assert_eq!(adjusted.history[0].quantity, 50);
        assert_eq!(adjusted.history[0].by, "tech-1");
    }

    #[test]
    fn adjust_remove_recomputes_status() {
        let (_dir, svc) = make_service();
        let item = svc.create_item(reagent(60, 40)).unwrap();

        let adjusted = svc
            .adjust_stock(
                &item.id,
                AdjustStockInput {
                    op: StockOp::Remove,
                    quantity: 55,
                    by: "tech-1".into(),
                    note: None,
                },
            )
            .unwrap();

        assert_eq!(adjusted.current_stock, 5);
        assert_eq!(adjusted.status, StockStatus::Critical);
        // Removal does not count as a restock.
        assert!(adjusted.last_restocked.is_none());
    }

    #[test]
    fn remove_below_zero_rejected_without_mutation() {
        let (_dir, svc) = make_service();
        let item = svc.create_item(reagent(10, 40)).unwrap();

        let err = svc
            .adjust_stock(
                &item.id,
                AdjustStockInput {
                    op: StockOp::Remove,
                    quantity: 11,
                    by: "tech-1".into(),
                    note: None,
                },
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");

        let stored = svc.get_item(&item.id).unwrap();
        assert_eq!(stored.current_stock, 10);
        assert!(stored.history.is_empty());
    }

    #[test]
    fn nonpositive_quantity_rejected() {
        let (_dir, svc) = make_service();
        let item = svc.create_item(reagent(10, 40)).unwrap();
        for qty in [0, -5] {
            let err = svc
                .adjust_stock(
                    &item.id,
                    AdjustStockInput {
                        op: StockOp::Add,
                        quantity: qty,
                        by: "tech-1".into(),
                        note: None,
                    },
                )
                .unwrap_err();
            assert_eq!(err.error_code(), "VALIDATION_FAILED");
        }
    }

    #[test]
    fn history_only_grows() {
        let (_dir, svc) = make_service();
        let item = svc.create_item(reagent(10, 40)).unwrap();

        for i in 0..3 {
            svc.adjust_stock(
                &item.id,
                AdjustStockInput {
                    op: StockOp::Add,
                    quantity: 5,
                    by: format!("tech-{}", i),
                    note: None,
                },
            )
            .unwrap();
        }

        let stored = svc.get_item(&item.id).unwrap();
        assert_eq!(stored.history.len(), 3);
        assert_eq!(stored.history[0].by, "tech-0");
        assert_eq!(stored.history[2].by, "tech-2");
        assert_eq!(stored.current_stock, 25);
    }

    #[test]
    fn list_filters_by_status() {
        let (_dir, svc) = make_service();
        svc.create_item(reagent(100, 40)).unwrap();
        svc.create_item(reagent(20, 40)).unwrap();
        svc.create_item(reagent(5, 40)).unwrap();

        let critical = svc
            .list_items(
                &ListParams::default(),
                &LabItemFilters {
                    status: Some("critical".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(critical.total, 1);
        assert_eq!(critical.items[0].current_stock, 5);
    }

    #[test]
    fn stored_status_tracks_adjustments() {
        // The persisted status column stays in lockstep with the document.
        let (_dir, svc) = make_service();
        let item = svc.create_item(reagent(5, 40)).unwrap();

        svc.adjust_stock(
            &item.id,
            AdjustStockInput {
                op: StockOp::Add,
                quantity: 100,
                by: "tech-1".into(),
                note: None,
            },
        )
        .unwrap();

        let adequate = svc
            .list_items(
                &ListParams::default(),
                &LabItemFilters {
                    status: Some("adequate".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(adequate.total, 1);
    }
}
