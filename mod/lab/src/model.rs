use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// StockStatus — derived adequacy classification
// ---------------------------------------------------------------------------

/// Adequacy of a lab consumable's stock, derived from `current_stock`
/// versus `min_required` and recomputed before every persist.
///
/// Persisted as lowercase strings (`"critical"`, `"low"`, `"adequate"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Critical,
    Low,
    Adequate,
}

impl StockStatus {
    /// Classify a stock level against its minimum requirement.
    ///
    /// At or below a quarter of the minimum is critical; below the minimum
    /// is low; otherwise adequate. The boundary `current == min * 0.25`
    /// lands on critical, `current == min` on adequate.
    pub fn classify(current_stock: i64, min_required: i64) -> Self {
        if (current_stock as f64) <= (min_required as f64) * 0.25 {
            Self::Critical
        } else if current_stock < min_required {
            Self::Low
        } else {
            Self::Adequate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Low => "low",
            Self::Adequate => "adequate",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Stock history
// ---------------------------------------------------------------------------

/// Direction of a manual stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockOp {
    Add,
    Remove,
}

/// One audit entry in a lab item's stock history. Entries are appended on
/// every adjustment and never mutated or removed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockEntry {
    pub op: StockOp,
    pub quantity: i64,
    /// RFC 3339 timestamp of the adjustment.
    pub at: String,
    /// Acting account id.
    pub by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// ---------------------------------------------------------------------------
// LabItem
// ---------------------------------------------------------------------------

/// LabItem — a stocked lab consumable with a derived adequacy status.
/// PK = id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabItem {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Units on hand, never negative.
    pub current_stock: i64,

    /// Reorder threshold, always positive.
    pub min_required: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Derived from `current_stock` vs `min_required` on every persist.
    pub status: StockStatus,

    /// Append-only audit log of manual adjustments.
    #[serde(default)]
    pub history: Vec<StockEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_restocked: Option<String>,

    pub create_at: String,
    pub update_at: String,
}

// ---------------------------------------------------------------------------
// TestStatus / TestPriority
// ---------------------------------------------------------------------------

/// Lifecycle state of a lab test.
///
/// ```text
/// REQUESTED → IN_PROGRESS → COMPLETED
///           ↘ CANCELLED   ↘ CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestStatus {
    Requested,
    InProgress,
    Completed,
    Cancelled,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "REQUESTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Whether the test has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheduling priority of a lab test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestPriority {
    Routine,
    Urgent,
}

impl Default for TestPriority {
    fn default() -> Self {
        Self::Routine
    }
}

// ---------------------------------------------------------------------------
// LabTest
// ---------------------------------------------------------------------------

/// LabTest — a requested diagnostic test and its lifecycle.
///
/// The SQL document holds the lifecycle and a result summary; the full
/// result payload (opaque JSON) lives in KV under the test id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTest {
    pub id: String,

    /// Subject patient (opaque reference).
    pub patient_id: String,

    /// Requesting doctor (opaque reference).
    pub requested_by: String,

    /// What to run, e.g. "CBC", "Lipid Panel".
    pub test_type: String,

    #[serde(default)]
    pub priority: TestPriority,

    pub status: TestStatus,

    /// Who ran the test, set on start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technician: Option<String>,

    /// Short human-readable result, set on completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub requested_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,

    pub update_at: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_boundaries() {
        // Exactly a quarter of the minimum is critical.
        assert_eq!(StockStatus::classify(25, 100), StockStatus::Critical);
        assert_eq!(StockStatus::classify(26, 100), StockStatus::Low);
        // Just under the minimum is low; at the minimum is adequate.
        assert_eq!(StockStatus::classify(99, 100), StockStatus::Low);
        assert_eq!(StockStatus::classify(100, 100), StockStatus::Adequate);
        assert_eq!(StockStatus::classify(500, 100), StockStatus::Adequate);
    }

    #[test]
    fn classify_zero_stock() {
        assert_eq!(StockStatus::classify(0, 1), StockStatus::Critical);
        assert_eq!(StockStatus::classify(0, 1000), StockStatus::Critical);
    }

    #[test]
    fn classify_small_minimums() {
        // min_required = 1: quarter threshold is 0.25, so 0 is critical
        // and 1 is adequate; nothing classifies low.
        assert_eq!(StockStatus::classify(0, 1), StockStatus::Critical);
        assert_eq!(StockStatus::classify(1, 1), StockStatus::Adequate);
        // min_required = 4: 1 == 4 * 0.25 lands on critical.
        assert_eq!(StockStatus::classify(1, 4), StockStatus::Critical);
        assert_eq!(StockStatus::classify(2, 4), StockStatus::Low);
    }

    #[test]
    fn classify_is_total() {
        // Every pair lands in exactly one of the three states.
        for min in 1..=50 {
            for current in 0..=60 {
                let status = StockStatus::classify(current, min);
                let critical = (current as f64) <= (min as f64) * 0.25;
                let low = !critical && current < min;
                match status {
                    StockStatus::Critical => assert!(critical),
                    StockStatus::Low => assert!(low),
                    StockStatus::Adequate => assert!(!critical && !low),
                }
            }
        }
    }

    #[test]
    fn classify_is_idempotent() {
        for (current, min) in [(0, 10), (3, 10), (7, 10), (10, 10), (25, 100)] {
            let first = StockStatus::classify(current, min);
            let second = StockStatus::classify(current, min);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn stock_status_wire_format_is_lowercase() {
        assert_eq!(serde_json::to_string(&StockStatus::Critical).unwrap(), "\"critical\"");
        assert_eq!(serde_json::to_string(&StockStatus::Low).unwrap(), "\"low\"");
        assert_eq!(serde_json::to_string(&StockStatus::Adequate).unwrap(), "\"adequate\"");
    }

    #[test]
    fn stock_op_wire_format_is_lowercase() {
        assert_eq!(serde_json::to_string(&StockOp::Add).unwrap(), "\"add\"");
        assert_eq!(serde_json::to_string(&StockOp::Remove).unwrap(), "\"remove\"");
    }

    #[test]
    fn test_status_terminal() {
        assert!(!TestStatus::Requested.is_terminal());
        assert!(!TestStatus::InProgress.is_terminal());
        assert!(TestStatus::Completed.is_terminal());
        assert!(TestStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&TestStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
    }

    #[test]
    fn lab_item_json_roundtrip() {
        let item = LabItem {
            id: "l1".into(),
            name: "Reagent A".into(),
            category: Some("reagent".into()),
            current_stock: 12,
            min_required: 40,
            unit: Some("vial".into()),
            status: StockStatus::Low,
            history: vec![StockEntry {
                op: StockOp::Add,
                quantity: 12,
                at: "2026-01-01T00:00:00Z".into(),
                by: "tech-1".into(),
                note: None,
            }],
            last_restocked: Some("2026-01-01T00:00:00Z".into()),
            create_at: "2026-01-01T00:00:00Z".into(),
            update_at: "2026-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"currentStock\":12"));
        assert!(json.contains("\"status\":\"low\""));
        let back: LabItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.history.len(), 1);
        assert_eq!(back.history[0].op, StockOp::Add);
    }
}
