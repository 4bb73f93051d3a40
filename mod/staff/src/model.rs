use serde::{Deserialize, Serialize};

/// Doctor — a physician on staff. PK = id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: String,

    pub name: String,

    /// Contact email (unique when present).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub specialization: String,

    pub department: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Consultation fee, non-negative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consultation_fee: Option<f64>,

    #[serde(default = "default_true")]
    pub active: bool,

    pub create_at: String,
    pub update_at: String,
}

fn default_true() -> bool {
    true
}

/// Decision state of a leave request.
///
/// ```text
/// PENDING → APPROVED
///         → REJECTED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LeaveRequest — a doctor's request for a date range off duty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: String,

    /// The requesting doctor (Doctor.id).
    pub doctor_id: String,

    /// Inclusive range, ISO dates (YYYY-MM-DD).
    pub from_date: String,
    pub to_date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    pub status: LeaveStatus,

    /// Who approved/rejected, set on decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<String>,

    pub create_at: String,
    pub update_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctor_json_roundtrip() {
        let d = Doctor {
            id: "d1".into(),
            name: "Dr. Asha Rao".into(),
            email: Some("asha.rao@clinic.example".into()),
            specialization: "Cardiology".into(),
            department: "Medicine".into(),
            phone: None,
            consultation_fee: Some(150.0),
            active: true,
            create_at: "2026-01-01T00:00:00Z".into(),
            update_at: "2026-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_string(&d).unwrap();
        let back: Doctor = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
        // Optional None fields should not appear in JSON.
        assert!(!json.contains("\"phone\""));
        assert!(json.contains("\"consultationFee\""));
    }

    #[test]
    fn leave_status_wire_format() {
        let json = serde_json::to_string(&LeaveStatus::Pending).unwrap();
        assert_eq!(json, "\"PENDING\"");
    }
}
