use serde::{Deserialize, Serialize};

/// Accepted blood group strings.
pub const BLOOD_GROUPS: &[&str] = &["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

/// Patient — a registered patient record. PK = id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,

    pub name: String,

    /// ISO date (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    /// One of [`BLOOD_GROUPS`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Free-text history notes, append-friendly.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub medical_history: Vec<String>,

    pub create_at: String,
    pub update_at: String,
}

/// Lifecycle state of an appointment.
///
/// ```text
/// SCHEDULED → COMPLETED
///           → CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Whether the appointment has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Appointment — a scheduled visit between a patient and a doctor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,

    pub patient_id: String,
    pub doctor_id: String,

    /// ISO date (YYYY-MM-DD).
    pub date: String,

    /// Time slot label, e.g. "10:30".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    pub status: AppointmentStatus,

    pub create_at: String,
    pub update_at: String,
}

/// A single medication line on a prescription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationLine {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// Prescription — issued once, never edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: String,

    pub patient_id: String,

    /// Issuing doctor.
    pub doctor_id: String,

    pub medications: Vec<MedicationLine>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub create_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appointment_status_terminal() {
        assert!(!AppointmentStatus::Scheduled.is_terminal());
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(AppointmentStatus::Cancelled.is_terminal());
    }

    #[test]
    fn patient_optional_fields_skipped() {
        let p = Patient {
            id: "p1".into(),
            name: "Jordan Lee".into(),
            date_of_birth: None,
            gender: None,
            blood_group: Some("O+".into()),
            phone: None,
            address: None,
            medical_history: vec![],
            create_at: "2026-01-01T00:00:00Z".into(),
            update_at: "2026-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("\"phone\""));
        assert!(!json.contains("\"medicalHistory\""));
        assert!(json.contains("\"bloodGroup\":\"O+\""));
    }

    #[test]
    fn prescription_json_roundtrip() {
        let rx = Prescription {
            id: "r1".into(),
            patient_id: "p1".into(),
            doctor_id: "d1".into(),
            medications: vec![MedicationLine {
                name: "Amoxicillin".into(),
                dosage: "500mg".into(),
                frequency: "3x daily".into(),
                duration: Some("7 days".into()),
            }],
            notes: None,
            create_at: "2026-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_string(&rx).unwrap();
        let back: Prescription = serde_json::from_str(&json).unwrap();
        assert_eq!(back.medications.len(), 1);
        assert_eq!(back.medications[0].name, "Amoxicillin");
    }
}
