use clinic_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use clinic_sql::Value;

use crate::model::{BLOOD_GROUPS, Patient};
use super::PatientService;

/// Input for registering a patient.
#[derive(Debug)]
pub struct CreatePatientInput {
    pub name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub medical_history: Vec<String>,
}

impl PatientService {
    pub fn create_patient(&self, input: CreatePatientInput) -> Result<Patient, ServiceError> {
        let now = now_rfc3339();
        let patient = Patient {
            id: new_id(),
            name: input.name,
            date_of_birth: input.date_of_birth,
            gender: input.gender,
            blood_group: input.blood_group,
            phone: input.phone,
            address: input.address,
            medical_history: input.medical_history,
            create_at: now.clone(),
            update_at: now,
        };
        validate_patient(&patient)?;

        self.insert_record("patients", &patient.id, &patient, &patient_indexes(&patient))?;
        Ok(patient)
    }

    pub fn get_patient(&self, id: &str) -> Result<Patient, ServiceError> {
        self.get_record("patients", id)
    }

    pub fn list_patients(&self, params: &ListParams) -> Result<ListResult<Patient>, ServiceError> {
        let limit = params.limit.min(500);
        self.list_records("patients", &[], limit, params.offset)
    }

    pub fn update_patient(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<Patient, ServiceError> {
        let current: Patient = self.get_record("patients", id)?;
        let updated: Patient = Self::apply_patch(&current, patch)?;
        validate_patient(&updated)?;

        self.update_record("patients", id, &updated, &patient_indexes(&updated))?;
        Ok(updated)
    }

    pub fn delete_patient(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_record("patients", id)
    }
}

fn patient_indexes(patient: &Patient) -> Vec<(&'static str, Value)> {
    vec![
        ("name", Value::Text(patient.name.clone())),
        (
            "blood_group",
            match &patient.blood_group {
                Some(bg) => Value::Text(bg.clone()),
                None => Value::Null,
            },
        ),
        ("create_at", Value::Text(patient.create_at.clone())),
        ("update_at", Value::Text(patient.update_at.clone())),
    ]
}

fn validate_patient(patient: &Patient) -> Result<(), ServiceError> {
    if patient.name.trim().is_empty() {
        return Err(ServiceError::Validation("patient name is required".into()));
    }
    if let Some(ref bg) = patient.blood_group {
        if !BLOOD_GROUPS.contains(&bg.as_str()) {
            return Err(ServiceError::Validation(format!(
                "unknown blood group: {}",
                bg
            )));
        }
    }
    if let Some(ref dob) = patient.date_of_birth {
        chrono::NaiveDate::parse_from_str(dob, "%Y-%m-%d")
            .map_err(|_| ServiceError::Validation("dateOfBirth must be a YYYY-MM-DD date".into()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn test_service() -> PatientService {
        let sql = Arc::new(clinic_sql::SqliteStore::open_in_memory().unwrap());
        PatientService::new(sql).unwrap()
    }

    fn sample_input(name: &str) -> CreatePatientInput {
        CreatePatientInput {
            name: name.into(),
            date_of_birth: Some("1985-06-14".into()),
            gender: Some("female".into()),
            blood_group: Some("B+".into()),
            phone: None,
            address: None,
            medical_history: vec!["asthma".into()],
        }
    }

    #[test]
    fn create_and_get() {
        let svc = test_service();
        let p = svc.create_patient(sample_input("Jordan Lee")).unwrap();
        let got = svc.get_patient(&p.id).unwrap();
        assert_eq!(got.name, "Jordan Lee");
        assert_eq!(got.medical_history, vec!["asthma".to_string()]);
    }

    #[test]
    fn invalid_blood_group_rejected() {
        let svc = test_service();
        let mut input = sample_input("Jordan Lee");
        input.blood_group = Some("Z+".into());
        let err = svc.create_patient(input).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn invalid_dob_rejected() {
        let svc = test_service();
        let mut input = sample_input("Jordan Lee");
        input.date_of_birth = Some("14/06/1985".into());
        let err = svc.create_patient(input).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn update_appends_history() {
        let svc = test_service();
        let p = svc.create_patient(sample_input("Jordan Lee")).unwrap();
        let updated = svc
            .update_patient(
                &p.id,
                serde_json::json!({"medicalHistory": ["asthma", "hypertension"]}),
            )
            .unwrap();
        assert_eq!(updated.medical_history.len(), 2);
    }

    #[test]
    fn list_counts_all() {
        let svc = test_service();
        svc.create_patient(sample_input("A")).unwrap();
        svc.create_patient(sample_input("B")).unwrap();
        let result = svc.list_patients(&ListParams::default()).unwrap();
        assert_eq!(result.total, 2);
    }

    #[test]
    fn unknown_patient_is_not_found() {
        let svc = test_service();
        assert!(matches!(
            svc.get_patient("missing"),
            Err(ServiceError::NotFound(_))
        ));
    }
}
