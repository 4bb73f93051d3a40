use clinic_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use clinic_sql::Value;

use crate::model::{MedicationLine, Patient, Prescription};
use super::PatientService;

/// Input for issuing a prescription.
#[derive(Debug)]
pub struct CreatePrescriptionInput {
    pub patient_id: String,
    pub doctor_id: String,
    pub medications: Vec<MedicationLine>,
    pub notes: Option<String>,
}

/// Optional list filters for prescriptions.
#[derive(Debug, Default)]
pub struct PrescriptionFilters {
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
}

impl PatientService {
    /// Issue a prescription. Once written it is never updated or deleted.
    pub fn create_prescription(
        &self,
        input: CreatePrescriptionInput,
    ) -> Result<Prescription, ServiceError> {
        let _: Patient = self.get_record("patients", &input.patient_id)?;

        if input.doctor_id.trim().is_empty() {
            return Err(ServiceError::Validation("doctorId is required".into()));
        }
        if input.medications.is_empty() {
            return Err(ServiceError::Validation(
                "a prescription needs at least one medication".into(),
            ));
        }
        for line in &input.medications {
            if line.name.trim().is_empty() || line.dosage.trim().is_empty() {
                return Err(ServiceError::Validation(
                    "each medication needs a name and dosage".into(),
                ));
            }
        }

        let prescription = Prescription {
            id: new_id(),
            patient_id: input.patient_id,
            doctor_id: input.doctor_id,
            medications: input.medications,
            notes: input.notes,
            create_at: now_rfc3339(),
        };

        self.insert_record(
            "prescriptions",
            &prescription.id,
            &prescription,
            &[
                ("patient_id", Value::Text(prescription.patient_id.clone())),
                ("doctor_id", Value::Text(prescription.doctor_id.clone())),
                ("create_at", Value::Text(prescription.create_at.clone())),
            ],
        )?;

        Ok(prescription)
    }

    pub fn get_prescription(&self, id: &str) -> Result<Prescription, ServiceError> {
        self.get_record("prescriptions", id)
    }

    pub fn list_prescriptions(
        &self,
        params: &ListParams,
        filters: &PrescriptionFilters,
    ) -> Result<ListResult<Prescription>, ServiceError> {
        let mut where_filters: Vec<(&str, Value)> = Vec::new();
        if let Some(ref patient_id) = filters.patient_id {
            where_filters.push(("patient_id", Value::Text(patient_id.clone())));
        }
        if let Some(ref doctor_id) = filters.doctor_id {
            where_filters.push(("doctor_id", Value::Text(doctor_id.clone())));
        }

        let limit = params.limit.min(500);
        self.list_records("prescriptions", &where_filters, limit, params.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::patient::CreatePatientInput;
    use std::sync::Arc;

    fn test_service() -> (PatientService, String) {
        let sql = Arc::new(clinic_sql::SqliteStore::open_in_memory().unwrap());
        let svc = PatientService::new(sql).unwrap();
        let patient = svc
            .create_patient(CreatePatientInput {
                name: "Jordan Lee".into(),
                date_of_birth: None,
                gender: None,
                blood_group: None,
                phone: None,
                address: None,
                medical_history: vec![],
            })
            .unwrap();
        (svc, patient.id)
    }

    fn amoxicillin() -> MedicationLine {
        MedicationLine {
            name: "Amoxicillin".into(),
            dosage: "500mg".into(),
            frequency: "3x daily".into(),
            duration: Some("7 days".into()),
        }
    }

    #[test]
    fn issue_and_get() {
        let (svc, patient_id) = test_service();
        let rx = svc
            .create_prescription(CreatePrescriptionInput {
                patient_id: patient_id.clone(),
                doctor_id: "doc-1".into(),
                medications: vec![amoxicillin()],
                notes: None,
            })
            .unwrap();

        let got = svc.get_prescription(&rx.id).unwrap();
        assert_eq!(got.patient_id, patient_id);
        assert_eq!(got.medications[0].name, "Amoxicillin");
    }

    #[test]
    fn empty_medications_rejected() {
        let (svc, patient_id) = test_service();
        let err = svc
            .create_prescription(CreatePrescriptionInput {
                patient_id,
                doctor_id: "doc-1".into(),
                medications: vec![],
                notes: None,
            })
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn blank_medication_name_rejected() {
        let (svc, patient_id) = test_service();
        let mut med = amoxicillin();
        med.name = " ".into();
        let err = svc
            .create_prescription(CreatePrescriptionInput {
                patient_id,
                doctor_id: "doc-1".into(),
                medications: vec![med],
                notes: None,
            })
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn list_by_patient() {
        let (svc, patient_id) = test_service();
        svc.create_prescription(CreatePrescriptionInput {
            patient_id: patient_id.clone(),
            doctor_id: "doc-1".into(),
            medications: vec![amoxicillin()],
            notes: None,
        })
        .unwrap();

        let result = svc
            .list_prescriptions(
                &ListParams::default(),
                &PrescriptionFilters {
                    patient_id: Some(patient_id),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(result.total, 1);
    }
}
