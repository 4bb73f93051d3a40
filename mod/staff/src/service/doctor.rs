use clinic_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use clinic_sql::Value;

use crate::model::Doctor;
use super::StaffService;

/// Input for creating a doctor record.
#[derive(Debug)]
pub struct CreateDoctorInput {
    pub name: String,
    pub email: Option<String>,
    pub specialization: String,
    pub department: String,
    pub phone: Option<String>,
    pub consultation_fee: Option<f64>,
}

/// Optional list filters for doctors.
#[derive(Debug, Default)]
pub struct DoctorFilters {
    pub department: Option<String>,
    pub specialization: Option<String>,
    pub active: Option<bool>,
}

impl StaffService {
    pub fn create_doctor(&self, input: CreateDoctorInput) -> Result<Doctor, ServiceError> {
        validate_doctor_fields(
            &input.name,
            &input.specialization,
            &input.department,
            input.consultation_fee,
        )?;

        let now = now_rfc3339();
        let doctor = Doctor {
            id: new_id(),
            name: input.name,
            email: input.email,
            specialization: input.specialization,
            department: input.department,
            phone: input.phone,
            consultation_fee: input.consultation_fee,
            active: true,
            create_at: now.clone(),
            update_at: now,
        };

        self.insert_record("doctors", &doctor.id, &doctor, &doctor_indexes(&doctor))?;
        Ok(doctor)
    }

    pub fn get_doctor(&self, id: &str) -> Result<Doctor, ServiceError> {
        self.get_record("doctors", id)
    }

    pub fn list_doctors(
        &self,
        params: &ListParams,
        filters: &DoctorFilters,
    ) -> Result<ListResult<Doctor>, ServiceError> {
        let mut where_filters: Vec<(&str, Value)> = Vec::new();
        if let Some(ref dep) = filters.department {
            where_filters.push(("department", Value::Text(dep.clone())));
        }
        if let Some(ref spec) = filters.specialization {
            where_filters.push(("specialization", Value::Text(spec.clone())));
        }
        if let Some(active) = filters.active {
            where_filters.push(("active", Value::Integer(active as i64)));
        }

        let limit = params.limit.min(500);
        self.list_records("doctors", &where_filters, limit, params.offset)
    }

    pub fn update_doctor(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<Doctor, ServiceError> {
        let current: Doctor = self.get_record("doctors", id)?;
        let updated: Doctor = Self::apply_patch(&current, patch)?;

        validate_doctor_fields(
            &updated.name,
            &updated.specialization,
            &updated.department,
            updated.consultation_fee,
        )?;

        self.update_record("doctors", id, &updated, &doctor_indexes(&updated))?;
        Ok(updated)
    }

    pub fn delete_doctor(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_record("doctors", id)
    }
}

fn doctor_indexes(doctor: &Doctor) -> Vec<(&'static str, Value)> {
    vec![
        ("name", Value::Text(doctor.name.clone())),
        (
            "email",
            match &doctor.email {
                Some(e) => Value::Text(e.clone()),
                None => Value::Null,
            },
        ),
        ("specialization", Value::Text(doctor.specialization.clone())),
        ("department", Value::Text(doctor.department.clone())),
        ("active", Value::Integer(doctor.active as i64)),
        ("create_at", Value::Text(doctor.create_at.clone())),
        ("update_at", Value::Text(doctor.update_at.clone())),
    ]
}

fn validate_doctor_fields(
    name: &str,
    specialization: &str,
    department: &str,
    fee: Option<f64>,
) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::Validation("doctor name is required".into()));
    }
    if specialization.trim().is_empty() {
        return Err(ServiceError::Validation("specialization is required".into()));
    }
    if department.trim().is_empty() {
        return Err(ServiceError::Validation("department is required".into()));
    }
    if let Some(fee) = fee {
        if fee < 0.0 || !fee.is_finite() {
            return Err(ServiceError::Validation(
                "consultation fee must be non-negative".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn test_service() -> StaffService {
        let sql = Arc::new(clinic_sql::SqliteStore::open_in_memory().unwrap());
        StaffService::new(sql).unwrap()
    }

    fn sample_input(name: &str, email: Option<&str>) -> CreateDoctorInput {
        CreateDoctorInput {
            name: name.into(),
            email: email.map(String::from),
            specialization: "Cardiology".into(),
            department: "Medicine".into(),
            phone: None,
            consultation_fee: Some(120.0),
        }
    }

    #[test]
    fn create_and_get() {
        let svc = test_service();
        let doc = svc
            .create_doctor(sample_input("Dr. Rao", Some("rao@clinic.example")))
            .unwrap();
        assert!(doc.active);

        let got = svc.get_doctor(&doc.id).unwrap();
        assert_eq!(got.name, "Dr. Rao");
        assert_eq!(got.email.as_deref(), Some("rao@clinic.example"));
    }

    #[test]
    fn missing_name_is_validation_error() {
        let svc = test_service();
        let err = svc.create_doctor(sample_input("  ", None)).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn negative_fee_rejected() {
        let svc = test_service();
        let mut input = sample_input("Dr. Rao", None);
        input.consultation_fee = Some(-5.0);
        let err = svc.create_doctor(input).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn duplicate_email_is_conflict() {
        let svc = test_service();
        svc.create_doctor(sample_input("Dr. A", Some("same@clinic.example")))
            .unwrap();
        let err = svc
            .create_doctor(sample_input("Dr. B", Some("same@clinic.example")))
            .unwrap_err();
        assert_eq!(err.error_code(), "ALREADY_EXISTS");
    }

    #[test]
    fn get_unknown_is_not_found() {
        let svc = test_service();
        let err = svc.get_doctor("nope").unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn list_with_department_filter() {
        let svc = test_service();
        svc.create_doctor(sample_input("Dr. A", None)).unwrap();
        let mut other = sample_input("Dr. B", None);
        other.department = "Surgery".into();
        svc.create_doctor(other).unwrap();

        let result = svc
            .list_doctors(
                &ListParams::default(),
                &DoctorFilters {
                    department: Some("Surgery".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].name, "Dr. B");
    }

    #[test]
    fn update_patches_and_protects_id() {
        let svc = test_service();
        let doc = svc.create_doctor(sample_input("Dr. Rao", None)).unwrap();

        let updated = svc
            .update_doctor(
                &doc.id,
                serde_json::json!({"id": "hijack", "department": "ICU"}),
            )
            .unwrap();
        assert_eq!(updated.id, doc.id);
        assert_eq!(updated.department, "ICU");
        assert_eq!(updated.create_at, doc.create_at);

        let got = svc.get_doctor(&doc.id).unwrap();
        assert_eq!(got.department, "ICU");
    }

    #[test]
    fn update_cannot_blank_name() {
        let svc = test_service();
        let doc = svc.create_doctor(sample_input("Dr. Rao", None)).unwrap();
        let err = svc
            .update_doctor(&doc.id, serde_json::json!({"name": ""}))
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn delete_then_gone() {
        let svc = test_service();
        let doc = svc.create_doctor(sample_input("Dr. Rao", None)).unwrap();
        svc.delete_doctor(&doc.id).unwrap();
        assert!(svc.get_doctor(&doc.id).is_err());
        assert!(svc.delete_doctor(&doc.id).is_err());
    }
}
