use chrono::NaiveDate;

use clinic_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use clinic_sql::Value;

use crate::model::{Appointment, AppointmentStatus, Patient};
use super::PatientService;

/// Input for scheduling an appointment.
#[derive(Debug)]
pub struct CreateAppointmentInput {
    pub patient_id: String,
    pub doctor_id: String,
    pub date: String,
    pub slot: Option<String>,
    pub reason: Option<String>,
}

/// Optional list filters for appointments.
#[derive(Debug, Default)]
pub struct AppointmentFilters {
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
}

impl PatientService {
    pub fn create_appointment(
        &self,
        input: CreateAppointmentInput,
    ) -> Result<Appointment, ServiceError> {
        // The patient must exist; the doctor id lives in another module and
        // is recorded as an opaque reference.
        let _: Patient = self.get_record("patients", &input.patient_id)?;

        if input.doctor_id.trim().is_empty() {
            return Err(ServiceError::Validation("doctorId is required".into()));
        }
        NaiveDate::parse_from_str(&input.date, "%Y-%m-%d")
            .map_err(|_| ServiceError::Validation("date must be a YYYY-MM-DD date".into()))?;

        let now = now_rfc3339();
        let appointment = Appointment {
            id: new_id(),
            patient_id: input.patient_id,
            doctor_id: input.doctor_id,
            date: input.date,
            slot: input.slot,
            reason: input.reason,
            status: AppointmentStatus::Scheduled,
            create_at: now.clone(),
            update_at: now,
        };

        self.insert_record(
            "appointments",
            &appointment.id,
            &appointment,
            &[
                ("patient_id", Value::Text(appointment.patient_id.clone())),
                ("doctor_id", Value::Text(appointment.doctor_id.clone())),
                ("date", Value::Text(appointment.date.clone())),
                ("status", Value::Text(appointment.status.as_str().to_string())),
                ("create_at", Value::Text(appointment.create_at.clone())),
                ("update_at", Value::Text(appointment.update_at.clone())),
            ],
        )?;

        Ok(appointment)
    }

    pub fn get_appointment(&self, id: &str) -> Result<Appointment, ServiceError> {
        self.get_record("appointments", id)
    }

    pub fn list_appointments(
        &self,
        params: &ListParams,
        filters: &AppointmentFilters,
    ) -> Result<ListResult<Appointment>, ServiceError> {
        let mut where_filters: Vec<(&str, Value)> = Vec::new();
        if let Some(ref patient_id) = filters.patient_id {
            where_filters.push(("patient_id", Value::Text(patient_id.clone())));
        }
        if let Some(ref doctor_id) = filters.doctor_id {
            where_filters.push(("doctor_id", Value::Text(doctor_id.clone())));
        }
        if let Some(ref status) = filters.status {
            where_filters.push(("status", Value::Text(status.clone())));
        }
        if let Some(ref date) = filters.date {
            where_filters.push(("date", Value::Text(date.clone())));
        }

        let limit = params.limit.min(500);
        self.list_records("appointments", &where_filters, limit, params.offset)
    }

    /// Mark a SCHEDULED appointment as COMPLETED.
    pub fn complete_appointment(&self, id: &str) -> Result<Appointment, ServiceError> {
        self.transition_appointment(id, AppointmentStatus::Completed)
    }

    /// Mark a SCHEDULED appointment as CANCELLED.
    pub fn cancel_appointment(&self, id: &str) -> Result<Appointment, ServiceError> {
        self.transition_appointment(id, AppointmentStatus::Cancelled)
    }

    /// SCHEDULED → terminal transition, guarded on the status column so a
    /// completed appointment cannot also be cancelled.
    fn transition_appointment(
        &self,
        id: &str,
        target: AppointmentStatus,
    ) -> Result<Appointment, ServiceError> {
        let mut appointment: Appointment = self.get_record("appointments", id)?;
        appointment.status = target;
        appointment.update_at = now_rfc3339();

        let data = serde_json::to_string(&appointment)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let affected = self.sql
            .exec(
                "UPDATE appointments SET data = ?1, status = ?2, update_at = ?3 \
                 WHERE id = ?4 AND status = 'SCHEDULED'",
                &[
                    Value::Text(data),
                    Value::Text(target.as_str().to_string()),
                    Value::Text(appointment.update_at.clone()),
                    Value::Text(id.to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if affected == 0 {
            let current: Appointment = self.get_record("appointments", id)?;
            return Err(ServiceError::Conflict(format!(
                "appointment {} is already {}",
                id, current.status
            )));
        }

        Ok(appointment)
    }
}
