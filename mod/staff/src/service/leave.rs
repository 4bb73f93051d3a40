use chrono::NaiveDate;

use clinic_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use clinic_sql::Value;

use crate::model::{LeaveRequest, LeaveStatus};
use super::StaffService;

/// Input for filing a leave request.
#[derive(Debug)]
pub struct CreateLeaveInput {
    pub doctor_id: String,
    pub from_date: String,
    pub to_date: String,
    pub reason: Option<String>,
}

/// Optional list filters for leave requests.
#[derive(Debug, Default)]
pub struct LeaveFilters {
    pub doctor_id: Option<String>,
    pub status: Option<String>,
}

impl StaffService {
    pub fn create_leave(&self, input: CreateLeaveInput) -> Result<LeaveRequest, ServiceError> {
        // The requesting doctor must exist.
        let _: crate::model::Doctor = self.get_record("doctors", &input.doctor_id)?;

        let from = parse_date(&input.from_date, "fromDate")?;
        let to = parse_date(&input.to_date, "toDate")?;
        if from > to {
            return Err(ServiceError::Validation(
                "fromDate must not be after toDate".into(),
            ));
        }

        let now = now_rfc3339();
        let leave = LeaveRequest {
            id: new_id(),
            doctor_id: input.doctor_id,
            from_date: input.from_date,
            to_date: input.to_date,
            reason: input.reason,
            status: LeaveStatus::Pending,
            decided_by: None,
            decided_at: None,
            create_at: now.clone(),
            update_at: now,
        };

        self.insert_record(
            "leave_requests",
            &leave.id,
            &leave,
            &[
                ("doctor_id", Value::Text(leave.doctor_id.clone())),
                ("status", Value::Text(leave.status.as_str().to_string())),
                ("from_date", Value::Text(leave.from_date.clone())),
                ("to_date", Value::Text(leave.to_date.clone())),
                ("create_at", Value::Text(leave.create_at.clone())),
                ("update_at", Value::Text(leave.update_at.clone())),
            ],
        )?;

        Ok(leave)
    }

    pub fn get_leave(&self, id: &str) -> Result<LeaveRequest, ServiceError> {
        self.get_record("leave_requests", id)
    }

    pub fn list_leaves(
        &self,
        params: &ListParams,
        filters: &LeaveFilters,
    ) -> Result<ListResult<LeaveRequest>, ServiceError> {
        let mut where_filters: Vec<(&str, Value)> = Vec::new();
        if let Some(ref doctor_id) = filters.doctor_id {
            where_filters.push(("doctor_id", Value::Text(doctor_id.clone())));
        }
        if let Some(ref status) = filters.status {
            where_filters.push(("status", Value::Text(status.clone())));
        }

        let limit = params.limit.min(500);
        self.list_records("leave_requests", &where_filters, limit, params.offset)
    }

    /// Approve a PENDING leave request.
    pub fn approve_leave(&self, id: &str, decided_by: &str) -> Result<LeaveRequest, ServiceError> {
        self.decide_leave(id, LeaveStatus::Approved, decided_by)
    }

    /// Reject a PENDING leave request.
    pub fn reject_leave(&self, id: &str, decided_by: &str) -> Result<LeaveRequest, ServiceError> {
        self.decide_leave(id, LeaveStatus::Rejected, decided_by)
    }

    /// Transition PENDING → APPROVED/REJECTED.
    ///
    /// The UPDATE is guarded on `status = 'PENDING'` so two concurrent
    /// decisions cannot both win.
    fn decide_leave(
        &self,
        id: &str,
        decision: LeaveStatus,
        decided_by: &str,
    ) -> Result<LeaveRequest, ServiceError> {
        let now = now_rfc3339();
        let mut leave: LeaveRequest = self.get_record("leave_requests", id)?;
        leave.status = decision;
        leave.decided_by = Some(decided_by.to_string());
        leave.decided_at = Some(now.clone());
        leave.update_at = now;

        let data = serde_json::to_string(&leave)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let affected = self.sql
            .exec(
                "UPDATE leave_requests SET data = ?1, status = ?2, update_at = ?3 \
                 WHERE id = ?4 AND status = 'PENDING'",
                &[
                    Value::Text(data),
                    Value::Text(decision.as_str().to_string()),
                    Value::Text(leave.update_at.clone()),
                    Value::Text(id.to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if affected == 0 {
            let current: LeaveRequest = self.get_record("leave_requests", id)?;
            return Err(ServiceError::Conflict(format!(
                "leave request {} is already {}",
                id, current.status
            )));
        }

        Ok(leave)
    }
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ServiceError::Validation(format!("{} must be a YYYY-MM-DD date", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::doctor::CreateDoctorInput;
    use std::sync::Arc;

    fn test_service() -> (StaffService, String) {
        let sql = Arc::new(clinic_sql::SqliteStore::open_in_memory().unwrap());
        let svc = StaffService::new(sql).unwrap();
        let doctor = svc
            .create_doctor(CreateDoctorInput {
                name: "Dr. Rao".into(),
                email: None,
                specialization: "Cardiology".into(),
                department: "Medicine".into(),
                phone: None,
                consultation_fee: None,
            })
            .unwrap();
        (svc, doctor.id)
    }

    fn leave_input(doctor_id: &str, from: &str, to: &str) -> CreateLeaveInput {
        CreateLeaveInput {
            doctor_id: doctor_id.into(),
            from_date: from.into(),
            to_date: to.into(),
            reason: Some("conference".into()),
        }
    }

    #[test]
    fn create_pending_leave() {
        let (svc, doctor_id) = test_service();
        let leave = svc
            .create_leave(leave_input(&doctor_id, "2026-09-01", "2026-09-05"))
            .unwrap();
        assert_eq!(leave.status, LeaveStatus::Pending);
        assert!(leave.decided_by.is_none());
    }

    #[test]
    fn unknown_doctor_rejected() {
        let (svc, _) = test_service();
        let err = svc
            .create_leave(leave_input("ghost", "2026-09-01", "2026-09-05"))
            .unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn inverted_range_rejected() {
        let (svc, doctor_id) = test_service();
        let err = svc
            .create_leave(leave_input(&doctor_id, "2026-09-05", "2026-09-01"))
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn malformed_date_rejected() {
        let (svc, doctor_id) = test_service();
        let err = svc
            .create_leave(leave_input(&doctor_id, "Sept 1", "2026-09-05"))
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn single_day_range_is_valid() {
        let (svc, doctor_id) = test_service();
        let leave = svc
            .create_leave(leave_input(&doctor_id, "2026-09-01", "2026-09-01"))
            .unwrap();
        assert_eq!(leave.from_date, leave.to_date);
    }

    #[test]
    fn approve_records_decision() {
        let (svc, doctor_id) = test_service();
        let leave = svc
            .create_leave(leave_input(&doctor_id, "2026-09-01", "2026-09-05"))
            .unwrap();

        let approved = svc.approve_leave(&leave.id, "admin-1").unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.decided_by.as_deref(), Some("admin-1"));
        assert!(approved.decided_at.is_some());
    }

    #[test]
    fn decided_leave_cannot_be_decided_again() {
        let (svc, doctor_id) = test_service();
        let leave = svc
            .create_leave(leave_input(&doctor_id, "2026-09-01", "2026-09-05"))
            .unwrap();

        svc.approve_leave(&leave.id, "admin-1").unwrap();
        let err = svc.reject_leave(&leave.id, "admin-2").unwrap_err();
        assert_eq!(err.error_code(), "ALREADY_EXISTS");

        let got = svc.get_leave(&leave.id).unwrap();
        assert_eq!(got.status, LeaveStatus::Approved);
        assert_eq!(got.decided_by.as_deref(), Some("admin-1"));
    }

    #[test]
    fn list_filters_by_status() {
        let (svc, doctor_id) = test_service();
        let a = svc
            .create_leave(leave_input(&doctor_id, "2026-09-01", "2026-09-05"))
            .unwrap();
        svc.create_leave(leave_input(&doctor_id, "2026-10-01", "2026-10-02"))
            .unwrap();
        svc.approve_leave(&a.id, "admin-1").unwrap();

        let pending = svc
            .list_leaves(
                &ListParams::default(),
                &LeaveFilters {
                    status: Some("PENDING".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(pending.total, 1);
    }
}
