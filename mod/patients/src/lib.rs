pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use clinic_core::Module;

use service::PatientService;

/// Patients module — patient records, appointments, prescriptions.
pub struct PatientsModule {
    service: Arc<PatientService>,
}

impl PatientsModule {
    pub fn new(service: PatientService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl Module for PatientsModule {
    fn name(&self) -> &str {
        "records"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
