pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use clinic_core::Module;

use service::StaffService;

/// Staff module — doctor records and leave requests.
pub struct StaffModule {
    service: Arc<StaffService>,
}

impl StaffModule {
    pub fn new(service: StaffService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl Module for StaffModule {
    fn name(&self) -> &str {
        "staff"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
