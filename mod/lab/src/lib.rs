pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use clinic_core::Module;

use service::LabService;

/// Lab module — lab consumable inventory and diagnostic test lifecycle.
pub struct LabModule {
    service: Arc<LabService>,
}

impl LabModule {
    pub fn new(service: LabService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl Module for LabModule {
    fn name(&self) -> &str {
        "lab"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
