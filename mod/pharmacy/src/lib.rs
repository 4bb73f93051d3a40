pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use clinic_core::Module;

use service::PharmacyService;

/// Pharmacy module — stocked inventory items.
pub struct PharmacyModule {
    service: Arc<PharmacyService>,
}

impl PharmacyModule {
    pub fn new(service: PharmacyService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl Module for PharmacyModule {
    fn name(&self) -> &str {
        "pharmacy"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
