//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports, and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{CatalogueCommand, CatalogueQuery};
use crate::domain::{AccountService, ReviewService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: AccountService,
    pub reviews: ReviewService,
    pub catalogue: Arc<dyn CatalogueQuery>,
    pub admin: Arc<dyn CatalogueCommand>,
}

impl HttpState {
    /// Construct state from the domain services and catalogue ports.
    #[must_use]
    pub fn new(
        accounts: AccountService,
        reviews: ReviewService,
        catalogue: Arc<dyn CatalogueQuery>,
        admin: Arc<dyn CatalogueCommand>,
    ) -> Self {
        Self {
            accounts,
            reviews,
            catalogue,
            admin,
        }
    }
}
