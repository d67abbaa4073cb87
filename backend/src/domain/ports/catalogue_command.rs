//! Driven port for admin catalogue mutations.

use async_trait::async_trait;

use crate::domain::catalogue::{Domaine, DomaineDraft, Wine, WineDraft};
use crate::domain::ids::{DomaineId, WineId};

pub use super::catalogue_query::CatalogueQueryError as CatalogueCommandError;

/// Admin-only catalogue CRUD.
///
/// Deletes cascade at the store level: removing a domaine removes its wines
/// and their reviews; removing a wine removes its reviews. The application
/// never walks the tree itself.
#[async_trait]
pub trait CatalogueCommand: Send + Sync {
    /// Insert a new domaine.
    async fn create_domaine(&self, draft: &DomaineDraft) -> Result<(), CatalogueCommandError>;

    /// Fetch a domaine for the edit form.
    async fn get_domaine(&self, id: DomaineId) -> Result<Option<Domaine>, CatalogueCommandError>;

    /// Overwrite a domaine's fields.
    async fn update_domaine(
        &self,
        id: DomaineId,
        draft: &DomaineDraft,
    ) -> Result<(), CatalogueCommandError>;

    /// Delete a domaine; a no-op when absent, cascades otherwise.
    async fn delete_domaine(&self, id: DomaineId) -> Result<(), CatalogueCommandError>;

    /// Insert a new wine.
    async fn create_wine(&self, draft: &WineDraft) -> Result<(), CatalogueCommandError>;

    /// Fetch a wine for the edit form.
    async fn get_wine(&self, id: WineId) -> Result<Option<Wine>, CatalogueCommandError>;

    /// Overwrite a wine's fields.
    async fn update_wine(
        &self,
        id: WineId,
        draft: &WineDraft,
    ) -> Result<(), CatalogueCommandError>;

    /// Delete a wine; a no-op when absent, cascades to its reviews otherwise.
    async fn delete_wine(&self, id: WineId) -> Result<(), CatalogueCommandError>;
}
