//! In-memory adapters implementing the persistence ports.
//!
//! Used when no database is configured (local development) and by the
//! app-level tests, which exercise handlers end to end without I/O. The
//! store mirrors the relational semantics the domain relies on: unique
//! usernames, the `(wine_id, user_id)` review constraint, and cascade
//! deletes.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    CatalogueCommand, CatalogueCommandError, CatalogueQuery, CatalogueQueryError,
    ReviewRepository, ReviewRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Domaine, DomaineDraft, DomaineId, Review, ReviewId, ReviewUpsert, Role, StoredUser,
    UserId, UserReview, Username, Wine, WineDetail, WineDraft, WineFilter, WineId, WineReview,
    WineStats, WineSummary,
};

#[derive(Default)]
struct Inner {
    users: Vec<StoredUser>,
    domaines: Vec<Domaine>,
    wines: Vec<Wine>,
    reviews: Vec<Review>,
    // Per-entity serial counters, mirroring one sequence per table.
    serials: [i32; 4],
}

#[derive(Clone, Copy)]
enum Serial {
    User,
    Domaine,
    Wine,
    Review,
}

impl Inner {
    fn next(&mut self, serial: Serial) -> i32 {
        let slot = &mut self.serials[serial as usize];
        *slot += 1;
        *slot
    }
}

/// Shared in-memory store behind all four ports.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Poisoning only happens if another holder panicked; propagating the
        // inner value keeps tests honest about what went wrong.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Insert a domaine directly, returning its id.
    ///
    /// For seeding development data and tests; the HTTP adapters go through
    /// the [`CatalogueCommand`] port instead.
    pub async fn seed_domaine(&self, draft: DomaineDraft) -> DomaineId {
        let mut inner = self.lock();
        let id = DomaineId::new(inner.next(Serial::Domaine));
        inner.domaines.push(Domaine {
            id,
            name: draft.name,
            region: draft.region,
            country: draft.country,
            created_at: Utc::now(),
        });
        id
    }

    /// Grant the admin role to an existing user, as the `make-admin` tool
    /// does for the database-backed store. Returns whether the user existed.
    pub async fn promote_to_admin(&self, username: &str) -> bool {
        let mut inner = self.lock();
        match inner
            .users
            .iter_mut()
            .find(|u| u.username.as_ref() == username)
        {
            Some(user) => {
                user.role = Role::Admin;
                true
            }
            None => false,
        }
    }

    /// Id of the single stored review; panics unless exactly one exists.
    /// Test helper only.
    #[cfg(test)]
    pub(crate) async fn only_review_id(&self) -> ReviewId {
        let inner = self.lock();
        assert_eq!(inner.reviews.len(), 1, "expected exactly one review");
        inner.reviews[0].id
    }

    /// Insert a wine directly, returning its id.
    pub async fn seed_wine(&self, draft: WineDraft) -> WineId {
        let mut inner = self.lock();
        let id = WineId::new(inner.next(Serial::Wine));
        inner.wines.push(Wine {
            id,
            domaine_id: draft.domaine_id,
            name: draft.name,
            year: draft.year,
            grape: draft.grape,
            description_md: draft.description_md,
            created_at: Utc::now(),
        });
        id
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn matches_query(wine: &Wine, domaine: &Domaine, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    wine.name.to_lowercase().contains(&needle)
        || domaine.name.to_lowercase().contains(&needle)
        || wine
            .grape
            .as_deref()
            .is_some_and(|g| g.to_lowercase().contains(&needle))
}

fn newest_first(a: (DateTime<Utc>, i32), b: (DateTime<Utc>, i32)) -> std::cmp::Ordering {
    b.cmp(&a)
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<StoredUser, UserRepositoryError> {
        let mut inner = self.lock();
        if inner.users.iter().any(|u| u.username == *username) {
            return Err(UserRepositoryError::DuplicateUsername);
        }
        let user = StoredUser {
            id: UserId::new(inner.next(Serial::User)),
            username: username.clone(),
            password_hash: password_hash.to_owned(),
            role: Role::User,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, UserRepositoryError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.username.as_ref() == username)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<StoredUser>, UserRepositoryError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn upsert(&self, review: &ReviewUpsert) -> Result<(), ReviewRepositoryError> {
        let mut inner = self.lock();
        if let Some(existing) = inner
            .reviews
            .iter_mut()
            .find(|r| r.wine_id == review.wine_id && r.user_id == review.user_id)
        {
            existing.rating = review.rating;
            existing.comment = review.comment.clone();
            existing.created_at = Utc::now();
        } else {
            let id = ReviewId::new(inner.next(Serial::Review));
            inner.reviews.push(Review {
                id,
                wine_id: review.wine_id,
                user_id: review.user_id,
                rating: review.rating,
                comment: review.comment.clone(),
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, ReviewRepositoryError> {
        Ok(self.lock().reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn delete(&self, id: ReviewId) -> Result<(), ReviewRepositoryError> {
        self.lock().reviews.retain(|r| r.id != id);
        Ok(())
    }
}

#[async_trait]
impl CatalogueQuery for MemoryStore {
    async fn list_domaines_by_name(&self) -> Result<Vec<Domaine>, CatalogueQueryError> {
        let mut domaines = self.lock().domaines.clone();
        domaines.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(domaines)
    }

    async fn list_domaines_newest(&self) -> Result<Vec<Domaine>, CatalogueQueryError> {
        let mut domaines = self.lock().domaines.clone();
        domaines
            .sort_by(|a, b| newest_first((a.created_at, a.id.get()), (b.created_at, b.id.get())));
        Ok(domaines)
    }

    async fn list_wines(
        &self,
        filter: &WineFilter,
    ) -> Result<Vec<WineSummary>, CatalogueQueryError> {
        let inner = self.lock();
        let mut summaries: Vec<(DateTime<Utc>, WineSummary)> = Vec::new();

        for wine in &inner.wines {
            let Some(domaine) = inner.domaines.iter().find(|d| d.id == wine.domaine_id) else {
                continue;
            };
            if let Some(needle) = &filter.query
                && !matches_query(wine, domaine, needle)
            {
                continue;
            }
            if let Some(domaine_id) = filter.domaine_id
                && wine.domaine_id != domaine_id
            {
                continue;
            }

            let ratings: Vec<i32> = inner
                .reviews
                .iter()
                .filter(|r| r.wine_id == wine.id)
                .map(|r| r.rating.get())
                .collect();
            let count = ratings.len() as i64;
            let avg = (count > 0)
                .then(|| round2(ratings.iter().sum::<i32>() as f64 / count as f64));

            summaries.push((
                wine.created_at,
                WineSummary {
                    id: wine.id,
                    name: wine.name.clone(),
                    year: wine.year,
                    grape: wine.grape.clone(),
                    domaine_name: domaine.name.clone(),
                    reviews_count: count,
                    avg_rating: avg,
                },
            ));
        }

        summaries.sort_by(|a, b| newest_first((a.0, a.1.id.get()), (b.0, b.1.id.get())));
        Ok(summaries.into_iter().map(|(_, s)| s).collect())
    }

    async fn wine_detail(&self, id: WineId) -> Result<Option<WineDetail>, CatalogueQueryError> {
        let inner = self.lock();
        let Some(wine) = inner.wines.iter().find(|w| w.id == id) else {
            return Ok(None);
        };
        let Some(domaine) = inner.domaines.iter().find(|d| d.id == wine.domaine_id) else {
            return Ok(None);
        };
        Ok(Some(WineDetail {
            id: wine.id,
            domaine_id: wine.domaine_id,
            name: wine.name.clone(),
            year: wine.year,
            grape: wine.grape.clone(),
            description_md: wine.description_md.clone(),
            domaine_name: domaine.name.clone(),
            region: domaine.region.clone(),
            country: domaine.country.clone(),
        }))
    }

    async fn wine_stats(&self, id: WineId) -> Result<WineStats, CatalogueQueryError> {
        let inner = self.lock();
        let ratings: Vec<i32> = inner
            .reviews
            .iter()
            .filter(|r| r.wine_id == id)
            .map(|r| r.rating.get())
            .collect();
        let count = ratings.len() as i64;
        Ok(WineStats {
            count,
            avg: (count > 0)
                .then(|| round2(ratings.iter().sum::<i32>() as f64 / count as f64)),
        })
    }

    async fn reviews_for_wine(
        &self,
        id: WineId,
    ) -> Result<Vec<WineReview>, CatalogueQueryError> {
        let inner = self.lock();
        let mut annotated: Vec<WineReview> = inner
            .reviews
            .iter()
            .filter(|r| r.wine_id == id)
            .map(|r| {
                let username = inner
                    .users
                    .iter()
                    .find(|u| u.id == r.user_id)
                    .map_or_else(String::new, |u| u.username.to_string());
                WineReview {
                    id: r.id,
                    rating: r.rating,
                    comment: r.comment.clone(),
                    created_at: r.created_at,
                    user_id: r.user_id,
                    username,
                }
            })
            .collect();
        annotated
            .sort_by(|a, b| newest_first((a.created_at, a.id.get()), (b.created_at, b.id.get())));
        Ok(annotated)
    }

    async fn review_for_user(
        &self,
        wine_id: WineId,
        user_id: UserId,
    ) -> Result<Option<Review>, CatalogueQueryError> {
        Ok(self
            .lock()
            .reviews
            .iter()
            .find(|r| r.wine_id == wine_id && r.user_id == user_id)
            .cloned())
    }

    async fn reviews_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<UserReview>, CatalogueQueryError> {
        let inner = self.lock();
        let mut annotated: Vec<UserReview> = inner
            .reviews
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| {
                let wine = inner.wines.iter().find(|w| w.id == r.wine_id)?;
                let domaine = inner.domaines.iter().find(|d| d.id == wine.domaine_id)?;
                Some(UserReview {
                    id: r.id,
                    rating: r.rating,
                    comment: r.comment.clone(),
                    created_at: r.created_at,
                    wine_id: wine.id,
                    wine_name: wine.name.clone(),
                    year: wine.year,
                    domaine_id: domaine.id,
                    domaine_name: domaine.name.clone(),
                })
            })
            .collect();
        annotated
            .sort_by(|a, b| newest_first((a.created_at, a.id.get()), (b.created_at, b.id.get())));
        Ok(annotated)
    }
}

#[async_trait]
impl CatalogueCommand for MemoryStore {
    async fn create_domaine(&self, draft: &DomaineDraft) -> Result<(), CatalogueCommandError> {
        let mut inner = self.lock();
        let id = DomaineId::new(inner.next(Serial::Domaine));
        inner.domaines.push(Domaine {
            id,
            name: draft.name.clone(),
            region: draft.region.clone(),
            country: draft.country.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn get_domaine(
        &self,
        id: DomaineId,
    ) -> Result<Option<Domaine>, CatalogueCommandError> {
        Ok(self.lock().domaines.iter().find(|d| d.id == id).cloned())
    }

    async fn update_domaine(
        &self,
        id: DomaineId,
        draft: &DomaineDraft,
    ) -> Result<(), CatalogueCommandError> {
        let mut inner = self.lock();
        if let Some(domaine) = inner.domaines.iter_mut().find(|d| d.id == id) {
            domaine.name = draft.name.clone();
            domaine.region = draft.region.clone();
            domaine.country = draft.country.clone();
        }
        Ok(())
    }

    async fn delete_domaine(&self, id: DomaineId) -> Result<(), CatalogueCommandError> {
        let mut inner = self.lock();
        let orphaned: Vec<WineId> = inner
            .wines
            .iter()
            .filter(|w| w.domaine_id == id)
            .map(|w| w.id)
            .collect();
        inner.domaines.retain(|d| d.id != id);
        inner.wines.retain(|w| w.domaine_id != id);
        inner.reviews.retain(|r| !orphaned.contains(&r.wine_id));
        Ok(())
    }

    async fn create_wine(&self, draft: &WineDraft) -> Result<(), CatalogueCommandError> {
        let mut inner = self.lock();
        let id = WineId::new(inner.next(Serial::Wine));
        inner.wines.push(Wine {
            id,
            domaine_id: draft.domaine_id,
            name: draft.name.clone(),
            year: draft.year,
            grape: draft.grape.clone(),
            description_md: draft.description_md.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn get_wine(&self, id: WineId) -> Result<Option<Wine>, CatalogueCommandError> {
        Ok(self.lock().wines.iter().find(|w| w.id == id).cloned())
    }

    async fn update_wine(
        &self,
        id: WineId,
        draft: &WineDraft,
    ) -> Result<(), CatalogueCommandError> {
        let mut inner = self.lock();
        if let Some(wine) = inner.wines.iter_mut().find(|w| w.id == id) {
            wine.domaine_id = draft.domaine_id;
            wine.name = draft.name.clone();
            wine.year = draft.year;
            wine.grape = draft.grape.clone();
            wine.description_md = draft.description_md.clone();
        }
        Ok(())
    }

    async fn delete_wine(&self, id: WineId) -> Result<(), CatalogueCommandError> {
        let mut inner = self.lock();
        inner.wines.retain(|w| w.id != id);
        inner.reviews.retain(|r| r.wine_id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rating;
    use rstest::rstest;

    fn draft(name: &str) -> DomaineDraft {
        DomaineDraft::new(name, Some("Bourgogne"), Some("France")).expect("valid draft")
    }

    async fn seeded_store() -> (MemoryStore, DomaineId, WineId) {
        let store = MemoryStore::new();
        store.create_domaine(&draft("Domaine Leflaive")).await.expect("domaine");
        let domaine_id = store.list_domaines_by_name().await.expect("list")[0].id;
        let wine =
            WineDraft::new(domaine_id, "Montrachet", Some(2019), Some("Chardonnay"), None)
                .expect("valid wine");
        store.create_wine(&wine).await.expect("wine");
        let wine_id = store.list_wines(&WineFilter::default()).await.expect("list")[0].id;
        (store, domaine_id, wine_id)
    }

    async fn add_review(store: &MemoryStore, wine_id: WineId, user_id: i32, rating: i32) {
        store
            .upsert(&ReviewUpsert {
                wine_id,
                user_id: UserId::new(user_id),
                rating: Rating::new(rating).expect("valid"),
                comment: None,
            })
            .await
            .expect("upsert");
    }

    #[tokio::test]
    async fn deleting_a_domaine_cascades_to_wines_and_reviews() {
        let (store, domaine_id, wine_id) = seeded_store().await;
        add_review(&store, wine_id, 1, 4).await;

        store.delete_domaine(domaine_id).await.expect("delete");

        assert!(store.wine_detail(wine_id).await.expect("query").is_none());
        assert!(store.list_wines(&WineFilter::default()).await.expect("query").is_empty());
        assert!(store.reviews_for_wine(wine_id).await.expect("query").is_empty());
        assert_eq!(store.wine_stats(wine_id).await.expect("query").count, 0);
    }

    #[tokio::test]
    async fn deleting_a_wine_cascades_to_its_reviews() {
        let (store, _, wine_id) = seeded_store().await;
        add_review(&store, wine_id, 1, 4).await;

        store.delete_wine(wine_id).await.expect("delete");

        assert!(store.reviews_for_wine(wine_id).await.expect("query").is_empty());
    }

    #[rstest]
    #[case("leflaive")]
    #[case("LEFLAIVE")]
    #[case("chardonnay")]
    #[case("montrachet")]
    #[tokio::test]
    async fn search_matches_domaine_name_wine_name_and_grape(#[case] needle: &str) {
        let (store, _, _) = seeded_store().await;
        let filter = WineFilter::new(Some(needle), None);
        let wines = store.list_wines(&filter).await.expect("list");
        assert_eq!(wines.len(), 1, "needle {needle:?} should match");
    }

    #[tokio::test]
    async fn search_misses_return_empty() {
        let (store, _, _) = seeded_store().await;
        let filter = WineFilter::new(Some("riesling"), None);
        assert!(store.list_wines(&filter).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn aggregates_round_to_two_decimals() {
        let (store, _, wine_id) = seeded_store().await;
        add_review(&store, wine_id, 1, 5).await;
        add_review(&store, wine_id, 2, 4).await;
        add_review(&store, wine_id, 3, 4).await;

        let stats = store.wine_stats(wine_id).await.expect("stats");
        assert_eq!(stats.count, 3);
        // 13 / 3 = 4.333... rounds to 4.33.
        assert_eq!(stats.avg, Some(4.33));

        let listing = store.list_wines(&WineFilter::default()).await.expect("list");
        assert_eq!(listing[0].avg_rating, Some(4.33));
    }

    #[tokio::test]
    async fn stats_for_unreviewed_wine_are_empty() {
        let (store, _, wine_id) = seeded_store().await;
        let stats = store.wine_stats(wine_id).await.expect("stats");
        assert_eq!(stats.count, 0);
        assert_eq!(stats.avg, None);
    }
}
