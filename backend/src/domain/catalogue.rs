//! Catalogue entities: domaines (wine producers) and wines.
//!
//! A *domaine* here is a wine estate, unrelated to DNS. Drafts carry the
//! validated form input for admin CRUD; read models carry the aggregates the
//! listing and detail pages need.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::{DomaineId, WineId};

/// Minimum allowed length for a domaine name.
pub const DOMAINE_NAME_MIN: usize = 2;

/// Validation errors for catalogue drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueValidationError {
    /// Domaine name was shorter than [`DOMAINE_NAME_MIN`] once trimmed.
    DomaineNameTooShort { min: usize },
    /// Wine name was blank once trimmed.
    EmptyWineName,
}

impl fmt::Display for CatalogueValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DomaineNameTooShort { min } => {
                write!(f, "domaine name must be at least {min} characters")
            }
            Self::EmptyWineName => write!(f, "wine name must not be empty"),
        }
    }
}

impl std::error::Error for CatalogueValidationError {}

fn normalize_optional(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// A wine producer as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Domaine {
    pub id: DomaineId,
    pub name: String,
    pub region: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating or updating a domaine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomaineDraft {
    pub name: String,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl DomaineDraft {
    /// Trim all fields; empty optionals become `None`.
    pub fn new(
        name: &str,
        region: Option<&str>,
        country: Option<&str>,
    ) -> Result<Self, CatalogueValidationError> {
        let name = name.trim();
        if name.chars().count() < DOMAINE_NAME_MIN {
            return Err(CatalogueValidationError::DomaineNameTooShort {
                min: DOMAINE_NAME_MIN,
            });
        }
        Ok(Self {
            name: name.to_owned(),
            region: normalize_optional(region),
            country: normalize_optional(country),
        })
    }
}

/// A wine as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Wine {
    pub id: WineId,
    pub domaine_id: DomaineId,
    pub name: String,
    pub year: Option<i32>,
    pub grape: Option<String>,
    pub description_md: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating or updating a wine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WineDraft {
    pub domaine_id: DomaineId,
    pub name: String,
    pub year: Option<i32>,
    pub grape: Option<String>,
    pub description_md: Option<String>,
}

impl WineDraft {
    /// Trim the name and optional fields; an unchecked Markdown description
    /// passes through as-is (it is converted to HTML at render time).
    pub fn new(
        domaine_id: DomaineId,
        name: &str,
        year: Option<i32>,
        grape: Option<&str>,
        description_md: Option<&str>,
    ) -> Result<Self, CatalogueValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogueValidationError::EmptyWineName);
        }
        Ok(Self {
            domaine_id,
            name: name.to_owned(),
            year,
            grape: normalize_optional(grape),
            description_md: description_md
                .filter(|s| !s.trim().is_empty())
                .map(str::to_owned),
        })
    }
}

/// Search filter for the wine listing.
///
/// `query` matches case-insensitively against wine name, domaine name, and
/// grape; `domaine_id` is an exact match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WineFilter {
    pub query: Option<String>,
    pub domaine_id: Option<DomaineId>,
}

impl WineFilter {
    /// Normalise raw query-string input: trim the term, blank becomes `None`.
    pub fn new(query: Option<&str>, domaine_id: Option<DomaineId>) -> Self {
        Self {
            query: query
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            domaine_id,
        }
    }
}

/// One row of the wine listing with derived review aggregates.
///
/// `avg_rating` is `None` when the wine has no reviews and otherwise rounded
/// to two decimal places by the query layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WineSummary {
    pub id: WineId,
    pub name: String,
    pub year: Option<i32>,
    pub grape: Option<String>,
    pub domaine_name: String,
    pub reviews_count: i64,
    pub avg_rating: Option<f64>,
}

/// A single wine joined with its domaine for the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WineDetail {
    pub id: WineId,
    pub domaine_id: DomaineId,
    pub name: String,
    pub year: Option<i32>,
    pub grape: Option<String>,
    pub description_md: Option<String>,
    pub domaine_name: String,
    pub region: Option<String>,
    pub country: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("x")]
    #[case("  a ")]
    fn short_domaine_names_are_rejected(#[case] name: &str) {
        let err = DomaineDraft::new(name, None, None).expect_err("must fail");
        assert_eq!(
            err,
            CatalogueValidationError::DomaineNameTooShort { min: 2 }
        );
    }

    #[rstest]
    fn domaine_draft_normalises_optionals() {
        let draft =
            DomaineDraft::new(" Domaine Leflaive ", Some("  "), Some(" France ")).expect("valid");
        assert_eq!(draft.name, "Domaine Leflaive");
        assert_eq!(draft.region, None);
        assert_eq!(draft.country.as_deref(), Some("France"));
    }

    #[rstest]
    fn blank_wine_names_are_rejected() {
        let err =
            WineDraft::new(DomaineId::new(1), "   ", None, None, None).expect_err("must fail");
        assert_eq!(err, CatalogueValidationError::EmptyWineName);
    }

    #[rstest]
    fn wine_filter_drops_blank_query() {
        let filter = WineFilter::new(Some("   "), None);
        assert_eq!(filter, WineFilter::default());

        let filter = WineFilter::new(Some("  pinot "), Some(DomaineId::new(2)));
        assert_eq!(filter.query.as_deref(), Some("pinot"));
        assert_eq!(filter.domaine_id, Some(DomaineId::new(2)));
    }
}
