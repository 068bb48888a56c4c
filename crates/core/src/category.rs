//! The fixed category table.

use serde::{Deserialize, Serialize};

/// A product category.
///
/// The slug is what products store in `categorySlug` and what appears in
/// `/category/{slug}` URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Packs,
    Proteines,
    Creatines,
    MassGainers,
    PreWorkout,
    Vitamines,
    BruleurDeGraisse,
    Collagene,
    Boosters,
    BarsSnacks,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 10] = [
        Self::Packs,
        Self::Proteines,
        Self::Creatines,
        Self::MassGainers,
        Self::PreWorkout,
        Self::Vitamines,
        Self::BruleurDeGraisse,
        Self::Collagene,
        Self::Boosters,
        Self::BarsSnacks,
    ];

    /// The stored slug.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Packs => "packs",
            Self::Proteines => "proteines",
            Self::Creatines => "creatines",
            Self::MassGainers => "mass-gainers",
            Self::PreWorkout => "pre-workout",
            Self::Vitamines => "vitamines",
            Self::BruleurDeGraisse => "bruleur-de-graisse",
            Self::Collagene => "collagene",
            Self::Boosters => "boosters",
            Self::BarsSnacks => "bars-snacks",
        }
    }

    /// The display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Packs => "Packs",
            Self::Proteines => "Protéines",
            Self::Creatines => "Créatines",
            Self::MassGainers => "Mass Gainers",
            Self::PreWorkout => "Pre-Workout",
            Self::Vitamines => "Vitamines",
            Self::BruleurDeGraisse => "Brûleur de Graisse",
            Self::Collagene => "COLLAGENE",
            Self::Boosters => "Boosters",
            Self::BarsSnacks => "Bars & Snacks",
        }
    }

    /// Tile image for the home page.
    #[must_use]
    pub const fn image(self) -> &'static str {
        match self {
            Self::Packs => "/static/images/pack.webp",
            Self::Proteines => "/static/images/protien.jpg",
            Self::Creatines => "/static/images/creatine.jpg",
            Self::MassGainers => "/static/images/massgainer.jpg",
            Self::PreWorkout => "/static/images/preworkout.jpg",
            Self::Vitamines => "/static/images/vitamine.jpg",
            Self::BruleurDeGraisse => "/static/images/bru.webp",
            Self::Collagene => "/static/images/collagen.jpg",
            Self::Boosters => "/static/images/boosters.jpg",
            Self::BarsSnacks => "/static/images/snacks.jpg",
        }
    }

    /// Look up a category by slug, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        let slug = slug.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.slug().eq_ignore_ascii_case(slug))
    }

    /// Display label for a slug; unknown slugs display as themselves.
    #[must_use]
    pub fn label_for(slug: &str) -> String {
        Self::from_slug(slug).map_or_else(|| slug.to_string(), |c| c.label().to_string())
    }
}
