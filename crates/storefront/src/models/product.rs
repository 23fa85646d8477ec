//! Pet-product catalog types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pawcase_core::{Money, PetProductId};

/// Where the pet artwork sits on a case template, in template pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Rendered size of the cover artwork.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverSize {
    pub width: f64,
    pub height: f64,
}

/// Layout metadata for placing artwork on a product's templates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLayout {
    pub cover_area: CoverArea,
    pub cover_size: CoverSize,
}

/// A catalog product that orders may reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetProduct {
    pub id: PetProductId,
    pub name: String,
    /// Free-form catalog category (e.g. "dog", "cat").
    pub category: String,
    /// Unique slug used by the storefront.
    pub key: String,
    pub price: Money,
    pub images: Vec<String>,
    /// Overlay images the artwork is composited onto.
    pub templates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<CoverLayout>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for creating or replacing a [`PetProduct`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewPetProduct {
    pub name: String,
    pub category: String,
    pub key: String,
    pub price: Money,
    pub images: Vec<String>,
    pub templates: Vec<String>,
    pub layout: Option<CoverLayout>,
}
