//! SKU records and composite SKU codes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Price, SkuId, SkuImageId};

/// Separator between the parts of a SKU code.
pub const SKU_CODE_SEPARATOR: char = '-';

/// Errors that can occur when parsing a [`SkuCode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkuCodeError {
    /// The code has fewer than the three `TITLE-SIZE-COLOR` parts.
    #[error("sku code {code:?} has {found} part(s), expected TITLE-SIZE-COLOR")]
    TooFewParts {
        /// The offending code.
        code: String,
        /// Number of parts found.
        found: usize,
    },
}

/// A parsed `TITLE-SIZE-COLOR` SKU code, borrowing from the raw code.
///
/// Parts beyond the third are ignored.
///
/// ```
/// use shopfront_core::catalog::SkuCode;
///
/// let code = SkuCode::parse("SHIRT-M-RED").unwrap();
/// assert_eq!((code.title, code.size, code.color), ("SHIRT", "M", "RED"));
/// assert!(SkuCode::parse("SHIRT-M").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkuCode<'a> {
    /// Product title (uniform across one product's SKUs).
    pub title: &'a str,
    /// Size facet value.
    pub size: &'a str,
    /// Color facet value.
    pub color: &'a str,
}

impl<'a> SkuCode<'a> {
    /// Split a raw code into its parts.
    ///
    /// # Errors
    ///
    /// Returns [`SkuCodeError::TooFewParts`] if the code has fewer than
    /// three parts.
    pub fn parse(raw: &'a str) -> Result<Self, SkuCodeError> {
        let mut parts = raw.split(SKU_CODE_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(title), Some(size), Some(color)) => Ok(Self { title, size, color }),
            _ => Err(SkuCodeError::TooFewParts {
                code: raw.to_owned(),
                found: raw.split(SKU_CODE_SEPARATOR).count(),
            }),
        }
    }
}

/// Image attached to a SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuImage {
    /// Image ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SkuImageId>,
    /// Public URL of the image.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sku {
    /// SKU ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SkuId>,
    /// Composite `TITLE-SIZE-COLOR` code.
    pub sku_code: String,
    /// Unit price.
    pub price: Price,
    /// Variant description.
    #[serde(default)]
    pub description: Option<String>,
    /// Variant images, in display order.
    #[serde(default)]
    pub images: Vec<SkuImage>,
}

impl Sku {
    /// Parse this SKU's code.
    ///
    /// # Errors
    ///
    /// Returns [`SkuCodeError`] if the code is malformed.
    pub fn code(&self) -> Result<SkuCode<'_>, SkuCodeError> {
        SkuCode::parse(&self.sku_code)
    }
}
