//! Catalog records exchanged with the product endpoints.

use serde::{Deserialize, Serialize};

use super::facets::SkuFacets;
use super::sku::Sku;
use crate::{CategoryId, OptionGroupId, OptionValueId, ProductId};

/// A product category (`GET /category`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
}

/// An option group such as "Size" or "Color" (`GET /options/type`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionGroup {
    /// Option group ID.
    pub id: OptionGroupId,
    /// Display name.
    pub name: String,
}

/// One value of an option group (`GET /options/type/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionValue {
    /// Option value ID.
    pub id: OptionValueId,
    /// The value, e.g. `M` or `RED`.
    pub value: String,
    /// Owning group, when the backend includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_group_id: Option<OptionGroupId>,
}

/// A row of the product listing (`GET /product`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    /// Product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
    /// Category, if assigned.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

/// A product with all of its SKUs (`GET /product/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    /// Product ID.
    #[serde(default)]
    pub id: Option<ProductId>,
    /// Title as stored by the backend, if it sends one.
    #[serde(default)]
    pub title: Option<String>,
    /// Every SKU of the product, well-formed or not.
    #[serde(default)]
    pub skus: Vec<Sku>,
}

impl ProductDetail {
    /// Derive size/color facets from the SKU codes.
    ///
    /// A title sent by the backend wins over the one encoded in the codes.
    #[must_use]
    pub fn facets(&self) -> SkuFacets {
        let mut facets = SkuFacets::derive(&self.skus);
        if let Some(title) = &self.title {
            facets.title = Some(title.clone());
        }
        facets
    }
}

/// Body of `POST /product` when no images are uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    /// Product name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Category to file the product under.
    pub category_id: CategoryId,
    /// Option groups the product varies on.
    #[serde(default)]
    pub option_group_ids: Vec<OptionGroupId>,
}
