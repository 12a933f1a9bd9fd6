//! Catalog records and SKU facet derivation.
//!
//! The backend stores a product's variants as SKUs whose codes encode the
//! variant axes (`TITLE-SIZE-COLOR`). The storefront never receives the
//! axes separately, so [`SkuFacets`] rebuilds them from the codes.

pub mod facets;
pub mod records;
pub mod sku;

pub use facets::{SkuFacets, VariantMatch, VariantSelection};
pub use records::{
    Category, NewProduct, OptionGroup, OptionValue, ProductDetail, ProductSummary,
};
pub use sku::{Sku, SkuCode, SkuCodeError, SkuImage};
