//! Catalog endpoints: categories, option groups and products.

use serde::Deserialize;
use shopfront_core::catalog::{
    Category, NewProduct, OptionGroup, OptionValue, ProductDetail, ProductSummary, Sku, SkuFacets,
    VariantSelection,
};
use shopfront_core::{OptionGroupId, ProductId};
use tracing::instrument;

use crate::error::Result;
use crate::http::{ApiClient, MultipartForm, Payload};

/// Body of `POST /product`.
#[derive(Debug, Clone)]
pub enum ProductUpload {
    /// Product fields only.
    Json(NewProduct),
    /// Product fields plus image files.
    Multipart(MultipartForm),
}

impl From<NewProduct> for ProductUpload {
    fn from(product: NewProduct) -> Self {
        Self::Json(product)
    }
}

impl From<MultipartForm> for ProductUpload {
    fn from(form: MultipartForm) -> Self {
        Self::Multipart(form)
    }
}

impl ProductUpload {
    fn into_payload(self) -> Result<Payload> {
        match self {
            Self::Json(product) => Payload::json(&product),
            Self::Multipart(form) => Ok(Payload::Multipart(form)),
        }
    }
}

/// What a product page shows: the product, its facets and the initial
/// variant selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductView {
    /// The product with every SKU.
    pub detail: ProductDetail,
    /// Title, sizes and colors derived from the SKU codes.
    pub facets: SkuFacets,
    /// Selection starting on the first SKU.
    pub selection: VariantSelection,
}

impl ProductView {
    /// Build the view of `detail`.
    #[must_use]
    pub fn new(detail: ProductDetail) -> Self {
        let facets = detail.facets();
        let selection = VariantSelection::initial(&detail.skus);
        Self {
            detail,
            facets,
            selection,
        }
    }
}

/// Some backends answer `GET /product/{id}` with the bare SKU list.
#[derive(Deserialize)]
#[serde(untagged)]
enum DetailResponse {
    Detail(ProductDetail),
    Skus(Vec<Sku>),
}

impl From<DetailResponse> for ProductDetail {
    fn from(response: DetailResponse) -> Self {
        match response {
            DetailResponse::Detail(detail) => detail,
            DetailResponse::Skus(skus) => Self {
                id: None,
                title: None,
                skus,
            },
        }
    }
}

/// Product API service.
#[derive(Debug, Clone)]
pub struct ProductService {
    client: ApiClient,
}

impl ProductService {
    /// Service over `client` (the user-facing or admin API).
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /category`.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    #[instrument(skip(self))]
    pub async fn get_all_categories(&self) -> Result<Vec<Category>> {
        self.client
            .get_json("category")
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error fetching categories"))
    }

    /// `GET /options/type`.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    #[instrument(skip(self))]
    pub async fn get_all_available_option_groups(&self) -> Result<Vec<OptionGroup>> {
        self.client
            .get_json("options/type")
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error fetching option groups"))
    }

    /// `GET /options/type/{id}`.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    #[instrument(skip(self), fields(option_group_id = %id))]
    pub async fn get_option_values_by_group_id(&self, id: OptionGroupId) -> Result<Vec<OptionValue>> {
        self.client
            .get_json(&format!("options/type/{id}"))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error fetching option values"))
    }

    /// `POST /product`, as JSON or multipart depending on the upload.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    #[instrument(skip_all)]
    pub async fn create_product(&self, product: impl Into<ProductUpload>) -> Result<ProductSummary> {
        let payload = product.into().into_payload()?;
        self.client
            .post_json("product", payload)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error creating product"))
    }

    /// `GET /product`.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<ProductSummary>> {
        self.client
            .get_json("product")
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error fetching products"))
    }

    /// `GET /product/{id}`.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product_by_id(&self, id: ProductId) -> Result<ProductDetail> {
        let response: DetailResponse = self
            .client
            .get_json(&format!("product/{id}"))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error fetching product"))?;
        Ok(response.into())
    }

    /// Product page data for `id`.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    pub async fn get_product_view(&self, id: ProductId) -> Result<ProductView> {
        self.get_product_by_id(id).await.map(ProductView::new)
    }
}
