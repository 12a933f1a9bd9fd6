//! Catalog commands.
//!
//! # Usage
//!
//! ```bash
//! shop-cli products list
//! shop-cli products show 5 --size M --color BLUE
//! shop-cli categories
//! shop-cli options --group 2
//! ```

use shopfront_client::ShopState;
use shopfront_core::catalog::VariantMatch;
use shopfront_core::{OptionGroupId, ProductId};

use super::CliError;

/// List every product.
pub async fn list_products(state: &ShopState) -> Result<(), CliError> {
    let products = state.products().get_products().await?;

    tracing::info!("{} products", products.len());
    for product in &products {
        tracing::info!("  {:>6}  {}", product.id, product.name);
    }
    Ok(())
}

/// Show a product, its facets and the variant for the chosen size and color.
pub async fn show_product(
    state: &ShopState,
    id: i64,
    size: Option<String>,
    color: Option<String>,
) -> Result<(), CliError> {
    let view = state.products().get_product_view(ProductId::new(id)).await?;

    tracing::info!(
        "{}",
        view.facets.title.as_deref().unwrap_or("(untitled product)")
    );
    tracing::info!("  Sizes:  {}", view.facets.sizes.join(", "));
    tracing::info!("  Colors: {}", view.facets.colors.join(", "));

    let mut selection = view.selection.clone();
    if let Some(size) = size {
        selection.choose_size(size);
    }
    if let Some(color) = color {
        selection.choose_color(color);
    }

    match selection.resolve(&view.detail.skus) {
        VariantMatch::Found { sku, .. } => {
            tracing::info!("  Selected {} at {}", sku.sku_code, sku.price);
            if let Some(description) = &sku.description {
                tracing::info!("    {description}");
            }
        }
        VariantMatch::NoMatch => tracing::info!(
            "  No matching variant for size {} / color {}",
            selection.size().unwrap_or("-"),
            selection.color().unwrap_or("-")
        ),
    }
    Ok(())
}

/// List every category.
pub async fn categories(state: &ShopState) -> Result<(), CliError> {
    for category in state.products().get_all_categories().await? {
        tracing::info!("  {:>6}  {}", category.id, category.name);
    }
    Ok(())
}

/// List option groups, or the values of `group`.
pub async fn options(state: &ShopState, group: Option<i64>) -> Result<(), CliError> {
    let products = state.products();
    match group {
        Some(group) => {
            for value in products
                .get_option_values_by_group_id(OptionGroupId::new(group))
                .await?
            {
                tracing::info!("  {:>6}  {}", value.id, value.value);
            }
        }
        None => {
            for group in products.get_all_available_option_groups().await? {
                tracing::info!("  {:>6}  {}", group.id, group.name);
            }
        }
    }
    Ok(())
}
