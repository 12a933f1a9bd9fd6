//! Size/color facets derived from SKU codes.

use super::sku::{Sku, SkuCode};

/// Title and variant axes of one product, rebuilt from its SKU codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkuFacets {
    /// Product title, taken from the first well-formed code.
    pub title: Option<String>,
    /// Distinct sizes in first-seen order.
    pub sizes: Vec<String>,
    /// Distinct colors in first-seen order.
    pub colors: Vec<String>,
}

/// Result of looking up the SKU for a (size, color) pair.
///
/// `NoMatch` is a normal state ("this combination is unavailable") and
/// must be shown as such, never replaced by some other SKU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantMatch<'a> {
    /// The SKU carrying exactly the requested size and color.
    Found {
        /// Position in the product's SKU list.
        index: usize,
        /// The matching SKU.
        sku: &'a Sku,
    },
    /// No SKU has this combination.
    NoMatch,
}

impl<'a> VariantMatch<'a> {
    /// The matched SKU, if any.
    #[must_use]
    pub const fn sku(&self) -> Option<&'a Sku> {
        match self {
            Self::Found { sku, .. } => Some(sku),
            Self::NoMatch => None,
        }
    }
}

impl SkuFacets {
    /// Derive the facets of a product from all of its SKUs.
    ///
    /// SKUs whose code has fewer than three parts contribute nothing here
    /// but stay in the caller's SKU list.
    #[must_use]
    pub fn derive(skus: &[Sku]) -> Self {
        let mut facets = Self::default();

        for code in skus.iter().filter_map(|sku| sku.code().ok()) {
            if facets.title.is_none() {
                facets.title = Some(code.title.to_owned());
            }
            push_distinct(&mut facets.sizes, code.size);
            push_distinct(&mut facets.colors, code.color);
        }

        facets
    }

    /// Find the SKU with exactly this size and color.
    #[must_use]
    pub fn select<'a>(skus: &'a [Sku], size: &str, color: &str) -> VariantMatch<'a> {
        skus.iter()
            .enumerate()
            .find(|(_, sku)| {
                sku.code()
                    .is_ok_and(|code| code.size == size && code.color == color)
            })
            .map_or(VariantMatch::NoMatch, |(index, sku)| VariantMatch::Found {
                index,
                sku,
            })
    }
}

fn push_distinct(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_owned());
    }
}

/// The size and color a shopper currently has selected on a product page.
///
/// Starts on the first SKU's size and color; each facet then changes
/// independently, so a selection can land on a combination without a SKU.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantSelection {
    size: Option<String>,
    color: Option<String>,
}

impl VariantSelection {
    /// Initial selection for a product: the facets of its first SKU.
    #[must_use]
    pub fn initial(skus: &[Sku]) -> Self {
        skus.first()
            .and_then(|sku| sku.code().ok())
            .map_or_else(Self::default, |code: SkuCode<'_>| Self {
                size: Some(code.size.to_owned()),
                color: Some(code.color.to_owned()),
            })
    }

    /// Select a size, keeping the color.
    pub fn choose_size(&mut self, size: impl Into<String>) {
        self.size = Some(size.into());
    }

    /// Select a color, keeping the size.
    pub fn choose_color(&mut self, color: impl Into<String>) {
        self.color = Some(color.into());
    }

    /// Currently selected size.
    #[must_use]
    pub fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    /// Currently selected color.
    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// The SKU for the current selection.
    #[must_use]
    pub fn resolve<'a>(&self, skus: &'a [Sku]) -> VariantMatch<'a> {
        match (self.size.as_deref(), self.color.as_deref()) {
            (Some(size), Some(color)) => SkuFacets::select(skus, size, color),
            _ => VariantMatch::NoMatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::Price;

    fn sku(code: &str) -> Sku {
        Sku {
            id: None,
            sku_code: code.to_owned(),
            price: Price::new(Decimal::new(1000, 2)),
            description: None,
            images: Vec::new(),
        }
    }

    fn shirts() -> Vec<Sku> {
        vec![sku("SHIRT-S-RED"), sku("SHIRT-M-RED"), sku("SHIRT-S-BLUE")]
    }

    #[test]
    fn test_derive_title_sizes_colors() {
        let facets = SkuFacets::derive(&shirts());
        assert_eq!(facets.title.as_deref(), Some("SHIRT"));
        assert_eq!(facets.sizes, ["S", "M"]);
        assert_eq!(facets.colors, ["RED", "BLUE"]);
    }

    #[test]
    fn test_missing_combination_is_no_match() {
        let skus = shirts();
        assert_eq!(SkuFacets::select(&skus, "M", "BLUE"), VariantMatch::NoMatch);
        assert!(SkuFacets::select(&skus, "M", "BLUE").sku().is_none());
    }

    #[test]
    fn test_select_reports_index() {
        let skus = shirts();
        match SkuFacets::select(&skus, "S", "BLUE") {
            VariantMatch::Found { index, sku } => {
                assert_eq!(index, 2);
                assert_eq!(sku.sku_code, "SHIRT-S-BLUE");
            }
            VariantMatch::NoMatch => panic!("expected a match"),
        }
    }

    #[test]
    fn test_short_codes_are_skipped_for_facets_only() {
        let skus = vec![sku("GIFTCARD"), sku("MUG-L-WHITE")];
        let facets = SkuFacets::derive(&skus);
        assert_eq!(facets.title.as_deref(), Some("MUG"));
        assert_eq!(facets.sizes, ["L"]);
        assert_eq!(facets.colors, ["WHITE"]);
        assert_eq!(skus.len(), 2);
    }

    #[test]
    fn test_no_skus_no_facets() {
        assert_eq!(SkuFacets::derive(&[]), SkuFacets::default());
    }

    #[test]
    fn test_selection_starts_on_first_sku() {
        let skus = shirts();
        let selection = VariantSelection::initial(&skus);
        assert_eq!(selection.size(), Some("S"));
        assert_eq!(selection.color(), Some("RED"));
        assert_eq!(selection.resolve(&skus).sku(), skus.first());
    }

    #[test]
    fn test_selection_can_reach_unavailable_combination() {
        let skus = shirts();
        let mut selection = VariantSelection::initial(&skus);
        selection.choose_size("M");
        assert_eq!(
            selection.resolve(&skus).sku().map(|s| s.sku_code.as_str()),
            Some("SHIRT-M-RED")
        );
        selection.choose_color("BLUE");
        assert_eq!(selection.resolve(&skus), VariantMatch::NoMatch);
    }

    #[test]
    fn test_selection_for_malformed_first_sku_is_empty() {
        let skus = vec![sku("GIFTCARD")];
        let selection = VariantSelection::initial(&skus);
        assert_eq!(selection, VariantSelection::default());
        assert_eq!(selection.resolve(&skus), VariantMatch::NoMatch);
    }
}
