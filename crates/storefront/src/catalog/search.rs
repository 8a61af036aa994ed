//! Client-side product search.

use mobile_shop_core::Product;

/// Products whose brand or model contains `term` (case-insensitive).
///
/// A blank term returns every product in catalog order.
#[must_use]
pub fn filter_products<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    products.iter().filter(|p| p.matches_search(term)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn catalog() -> Vec<Product> {
        serde_json::from_value(json!([
            { "id": "1", "brand": "Acer", "model": "Iconia Talk S" },
            { "id": "2", "brand": "Alcatel", "model": "Idol 4" },
            { "id": "3", "brand": "Samsung", "model": "Galaxy Tab" }
        ]))
        .unwrap()
    }

    #[test]
    fn test_filter_by_brand_or_model() {
        let products = catalog();

        let ids = |term| {
            filter_products(&products, term)
                .iter()
                .map(|p| p.id.as_str().to_owned())
                .collect::<Vec<_>>()
        };

        assert_eq!(ids("acer"), vec!["1"]);
        assert_eq!(ids("IDOL"), vec!["2"]);
        assert_eq!(ids("a"), vec!["1", "2", "3"]);
        assert_eq!(ids(""), vec!["1", "2", "3"]);
        assert!(ids("nokia").is_empty());
    }
}
