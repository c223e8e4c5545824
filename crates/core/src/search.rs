//! Search and filter rules shared by the API mock and the sample fallback.

use crate::types::{Price, Product, User};

/// Trim a search query; blank queries become `None`.
#[must_use]
pub fn normalize_query(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|q| !q.is_empty())
        .map(ToString::to_string)
}

/// Product search: text query plus an inclusive price range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub q: Option<String>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
}

impl ProductFilter {
    /// Filter on a text query only.
    #[must_use]
    pub fn query(q: Option<&str>) -> Self {
        Self {
            q: normalize_query(q),
            ..Self::default()
        }
    }

    /// Build from raw query-string values. Bounds that do not parse are ignored.
    #[must_use]
    pub fn from_raw(q: Option<&str>, min_price: Option<&str>, max_price: Option<&str>) -> Self {
        let bound = |raw: Option<&str>| raw.and_then(|s| Price::parse(s).ok());
        Self {
            q: normalize_query(q),
            min_price: bound(min_price),
            max_price: bound(max_price),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.q.is_none() && self.min_price.is_none() && self.max_price.is_none()
    }

    /// Whether `product` passes every active condition.
    ///
    /// A product without a price fails any price bound.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(q) = &self.q
            && !product.matches_lowercase(&q.to_lowercase())
        {
            return false;
        }
        if self.min_price.is_none() && self.max_price.is_none() {
            return true;
        }
        let Some(price) = product.price else {
            return false;
        };
        self.min_price.is_none_or(|min| price >= min) && self.max_price.is_none_or(|max| price <= max)
    }

    /// Query parameters understood by the REST API.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(q) = &self.q {
            pairs.push(("q", q.clone()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("price_gte", min.amount().to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("price_lte", max.amount().to_string()));
        }
        pairs
    }
}

/// Products passing `filter`, in their original order.
#[must_use]
pub fn filter_products(products: &[Product], filter: &ProductFilter) -> Vec<Product> {
    products
        .iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect()
}

/// Users whose name or email contains `q`, case-insensitively.
#[must_use]
pub fn filter_users(users: &[User], q: Option<&str>) -> Vec<User> {
    let Some(needle) = normalize_query(q).map(|q| q.to_lowercase()) else {
        return users.to_vec();
    };
    users
        .iter()
        .filter(|u| {
            u.name.to_lowercase().contains(&needle) || u.email.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{ProductId, UserId};

    fn product(id: i64, name: &str, price: Option<u64>) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: price.map(Price::from_units),
            image: None,
            description: None,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Áo thun", Some(150_000)),
            product(2, "Quần jean", Some(450_000)),
            product(3, "Mũ lưỡi trai", None),
            product(4, "Áo khoác", Some(600_000)),
        ]
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query(None), None);
        assert_eq!(normalize_query(Some("   ")), None);
        assert_eq!(normalize_query(Some(" áo ")), Some("áo".to_string()));
    }

    #[test]
    fn test_text_query_is_case_insensitive() {
        let found = filter_products(&catalog(), &ProductFilter::query(Some("ÁO")));
        let ids: Vec<i64> = found.iter().map(|p| p.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let filter = ProductFilter::from_raw(None, Some("150000"), Some("450000"));
        let ids: Vec<i64> = filter_products(&catalog(), &filter)
            .iter()
            .map(|p| p.id.as_i64())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_unpriced_product_fails_any_bound() {
        let filter = ProductFilter::from_raw(Some("mũ"), Some("0"), None);
        assert!(filter_products(&catalog(), &filter).is_empty());
        assert_eq!(filter_products(&catalog(), &ProductFilter::query(Some("mũ"))).len(), 1);
    }

    #[test]
    fn test_garbage_bounds_ignored() {
        let filter = ProductFilter::from_raw(Some(""), Some("abc"), Some("-5"));
        assert!(filter.is_empty());
        assert_eq!(filter_products(&catalog(), &filter).len(), 4);
    }

    #[test]
    fn test_query_pairs() {
        let filter = ProductFilter::from_raw(Some("áo"), Some("100"), None);
        assert_eq!(
            filter.to_query_pairs(),
            vec![("q", "áo".to_string()), ("price_gte", "100".to_string())]
        );
    }

    #[test]
    fn test_filter_users_by_name_or_email() {
        let users = vec![
            User {
                id: UserId::new(1),
                name: "Người dùng A".to_string(),
                email: "a@example.com".to_string(),
            },
            User {
                id: UserId::new(2),
                name: "Lan".to_string(),
                email: "lan@shop.vn".to_string(),
            },
        ];
        assert_eq!(filter_users(&users, Some("SHOP")).len(), 1);
        assert_eq!(filter_users(&users, Some("người")).len(), 1);
        assert_eq!(filter_users(&users, None).len(), 2);
    }
}
