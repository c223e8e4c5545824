//! In-memory record collections with json-server list semantics.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shopfront_core::{Product, User};

/// Page size json-server uses when `_page` comes without `_limit`.
pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// Every id up to `i64::MAX` is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no free record id left")]
pub struct IdsExhausted;

/// A record with a numeric id.
pub trait Record: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> i64;
}

impl Record for Product {
    fn id(&self) -> i64 {
        self.id.as_i64()
    }
}

impl Record for User {
    fn id(&self) -> i64 {
        self.id.as_i64()
    }
}

/// Query parameters of a list request.
///
/// Values stay strings: json-server ignores parameters it cannot parse
/// rather than rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(rename = "_page")]
    pub page: Option<String>,
    #[serde(rename = "_limit")]
    pub limit: Option<String>,
    pub q: Option<String>,
    pub price_gte: Option<String>,
    pub price_lte: Option<String>,
}

impl ListParams {
    fn number(raw: Option<&str>) -> Option<usize> {
        raw.and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
    }

    /// Items to skip and the maximum to return; `None` means everything.
    #[must_use]
    pub fn window(&self) -> (usize, Option<usize>) {
        let limit = Self::number(self.limit.as_deref());
        match Self::number(self.page.as_deref()) {
            Some(page) => {
                let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
                ((page - 1).saturating_mul(limit), Some(limit))
            }
            None => (0, limit),
        }
    }

    /// Slice `items` to the requested window.
    #[must_use]
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let (offset, limit) = self.window();
        let rest = items.into_iter().skip(offset);
        match limit {
            Some(limit) => rest.take(limit).collect(),
            None => rest.collect(),
        }
    }
}

/// An ordered set of records keyed by id.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T: Record> Collection<T> {
    #[must_use]
    pub const fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn all(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: i64) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// One past the largest id in use.
    ///
    /// # Errors
    ///
    /// Returns [`IdsExhausted`] once `i64::MAX` is in use.
    pub fn next_id(&self) -> Result<i64, IdsExhausted> {
        self.items
            .iter()
            .map(Record::id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or(IdsExhausted)
    }

    /// Append a record built from the next free id.
    ///
    /// # Errors
    ///
    /// Returns [`IdsExhausted`] when no id is left; nothing is inserted.
    pub fn insert_with(&mut self, make: impl FnOnce(i64) -> T) -> Result<T, IdsExhausted> {
        let item = make(self.next_id()?);
        self.items.push(item.clone());
        Ok(item)
    }

    /// Swap in `item` for the record with the same id.
    pub fn replace(&mut self, item: T) -> Option<T> {
        let slot = self.items.iter_mut().find(|i| i.id() == item.id())?;
        *slot = item.clone();
        Some(item)
    }

    /// Merge the fields of `changes` into the record. The id never changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged JSON no longer forms a valid record.
    pub fn patch(&mut self, id: i64, changes: &Value) -> Result<Option<T>, serde_json::Error> {
        let Some(slot) = self.items.iter_mut().find(|i| i.id() == id) else {
            return Ok(None);
        };

        let mut merged = serde_json::to_value(&*slot)?;
        if let (Value::Object(target), Value::Object(changes)) = (&mut merged, changes) {
            for (key, value) in changes {
                if key != "id" {
                    target.insert(key.clone(), value.clone());
                }
            }
        }

        let updated: T = serde_json::from_value(merged)?;
        *slot = updated.clone();
        Ok(Some(updated))
    }

    pub fn remove(&mut self, id: i64) -> Option<T> {
        let index = self.items.iter().position(|i| i.id() == id)?;
        Some(self.items.remove(index))
    }
}

/// Parse a path id; anything non-numeric matches no record.
#[must_use]
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use shopfront_core::{Price, ProductId};

    use super::*;

    fn product(id: i64, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Some(Price::from_units(100_000)),
            image: None,
            description: None,
        }
    }

    fn params(page: Option<&str>, limit: Option<&str>) -> ListParams {
        ListParams {
            page: page.map(String::from),
            limit: limit.map(String::from),
            ..ListParams::default()
        }
    }

    #[test]
    fn test_window() {
        assert_eq!(params(None, None).window(), (0, None));
        assert_eq!(params(None, Some("3")).window(), (0, Some(3)));
        assert_eq!(params(Some("2"), None).window(), (10, Some(10)));
        assert_eq!(params(Some("3"), Some("6")).window(), (12, Some(6)));
        assert_eq!(params(Some("abc"), Some("0")).window(), (0, None));
    }

    #[test]
    fn test_apply_past_the_end_is_empty() {
        let items: Vec<u32> = (1..=5).collect();
        assert_eq!(params(Some("2"), Some("2")).apply(items.clone()), vec![3, 4]);
        assert!(params(Some("4"), Some("2")).apply(items).is_empty());
    }

    #[test]
    fn test_insert_uses_next_id() {
        let mut products = Collection::new(vec![product(3, "A"), product(7, "B")]);
        let created = products.insert_with(|id| product(id, "C")).unwrap();
        assert_eq!(created.id, ProductId::new(8));
        assert_eq!(products.all().len(), 3);

        let mut empty: Collection<Product> = Collection::new(vec![]);
        assert_eq!(empty.insert_with(|id| product(id, "D")).unwrap().id, ProductId::new(1));
    }

    #[test]
    fn test_insert_fails_when_ids_run_out() {
        let mut products = Collection::new(vec![product(i64::MAX, "Last")]);
        assert_eq!(products.next_id(), Err(IdsExhausted));
        assert_eq!(products.insert_with(|id| product(id, "X")).unwrap_err(), IdsExhausted);
        assert_eq!(products.all().len(), 1);
    }

    #[test]
    fn test_patch_merges_and_keeps_id() {
        let mut products = Collection::new(vec![product(1, "Old")]);
        let patched = products
            .patch(1, &json!({"id": 99, "name": "New", "price": 5000}))
            .unwrap()
            .unwrap();
        assert_eq!(patched.id, ProductId::new(1));
        assert_eq!(patched.name, "New");
        assert_eq!(patched.price, Some(Price::from_units(5_000)));
        assert!(products.patch(2, &json!({})).unwrap().is_none());
    }

    #[test]
    fn test_replace_and_remove() {
        let mut products = Collection::new(vec![product(1, "A")]);
        assert!(products.replace(product(1, "B")).is_some());
        assert_eq!(products.get(1).unwrap().name, "B");
        assert!(products.replace(product(2, "C")).is_none());
        assert!(products.remove(1).is_some());
        assert!(products.remove(1).is_none());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("12"), Some(12));
        assert_eq!(parse_id("x"), None);
    }
}
