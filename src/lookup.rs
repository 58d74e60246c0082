use std::hash::Hash;

use indexmap::IndexMap;

use crate::models::{Branch, BranchId, Product, ProductId};

/// Records indexed by their typed id, iterating in the order they were
/// loaded. Later records with a duplicate id replace the earlier value but
/// keep the original position.
#[derive(Debug, Clone)]
pub struct LookupMap<K, V> {
    entries: IndexMap<K, V>,
}

impl<K: Hash + Eq + Copy, V> LookupMap<K, V> {
    pub fn from_iter_keyed<I, F>(items: I, key: F) -> Self
    where
        I: IntoIterator<Item = V>,
        F: Fn(&V) -> K,
    {
        let mut entries = IndexMap::new();
        for item in items {
            entries.insert(key(&item), item);
        }
        Self { entries }
    }

    pub fn get(&self, id: &K) -> Option<&V> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }
}

/// Records that have a display name.
pub trait Named {
    fn display_name(&self) -> &str;
}

impl Named for Product {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Named for Branch {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl<K, V> LookupMap<K, V>
where
    K: Hash + Eq + Copy + std::fmt::Display,
    V: Named,
{
    /// Name of the referenced record, or `<fallback> #<id>` when the
    /// reference dangles.
    pub fn name_or(&self, id: K, fallback: &str) -> String {
        match self.get(&id) {
            Some(v) => v.display_name().to_string(),
            None => format!("{} #{}", fallback, id),
        }
    }
}

pub type ProductMap = LookupMap<ProductId, Product>;
pub type BranchMap = LookupMap<BranchId, Branch>;

pub fn products_by_id(products: Vec<Product>) -> ProductMap {
    LookupMap::from_iter_keyed(products, |p| p.id)
}

pub fn branches_by_id(branches: Vec<Branch>) -> BranchMap {
    LookupMap::from_iter_keyed(branches, |b| b.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BrandId;

    fn product(id: i64, name: &str) -> Product {
        Product {
            id: ProductId(id),
            name: name.to_string(),
            brand_id: BrandId(1),
            description: String::new(),
            active: true,
        }
    }

    #[test]
    fn lookup_resolves_by_typed_id() {
        let map = products_by_id(vec![product(1, "Arroz"), product(2, "Fideo")]);
        assert_eq!(map.get(&ProductId(2)).map(|p| p.name.as_str()), Some("Fideo"));
        assert!(map.get(&ProductId(3)).is_none());
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn dangling_reference_falls_back_to_id() {
        let map = products_by_id(vec![product(1, "Arroz")]);
        assert_eq!(map.name_or(ProductId(1), "Producto"), "Arroz");
        assert_eq!(map.name_or(ProductId(42), "Producto"), "Producto #42");
    }

    #[test]
    fn duplicate_ids_keep_first_position_last_value() {
        let map = products_by_id(vec![
            product(5, "Viejo"),
            product(6, "Otro"),
            product(5, "Nuevo"),
        ]);
        let names: Vec<&str> = map.values().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Nuevo", "Otro"]);
    }

    #[test]
    fn empty_map() {
        let map = branches_by_id(Vec::new());
        assert_eq!(map.len(), 0);
        assert!(map.get(&BranchId(1)).is_none());
    }
}
