use crate::error::{Result, StatisticsError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Exposes the code and label of a lookup-table entity.
///
/// Payment methods, expense natures and the like implement this so the
/// catalog can be built without knowing the concrete entity type.
pub trait CatalogEntry {
    fn code(&self) -> &str;
    fn label(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Category {
    pub code: String,
    pub label: String,
}

impl Category {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }
}

impl CatalogEntry for Category {
    fn code(&self) -> &str {
        &self.code
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Which lookup table a catalog comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CategoryDimension {
    PaymentMethod,
    ExpenseNature,
    Sci,
    OperationType,
}

/// Ordered `(code, label)` pairs of one dimension, indexed by code.
#[derive(Debug, Clone, Default)]
pub struct CategoryCatalog {
    entries: Vec<Category>,
    by_code: HashMap<String, usize>,
}

impl CategoryCatalog {
    pub fn entries(&self) -> &[Category] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&Category> {
        self.by_code.get(code).and_then(|&idx| self.entries.get(idx))
    }

    pub fn label_of(&self, code: &str) -> Result<&str> {
        self.get(code)
            .map(|c| c.label.as_str())
            .ok_or_else(|| StatisticsError::UnknownCategory {
                code: code.to_string(),
            })
    }

    /// One zero-valued slot per label, used to seed a month bucket.
    pub fn zeroed<V: Clone>(&self, zero: V) -> BTreeMap<String, V> {
        self.entries
            .iter()
            .map(|c| (c.label.clone(), zero.clone()))
            .collect()
    }
}

/// Builds a catalog in the order the entries are given.
///
/// A repeated code keeps its first entry. Results are keyed by label, so two
/// codes sharing a label fail with [`StatisticsError::DuplicateLabel`].
pub fn load_categories<I, E>(entries: I) -> Result<CategoryCatalog>
where
    I: IntoIterator<Item = E>,
    E: CatalogEntry,
{
    let mut catalog = CategoryCatalog::default();
    let mut by_label: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        if catalog.by_code.contains_key(entry.code()) {
            continue;
        }
        if let Some(&idx) = by_label.get(entry.label()) {
            return Err(StatisticsError::DuplicateLabel {
                label: entry.label().to_string(),
                first: catalog.entries[idx].code.clone(),
                second: entry.code().to_string(),
            });
        }

        let idx = catalog.entries.len();
        catalog.by_code.insert(entry.code().to_string(), idx);
        by_label.insert(entry.label().to_string(), idx);
        catalog.entries.push(Category::new(entry.code(), entry.label()));
    }

    Ok(catalog)
}

/// Supplies the lookup table for a dimension, typically backed by a
/// repository `find_all`.
pub trait CategoryProvider {
    fn catalog(&self, dimension: CategoryDimension) -> Result<CategoryCatalog>;
}

/// Catalogs held in memory, one per dimension.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogs {
    catalogs: BTreeMap<CategoryDimension, Vec<Category>>,
}

impl StaticCatalogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, dimension: CategoryDimension, categories: Vec<Category>) -> Self {
        self.catalogs.insert(dimension, categories);
        self
    }
}

impl CategoryProvider for StaticCatalogs {
    fn catalog(&self, dimension: CategoryDimension) -> Result<CategoryCatalog> {
        let categories = self.catalogs.get(&dimension).ok_or_else(|| {
            StatisticsError::DataSource(format!("No catalog registered for {:?}", dimension))
        })?;
        load_categories(categories.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PaymentMethod {
        code: &'static str,
        libelle: &'static str,
    }

    impl CatalogEntry for PaymentMethod {
        fn code(&self) -> &str {
            self.code
        }

        fn label(&self) -> &str {
            self.libelle
        }
    }

    #[test]
    fn test_load_keeps_order_and_first_duplicate() {
        let catalog = load_categories(vec![
            PaymentMethod { code: "ESP", libelle: "Espèces" },
            PaymentMethod { code: "CHQ", libelle: "Chèque" },
            PaymentMethod { code: "ESP", libelle: "Cash (duplicate)" },
            PaymentMethod { code: "VIR", libelle: "Virement" },
        ])
        .unwrap();

        let codes: Vec<&str> = catalog.entries().iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["ESP", "CHQ", "VIR"]);
        assert_eq!(catalog.label_of("ESP").unwrap(), "Espèces");
    }

    #[test]
    fn test_unknown_code() {
        let catalog = load_categories(vec![Category::new("VIR", "Virement")]).unwrap();
        let err = catalog.label_of("CB").unwrap_err();
        assert!(matches!(err, StatisticsError::UnknownCategory { code } if code == "CB"));
    }

    #[test]
    fn test_shared_label_is_rejected() {
        let err = load_categories(vec![
            Category::new("ESP", "Cash"),
            Category::new("CSH", "Cash"),
            Category::new("VIR", "Virement"),
        ])
        .unwrap_err();

        assert!(matches!(
            err,
            StatisticsError::DuplicateLabel { label, first, second }
                if label == "Cash" && first == "ESP" && second == "CSH"
        ));
    }

    #[test]
    fn test_static_catalogs_missing_dimension() {
        let catalogs = StaticCatalogs::new().with(
            CategoryDimension::PaymentMethod,
            vec![Category::new("ESP", "Espèces")],
        );

        assert_eq!(catalogs.catalog(CategoryDimension::PaymentMethod).unwrap().len(), 1);
        assert!(matches!(
            catalogs.catalog(CategoryDimension::Sci),
            Err(StatisticsError::DataSource(_))
        ));
    }
}
