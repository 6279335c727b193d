use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Record, Seo};
use crate::list::criteria::{Filter, Sorter, compare_number, compare_text, contains_ci};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Available,
    OutOfStock,
    ComingSoon,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::OutOfStock => "out_of_stock",
            Self::ComingSoon => "coming_soon",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "out_of_stock" => Ok(Self::OutOfStock),
            "coming_soon" => Ok(Self::ComingSoon),
            _ => Err(format!("Invalid product status: {}", s)),
        }
    }
}

/// Category as embedded in a product: either a bare id or a populated object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(String),
    Embedded(CategorySummary),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl CategoryRef {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id.as_str()).filter(|id| !id.is_empty()),
            Self::Embedded(summary) => summary.id.as_deref(),
        }
    }

    /// Display name when the category was populated by the server.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Embedded(summary) => Some(summary.name.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub made_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragranceNotes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragrance {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<FragranceNotes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concentration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sillage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longevity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_trending: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ProductDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<Seo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragrance: Option<Fragrance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Product {
    /// Category ids, dropping embedded objects that came back without one.
    pub fn category_ids(&self) -> Vec<String> {
        self.categories
            .iter()
            .filter_map(|c| c.id().map(str::to_string))
            .collect()
    }

    /// Name of the first populated category, used as the "main" category.
    pub fn main_category(&self) -> Option<&str> {
        self.categories.iter().find_map(CategoryRef::name)
    }
}

impl Record for Product {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        !matches!(self.status, Some(ProductStatus::OutOfStock))
    }

    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }
}

/// Name search plus an exact category-name match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub search: String,
    pub category: Option<String>,
}

impl Filter<Product> for ProductFilter {
    fn matches(&self, item: &Product) -> bool {
        if !contains_ci(&item.name, &self.search) {
            return false;
        }
        match self.category.as_deref() {
            None | Some("") => true,
            Some(wanted) => item.categories.iter().any(|c| c.name() == Some(wanted)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    #[default]
    Name,
    PriceAsc,
    PriceDesc,
    Stock,
}

impl FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            "stock" => Ok(Self::Stock),
            _ => Err(format!("Invalid product sort: {}", s)),
        }
    }
}

impl Sorter<Product> for ProductSort {
    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Name => compare_text(&a.name, &b.name),
            Self::PriceAsc => compare_number(a.price, b.price),
            Self::PriceDesc => compare_number(b.price, a.price),
            Self::Stock => a.stock.cmp(&b.stock),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedded(name: &str) -> CategoryRef {
        CategoryRef::Embedded(CategorySummary {
            id: Some(format!("cat-{}", name.to_lowercase())),
            name: name.to_string(),
            slug: None,
        })
    }

    #[test]
    fn test_product_deserialize_with_embedded_categories() {
        let json = r#"{
            "id": "p1",
            "name": "Sauvage",
            "description": "Eau de toilette",
            "price": 89.9,
            "stock": 12,
            "images": ["/uploads/sauvage.png"],
            "categories": ["c1", {"id": "c2", "name": "Homme", "slug": "homme"}],
            "status": "available",
            "details": {"brand": "Dior", "releaseYear": 2015},
            "seo": {"keywords": ["dior", "sauvage"]}
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id(), Some("p1"));
        assert_eq!(product.category_ids(), vec!["c1", "c2"]);
        assert_eq!(product.main_category(), Some("Homme"));
        assert_eq!(product.details.unwrap().release_year, Some(2015));
        assert_eq!(product.status, Some(ProductStatus::Available));
    }

    #[test]
    fn test_product_minimal_payload_defaults() {
        let product: Product = serde_json::from_str(r#"{"name": "Bare"}"#).unwrap();
        assert_eq!(product.id(), None);
        assert_eq!(product.price, 0.0);
        assert!(product.categories.is_empty());
        assert!(product.is_active());
    }

    #[test]
    fn test_out_of_stock_is_inactive() {
        let product = Product {
            status: Some(ProductStatus::OutOfStock),
            ..Default::default()
        };
        assert!(!product.is_active());
    }

    #[test]
    fn test_product_status_round_trip_str() {
        for status in [
            ProductStatus::Available,
            ProductStatus::OutOfStock,
            ProductStatus::ComingSoon,
        ] {
            assert_eq!(status.as_str().parse::<ProductStatus>().unwrap(), status);
        }
        assert!("sold".parse::<ProductStatus>().is_err());
    }

    #[test]
    fn test_filter_by_name_and_category() {
        let product = Product {
            name: "Bleu de Chanel".to_string(),
            categories: vec![embedded("Homme")],
            ..Default::default()
        };
        let by_name = ProductFilter {
            search: "bleu".into(),
            category: None,
        };
        let by_category = ProductFilter {
            search: String::new(),
            category: Some("Homme".into()),
        };
        let wrong_category = ProductFilter {
            search: String::new(),
            category: Some("Femme".into()),
        };
        assert!(by_name.matches(&product));
        assert!(by_category.matches(&product));
        assert!(!wrong_category.matches(&product));
    }

    #[test]
    fn test_category_filter_ignores_bare_ids() {
        let product = Product {
            name: "Oud".to_string(),
            categories: vec![CategoryRef::Id("cat-homme".into())],
            ..Default::default()
        };
        let filter = ProductFilter {
            search: String::new(),
            category: Some("Homme".into()),
        };
        assert!(!filter.matches(&product));
    }

    #[test]
    fn test_sorts() {
        let cheap = Product {
            name: "b".into(),
            price: 10.0,
            stock: 5,
            ..Default::default()
        };
        let pricey = Product {
            name: "A".into(),
            price: 99.0,
            stock: 1,
            ..Default::default()
        };
        assert_eq!(ProductSort::Name.compare(&cheap, &pricey), Ordering::Greater);
        assert_eq!(ProductSort::PriceAsc.compare(&cheap, &pricey), Ordering::Less);
        assert_eq!(ProductSort::PriceDesc.compare(&cheap, &pricey), Ordering::Greater);
        assert_eq!(ProductSort::Stock.compare(&cheap, &pricey), Ordering::Greater);
    }

    #[test]
    fn test_product_sort_from_str() {
        assert_eq!("price-desc".parse::<ProductSort>().unwrap(), ProductSort::PriceDesc);
        assert!("rating".parse::<ProductSort>().is_err());
    }
}
