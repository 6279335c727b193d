use serde::Serialize;

use super::fields::{FieldPath, FieldValue, join_keywords, parse_keywords, trim_optional};
use super::{Draft, ValidationErrors};
use crate::errors::FormError;
use crate::models::Seo;
use crate::models::product::{
    Fragrance, FragranceNotes, Product, ProductDetails, ProductStatus,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailsDraft {
    pub brand: String,
    pub gender: String,
    pub size: String,
    pub made_in: String,
    pub release_year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeoDraft {
    pub meta_title: String,
    pub meta_description: String,
    /// Comma-separated keyword input.
    pub keywords: String,
}

/// Fragrance block; notes are flattened so every field is one level deep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FragranceDraft {
    pub kind: String,
    pub concentration: String,
    pub sillage: String,
    pub longevity: String,
    pub top: String,
    pub middle: String,
    pub base: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub discount_price: Option<f64>,
    pub images: Vec<String>,
    /// Category ids.
    pub categories: Vec<String>,
    pub is_new: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_trending: Option<bool>,
    pub status: Option<ProductStatus>,
    pub details: DetailsDraft,
    pub seo: SeoDraft,
    pub fragrance: FragranceDraft,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub images: Vec<String>,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_trending: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ProductDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo: Option<Seo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragrance: Option<Fragrance>,
}

/// Inventory-only edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockPatch {
    pub stock: i64,
}

impl StockPatch {
    pub fn new(stock: i64) -> Result<Self, FormError> {
        if stock < 0 {
            return Err(FormError::TypeMismatch {
                path: "stock".to_string(),
                expected: "a non-negative number",
            });
        }
        Ok(Self { stock })
    }
}

fn notes_text(notes: Option<&FragranceNotes>, pick: fn(&FragranceNotes) -> Option<&Vec<String>>) -> String {
    join_keywords(notes.and_then(pick).map(Vec::as_slice))
}

fn non_empty_list(items: Vec<String>) -> Option<Vec<String>> {
    (!items.is_empty()).then_some(items)
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .filter_map(|s| trim_optional(s))
        .collect()
}

impl ProductDraft {
    pub fn from_record(product: &Product) -> Self {
        let details = product.details.clone().unwrap_or_default();
        let seo = product.seo.clone().unwrap_or_default();
        let fragrance = product.fragrance.clone().unwrap_or_default();
        let notes = fragrance.notes.as_ref();
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            stock: product.stock,
            discount_price: product.discount_price,
            images: product.images.clone(),
            categories: product.category_ids(),
            is_new: product.is_new,
            is_featured: product.is_featured,
            is_trending: product.is_trending,
            status: product.status,
            details: DetailsDraft {
                brand: details.brand.unwrap_or_default(),
                gender: details.gender.unwrap_or_default(),
                size: details.size.unwrap_or_default(),
                made_in: details.made_in.unwrap_or_default(),
                release_year: details.release_year,
            },
            seo: SeoDraft {
                meta_title: seo.meta_title.unwrap_or_default(),
                meta_description: seo.meta_description.unwrap_or_default(),
                keywords: join_keywords(seo.keywords.as_deref()),
            },
            fragrance: FragranceDraft {
                kind: fragrance.kind.clone().unwrap_or_default(),
                concentration: fragrance.concentration.clone().unwrap_or_default(),
                sillage: fragrance.sillage.clone().unwrap_or_default(),
                longevity: fragrance.longevity.clone().unwrap_or_default(),
                top: notes_text(notes, |n| n.top.as_ref()),
                middle: notes_text(notes, |n| n.middle.as_ref()),
                base: notes_text(notes, |n| n.base.as_ref()),
            },
        }
    }

    fn details_payload(&self) -> Option<ProductDetails> {
        let d = &self.details;
        let details = ProductDetails {
            brand: trim_optional(&d.brand),
            gender: trim_optional(&d.gender),
            size: trim_optional(&d.size),
            made_in: trim_optional(&d.made_in),
            release_year: d.release_year,
        };
        (details != ProductDetails::default()).then_some(details)
    }

    fn seo_payload(&self) -> Option<Seo> {
        let seo = Seo {
            meta_title: trim_optional(&self.seo.meta_title),
            meta_description: trim_optional(&self.seo.meta_description),
            keywords: non_empty_list(parse_keywords(&self.seo.keywords)),
        };
        (seo != Seo::default()).then_some(seo)
    }

    fn fragrance_payload(&self) -> Option<Fragrance> {
        let f = &self.fragrance;
        let notes = FragranceNotes {
            top: non_empty_list(parse_keywords(&f.top)),
            middle: non_empty_list(parse_keywords(&f.middle)),
            base: non_empty_list(parse_keywords(&f.base)),
        };
        let fragrance = Fragrance {
            kind: trim_optional(&f.kind),
            notes: (notes != FragranceNotes::default()).then_some(notes),
            concentration: trim_optional(&f.concentration),
            sillage: trim_optional(&f.sillage),
            longevity: trim_optional(&f.longevity),
        };
        (fragrance != Fragrance::default()).then_some(fragrance)
    }
}

impl Draft for ProductDraft {
    type Payload = ProductPayload;

    fn set_field(&mut self, path: &FieldPath, value: FieldValue) -> Result<(), FormError> {
        match (path.head(), path.tail()) {
            ("name", None) => self.name = value.into_text(path)?,
            ("description", None) => self.description = value.into_text(path)?,
            ("price", None) => self.price = value.into_number(path)?,
            ("stock", None) => self.stock = value.into_integer(path)?,
            ("discountPrice", None) => self.discount_price = value.into_optional_number(path)?,
            ("images", None) => self.images = value.into_list(path)?,
            ("categories", None) => self.categories = value.into_list(path)?,
            ("isNew", None) => self.is_new = Some(value.into_flag(path)?),
            ("isFeatured", None) => self.is_featured = Some(value.into_flag(path)?),
            ("isTrending", None) => self.is_trending = Some(value.into_flag(path)?),
            ("status", None) => {
                let raw = value.into_text(path)?;
                self.status = match raw.trim() {
                    "" => None,
                    s => Some(s.parse().map_err(|_| FormError::TypeMismatch {
                        path: path.as_str().to_string(),
                        expected: "available, out_of_stock or coming_soon",
                    })?),
                };
            }
            ("details", Some(field)) => {
                let d = &mut self.details;
                match field {
                    "brand" => d.brand = value.into_text(path)?,
                    "gender" => d.gender = value.into_text(path)?,
                    "size" => d.size = value.into_text(path)?,
                    "madeIn" => d.made_in = value.into_text(path)?,
                    "releaseYear" => {
                        d.release_year = value
                            .into_optional_integer(path)?
                            .map(i32::try_from)
                            .transpose()
                            .map_err(|_| FormError::TypeMismatch {
                                path: path.as_str().to_string(),
                                expected: "a year",
                            })?
                    }
                    _ => return Err(path.unknown()),
                }
            }
            ("seo", Some(field)) => match field {
                "metaTitle" => self.seo.meta_title = value.into_text(path)?,
                "metaDescription" => self.seo.meta_description = value.into_text(path)?,
                "keywords" => self.seo.keywords = value.into_list(path)?.join(", "),
                _ => return Err(path.unknown()),
            },
            ("fragrance", Some(field)) => {
                let f = &mut self.fragrance;
                match field {
                    "type" => f.kind = value.into_text(path)?,
                    "concentration" => f.concentration = value.into_text(path)?,
                    "sillage" => f.sillage = value.into_text(path)?,
                    "longevity" => f.longevity = value.into_text(path)?,
                    "top" => f.top = value.into_list(path)?.join(", "),
                    "middle" => f.middle = value.into_list(path)?.join(", "),
                    "base" => f.base = value.into_list(path)?.join(", "),
                    _ => return Err(path.unknown()),
                }
            }
            _ => return Err(path.unknown()),
        }
        Ok(())
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.insert("name", "Product name is required");
        }
        if self.description.trim().is_empty() {
            errors.insert("description", "Description is required");
        }
        // NaN fails too
        if !(self.price.is_finite() && self.price > 0.0) {
            errors.insert("price", "Price must be greater than 0");
        }
        if self.stock < 0 {
            errors.insert("stock", "Stock cannot be negative");
        }
        if clean_list(&self.images).is_empty() {
            errors.insert("images", "At least one image is required");
        }
        if clean_list(&self.categories).is_empty() {
            errors.insert("categories", "Select at least one category");
        }
        errors
    }

    fn to_payload(&self) -> ProductPayload {
        ProductPayload {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price,
            stock: self.stock,
            images: clean_list(&self.images),
            categories: clean_list(&self.categories),
            discount_price: self.discount_price,
            is_new: self.is_new,
            is_featured: self.is_featured,
            is_trending: self.is_trending,
            status: self.status,
            details: self.details_payload(),
            seo: self.seo_payload(),
            fragrance: self.fragrance_payload(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormViewModel;
    use serde_json::{Value, json};

    fn valid_draft() -> ProductDraft {
        ProductDraft {
            name: "Sauvage".into(),
            description: "Eau de toilette".into(),
            price: 89.9,
            stock: 4,
            images: vec!["/uploads/sauvage.png".into()],
            categories: vec!["c1".into()],
            ..Default::default()
        }
    }

    fn merge(target: &mut Value, patch: &Value) {
        match (target, patch) {
            (Value::Object(target), Value::Object(patch)) => {
                for (key, value) in patch {
                    if value.is_null() {
                        target.remove(key);
                    } else {
                        merge(target.entry(key.clone()).or_insert(Value::Null), value);
                    }
                }
            }
            (target, patch) => *target = patch.clone(),
        }
    }

    #[test]
    fn test_price_boundary() {
        let mut draft = valid_draft();
        draft.price = 0.0;
        assert_eq!(draft.validate().get("price"), Some("Price must be greater than 0"));
        draft.price = 0.01;
        assert!(draft.validate().is_empty());
    }

    #[test]
    fn test_non_finite_price_is_invalid() {
        let mut draft = valid_draft();
        for price in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            draft.price = price;
            assert_eq!(draft.validate().get("price"), Some("Price must be greater than 0"));
        }
    }

    #[test]
    fn test_stock_boundary() {
        let mut draft = valid_draft();
        draft.stock = -1;
        assert_eq!(draft.validate().get("stock"), Some("Stock cannot be negative"));
        draft.stock = 0;
        assert!(draft.validate().is_empty());
    }

    #[test]
    fn test_empty_draft_errors_in_form_order() {
        let errors = ProductDraft::default().validate();
        let fields: Vec<&str> = errors.iter().map(|(f, _)| f).collect();
        assert_eq!(
            fields,
            vec!["name", "description", "price", "images", "categories"]
        );
        assert_eq!(errors.first_field(), Some("name"));
    }

    #[test]
    fn test_blank_images_do_not_count() {
        let mut draft = valid_draft();
        draft.images = vec!["  ".into()];
        assert!(draft.validate().get("images").is_some());
    }

    #[test]
    fn test_set_field_nested_paths() {
        let mut form = FormViewModel::create(ProductDraft::default());
        form.set_field("details.brand", "Dior").unwrap();
        form.set_field("details.releaseYear", "2015").unwrap();
        form.set_field("seo.keywords", "a, b ,, c").unwrap();
        form.set_field("fragrance.top", "bergamote, poivre").unwrap();
        form.set_field("status", "coming_soon").unwrap();

        let payload = form.draft().to_payload();
        let details = payload.details.unwrap();
        assert_eq!(details.brand.as_deref(), Some("Dior"));
        assert_eq!(details.release_year, Some(2015));
        assert_eq!(
            payload.seo.unwrap().keywords,
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert_eq!(
            payload.fragrance.unwrap().notes.unwrap().top,
            Some(vec!["bergamote".to_string(), "poivre".to_string()])
        );
        assert_eq!(payload.status, Some(ProductStatus::ComingSoon));
    }

    #[test]
    fn test_set_field_rejections() {
        let mut form = FormViewModel::create(ProductDraft::default());
        assert!(matches!(
            form.set_field("price", "cheap"),
            Err(FormError::TypeMismatch { .. })
        ));
        assert!(matches!(
            form.set_field("status", "sold"),
            Err(FormError::TypeMismatch { .. })
        ));
        assert_eq!(
            form.set_field("details.colour", "red"),
            Err(FormError::UnknownField("details.colour".into()))
        );
        assert!(matches!(
            form.set_field("fragrance.notes.top", "x"),
            Err(FormError::PathTooDeep(_))
        ));
        assert_eq!(form.draft(), &ProductDraft::default());
    }

    #[test]
    fn test_payload_omits_empty_optionals() {
        let mut draft = valid_draft();
        draft.name = "  Sauvage  ".into();
        draft.details.brand = "   ".into();
        let payload = serde_json::to_value(draft.to_payload()).unwrap();
        assert_eq!(
            payload,
            json!({
                "name": "Sauvage",
                "description": "Eau de toilette",
                "price": 89.9,
                "stock": 4,
                "images": ["/uploads/sauvage.png"],
                "categories": ["c1"]
            })
        );
    }

    #[test]
    fn test_edit_round_trip_loses_nothing() {
        let record: Product = serde_json::from_value(json!({
            "id": "p1",
            "name": "Bleu de Chanel",
            "description": "Eau de parfum boisée",
            "price": 120.5,
            "stock": 7,
            "images": ["/uploads/bleu-1.png", "/uploads/bleu-2.png"],
            "categories": ["c1", "c2"],
            "discountPrice": 99.0,
            "isNew": true,
            "isFeatured": false,
            "status": "available",
            "details": {"brand": "Chanel", "gender": "homme", "releaseYear": 2010},
            "seo": {"metaTitle": "Bleu", "keywords": ["chanel", "bleu"]},
            "fragrance": {
                "type": "boisé",
                "notes": {"top": ["citron", "menthe"], "base": ["encens"]},
                "longevity": "long"
            },
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        let mut form = FormViewModel::edit("p1", ProductDraft::from_record(&record));
        let payload = form.begin_submit().unwrap();

        let original = serde_json::to_value(&record).unwrap();
        let mut merged = original.clone();
        merge(&mut merged, &serde_json::to_value(&payload).unwrap());
        assert_eq!(merged, original);
    }

    #[test]
    fn test_stock_patch_rejects_negative() {
        assert!(StockPatch::new(-3).is_err());
        assert_eq!(
            serde_json::to_value(StockPatch::new(12).unwrap()).unwrap(),
            json!({"stock": 12})
        );
    }
}
