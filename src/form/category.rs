use serde::Serialize;
use serde_json::Value;

use super::fields::{FieldPath, FieldValue, join_keywords, parse_keywords, trim_optional};
use super::{Draft, ValidationErrors};
use crate::errors::FormError;
use crate::models::{Category, Seo};

/// Editable category. Flags and order stay unset until touched so an
/// untouched create sends only what the admin typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryDraft {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: String,
    pub icon: String,
    pub order: Option<i64>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub parent_id: String,
    /// Raw JSON text; must be an object when non-blank.
    pub attributes: String,
    pub seo_meta_title: String,
    pub seo_meta_description: String,
    pub seo_keywords: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo: Option<Seo>,
}

impl CategoryDraft {
    pub fn from_record(category: &Category) -> Self {
        let attributes = category
            .attributes
            .as_ref()
            .and_then(|a| serde_json::to_string(a).ok())
            .unwrap_or_default();
        let seo = category.seo.clone().unwrap_or_default();
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone().unwrap_or_default(),
            image: category.image.clone().unwrap_or_default(),
            icon: category.icon.clone().unwrap_or_default(),
            order: category.order,
            is_active: Some(category.is_active),
            is_featured: Some(category.is_featured),
            parent_id: category.parent_id.clone().unwrap_or_default(),
            attributes,
            seo_meta_title: seo.meta_title.unwrap_or_default(),
            seo_meta_description: seo.meta_description.unwrap_or_default(),
            seo_keywords: join_keywords(seo.keywords.as_deref()),
        }
    }

    fn parsed_attributes(&self) -> Result<Option<Value>, &'static str> {
        if self.attributes.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Value>(&self.attributes) {
            Ok(value @ Value::Object(_)) => Ok(Some(value)),
            Ok(_) => Err("Attributes must be a JSON object"),
            Err(_) => Err("Attributes must be valid JSON"),
        }
    }

    fn seo(&self) -> Option<Seo> {
        let keywords = parse_keywords(&self.seo_keywords);
        let seo = Seo {
            meta_title: trim_optional(&self.seo_meta_title),
            meta_description: trim_optional(&self.seo_meta_description),
            keywords: (!keywords.is_empty()).then_some(keywords),
        };
        (seo != Seo::default()).then_some(seo)
    }
}

impl Draft for CategoryDraft {
    type Payload = CategoryPayload;

    fn set_field(&mut self, path: &FieldPath, value: FieldValue) -> Result<(), FormError> {
        match (path.head(), path.tail()) {
            ("name", None) => self.name = value.into_text(path)?,
            ("slug", None) => self.slug = value.into_text(path)?,
            ("description", None) => self.description = value.into_text(path)?,
            ("image", None) => self.image = value.into_text(path)?,
            ("icon", None) => self.icon = value.into_text(path)?,
            ("order", None) => self.order = value.into_optional_integer(path)?,
            ("isActive", None) => self.is_active = Some(value.into_flag(path)?),
            ("isFeatured", None) => self.is_featured = Some(value.into_flag(path)?),
            ("parentId", None) => self.parent_id = value.into_text(path)?,
            ("attributes", None) => self.attributes = value.into_text(path)?,
            ("seo", Some("metaTitle")) => self.seo_meta_title = value.into_text(path)?,
            ("seo", Some("metaDescription")) => self.seo_meta_description = value.into_text(path)?,
            ("seo", Some("keywords")) => {
                self.seo_keywords = match value {
                    FieldValue::List(items) => items.join(", "),
                    other => other.into_text(path)?,
                }
            }
            _ => return Err(path.unknown()),
        }
        Ok(())
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.insert("name", "Name is required");
        }
        if self.slug.trim().is_empty() {
            errors.insert("slug", "Slug is required");
        }
        if let Err(message) = self.parsed_attributes() {
            errors.insert("attributes", message);
        }
        errors
    }

    fn to_payload(&self) -> CategoryPayload {
        CategoryPayload {
            name: self.name.trim().to_string(),
            slug: self.slug.trim().to_string(),
            description: trim_optional(&self.description),
            image: trim_optional(&self.image),
            icon: trim_optional(&self.icon),
            order: self.order,
            is_active: self.is_active,
            is_featured: self.is_featured,
            parent_id: trim_optional(&self.parent_id),
            attributes: self.parsed_attributes().ok().flatten(),
            seo: self.seo(),
        }
    }
}
