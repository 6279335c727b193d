//! Field addressing and raw values for draft editing.

use crate::errors::FormError;

/// A dotted field path with at most one level of nesting: `name`,
/// `details.brand`, `seo.keywords`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    split: Option<usize>,
}

impl FieldPath {
    pub fn parse(path: &str) -> Result<Self, FormError> {
        let raw = path.trim();
        let segments: Vec<&str> = raw.split('.').collect();
        if raw.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return Err(FormError::MalformedPath(path.to_string()));
        }
        if segments.len() > 2 {
            return Err(FormError::PathTooDeep(path.to_string()));
        }
        Ok(Self {
            raw: raw.to_string(),
            split: raw.find('.'),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Top-level field name.
    pub fn head(&self) -> &str {
        match self.split {
            Some(i) => &self.raw[..i],
            None => &self.raw,
        }
    }

    /// Nested field name, when the path has one.
    pub fn tail(&self) -> Option<&str> {
        self.split.map(|i| &self.raw[i + 1..])
    }

    pub fn unknown(&self) -> FormError {
        FormError::UnknownField(self.raw.clone())
    }
}

/// A value written into a draft field.
///
/// Conversions are lenient towards `Text` so the same entry point serves
/// typed callers and raw `path=value` input.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Flag(bool),
    List(Vec<String>),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl FieldValue {
    fn mismatch(path: &FieldPath, expected: &'static str) -> FormError {
        FormError::TypeMismatch {
            path: path.as_str().to_string(),
            expected,
        }
    }

    pub fn into_text(self, path: &FieldPath) -> Result<String, FormError> {
        match self {
            FieldValue::Text(s) => Ok(s),
            FieldValue::Number(n) => Ok(n.to_string()),
            FieldValue::Flag(_) | FieldValue::List(_) => Err(Self::mismatch(path, "text")),
        }
    }

    pub fn into_number(self, path: &FieldPath) -> Result<f64, FormError> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Ok(n),
            FieldValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| Self::mismatch(path, "a number")),
            _ => Err(Self::mismatch(path, "a number")),
        }
    }

    /// Blank text clears the field.
    pub fn into_optional_number(self, path: &FieldPath) -> Result<Option<f64>, FormError> {
        match &self {
            FieldValue::Text(s) if s.trim().is_empty() => Ok(None),
            _ => self.into_number(path).map(Some),
        }
    }

    pub fn into_integer(self, path: &FieldPath) -> Result<i64, FormError> {
        let n = self.into_number(path)?;
        if n.fract() != 0.0 || n < i64::MIN as f64 || n > i64::MAX as f64 {
            return Err(Self::mismatch(path, "a whole number"));
        }
        Ok(n as i64)
    }

    pub fn into_optional_integer(self, path: &FieldPath) -> Result<Option<i64>, FormError> {
        match &self {
            FieldValue::Text(s) if s.trim().is_empty() => Ok(None),
            _ => self.into_integer(path).map(Some),
        }
    }

    pub fn into_flag(self, path: &FieldPath) -> Result<bool, FormError> {
        match self {
            FieldValue::Flag(b) => Ok(b),
            FieldValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Ok(true),
                "false" | "no" | "0" | "off" => Ok(false),
                _ => Err(Self::mismatch(path, "true or false")),
            },
            _ => Err(Self::mismatch(path, "true or false")),
        }
    }

    /// Lists accept comma-separated text.
    pub fn into_list(self, path: &FieldPath) -> Result<Vec<String>, FormError> {
        match self {
            FieldValue::List(items) => Ok(items),
            FieldValue::Text(s) => Ok(parse_keywords(&s)),
            _ => Err(Self::mismatch(path, "a list")),
        }
    }
}

/// Split comma-separated input, trimming each entry and dropping empties.
pub fn parse_keywords(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trimmed value, or `None` when nothing but whitespace is left.
pub fn trim_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Inverse of [`parse_keywords`] for loading a draft from a record.
pub fn join_keywords(items: Option<&[String]>) -> String {
    items.map(|k| k.join(", ")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_and_nested_paths() {
        let flat = FieldPath::parse("name").unwrap();
        assert_eq!(flat.head(), "name");
        assert_eq!(flat.tail(), None);

        let nested = FieldPath::parse(" details.brand ").unwrap();
        assert_eq!(nested.head(), "details");
        assert_eq!(nested.tail(), Some("brand"));
        assert_eq!(nested.as_str(), "details.brand");
    }

    #[test]
    fn test_parse_rejects_deep_and_malformed_paths() {
        assert_eq!(
            FieldPath::parse("fragrance.notes.top"),
            Err(FormError::PathTooDeep("fragrance.notes.top".into()))
        );
        assert!(matches!(FieldPath::parse(""), Err(FormError::MalformedPath(_))));
        assert!(matches!(FieldPath::parse("seo."), Err(FormError::MalformedPath(_))));
        assert!(matches!(FieldPath::parse(".name"), Err(FormError::MalformedPath(_))));
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_keywords("a, b ,, c"), vec!["a", "b", "c"]);
        assert!(parse_keywords("  ,  ").is_empty());
    }

    #[test]
    fn test_trim_optional() {
        assert_eq!(trim_optional("  Dior "), Some("Dior".to_string()));
        assert_eq!(trim_optional("   "), None);
    }

    #[test]
    fn test_number_conversions() {
        let path = FieldPath::parse("price").unwrap();
        assert_eq!(FieldValue::from("12.5").into_number(&path).unwrap(), 12.5);
        assert_eq!(FieldValue::Number(3.0).into_integer(&path).unwrap(), 3);
        assert!(matches!(
            FieldValue::from("abc").into_number(&path),
            Err(FormError::TypeMismatch { .. })
        ));
        assert!(FieldValue::from("1.5").into_integer(&path).is_err());
        assert_eq!(FieldValue::from(" ").into_optional_number(&path).unwrap(), None);
        assert!(FieldValue::Flag(true).into_number(&path).is_err());
    }

    #[test]
    fn test_flag_and_list_conversions() {
        let path = FieldPath::parse("isFeatured").unwrap();
        assert!(FieldValue::from("TRUE").into_flag(&path).unwrap());
        assert!(!FieldValue::from("no").into_flag(&path).unwrap());
        assert!(FieldValue::from("maybe").into_flag(&path).is_err());
        assert_eq!(
            FieldValue::from("x,y").into_list(&path).unwrap(),
            vec!["x", "y"]
        );
        assert!(FieldValue::Flag(true).into_text(&path).is_err());
    }
}
