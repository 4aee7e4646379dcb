use indexmap::IndexMap;

use super::Shape;
use crate::error::{Result, ShapeError};

#[derive(Clone, Debug)]
pub struct Field {
    pub shape: Shape,
    pub optional: bool,
    pub readonly: bool,
}

impl Field {
    pub fn required(shape: Shape) -> Self {
        Self { shape, optional: false, readonly: false }
    }

    pub fn optional(shape: Shape) -> Self {
        Self { shape, optional: true, readonly: false }
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Same flags, different shape.
    pub fn with_shape(&self, shape: Shape) -> Self {
        Self { shape, optional: self.optional, readonly: self.readonly }
    }
}

/// Ordered field map. Insertion order is the field order; keys are unique.
#[derive(Clone, Debug, Default)]
pub struct Record {
    fields: IndexMap<String, Field>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Record::insert`].
    pub fn with(mut self, name: impl Into<String>, field: Field) -> Self {
        self.insert(name, field);
        self
    }

    /// Insert or replace. A replaced field keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, field: Field) -> Option<Field> {
        self.fields.insert(name.into(), field)
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(k, f)| (k.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fail with `UnknownKey` on the first key this record lacks.
    pub(crate) fn require_keys<K: AsRef<str>>(&self, keys: &[K]) -> Result<()> {
        match keys.iter().find(|k| !self.contains_key(k.as_ref())) {
            None => Ok(()),
            Some(missing) => Err(ShapeError::UnknownKey {
                key: missing.as_ref().to_string(),
                available: self.keys().map(str::to_string).collect(),
            }),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, Field)> for Record {
    fn from_iter<I: IntoIterator<Item = (S, Field)>>(iter: I) -> Self {
        let mut out = Record::new();
        for (name, field) in iter {
            out.insert(name, field);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replacing_a_field_keeps_its_slot() {
        let mut r = Record::new()
            .with("a", Field::required(Shape::number()))
            .with("b", Field::required(Shape::string()));
        let old = r.insert("a", Field::optional(Shape::boolean()));
        assert!(old.is_some());
        assert_eq!(r.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert!(r.get("a").unwrap().optional);
    }

    #[test]
    fn require_keys_reports_the_missing_one() {
        let r = Record::new().with("a", Field::required(Shape::number()));
        let err = r.require_keys(&["a", "zz"]).unwrap_err();
        assert_eq!(
            err,
            ShapeError::UnknownKey { key: "zz".into(), available: vec!["a".into()] }
        );
    }
}
