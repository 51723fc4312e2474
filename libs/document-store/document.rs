use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{StoreError, StoreResult};

pub type DocumentId = String;

/// Content of a document, always a JSON object
pub type Fields = serde_json::Map<String, Value>;

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Fields merged with the id tag. A stored field named `id` wins over the tag.
    pub fn into_value(self) -> Value {
        let mut merged = Fields::new();
        merged.insert("id".to_owned(), Value::String(self.id));
        merged.extend(self.fields);
        Value::Object(merged)
    }

    pub fn parse<T: DeserializeOwned>(self) -> StoreResult<T> {
        let id = self.id.clone();
        serde_json::from_value(self.into_value())
            .map_err(|e| StoreError::Parse(format!("document '{id}': {e}")))
    }
}

/// Serialize `value` into a field map, `value` must serialize to an object.
pub fn to_fields<T: Serialize>(value: &T) -> StoreResult<Fields> {
    match serde_json::to_value(value).map_err(|e| StoreError::Parse(e.to_string()))? {
        Value::Object(fields) => Ok(fields),
        other => Err(StoreError::Parse(format!(
            "expected an object, got '{other}'"
        ))),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    All,
    Eq(String, Value),
    And(Vec<Filter>),
}

impl Filter {
    pub fn field_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn and(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::All, f) | (f, Filter::All) => f,
            (Filter::And(mut left), Filter::And(right)) => {
                left.extend(right);
                Filter::And(left)
            }
            (Filter::And(mut left), f) => {
                left.push(f);
                Filter::And(left)
            }
            (f, Filter::And(mut right)) => {
                right.insert(0, f);
                Filter::And(right)
            }
            (left, right) => Filter::And(vec![left, right]),
        }
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(name, value) => fields.get(name) == Some(value),
            Filter::And(filters) => filters.iter().all(|f| f.matches(fields)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Item {
        id: String,
        name: String,
    }

    #[test]
    fn parse_merges_the_id_tag() {
        let doc = Document::new("abc", fields(json!({ "name": "x" })));
        let item: Item = doc.parse().unwrap();

        assert_eq!(
            item,
            Item {
                id: "abc".to_owned(),
                name: "x".to_owned()
            }
        );
    }

    #[test]
    fn stored_id_field_wins_over_tag() {
        let doc = Document::new("abc", fields(json!({ "id": "inner", "name": "x" })));
        assert_eq!(doc.into_value()["id"], "inner");
    }

    #[test]
    fn parse_reports_the_document_id() {
        let doc = Document::new("abc", fields(json!({ "name": 3 })));
        let err = doc.parse::<Item>().unwrap_err();
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn to_fields_rejects_scalars() {
        assert!(to_fields(&3).is_err());
        assert_eq!(to_fields(&json!({ "a": 1 })).unwrap()["a"], 1);
    }

    #[test]
    fn filter_matching() {
        let doc = fields(json!({ "owner": "a@x.io", "done": false }));

        assert!(Filter::All.matches(&doc));
        assert!(Filter::field_eq("owner", "a@x.io").matches(&doc));
        assert!(!Filter::field_eq("owner", "b@x.io").matches(&doc));
        assert!(!Filter::field_eq("missing", "a@x.io").matches(&doc));
        assert!(Filter::field_eq("owner", "a@x.io")
            .and(Filter::field_eq("done", false))
            .matches(&doc));
        assert!(!Filter::field_eq("owner", "a@x.io")
            .and(Filter::field_eq("done", true))
            .matches(&doc));
    }

    #[test]
    fn and_flattens() {
        let a = Filter::field_eq("a", 1);
        let b = Filter::field_eq("b", 2);
        let c = Filter::field_eq("c", 3);

        assert_eq!(Filter::All.and(a.clone()), a);
        assert_eq!(
            a.clone().and(b.clone()).and(c.clone()),
            Filter::And(vec![a, b, c])
        );
    }
}
