use std::sync::Arc;

use derive_more::Deref;
use serde_json::Value;

use crate::{Fields, StoreError, StoreResult};

#[derive(Deref, Clone)]
#[deref(forward)]
pub struct DocumentParser(Arc<dyn IDocumentParser>);

pub trait IDocumentParser: Send + Sync {
    fn deserialize(&self, data: &str) -> StoreResult<Fields>;
    fn serialize(&self, fields: &Fields) -> StoreResult<String>;
    fn file_extension(&self) -> &'static str;
}

fn into_fields(value: Value) -> StoreResult<Fields> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(StoreError::CorruptedDocument(format!(
            "expected a table of fields, got '{other}'"
        ))),
    }
}

macro_rules! impl_file_parser {
    ($FormatType:ident, $deserialize:expr, $serialize:expr, $file_extension:expr) => {
        pub struct $FormatType;
        impl $FormatType {
            pub fn get() -> DocumentParser {
                DocumentParser(Arc::new($FormatType {}))
            }
        }
        impl IDocumentParser for $FormatType {
            fn deserialize(&self, data: &str) -> StoreResult<Fields> {
                let data: Value = $deserialize(data)
                    .map_err(|e| StoreError::CorruptedDocument(e.to_string()))?;
                into_fields(data)
            }

            fn serialize(&self, fields: &Fields) -> StoreResult<String> {
                $serialize(fields).map_err(|e| StoreError::Parse(e.to_string()))
            }

            fn file_extension(&self) -> &'static str {
                $file_extension
            }
        }
    };
}

impl_file_parser!(
    JsonParser,
    serde_json::from_str,
    serde_json::to_string_pretty,
    "json"
);

impl_file_parser!(TomlParser, toml::from_str, toml::to_string, "toml");

impl_file_parser!(
    YamlParser,
    serde_yaml::from_str,
    serde_yaml::to_string,
    "yaml"
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Fields {
        into_fields(json!({
            "title": "Buy milk",
            "priority": "Medium",
            "completed": false,
        }))
        .unwrap()
    }

    #[test]
    fn every_format_reads_back_what_it_writes() {
        for parser in [JsonParser::get(), TomlParser::get(), YamlParser::get()] {
            let text = parser.serialize(&sample()).unwrap();
            let fields = parser.deserialize(&text).unwrap();
            assert_eq!(fields, sample(), "format {}", parser.file_extension());
        }
    }

    #[test]
    fn non_table_documents_are_corrupted() {
        let err = JsonParser::get().deserialize("[1, 2]").unwrap_err();
        assert!(matches!(err, StoreError::CorruptedDocument(_)));

        let err = YamlParser::get().deserialize("just a string").unwrap_err();
        assert!(matches!(err, StoreError::CorruptedDocument(_)));
    }
}
