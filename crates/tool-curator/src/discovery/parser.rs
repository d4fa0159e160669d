use std::io::Read;

use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};

/// Splits a feature cell on `;` or `|`, dropping blanks.
pub(crate) fn split_features(cell: &str) -> Vec<String> {
    cell.split([';', '|'])
        .map(str::trim)
        .filter(|feature| !feature.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads CSV rows into raw tool objects. Blank cells become absent fields.
pub(crate) fn parse_csv<R: Read>(reader: R) -> Result<Vec<Value>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut items = Vec::new();

    for row in csv_reader.deserialize::<ToolRow>() {
        items.push(row?.into_value());
    }

    Ok(items)
}

/// Accepts a top-level array or an object with a `tools` array. Items are
/// kept raw so each one is decoded, and can fail, on its own.
pub(crate) fn parse_json<R: Read>(reader: R) -> Result<Vec<Value>, JsonShapeError> {
    let document: Value = serde_json::from_reader(reader).map_err(JsonShapeError::Syntax)?;
    match document {
        Value::Array(items) => Ok(items),
        Value::Object(mut object) => match object.remove("tools") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(JsonShapeError::MissingTools),
        },
        _ => Err(JsonShapeError::MissingTools),
    }
}

#[derive(Debug)]
pub(crate) enum JsonShapeError {
    Syntax(serde_json::Error),
    MissingTools,
}

#[derive(Debug, Deserialize)]
struct ToolRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    url: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    features: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pricing: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    documentation: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    api_available: Option<String>,
}

impl ToolRow {
    fn into_value(self) -> Value {
        let mut object = Map::new();
        let text_fields = [
            ("name", self.name),
            ("description", self.description),
            ("url", self.url),
            ("category", self.category),
            ("pricing", self.pricing),
            ("documentation", self.documentation),
        ];
        for (key, value) in text_fields {
            if let Some(value) = value {
                object.insert(key.to_string(), Value::String(value));
            }
        }

        if let Some(features) = self.features.as_deref() {
            object.insert("features".to_string(), json!(split_features(features)));
        }
        if let Some(flag) = self.api_available.as_deref() {
            object.insert("api_available".to_string(), Value::Bool(is_truthy(flag)));
        }

        Value::Object(object)
    }
}

fn is_truthy(flag: &str) -> bool {
    matches!(
        flag.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1"
    )
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
