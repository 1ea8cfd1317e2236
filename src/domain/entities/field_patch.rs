use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 部分更新のペイロード。キーはワイヤー上のフィールド名。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPatch(Map<String, Value>);

impl FieldPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, value: Value) -> Self {
        let mut map = Map::new();
        map.insert(field.into(), value);
        Self(map)
    }

    pub fn from_value(value: Value) -> Result<Self, AppError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(AppError::SerializationError(
                "Field patch must be a JSON object".to_string(),
            )),
        }
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `other` の値で上書きマージする
    pub fn merge(&mut self, other: &FieldPatch) {
        for (field, value) in other.iter() {
            self.0.insert(field.clone(), value.clone());
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_requires_object() {
        assert!(FieldPatch::from_value(json!({"companyName": "Meta"})).is_ok());
        assert!(FieldPatch::from_value(json!(["companyName"])).is_err());
    }

    #[test]
    fn test_merge_overwrites_existing_fields() {
        let mut patch = FieldPatch::single("jobStatus", json!("Applied"));
        patch.merge(&FieldPatch::single("jobStatus", json!("Offer")));
        patch.merge(&FieldPatch::single("notes", json!("call back")));

        assert_eq!(patch.len(), 2);
        assert_eq!(patch.get("jobStatus"), Some(&json!("Offer")));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let patch = FieldPatch::single("roleTitle", json!("PM"));
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"roleTitle": "PM"}));
    }
}
