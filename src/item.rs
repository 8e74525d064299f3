use crate::error::{Result, StacError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::read_to_string;
use std::path::Path;

const ITEM_ID_PATTERN: &str = r"(?i)^(([a-z0-9])|([a-z0-9][a-z0-9_.-]*[a-z0-9]))$";

/// A catalog entry, kept exactly as the service returned it.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(transparent)]
pub struct Item(Map<String, Value>);

/// A catalog description, kept exactly as the service returned it.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(transparent)]
pub struct Catalog(Map<String, Value>);

impl Item {
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(StacError::InvalidResponse(format!(
                "expected a STAC item object, got: {}",
                other
            ))),
        }
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| StacError::InvalidArgument(format!("item file is not JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn id(self: &Self) -> Option<&str> {
        self.0.get("id")?.as_str()
    }

    pub fn get(self: &Self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn property(self: &Self, name: &str) -> Option<&Value> {
        self.0.get("properties")?.get(name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Interpret the raw fields as a typed STAC item.
    pub fn to_stac(&self) -> Result<stac::Item> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| StacError::InvalidResponse(format!("not a valid STAC item: {e}")))
    }
}

impl From<Map<String, Value>> for Item {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl Catalog {
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(StacError::InvalidResponse(format!(
                "expected a catalog object, got: {}",
                other
            ))),
        }
    }

    pub fn id(self: &Self) -> Option<&str> {
        self.0.get("id")?.as_str()
    }

    pub fn get(self: &Self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_owned(), value);
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Catalog {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Reject identifiers that could not have come from the catalog, before they reach a URL.
pub fn validate_item_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(StacError::InvalidArgument("item id must not be empty".to_string()));
    }
    let re = Regex::new(ITEM_ID_PATTERN).expect("Regex pattern should always compile");
    if !re.is_match(id) {
        return Err(StacError::InvalidArgument(format!("Invalid item id: {}", id)));
    }
    Ok(())
}

/// Pull the list of items out of a search response.
///
/// The service answers with either a bare JSON array or a GeoJSON FeatureCollection.
pub fn items_from_response(content: Option<Value>) -> Result<Vec<Item>> {
    let list = match content {
        None | Some(Value::Null) => return Ok(vec![]),
        Some(Value::Array(list)) => list,
        Some(Value::Object(mut collection)) => match collection.remove("features") {
            Some(Value::Array(list)) => list,
            None | Some(Value::Null) => vec![],
            Some(other) => {
                return Err(StacError::InvalidResponse(format!(
                    "'features' is not a list: {}",
                    other
                )))
            }
        },
        Some(other) => {
            return Err(StacError::InvalidResponse(format!(
                "expected a list of items, got: {}",
                other
            )))
        }
    };
    list.into_iter().map(Item::from_value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn mock_item(id: &str) -> Value {
        json!({
            "type": "Feature",
            "stac_version": "1.0.0",
            "id": id,
            "geometry": null,
            "properties": {"datetime": "2018-06-03T17:04:10.000000Z", "eo:cloud_cover": 3},
            "links": [],
            "assets": {
                "thumbnail": {"title": "Browse", "href": format!("https://api.digitalglobe.com/v2/show/id={id}")}
            }
        })
    }

    #[test]
    fn test_item_accessors() {
        let item = Item::from_value(mock_item("1030010080D4FE00")).unwrap();
        assert_eq!(item.id(), Some("1030010080D4FE00"));
        assert_eq!(item.property("eo:cloud_cover"), Some(&json!(3)));
        assert_eq!(item.get("type"), Some(&json!("Feature")));
    }

    #[test]
    fn test_item_to_stac() {
        let item = Item::from_value(mock_item("1030010080D4FE00")).unwrap();
        let stac_item = item.to_stac().unwrap();
        assert_eq!(stac_item.id, "1030010080D4FE00");
        assert!(stac_item.assets.contains_key("thumbnail"));
    }

    #[test]
    fn test_item_rejects_non_object() {
        assert!(matches!(
            Item::from_value(json!(["not", "an", "item"])),
            Err(StacError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_read_item_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", mock_item("abc")).unwrap();
        let item = Item::read(file.path()).unwrap();
        assert_eq!(item.id(), Some("abc"));
    }

    #[test]
    fn test_validate_item_id() {
        assert!(validate_item_id("1030010080D4FE00").is_ok());
        assert!(validate_item_id("4d8ab5aa-46ac-4cab-84d2-c1423fc9b848-inv").is_ok());
        assert!(validate_item_id("a").is_ok());
        assert!(validate_item_id("").is_err());
        assert!(validate_item_id("-leading").is_err());
        assert!(validate_item_id("trailing.").is_err());
        assert!(validate_item_id("x' or '1'='1").is_err());
        assert!(validate_item_id("../catalog").is_err());
    }

    #[test]
    fn test_items_from_array() {
        let items = items_from_response(Some(json!([mock_item("a"), mock_item("b")]))).unwrap();
        let ids = items.iter().filter_map(|i| i.id()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_items_from_feature_collection() {
        let content = json!({"type": "FeatureCollection", "features": [mock_item("a")]});
        let items = items_from_response(Some(content)).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_items_from_empty_response() {
        assert!(items_from_response(None).unwrap().is_empty());
        assert!(items_from_response(Some(json!([]))).unwrap().is_empty());
        assert!(items_from_response(Some(json!({"type": "FeatureCollection"})))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_items_from_unexpected_response() {
        assert!(items_from_response(Some(json!("nope"))).is_err());
    }
}
