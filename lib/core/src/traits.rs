//! Trait maps and input validation
//!
//! Trait data reaches the engine from item storage as JSON. It is checked
//! here, once, so that the scoring code only ever sees string values.
//! Three layouts are accepted per item:
//!
//! - a flat object: `{"color": "red", "hat": "cap"}`
//! - an attribute list: `[{"trait_type": "color", "value": "red"}]`
//! - a metadata object carrying an attribute list under `attributes`

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Trait-name to trait-value mapping for one item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitMap {
    traits: BTreeMap<String, String>,
}

impl TraitMap {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a trait value, returning the previous one if any
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.traits.insert(name.into(), value.into())
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.traits.get(name).map(String::as_str)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.traits.contains_key(name)
    }

    /// Trait names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.traits.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.traits.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.traits.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TraitMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = TraitMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Union of trait names across all items, sorted
pub fn trait_universe(items: &[TraitMap]) -> BTreeSet<&str> {
    items.iter().flat_map(TraitMap::names).collect()
}

/// Parse a JSON array of items into trait maps
pub fn parse_items(value: &Value) -> Result<Vec<TraitMap>> {
    let items = value.as_array().ok_or_else(|| {
        Error::validation(0, None, format!("expected an array of items, got {}", kind(value)))
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_item(index, item))
        .collect()
}

/// Parse a single item at position `index`
pub fn parse_item(index: usize, value: &Value) -> Result<TraitMap> {
    match value {
        Value::Object(obj) => match obj.get("attributes") {
            Some(Value::Array(attributes)) => parse_attribute_list(index, attributes),
            Some(other) => Err(Error::validation(
                index,
                None,
                format!("'attributes' must be an array, got {}", kind(other)),
            )),
            None => parse_flat_object(index, obj),
        },
        Value::Array(attributes) => parse_attribute_list(index, attributes),
        other => Err(Error::validation(
            index,
            None,
            format!("expected a trait map, got {}", kind(other)),
        )),
    }
}

fn parse_flat_object(index: usize, obj: &Map<String, Value>) -> Result<TraitMap> {
    let mut traits = TraitMap::new();
    for (name, value) in obj {
        let name = trait_name(index, name)?;
        let value = string_value(index, name, value)?;
        if traits.insert(name, value).is_some() {
            return Err(Error::validation(index, Some(name), "duplicate trait after trimming"));
        }
    }
    Ok(traits)
}

fn parse_attribute_list(index: usize, attributes: &[Value]) -> Result<TraitMap> {
    let mut traits = TraitMap::new();
    for attribute in attributes {
        let obj = attribute.as_object().ok_or_else(|| {
            Error::validation(index, None, format!("attribute must be an object, got {}", kind(attribute)))
        })?;

        let name = match obj.get("trait_type") {
            Some(Value::String(name)) => trait_name(index, name)?,
            Some(other) => {
                return Err(Error::validation(
                    index,
                    None,
                    format!("'trait_type' must be a string, got {}", kind(other)),
                ))
            }
            None => return Err(Error::validation(index, None, "attribute is missing 'trait_type'")),
        };

        let value = match obj.get("value") {
            Some(value) => string_value(index, name, value)?,
            None => return Err(Error::validation(index, Some(name), "attribute is missing 'value'")),
        };

        if traits.insert(name, value).is_some() {
            return Err(Error::validation(index, Some(name), "duplicate trait"));
        }
    }
    Ok(traits)
}

fn trait_name(index: usize, raw: &str) -> Result<&str> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::validation(index, None, "trait name is empty"));
    }
    Ok(name)
}

fn string_value<'a>(index: usize, name: &str, value: &'a Value) -> Result<&'a str> {
    match value {
        Value::String(s) => Ok(s.trim()),
        other => Err(Error::validation(
            index,
            Some(name),
            format!("trait value must be a string, got {}", kind(other)),
        )),
    }
}

/// Reject trait maps the distribution counts cannot represent faithfully
///
/// An empty trait name or a value equal to the sentinel would be merged
/// with another bucket, so both are errors.
pub fn validate_items(items: &[TraitMap], sentinel: &str) -> Result<()> {
    for (index, item) in items.iter().enumerate() {
        for (name, value) in item.iter() {
            if name.trim().is_empty() {
                return Err(Error::validation(index, None, "trait name is empty"));
            }
            if value == sentinel {
                return Err(Error::validation(
                    index,
                    Some(name),
                    format!("value '{}' is reserved for missing traits", sentinel),
                ));
            }
        }
    }
    Ok(())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validation_parts(err: Error) -> (usize, Option<String>) {
        match err {
            Error::Validation { index, trait_name, .. } => (index, trait_name),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_flat_objects() {
        let items = parse_items(&json!([
            {"color": " red ", "hat": "cap"},
            {"color": "blue"}
        ]))
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("color"), Some("red"));
        assert_eq!(items[0].get("hat"), Some("cap"));
        assert!(!items[1].contains("hat"));
    }

    #[test]
    fn test_attribute_layouts() {
        let items = parse_items(&json!([
            [{"trait_type": "color", "value": "red"}],
            {
                "name": "Token #2",
                "image": "ipfs://abc",
                "attributes": [{"trait_type": " color ", "value": "blue"}]
            }
        ]))
        .unwrap();

        assert_eq!(items[0].get("color"), Some("red"));
        assert_eq!(items[1].get("color"), Some("blue"));
        assert_eq!(items[1].len(), 1);
    }

    #[test]
    fn test_non_string_value_names_item_and_trait() {
        let err = parse_items(&json!([
            {"color": "red"},
            {"color": "blue", "level": 3}
        ]))
        .unwrap_err();

        assert_eq!(validation_parts(err), (1, Some("level".to_string())));
    }

    #[test]
    fn test_null_item_rejected() {
        let err = parse_items(&json!([{"color": "red"}, null])).unwrap_err();
        assert_eq!(validation_parts(err), (1, None));
    }

    #[test]
    fn test_null_attribute_value_rejected() {
        let err = parse_items(&json!([
            {"attributes": [{"trait_type": "eyes", "value": null}]}
        ]))
        .unwrap_err();
        assert_eq!(validation_parts(err), (0, Some("eyes".to_string())));
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let err = parse_items(&json!([[
            {"trait_type": "eyes", "value": "green"},
            {"trait_type": "eyes ", "value": "blue"}
        ]]))
        .unwrap_err();
        assert_eq!(validation_parts(err), (0, Some("eyes".to_string())));
    }

    #[test]
    fn test_top_level_must_be_array() {
        assert!(matches!(
            parse_items(&json!({"color": "red"})),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_sentinel_value_rejected() {
        let items = vec![TraitMap::from_iter([("color", "__undefined")])];
        let err = validate_items(&items, "__undefined").unwrap_err();
        assert_eq!(validation_parts(err), (0, Some("color".to_string())));
        assert!(validate_items(&items, "<none>").is_ok());
    }

    #[test]
    fn test_trait_universe_is_union() {
        let items = vec![
            TraitMap::from_iter([("b", "y")]),
            TraitMap::from_iter([("a", "x"), ("b", "z")]),
        ];
        let universe: Vec<_> = trait_universe(&items).into_iter().collect();
        assert_eq!(universe, vec!["a", "b"]);
    }

    #[test]
    fn test_error_message_mentions_trait() {
        let err = Error::validation(4, Some("hat"), "bad");
        assert_eq!(err.to_string(), "Invalid trait data at item 4, trait 'hat': bad");
    }
}
