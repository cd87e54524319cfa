//! Normalises the provider's repeated elements.
//!
//! The API renders XML as JSON, so a repeated element comes back as a single
//! object when there is one entry, an array when there are several, and is
//! missing (or an empty string) when there are none. Often the entries sit
//! under a wrapper key (`Routes.Route`, `Trips.Trip`), sometimes not.

use std::borrow::Cow;

use serde_json::Value;

/// Collapses single/array/absent into an ordered list. Array order is kept.
pub fn to_list(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) if s.trim().is_empty() => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    }
}

/// Like [`to_list`], but looks through a wrapper object first: both
/// `{"Trips": {"Trip": [..]}}` and `{"Trips": [..]}` give the trip list.
pub fn collection<'a>(value: Option<&'a Value>, wrapper: &str) -> Vec<&'a Value> {
    match value {
        Some(Value::Object(map)) if map.contains_key(wrapper) => to_list(map.get(wrapper)),
        _ => to_list(value),
    }
}

/// An element carrying no data: `null`, `""` or `{}`.
pub fn is_padding(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Reads a scalar field as text. Numbers and booleans are rendered; missing
/// fields, `null` and nested structures give `None`.
pub fn text<'a>(value: &'a Value, key: &str) -> Option<Cow<'a, str>> {
    match value.get(key)? {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        _ => None,
    }
}

/// [`text`], with missing fields read as the empty string.
pub fn text_or_empty(value: &Value, key: &str) -> String {
    text(value, key).map(Cow::into_owned).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_list_absent() {
        assert!(to_list(None).is_empty());
        assert!(to_list(Some(&Value::Null)).is_empty());
        assert!(to_list(Some(&json!(""))).is_empty());
    }

    #[test]
    fn test_to_list_single() {
        let one = json!({"x": 1});
        assert_eq!(to_list(Some(&one)), vec![&json!({"x": 1})]);
    }

    #[test]
    fn test_to_list_keeps_order() {
        let many = json!([{"x": 1}, {"x": 2}, {"x": 3}]);
        let list = to_list(Some(&many));
        let xs: Vec<_> = list.iter().map(|v| v["x"].as_i64().unwrap()).collect();
        assert_eq!(xs, vec![1, 2, 3]);
    }

    #[test]
    fn test_collection_with_and_without_wrapper() {
        let wrapped = json!({"Trip": [{"x": 1}, {"x": 2}]});
        assert_eq!(collection(Some(&wrapped), "Trip").len(), 2);

        let wrapped_single = json!({"Trip": {"x": 1}});
        assert_eq!(collection(Some(&wrapped_single), "Trip"), vec![&json!({"x": 1})]);

        let bare = json!([{"x": 1}, {"x": 2}]);
        assert_eq!(collection(Some(&bare), "Trip").len(), 2);

        let empty_wrapper = json!({"Trip": null});
        assert!(collection(Some(&empty_wrapper), "Trip").is_empty());

        assert!(collection(None, "Trip").is_empty());
    }

    #[test]
    fn test_is_padding() {
        assert!(is_padding(&json!({})));
        assert!(is_padding(&json!("")));
        assert!(is_padding(&Value::Null));
        assert!(!is_padding(&json!({"RouteNo": "95"})));
    }

    #[test]
    fn test_text() {
        let v = json!({"a": "95", "b": 95, "c": true, "d": {}, "e": null});
        assert_eq!(text(&v, "a").as_deref(), Some("95"));
        assert_eq!(text(&v, "b").as_deref(), Some("95"));
        assert_eq!(text(&v, "c").as_deref(), Some("true"));
        assert_eq!(text(&v, "d"), None);
        assert_eq!(text(&v, "e"), None);
        assert_eq!(text(&v, "missing"), None);
        assert_eq!(text_or_empty(&v, "missing"), "");
    }
}
