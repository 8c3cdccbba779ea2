//! Serde helpers for maps whose key order is significant.
//!
//! Flow declarations and input schemas are written as JSON/TOML objects, but
//! declaration order drives execution order, so they are kept as ordered
//! `(key, value)` pairs instead of a hash map.
//!
//! ```ignore
//! #[serde(with = "crate::ordered::pairs")]
//! pub input_schema: Vec<(String, String)>,
//! ```

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// `#[serde(with = "...")]` module for `Vec<(String, V)>` stored as a map.
pub mod pairs {
    use super::*;

    pub fn serialize<S, V>(pairs: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        serializer.collect_map(pairs.iter().map(|(k, v)| (k, v)))
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        deserializer.deserialize_map(PairsVisitor(PhantomData))
    }
}

struct PairsVisitor<V>(PhantomData<V>);

impl<'de, V> Visitor<'de> for PairsVisitor<V>
where
    V: Deserialize<'de>,
{
    type Value = Vec<(String, V)>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut out = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            out.push((key, value));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    struct Holder {
        #[serde(with = "pairs")]
        fields: Vec<(String, String)>,
    }

    #[test]
    fn test_json_order_preserved() {
        let h: Holder =
            serde_json::from_str(r#"{"fields": {"zeta": "a", "alpha": "b", "mid": "c"}}"#)
                .unwrap();
        let keys: Vec<&str> = h.fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_toml_order_preserved() {
        let h: Holder = toml::from_str(
            r#"
[fields]
query = "string"
history = "array"
customField = "string"
"#,
        )
        .unwrap();
        let keys: Vec<&str> = h.fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["query", "history", "customField"]);
    }

    #[test]
    fn test_serialize_as_map() {
        let h = Holder {
            fields: vec![("b".into(), "1".into()), ("a".into(), "2".into())],
        };
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, r#"{"fields":{"b":"1","a":"2"}}"#);
    }
}
