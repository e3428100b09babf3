//! Serde adapter for ledger maps whose keys are not strings.
//!
//! JSON objects only accept string keys, so record maps are written with
//! each key rendered through `Display` and read back through `FromStr`.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::hash::Hash;
use std::marker::PhantomData;
use std::str::FromStr;

pub fn serialize<K, V, S>(records: &HashMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    K: Display,
    V: Serialize,
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(records.len()))?;
    for (key, record) in records {
        map.serialize_entry(&key.to_string(), record)?;
    }
    map.end()
}

pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<HashMap<K, V>, D::Error>
where
    K: FromStr + Eq + Hash,
    K::Err: Display,
    V: Deserialize<'de>,
    D: Deserializer<'de>,
{
    struct RecordsVisitor<K, V>(PhantomData<(K, V)>);

    impl<'de, K, V> Visitor<'de> for RecordsVisitor<K, V>
    where
        K: FromStr + Eq + Hash,
        K::Err: Display,
        V: Deserialize<'de>,
    {
        type Value = HashMap<K, V>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map keyed by hex record keys")
        }

        fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
            let mut map = HashMap::new();
            while let Some((key, value)) = access.next_entry::<String, V>()? {
                let parsed = key
                    .parse::<K>()
                    .map_err(|e| de::Error::custom(format!("invalid key {key}: {e}")))?;
                map.insert(parsed, value);
            }
            Ok(map)
        }
    }

    deserializer.deserialize_map(RecordsVisitor(PhantomData))
}
