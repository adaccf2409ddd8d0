//! Serde adapter for maps keyed by structured values.
//!
//! JSON object keys must be strings, so maps keyed by e.g. [`PartColor`] are
//! written as a list of `[key, value]` pairs instead. Use with
//! `#[serde(with = "brickledger_core::pairs")]`.
//!
//! [`PartColor`]: crate::PartColor

use std::collections::BTreeMap;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    K: Serialize,
    V: Serialize,
    S: Serializer,
{
    serializer.collect_seq(map.iter())
}

pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
    D: Deserializer<'de>,
{
    let pairs = Vec::<(K, V)>::deserialize(deserializer)?;
    Ok(pairs.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Serialize};

    use crate::{ColorId, PartColor, PartId};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "crate::pairs")]
        counts: BTreeMap<PartColor, i64>,
    }

    #[test]
    fn struct_keyed_map_survives_json() {
        let mut counts = BTreeMap::new();
        counts.insert(PartColor::new(PartId::parse("3001").unwrap(), ColorId(5)), 12);
        counts.insert(PartColor::new(PartId::parse("3003").unwrap(), ColorId(0)), 4);
        let holder = Holder { counts };

        let json = serde_json::to_string(&holder).unwrap();
        let back: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(back, holder);
    }
}
