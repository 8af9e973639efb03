//! Metadata — the key-value store on units, nodes and representations.

use std::collections::BTreeMap;
use super::MetaValue;

/// An ordered map of metadata keys to values.
///
/// Ordered (not hashed) so that two serializations of the same
/// representation are byte-identical.
pub type Metadata = BTreeMap<String, MetaValue>;

/// Convert a list of (key, value) pairs into a map value.
impl<K, V> From<Vec<(K, V)>> for MetaValue
where
    K: Into<String>,
    V: Into<MetaValue>,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        MetaValue::Map(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
