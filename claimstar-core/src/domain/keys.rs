// claimstar-core/src/domain/keys.rs

use std::collections::HashMap;

/// Reserved surrogate key of every dimension's unknown member.
pub const UNKNOWN_SK: i64 = -1;

/// Natural key of the unknown member unless a dimension declares its own.
pub const UNKNOWN_NATURAL_KEY: &str = "UNKNOWN";

/// Cleans a natural key as read from a raw row. Blank keys are absent keys.
pub fn natural_key(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

/// Pre-pass for fact keys resolved upstream: an unresolved key becomes the sentinel.
pub fn or_unknown(surrogate_key: Option<i64>) -> i64 {
    surrogate_key.unwrap_or(UNKNOWN_SK)
}

/// Dense surrogate keys over the distinct natural keys of one build.
///
/// Keys start at 1 and follow first appearance. Registering the same natural
/// key twice returns the key it already holds. Assignment is deterministic for
/// a given input order but carries no meaning across runs.
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    keys: HashMap<String, i64>,
    order: Vec<String>,
    reserved: Option<String>,
}

impl KeyRegistry {
    /// A registry that refuses to hand a positive key to the dimension's sentinel.
    pub fn with_reserved(sentinel: &str) -> Self {
        Self {
            reserved: Some(sentinel.to_string()),
            ..Self::default()
        }
    }

    /// Returns the surrogate key for `natural_key`, assigning the next one if unseen.
    /// Null, blank and reserved keys get `None`.
    pub fn register(&mut self, raw: Option<&str>) -> Option<i64> {
        let key = natural_key(raw)?;
        if self.reserved.as_deref() == Some(key.as_str()) {
            return None;
        }
        if let Some(&sk) = self.keys.get(&key) {
            return Some(sk);
        }
        let sk = self.order.len() as i64 + 1;
        self.keys.insert(key.clone(), sk);
        self.order.push(key);
        Some(sk)
    }

    pub fn get(&self, natural_key: &str) -> Option<i64> {
        self.keys.get(natural_key.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `(natural_key, surrogate_key)` in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.order
            .iter()
            .enumerate()
            .map(|(i, k)| (k.as_str(), i as i64 + 1))
    }
}
