// claimstar-core/src/domain/dimension.rs

//! Unknown-member injection, dimension lookup and the generic
//! "distinct values of one column" dimension builder.

use std::collections::HashMap;

use crate::domain::audit::{AuditStage, AuditStamp, Audited, add_audit_columns};
use crate::domain::keys::{KeyRegistry, UNKNOWN_NATURAL_KEY, UNKNOWN_SK};

/// Type-appropriate filler for a column of the unknown member.
pub trait UnknownValue {
    fn unknown() -> Self;
}

impl<T> UnknownValue for Option<T> {
    fn unknown() -> Self {
        None
    }
}

impl UnknownValue for bool {
    fn unknown() -> Self {
        false
    }
}

impl UnknownValue for String {
    fn unknown() -> Self {
        "Unknown".to_string()
    }
}

pub fn unknown<T: UnknownValue>() -> T {
    T::unknown()
}

pub trait Dimension: Sized {
    /// Natural key of this dimension's unknown member.
    const SENTINEL: &'static str = UNKNOWN_NATURAL_KEY;

    fn surrogate_key(&self) -> i64;
    fn natural_key(&self) -> &str;

    /// Builds the synthetic member. Columns the dimension does not override
    /// take [`UnknownValue`] defaults.
    fn unknown_member(surrogate_key: i64, natural_key: &str) -> Self;
}

/// Prepends exactly one unknown member (`-1`, `D::SENTINEL`).
///
/// Runs before audit stamping so the synthetic row is stamped too. Any row
/// already carrying the sentinel surrogate or natural key is replaced, so the
/// result always holds exactly one of each.
pub fn add_unknown_member<D: Dimension>(rows: Vec<D>) -> Vec<D> {
    let mut out = Vec::with_capacity(rows.len() + 1);
    out.push(D::unknown_member(UNKNOWN_SK, D::SENTINEL));
    out.extend(
        rows.into_iter()
            .filter(|r| r.surrogate_key() != UNKNOWN_SK && r.natural_key() != D::SENTINEL),
    );
    out
}

/// Natural key -> surrogate key over a built dimension.
#[derive(Debug, Clone, Default)]
pub struct DimensionIndex {
    keys: HashMap<String, i64>,
}

impl DimensionIndex {
    pub fn from_rows<D: Dimension, S>(rows: &[Audited<D, S>]) -> Self {
        let keys = rows
            .iter()
            .map(|r| (r.natural_key().to_string(), r.surrogate_key()))
            .collect();
        Self { keys }
    }

    /// Left-join semantics: unmatched or absent keys resolve to `-1`.
    pub fn resolve(&self, natural_key: Option<&str>) -> i64 {
        natural_key
            .and_then(|k| self.keys.get(k))
            .copied()
            .unwrap_or(UNKNOWN_SK)
    }
}

/// A dimension that can be derived from nothing but a column of distinct codes.
pub trait GenericDimension: Dimension {
    /// Column the codes come from, e.g. `procedure_code`.
    const SOURCE_COLUMN: &'static str;

    fn from_code(surrogate_key: i64, code: String) -> Self;
}

/// Deduplicates `codes` (first seen wins, blanks dropped), assigns dense keys,
/// then injects the unknown member and the audit columns.
pub fn build_generic_dimension<'a, D, S, I>(codes: I, stamp: AuditStamp) -> Vec<Audited<D, S>>
where
    D: GenericDimension,
    S: AuditStage,
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut registry = KeyRegistry::with_reserved(D::SENTINEL);
    for code in codes {
        registry.register(code);
    }
    let members = registry
        .iter()
        .map(|(code, sk)| D::from_code(sk, code.to_string()))
        .collect();
    add_audit_columns(add_unknown_member(members), stamp)
}

/// `procedure_code` -> `Procedure Code`.
pub fn humanize(column: &str) -> String {
    column
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Human-readable label for a generated member, e.g. `Procedure Code 99213`.
pub fn describe(column: &str, code: &str) -> String {
    format!("{} {}", humanize(column), code)
}
