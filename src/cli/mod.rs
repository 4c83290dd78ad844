//! Command handlers for the `voltbuild` binary

pub mod advisor;
pub mod field;
pub mod forecast;
pub mod phase;
pub mod project;
pub mod rate;
pub mod risk;
pub mod site;
pub mod task;

use anyhow::Result;
use chrono::{Local, NaiveDate};

use crate::error::DashboardError;

/// First 8 characters of an id, as shown in tables
pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub(crate) fn truncate(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or(text);
    if line.chars().count() > max {
        let cut: String = line.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}

pub(crate) fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Pick the record whose id equals `query` or uniquely starts with it
pub(crate) fn resolve<T>(
    items: Vec<T>,
    query: &str,
    kind: &'static str,
    id_of: impl Fn(&T) -> &str,
) -> Result<T> {
    if query.trim().is_empty() {
        return Err(DashboardError::EmptyLookup(kind).into());
    }

    let mut matches: Vec<T> = items
        .into_iter()
        .filter(|item| id_of(item).starts_with(query))
        .collect();
    if let Some(pos) = matches.iter().position(|item| id_of(item) == query) {
        return Ok(matches.swap_remove(pos));
    }
    match matches.len() {
        0 => Err(DashboardError::RecordNotFound {
            kind,
            id: query.to_string(),
        }
        .into()),
        1 => Ok(matches.remove(0)),
        _ => Err(DashboardError::AmbiguousId {
            kind,
            query: query.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Item {
        id: String,
    }

    fn items(ids: &[&str]) -> Vec<Item> {
        ids.iter().map(|id| Item { id: id.to_string() }).collect()
    }

    #[test]
    fn test_resolve_by_prefix() {
        let found = resolve(items(&["a1b2c3d4-1", "ffee0011-2"]), "ffee", "item", |i| {
            i.id.as_str()
        })
        .unwrap();
        assert_eq!(found.id, "ffee0011-2");
    }

    #[test]
    fn test_resolve_missing_is_record_not_found() {
        let err = resolve(Vec::<Item>::new(), "zz", "item", |i| i.id.as_str()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashboardError>(),
            Some(DashboardError::RecordNotFound { kind: "item", .. })
        ));
    }

    #[test]
    fn test_resolve_rejects_empty_and_ambiguous_prefixes() {
        let err = resolve(items(&["ab1", "ab2"]), "", "item", |i| i.id.as_str()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashboardError>(),
            Some(DashboardError::EmptyLookup("item"))
        ));

        let err = resolve(items(&["ab1", "ab2"]), "ab", "item", |i| i.id.as_str()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashboardError>(),
            Some(DashboardError::AmbiguousId { kind: "item", .. })
        ));

        let exact = resolve(items(&["ab", "ab2"]), "ab", "item", |i| i.id.as_str()).unwrap();
        assert_eq!(exact.id, "ab");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("a1b2c3d4-5678"), "a1b2c3d4");
        assert_eq!(short_id("p1"), "p1");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Zoning approval", 40), "Zoning approval");
        assert_eq!(truncate("Procure transformers for substation", 12), "Procure t...");
        assert_eq!(truncate("first\nsecond", 40), "first");
    }
}
