use std::collections::BTreeMap;

use crate::domain::product::AttributeRecord;

/// Normalized, deduplicated view of a product's attribute records.
///
/// Keys are lowercase with whitespace collapsed. When several records share
/// a key the shortest value is kept, since scraped pages tend to repeat a
/// label with a long marketing paragraph next to the structured value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CanonicalSpecMap(BTreeMap<String, String>);

impl CanonicalSpecMap {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&normalize_key(key)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

pub fn normalize(records: &[AttributeRecord]) -> CanonicalSpecMap {
    let mut map: BTreeMap<String, String> = BTreeMap::new();

    for record in records {
        let key = normalize_key(&record.key);
        if key.is_empty() {
            continue;
        }
        let value = collapse_whitespace(&record.value);

        match map.get(&key) {
            Some(existing) if existing.chars().count() <= value.chars().count() => {}
            _ => {
                map.insert(key, value);
            }
        }
    }

    CanonicalSpecMap(map)
}

pub fn normalize_key(key: &str) -> String {
    collapse_whitespace(key).to_lowercase()
}

pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
