// src/reference/mod.rs

mod states;

use std::collections::HashMap;

/// One row of the static state reference table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    pub name: String,
    pub abbreviation: String,
    pub fips: u8,
}

impl ReferenceEntry {
    /// FIPS as it appears in Census `STATEFP` fields, e.g. `"06"`.
    pub fn fips_code(&self) -> String {
        format!("{:02}", self.fips)
    }
}

/// Bidirectional lookup between state name, postal abbreviation and FIPS.
///
/// Lookups by key are partial (`try_*` return `None` for unknown keys).
/// Iterating `entries()` or `abbreviations()` is total.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    entries: Vec<ReferenceEntry>,
    by_name: HashMap<String, usize>,
    by_abbreviation: HashMap<String, usize>,
    by_fips: HashMap<u8, usize>,
}

impl ReferenceTable {
    /// The built-in table of states, DC and the inhabited territories.
    pub fn us_states() -> Self {
        Self::from_entries(
            states::STATES
                .iter()
                .map(|&(name, abbreviation, fips)| ReferenceEntry {
                    name: name.to_string(),
                    abbreviation: abbreviation.to_string(),
                    fips,
                })
                .collect(),
        )
    }

    pub fn from_entries(entries: Vec<ReferenceEntry>) -> Self {
        let mut by_name = HashMap::with_capacity(entries.len());
        let mut by_abbreviation = HashMap::with_capacity(entries.len());
        let mut by_fips = HashMap::with_capacity(entries.len());
        for (idx, e) in entries.iter().enumerate() {
            by_name.entry(e.name.clone()).or_insert(idx);
            by_abbreviation.entry(e.abbreviation.clone()).or_insert(idx);
            by_fips.entry(e.fips).or_insert(idx);
        }
        Self {
            entries,
            by_name,
            by_abbreviation,
            by_fips,
        }
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn try_by_name(&self, name: &str) -> Option<&ReferenceEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    pub fn try_by_abbreviation(&self, abbreviation: &str) -> Option<&ReferenceEntry> {
        self.by_abbreviation
            .get(abbreviation)
            .map(|&i| &self.entries[i])
    }

    pub fn try_by_fips(&self, fips: u8) -> Option<&ReferenceEntry> {
        self.by_fips.get(&fips).map(|&i| &self.entries[i])
    }

    pub fn try_abbreviation(&self, name: &str) -> Option<&str> {
        self.try_by_name(name).map(|e| e.abbreviation.as_str())
    }

    pub fn try_fips_code(&self, name: &str) -> Option<String> {
        self.try_by_name(name).map(ReferenceEntry::fips_code)
    }

    /// Abbreviations in table order.
    pub fn abbreviations(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.abbreviation.as_str())
    }
}

impl Default for ReferenceTable {
    fn default() -> Self {
        Self::us_states()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_agree_in_every_direction() {
        let table = ReferenceTable::us_states();
        for e in table.entries() {
            assert_eq!(table.try_by_name(&e.name), Some(e));
            assert_eq!(table.try_by_abbreviation(&e.abbreviation), Some(e));
            assert_eq!(table.try_by_fips(e.fips), Some(e));
        }
    }

    #[test]
    fn covers_states_dc_and_territories() {
        let table = ReferenceTable::us_states();
        assert_eq!(table.len(), 56);
        assert_eq!(table.try_abbreviation("District of Columbia"), Some("DC"));
        assert_eq!(table.try_abbreviation("Puerto Rico"), Some("PR"));
    }

    #[test]
    fn fips_codes_keep_leading_zero() {
        let table = ReferenceTable::us_states();
        assert_eq!(table.try_fips_code("California").as_deref(), Some("06"));
        assert_eq!(table.try_fips_code("Texas").as_deref(), Some("48"));
    }

    #[test]
    fn unknown_keys_are_none() {
        let table = ReferenceTable::us_states();
        assert!(table.try_by_name("Diamond Princess").is_none());
        assert!(table.try_by_abbreviation("ZZ").is_none());
        assert!(table.try_by_fips(99).is_none());
    }
}
