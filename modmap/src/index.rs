//! The multi key index, from names, accessions, masses, and compositions to record positions.

use std::collections::HashMap;

use ordered_float::OrderedFloat;

use crate::{AccessionId, ModificationRecord};

/// A key into the [`MultiKeyIndex`]. The kinds are kept apart so a name that happens to look
/// like an accession (or the other way around) never matches the wrong kind of key.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum IndexKey {
    /// A modification name, matched exactly
    Name(Box<str>),
    /// An accession
    Id(AccessionId),
    /// A monoisotopic mass, matched exactly (no rounding)
    Mass(OrderedFloat<f64>),
    /// A composition in canonical Hill notation, see [`crate::Composition::hill_notation`]
    Composition(Box<str>),
}

impl IndexKey {
    /// A name key
    pub fn name(name: &str) -> Self {
        Self::Name(name.into())
    }

    /// An accession key, numbers are converted to their textual form
    pub fn id(id: impl Into<AccessionId>) -> Self {
        Self::Id(id.into())
    }

    /// A mass key
    pub const fn mass(mass: f64) -> Self {
        Self::Mass(OrderedFloat(mass))
    }

    /// A composition key, this has to be in canonical Hill notation
    pub fn composition(key: &str) -> Self {
        Self::Composition(key.into())
    }
}

impl std::fmt::Display for IndexKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(name) => write!(f, "name '{name}'"),
            Self::Id(id) => write!(f, "id '{id}'"),
            Self::Mass(mass) => write!(f, "mass {mass}"),
            Self::Composition(composition) => write!(f, "composition '{composition}'"),
        }
    }
}

/// Maps every key of every record to all positions of records sharing that key. Lists are in
/// ascending position order, keys are never collapsed or overwritten.
#[derive(Clone, Debug, Default)]
pub struct MultiKeyIndex {
    positions: HashMap<IndexKey, Vec<usize>>,
}

impl MultiKeyIndex {
    /// Index all records, using their position in the slice.
    pub fn build(records: &[ModificationRecord]) -> Self {
        let mut index = Self::default();
        for (position, record) in records.iter().enumerate() {
            index.add(position, record);
        }
        index
    }

    fn add(&mut self, position: usize, record: &ModificationRecord) {
        let names = self.positions.entry(IndexKey::name(&record.name)).or_default();
        if let Some(first) = names.first() {
            log::debug!(
                "Duplicate modification name '{}' at positions {first} and {position}",
                record.name
            );
        }
        names.push(position);
        self.positions
            .entry(IndexKey::Id(record.accession_id.clone()))
            .or_default()
            .push(position);
        if let Some(mass) = record.monoisotopic_mass {
            self.positions
                .entry(IndexKey::mass(mass))
                .or_default()
                .push(position);
        }
        // An empty composition means unknown, so it is not a key
        if !record.composition.is_empty() {
            self.positions
                .entry(IndexKey::Composition(
                    record.composition_key().into_boxed_str(),
                ))
                .or_default()
                .push(position);
        }
    }

    /// All positions for this key, empty if the key is unknown
    pub fn get(&self, key: &IndexKey) -> &[usize] {
        self.positions.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// The lowest position for this key
    pub fn first(&self, key: &IndexKey) -> Option<usize> {
        self.get(key).iter().min().copied()
    }

    /// See if this key is known
    pub fn contains(&self, key: &IndexKey) -> bool {
        self.positions.contains_key(key)
    }

    /// The number of distinct keys
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// See if there are no keys at all
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// All names that are used by more than one record, sorted
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .positions
            .iter()
            .filter_map(|(key, positions)| match key {
                IndexKey::Name(name) if positions.len() > 1 => Some(name.as_ref()),
                _ => None,
            })
            .collect();
        names.sort_unstable();
        names
    }
}
