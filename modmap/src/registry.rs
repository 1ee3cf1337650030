//! The registry, all records with the index, tabular view, and combination tables derived from them.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use context_error::*;

use crate::{
    AccessionId, Combo, ComboTable, Composition, MapperConfig, MapperError, MapperIssue,
    MassWindow, ModificationRecord, ModificationTable, MultiKeyIndex, ReferenceSource,
    SourceVersion, Specificity,
    source::{load_sources, read_source, write_user_records},
};

/// The in memory registry of modification records.
///
/// The records are kept in source order, earlier sources get lower positions. The index and the
/// tabular view are built together with the records and are never updated in place, any change
/// (writing a user record) rebuilds everything from the sources. The combination tables are
/// built on request per arity with [`Self::combo_table`] and are dropped on every rebuild.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    config: MapperConfig,
    /// Records given directly instead of through a source, these always come first
    seed: Vec<ModificationRecord>,
    records: Vec<ModificationRecord>,
    index: MultiKeyIndex,
    table: ModificationTable,
    combos: HashMap<usize, ComboTable>,
    versions: Vec<SourceVersion>,
}

impl Registry {
    /// Build the registry from all sources in the configuration.
    /// # Errors
    /// If the primary or any required source is missing, or any existing source could not be
    /// read or parsed.
    pub fn build(config: MapperConfig) -> Result<Self, MapperIssue> {
        let mut registry = Self {
            config,
            ..Self::default()
        };
        registry.rebuild()?;
        Ok(registry)
    }

    /// Build a registry directly from records, without any sources.
    pub fn from_records(records: impl IntoIterator<Item = ModificationRecord>) -> Self {
        let mut registry = Self {
            seed: records.into_iter().collect(),
            ..Self::default()
        };
        registry.records = registry.seed.clone();
        registry.derive();
        registry
    }

    /// Discard all records and derived structures and read all sources again.
    /// # Errors
    /// If the primary or any required source is missing, or any existing source could not be
    /// read or parsed. The registry is left unchanged in that case.
    pub fn rebuild(&mut self) -> Result<(), MapperIssue> {
        let (loaded, versions) = load_sources(&self.config.sources)?;
        let mut records = self.seed.clone();
        records.extend(loaded);
        self.records = records;
        self.versions = versions;
        self.derive();
        log::info!(
            "Registry built with {} records from {} sources",
            self.records.len(),
            self.versions.len()
        );
        Ok(())
    }

    fn derive(&mut self) {
        self.index = MultiKeyIndex::build(&self.records);
        self.table = ModificationTable::build(&self.records);
        self.combos.clear();
    }

    /// All records, in position order
    pub fn records(&self) -> &[ModificationRecord] {
        &self.records
    }

    /// The record at this position
    pub fn record(&self, position: usize) -> Option<&ModificationRecord> {
        self.records.get(position)
    }

    /// The number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// See if there are no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The index on all records
    pub const fn index(&self) -> &MultiKeyIndex {
        &self.index
    }

    /// The tabular view on all records
    pub const fn table(&self) -> &ModificationTable {
        &self.table
    }

    /// The versions of all sources that were read, in order
    pub fn versions(&self) -> &[SourceVersion] {
        &self.versions
    }

    /// The configuration used
    pub const fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Get the combination table for this arity, building it if this is the first request since
    /// the last rebuild. Building is `O(distinct_masses^arity)`.
    pub fn combo_table(&mut self, arity: usize) -> &ComboTable {
        self.combos
            .entry(arity)
            .or_insert_with(|| ComboTable::build(&self.table, arity))
    }

    /// Get the combination table for this arity if it was built already.
    pub fn built_combo_table(&self, arity: usize) -> Option<&ComboTable> {
        self.combos.get(&arity)
    }

    /// All combinations of `arity` modifications (with replacement) with their summed mass in
    /// the [`MassWindow`] around `target`, sorted on mass.
    pub fn mass_to_combos(&mut self, target: f64, arity: usize, decimals: u8) -> Vec<Combo> {
        self.combo_table(arity)
            .search(MassWindow::around(target, decimals))
            .to_vec()
    }

    /// Write a new user defined modification to a user source and rebuild the registry. If no
    /// target is given the first optional source of the configuration is used. All records
    /// already in the target are kept. If the modification has no id it gets `u<n>` with `n` the
    /// number of records in the new file. A target that is not yet a source of this registry is
    /// added as optional source.
    /// # Errors
    /// If there is no target, the existing target could not be read, the target could not be
    /// written, or the rebuild failed.
    pub fn write_user_record(
        &mut self,
        modification: UserModification,
        target: Option<&Path>,
    ) -> Result<AccessionId, MapperIssue> {
        let path: PathBuf = target
            .or_else(|| self.config.user_source())
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                BoxedError::small(
                    MapperError::SourceCouldNotBeWritten,
                    "No user source",
                    "No path was given and the configuration does not have an optional source to write user modifications to",
                )
            })?;

        let mut records = if path.exists() {
            read_source(&path)?.0
        } else {
            Vec::new()
        };

        let id = match modification.id {
            Some(id) if !id.is_empty() => id,
            _ => {
                let mut n = records.len() + 1;
                while records
                    .iter()
                    .any(|r| r.accession_id.as_str() == format!("u{n}"))
                {
                    n += 1;
                }
                AccessionId::from(format!("u{n}"))
            }
        };
        let mut record = ModificationRecord::new(
            id.clone(),
            modification.name,
            Some(modification.mass),
            modification.composition,
        );
        record.specificities = modification.specificities;
        records.push(record);

        write_user_records(&path, &records)?;
        log::info!(
            "Wrote user modification '{id}' to {} ({} records)",
            path.display(),
            records.len()
        );

        if !self.config.contains(&path) {
            self.config
                .sources
                .push(ReferenceSource::optional(path.clone()));
        }
        self.rebuild()?;
        Ok(id)
    }
}

/// A user defined modification to be written with [`Registry::write_user_record`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserModification {
    /// The name
    pub name: Box<str>,
    /// The monoisotopic mass
    pub mass: f64,
    /// The composition
    pub composition: Composition,
    /// The accession, generated if not given
    pub id: Option<AccessionId>,
    /// The sites this modification can be placed on
    pub specificities: Vec<Specificity>,
}

impl UserModification {
    /// Create a new user modification without id or sites
    pub fn new(name: impl Into<Box<str>>, mass: f64, composition: Composition) -> Self {
        Self {
            name: name.into(),
            mass,
            composition,
            id: None,
            specificities: Vec::new(),
        }
    }

    /// Set the accession
    #[must_use]
    pub fn with_id(mut self, id: impl Into<AccessionId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a site
    #[must_use]
    pub fn with_specificity(mut self, site: &str, classification: &str) -> Self {
        self.specificities.push(Specificity::new(site, classification));
        self
    }
}
