//! All lookups on a [`Registry`]. Every list is in record position order and an unknown key
//! results in an empty list or `None`, never in an error.

use context_error::*;
use itertools::Itertools;

use crate::{
    AccessionId, Composition, IndexKey, MapperError, MapperIssue, MassWindow, ModificationRecord,
    Registry, Specificity,
};

impl Registry {
    fn matching(&self, key: &IndexKey) -> impl Iterator<Item = &ModificationRecord> {
        self.index()
            .get(key)
            .iter()
            .filter_map(|position| self.record(*position))
    }

    /// The record with the lowest position for this key. Returns `None` (and logs) if the key is
    /// not known.
    pub fn lookup_first(&self, key: &IndexKey) -> Option<&ModificationRecord> {
        let record = self
            .index()
            .first(key)
            .and_then(|position| self.record(position));
        if record.is_none() {
            log::debug!("No modification found for {key}");
        }
        record
    }

    // Name based lookups

    /// All masses for records with this name, records without mass are skipped
    pub fn name_to_masses(&self, name: &str) -> Vec<f64> {
        self.matching(&IndexKey::name(name))
            .filter_map(|r| r.monoisotopic_mass)
            .collect()
    }

    /// All compositions for records with this name
    pub fn name_to_compositions(&self, name: &str) -> Vec<&Composition> {
        self.matching(&IndexKey::name(name))
            .map(|r| &r.composition)
            .collect()
    }

    /// All accessions for records with this name
    pub fn name_to_ids(&self, name: &str) -> Vec<&AccessionId> {
        self.matching(&IndexKey::name(name))
            .map(|r| &r.accession_id)
            .collect()
    }

    /// The mass of the first record with this name
    pub fn name_to_first_mass(&self, name: &str) -> Option<f64> {
        self.lookup_first(&IndexKey::name(name))
            .and_then(|r| r.monoisotopic_mass)
    }

    /// The composition of the first record with this name
    pub fn name_to_first_composition(&self, name: &str) -> Option<&Composition> {
        self.lookup_first(&IndexKey::name(name))
            .map(|r| &r.composition)
    }

    /// The accession of the first record with this name
    pub fn name_to_first_id(&self, name: &str) -> Option<&AccessionId> {
        self.lookup_first(&IndexKey::name(name))
            .map(|r| &r.accession_id)
    }

    /// The specificities of every record with this name
    pub fn name_to_specificities(&self, name: &str) -> Vec<&[Specificity]> {
        self.matching(&IndexKey::name(name))
            .map(|r| r.specificities.as_slice())
            .collect()
    }

    /// All distinct sites of all records with this name
    pub fn name_to_specificity_sites(&self, name: &str) -> Vec<&str> {
        self.matching(&IndexKey::name(name))
            .flat_map(|r| r.specificities.iter().map(|s| s.site.as_ref()))
            .unique()
            .collect()
    }

    /// All (site, neutral loss mass) pairs of all records with this name
    pub fn name_to_neutral_losses(&self, name: &str) -> Vec<(&str, f64)> {
        self.table()
            .rows()
            .iter()
            .filter(|row| &*row.name == name)
            .filter_map(|row| row.site.as_deref().zip(row.neutral_loss_mass))
            .collect()
    }

    // Accession based lookups

    /// All masses for records with this accession
    pub fn id_to_masses(&self, id: impl Into<AccessionId>) -> Vec<f64> {
        self.matching(&IndexKey::id(id))
            .filter_map(|r| r.monoisotopic_mass)
            .collect()
    }

    /// All compositions for records with this accession
    pub fn id_to_compositions(&self, id: impl Into<AccessionId>) -> Vec<&Composition> {
        self.matching(&IndexKey::id(id))
            .map(|r| &r.composition)
            .collect()
    }

    /// All names for records with this accession
    pub fn id_to_names(&self, id: impl Into<AccessionId>) -> Vec<&str> {
        self.matching(&IndexKey::id(id))
            .map(|r| r.name.as_ref())
            .collect()
    }

    /// The mass of the first record with this accession
    pub fn id_to_first_mass(&self, id: impl Into<AccessionId>) -> Option<f64> {
        self.lookup_first(&IndexKey::id(id))
            .and_then(|r| r.monoisotopic_mass)
    }

    /// The composition of the first record with this accession
    pub fn id_to_first_composition(&self, id: impl Into<AccessionId>) -> Option<&Composition> {
        self.lookup_first(&IndexKey::id(id))
            .map(|r| &r.composition)
    }

    /// The name of the first record with this accession
    pub fn id_to_first_name(&self, id: impl Into<AccessionId>) -> Option<&str> {
        self.lookup_first(&IndexKey::id(id))
            .map(|r| r.name.as_ref())
    }

    // Exact mass lookups

    /// All names for records with exactly this mass
    pub fn mass_to_names(&self, mass: f64) -> Vec<&str> {
        self.matching(&IndexKey::mass(mass))
            .map(|r| r.name.as_ref())
            .collect()
    }

    /// All accessions for records with exactly this mass
    pub fn mass_to_ids(&self, mass: f64) -> Vec<&AccessionId> {
        self.matching(&IndexKey::mass(mass))
            .map(|r| &r.accession_id)
            .collect()
    }

    /// All compositions for records with exactly this mass
    pub fn mass_to_compositions(&self, mass: f64) -> Vec<&Composition> {
        self.matching(&IndexKey::mass(mass))
            .map(|r| &r.composition)
            .collect()
    }

    // Composition lookups, the composition has to be in canonical Hill notation

    /// All names for records with this composition
    pub fn composition_to_names(&self, composition: &str) -> Vec<&str> {
        self.matching(&IndexKey::composition(composition))
            .map(|r| r.name.as_ref())
            .collect()
    }

    /// All accessions for records with this composition
    pub fn composition_to_ids(&self, composition: &str) -> Vec<&AccessionId> {
        self.matching(&IndexKey::composition(composition))
            .map(|r| &r.accession_id)
            .collect()
    }

    /// The mass of all records with this composition.
    /// # Errors
    /// If the records with this composition do not all have the same mass. This means the
    /// sources contradict each other and the registry cannot be trusted.
    pub fn composition_to_mass(&self, composition: &str) -> Result<Option<f64>, MapperIssue> {
        let masses: Vec<f64> = self
            .matching(&IndexKey::composition(composition))
            .filter_map(|r| r.monoisotopic_mass)
            .unique_by(|m| m.to_bits())
            .collect();
        if masses.len() > 1 {
            return Err(BoxedError::new(
                MapperError::InconsistentComposition,
                "Composition with multiple masses",
                format!(
                    "The composition '{composition}' is defined with {} different masses: {}",
                    masses.len(),
                    masses.iter().join(", ")
                ),
                Context::show(composition.to_string()),
            ));
        }
        Ok(masses.first().copied())
    }

    // Approximate mass lookups

    fn approximate(&self, value: f64, decimals: u8) -> impl Iterator<Item = &ModificationRecord> {
        let factor = 10_f64.powi(i32::from(decimals));
        self.records().iter().filter(move |r| {
            r.monoisotopic_mass.is_some_and(|mass| {
                ((mass * factor).round_ties_even() / factor - value).abs() <= f64::EPSILON
            })
        })
    }

    /// The accessions of all records whose mass rounded to `decimals` places equals `value`
    pub fn approximate_mass_to_ids(&self, value: f64, decimals: u8) -> Vec<&AccessionId> {
        self.approximate(value, decimals)
            .map(|r| &r.accession_id)
            .collect()
    }

    /// The names of all records whose mass rounded to `decimals` places equals `value`
    pub fn approximate_mass_to_names(&self, value: f64, decimals: u8) -> Vec<&str> {
        self.approximate(value, decimals)
            .map(|r| r.name.as_ref())
            .collect()
    }

    /// The compositions of all records whose mass rounded to `decimals` places equals `value`
    pub fn approximate_mass_to_compositions(&self, value: f64, decimals: u8) -> Vec<&Composition> {
        self.approximate(value, decimals)
            .map(|r| &r.composition)
            .collect()
    }

    // Mass range lookups

    fn in_range(&self, value: f64, decimals: u8) -> impl Iterator<Item = &ModificationRecord> {
        let window = MassWindow::around(value, decimals);
        self.records()
            .iter()
            .filter(move |r| r.monoisotopic_mass.is_some_and(|mass| window.contains(mass)))
    }

    /// The distinct accessions of all records with a mass in the [`MassWindow`] around `value`
    pub fn mass_range_to_ids(&self, value: f64, decimals: u8) -> Vec<&AccessionId> {
        self.in_range(value, decimals)
            .map(|r| &r.accession_id)
            .unique()
            .collect()
    }

    /// The distinct names of all records with a mass in the [`MassWindow`] around `value`
    pub fn mass_range_to_names(&self, value: f64, decimals: u8) -> Vec<&str> {
        self.in_range(value, decimals)
            .map(|r| r.name.as_ref())
            .unique()
            .collect()
    }

    /// The compositions of all records with a mass in the [`MassWindow`] around `value`, not
    /// de-duplicated
    pub fn mass_range_to_compositions(&self, value: f64, decimals: u8) -> Vec<&Composition> {
        self.in_range(value, decimals)
            .map(|r| &r.composition)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::from_records([
            ModificationRecord::new(
                1,
                "Acetyl",
                Some(42.010565),
                Composition::from_iter([("H", 2), ("C", 2), ("O", 1)]),
            )
            .with_specificity("K", "Post-translational")
            .with_specificity("N-term", "Post-translational"),
            ModificationRecord::new(
                35,
                "Oxidation",
                Some(15.994915),
                Composition::from_iter([("O", 1)]),
            )
            .with_specificity("M", "Post-translational")
            .with_neutral_loss(
                "M",
                63.998285,
                Composition::from_iter([("H", 4), ("C", 1), ("O", 1), ("S", 1)]),
            ),
            ModificationRecord::new(
                "u1",
                "Acetyl",
                Some(42.010565),
                Composition::from_iter([("C", 2), ("O", 1), ("H", 2)]),
            )
            .with_specificity("K", "Other"),
            ModificationRecord::new("", "Unknown", None, Composition::new()),
        ])
    }

    #[test]
    fn by_name() {
        let registry = registry();
        assert_eq!(registry.name_to_masses("Acetyl"), vec![42.010565, 42.010565]);
        assert_eq!(
            registry
                .name_to_ids("Acetyl")
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>(),
            vec!["1", "u1"]
        );
        assert_eq!(registry.name_to_first_id("Acetyl"), Some(&AccessionId::from(1)));
        assert_eq!(registry.name_to_specificity_sites("Acetyl"), vec!["K", "N-term"]);
        assert_eq!(registry.name_to_specificities("Acetyl").len(), 2);
        assert_eq!(registry.name_to_neutral_losses("Oxidation"), vec![("M", 63.998285)]);
        assert!(registry.name_to_neutral_losses("Acetyl").is_empty());
        assert!(registry.name_to_masses("Unknown").is_empty());
        assert!(registry.name_to_ids("Nothing").is_empty());
        assert_eq!(registry.name_to_first_mass("Nothing"), None);
    }

    #[test]
    fn by_id() {
        let registry = registry();
        assert_eq!(registry.id_to_names(35), vec!["Oxidation"]);
        assert_eq!(registry.id_to_names("35"), vec!["Oxidation"]);
        assert_eq!(registry.id_to_first_mass(35_u64), Some(15.994915));
        assert_eq!(registry.id_to_first_name("u1"), Some("Acetyl"));
        assert_eq!(
            registry.id_to_first_composition(1).map(Composition::hill_notation),
            Some("C(2)H(2)O(1)".to_string())
        );
        assert!(registry.id_to_masses(999).is_empty());
        assert_eq!(registry.id_to_names(""), vec!["Unknown"]);
    }

    #[test]
    fn by_mass_and_composition() {
        let registry = registry();
        assert_eq!(registry.mass_to_names(42.010565), vec!["Acetyl", "Acetyl"]);
        assert!(registry.mass_to_names(42.0106).is_empty());
        assert_eq!(registry.composition_to_names("C(2)H(2)O(1)"), vec!["Acetyl", "Acetyl"]);
        assert_eq!(registry.composition_to_mass("C(2)H(2)O(1)").unwrap(), Some(42.010565));
        assert_eq!(registry.composition_to_mass("C(9)").unwrap(), None);
        // Only the canonical form is accepted
        assert!(registry.composition_to_names("H(2)C(2)O(1)").is_empty());
    }

    #[test]
    fn inconsistent_composition() {
        let registry = Registry::from_records([
            ModificationRecord::new(1, "A", Some(1.0), Composition::from_iter([("O", 1)])),
            ModificationRecord::new(2, "B", Some(2.0), Composition::from_iter([("O", 1)])),
        ]);
        let error = registry.composition_to_mass("O(1)").unwrap_err();
        assert!(matches!(
            error.get_kind(),
            MapperError::InconsistentComposition
        ));
        assert_eq!(registry.composition_to_names("O(1)"), vec!["A", "B"]);
        assert_eq!(registry.composition_to_ids("O(1)").len(), 2);
    }

    #[test]
    fn approximate_and_range() {
        let registry = registry();
        assert_eq!(registry.approximate_mass_to_names(16.0, 0), vec!["Oxidation"]);
        assert_eq!(registry.approximate_mass_to_names(15.99, 2), vec!["Oxidation"]);
        assert!(registry.approximate_mass_to_names(15.9, 1).is_empty());
        assert_eq!(registry.approximate_mass_to_ids(42.01, 2).len(), 2);
        assert_eq!(registry.mass_range_to_names(42.0, 1), vec!["Acetyl"]);
        assert_eq!(registry.mass_range_to_ids(42.0, 1).len(), 2);
        assert_eq!(registry.mass_range_to_compositions(42.0, 1).len(), 2);
        assert!(registry.mass_range_to_names(43.0, 1).is_empty());
    }

    #[test]
    fn first_lookup_logs_and_returns_none() {
        let registry = registry();
        assert!(registry.lookup_first(&IndexKey::name("Nothing")).is_none());
        assert_eq!(
            registry
                .lookup_first(&IndexKey::mass(42.010565))
                .map(|r| r.accession_id.as_str()),
            Some("1")
        );
    }
}
