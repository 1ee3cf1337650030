//! # Mapping modifications
//! This library maps chemical modifications between their names, accessions, monoisotopic
//! masses, and elemental compositions, based on one or more Unimod style reference files. Start
//! by building a [`Registry`] from a [`MapperConfig`].
//!
//! Handles:
//! * Exact lookups between all keys ([`Registry::name_to_ids`], [`Registry::id_to_masses`], [`Registry::composition_to_names`], ...)
//! * Approximate mass lookups ([`Registry::approximate_mass_to_names`], [`Registry::mass_range_to_ids`])
//! * Combinations of modifications that sum up to a mass ([`Registry::mass_to_combos`])
//! * Resolving user given modification lists against the registry ([`Registry::map_mods`])
//! * Writing user defined modifications ([`Registry::write_user_record`])
//!
//! Names are not unique over multiple reference files, all lookups return every match in record
//! order and the 'first' lookups always return the record with the lowest position. Earlier
//! sources in the configuration get lower positions.
//!
//! ```rust
//! use modmap::{Composition, ModificationIntent, ModificationRecord, Registry};
//! let registry = Registry::from_records([ModificationRecord::new(
//!     35,
//!     "Oxidation",
//!     Some(15.994915),
//!     Composition::from_iter([("O", 1)]),
//! )
//! .with_specificity("M", "Post-translational")]);
//! assert_eq!(registry.name_to_first_id("Oxidation").map(|id| id.as_str()), Some("35"));
//! assert_eq!(registry.composition_to_names("O(1)"), vec!["Oxidation"]);
//!
//! let (mapped, warnings) = registry
//!     .map_mods(&[ModificationIntent::new("M", "opt", "any").with_name("Oxidation")], None)
//!     .unwrap();
//! assert!(warnings.is_empty());
//! assert_eq!(mapped.optional[0].mass, Some(15.994915));
//! ```
//!
//! # Logging
//! Messages are emitted with the [`log`] facade, no logger is installed by this library.

mod combos;
mod composition;
mod config;
mod error;
mod hash_reader;
mod index;
mod legacy;
mod query;
mod reconcile;
mod record;
mod registry;
mod source;
mod table;

pub use combos::*;
pub use composition::*;
pub use config::*;
pub use error::*;
pub use index::*;
pub use reconcile::*;
pub use record::*;
pub use registry::*;
pub use source::*;
pub use table::*;
