//! Reconciliation of user given modification intents with the registry.
//!
//! An intent names a site and a fixed/optional type and identifies the modification by any of
//! composition, name, or accession. Every intent is resolved to a single registry record (or a
//! user defined modification for unknown compositions). Intents that cannot be resolved are
//! skipped, the reason is returned as a warning next to the result and logged.

use std::str::FromStr;

use context_error::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    AccessionId, Composition, IndexKey, MapperError, MapperIssue, MapperResult, MassCalculator,
    ModificationRecord, Registry,
};

/// A modification as requested by a user, the JSON form uses the keys `aa`, `type`, `position`,
/// `name`, `id`, `composition`, `mass`, and `neutral_loss`.
///
/// ```rust
/// use modmap::ModificationIntent;
/// let intents = ModificationIntent::list_from_json(
///     r#"[{"aa": "M", "type": "opt", "position": "any", "name": "Oxidation"},
///         {"aa": "C", "type": "fix", "position": "any", "id": 4, "neutral_loss": "unimod"}]"#,
/// ).unwrap();
/// assert_eq!(intents[1].id.as_ref().map(|id| id.as_str()), Some("4"));
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ModificationIntent {
    /// The site, an amino acid or `*` for any
    #[serde(rename = "aa", alias = "amino_acid")]
    pub amino_acid: Box<str>,
    /// The type, `fix` or `opt`, kept as text so an invalid type is reported per intent
    #[serde(rename = "type", alias = "mod_option")]
    pub mod_type: Box<str>,
    /// The position, eg `any` or `Prot-N-term`
    #[serde(default)]
    pub position: Box<str>,
    /// The name
    #[serde(
        default,
        alias = "unimod_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<Box<str>>,
    /// The accession
    #[serde(default, alias = "unimod_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<AccessionId>,
    /// The composition
    #[serde(
        default,
        alias = "chemical_formula",
        skip_serializing_if = "Option::is_none"
    )]
    pub composition: Option<CompositionSpec>,
    /// The monoisotopic mass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    /// What neutral loss to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neutral_loss: Option<NeutralLossDirective>,
    /// The JSON object this intent was read from, if any
    #[serde(skip)]
    pub payload: Option<serde_json::Value>,
}

impl ModificationIntent {
    /// Create an intent without any key, at least one of name, id, or composition has to be
    /// added to be resolvable.
    pub fn new(
        amino_acid: impl Into<Box<str>>,
        mod_type: impl Into<Box<str>>,
        position: impl Into<Box<str>>,
    ) -> Self {
        Self {
            amino_acid: amino_acid.into(),
            mod_type: mod_type.into(),
            position: position.into(),
            ..Self::default()
        }
    }

    /// Set the name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<Box<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the accession
    #[must_use]
    pub fn with_id(mut self, id: impl Into<AccessionId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the composition
    #[must_use]
    pub fn with_composition(mut self, composition: impl Into<CompositionSpec>) -> Self {
        self.composition = Some(composition.into());
        self
    }

    /// Set the mass
    #[must_use]
    pub const fn with_mass(mut self, mass: f64) -> Self {
        self.mass = Some(mass);
        self
    }

    /// Set the neutral loss directive
    #[must_use]
    pub const fn with_neutral_loss(mut self, neutral_loss: NeutralLossDirective) -> Self {
        self.neutral_loss = Some(neutral_loss);
        self
    }

    /// Read a list of intents from JSON.
    /// # Errors
    /// If the JSON is not a list of intents.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, MapperIssue> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json).map_err(|e| {
            BoxedError::new(
                MapperError::InvalidConfiguration,
                "Invalid modification list",
                e.to_string(),
                Context::show(json.to_string()),
            )
        })?;
        values.into_iter().map(Self::from_json_value).collect()
    }

    /// Read a single intent from a JSON object, the object is kept as [`Self::payload`].
    /// # Errors
    /// If the value is not a valid intent.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, MapperIssue> {
        let mut intent = Self::deserialize(&value).map_err(|e| {
            BoxedError::new(
                MapperError::InvalidConfiguration,
                "Invalid modification",
                e.to_string(),
                Context::show(value.to_string()),
            )
        })?;
        intent.payload = Some(value);
        Ok(intent)
    }

    /// The intent exactly as it was given: the JSON it was read from, or the serialised intent
    /// if it was built in code.
    pub fn original_payload(&self) -> serde_json::Value {
        self.payload.clone().unwrap_or_else(|| {
            serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
        })
    }
}

/// A composition as given in an intent, either as formula text or as element mapping.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CompositionSpec {
    /// Formula text, see [`Composition::from_str`] for the accepted notations
    Formula(Box<str>),
    /// Element counts
    Elements(Composition),
}

impl CompositionSpec {
    /// Get the composition.
    /// # Errors
    /// If the formula could not be parsed.
    pub fn resolve(&self) -> Result<Composition, MapperIssue> {
        match self {
            Self::Formula(formula) => formula.parse(),
            Self::Elements(composition) => Ok(composition.clone()),
        }
    }
}

impl From<Composition> for CompositionSpec {
    fn from(value: Composition) -> Self {
        Self::Elements(value)
    }
}

impl From<&str> for CompositionSpec {
    fn from(value: &str) -> Self {
        Self::Formula(value.into())
    }
}

/// The neutral loss to use, in JSON either `"unimod"` for the registry losses or a number.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "RawNeutralLoss", into = "RawNeutralLoss")]
pub enum NeutralLossDirective {
    /// Use the losses defined in the registry for this site
    Registry,
    /// Use this mass
    Mass(f64),
}

#[derive(Deserialize, Serialize)]
#[serde(untagged)]
enum RawNeutralLoss {
    Number(f64),
    Text(String),
}

impl TryFrom<RawNeutralLoss> for NeutralLossDirective {
    type Error = String;
    fn try_from(value: RawNeutralLoss) -> Result<Self, Self::Error> {
        match value {
            RawNeutralLoss::Number(mass) => Ok(Self::Mass(mass)),
            RawNeutralLoss::Text(text) if text.eq_ignore_ascii_case("unimod") => Ok(Self::Registry),
            RawNeutralLoss::Text(text) => text.trim().parse::<f64>().map(Self::Mass).map_err(|_| {
                format!("Invalid neutral loss '{text}', use 'unimod' or a mass")
            }),
        }
    }
}

impl From<NeutralLossDirective> for RawNeutralLoss {
    fn from(value: NeutralLossDirective) -> Self {
        match value {
            NeutralLossDirective::Registry => Self::Text("unimod".to_string()),
            NeutralLossDirective::Mass(mass) => Self::Number(mass),
        }
    }
}

/// Fixed or optional modification
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ModType {
    /// Placed on every matching site
    #[serde(rename = "fix", alias = "fixed")]
    Fixed,
    /// Possibly placed on matching sites
    #[serde(rename = "opt", alias = "optional")]
    Optional,
}

impl FromStr for ModType {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fix" | "fixed" => Ok(Self::Fixed),
            "opt" | "optional" => Ok(Self::Optional),
            _ => Err(()),
        }
    }
}

/// The resolved neutral loss
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedNeutralLoss {
    /// All registry loss masses for the site of the intent, possibly none
    Registry(Vec<f64>),
    /// The explicitly given mass
    Explicit(f64),
}

/// A fully resolved intent
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ResolvedModification {
    /// The index of the intent in the input list
    #[serde(rename = "_id")]
    pub sequence_index: usize,
    /// The site
    #[serde(rename = "aa")]
    pub amino_acid: Box<str>,
    /// The position
    pub position: Box<str>,
    /// The name
    pub name: Box<str>,
    /// The accession, `None` for user defined modifications without an explicit accession
    pub id: Option<AccessionId>,
    /// The monoisotopic mass, `None` only for user defined modifications if no mass was given
    /// and no calculator was available
    pub mass: Option<f64>,
    /// The composition
    pub composition: Composition,
    /// The neutral loss, `None` if the intent did not request any
    pub neutral_loss: Option<ResolvedNeutralLoss>,
    /// The intent this derives from, verbatim as given
    #[serde(rename = "org")]
    pub original: serde_json::Value,
    /// If this was resolved through the registry, false for user defined compositions
    #[serde(rename = "unimod")]
    pub registry: bool,
    /// Fixed or optional
    #[serde(rename = "type")]
    pub mod_type: ModType,
}

/// All resolved intents split on type, both in input order
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct MappedModifications {
    /// The fixed modifications
    #[serde(rename = "fix")]
    pub fixed: Vec<ResolvedModification>,
    /// The optional modifications
    #[serde(rename = "opt")]
    pub optional: Vec<ResolvedModification>,
}

impl MappedModifications {
    /// All resolved modifications, fixed first
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedModification> {
        self.fixed.iter().chain(self.optional.iter())
    }

    /// The total number of resolved modifications
    pub fn len(&self) -> usize {
        self.fixed.len() + self.optional.len()
    }

    /// See if nothing was resolved
    pub fn is_empty(&self) -> bool {
        self.fixed.is_empty() && self.optional.is_empty()
    }
}

fn signal(
    signals: &mut Vec<MapperIssue>,
    kind: MapperError,
    index: usize,
    short: &str,
    long: &str,
) {
    let issue = BoxedError::small(kind, short.to_string(), format!("Modification {index}: {long}"));
    log::warn!("{issue}");
    signals.push(issue);
}

impl Registry {
    /// Resolve all intents. The optional calculator is only used to get the mass of user defined
    /// compositions that are not in the registry and have no explicit mass.
    ///
    /// Per intent the first applicable of these is used:
    /// 1. A composition: the records with this composition, narrowed down by name (or id if no
    ///    name was given). If the composition is unknown it is used as user defined modification.
    /// 2. A name: all records with this name.
    /// 3. An id: all records with this accession.
    ///
    /// If multiple records remain the first (in record order) that agrees with all explicitly
    /// given fields is used, or the first if none agree. Any explicit field that disagrees with
    /// the selected record skips the intent. So this does not simply take the first record and
    /// then check for conflicts: name `Acetyl` with id `u1` resolves to the later `u1` record
    /// instead of being skipped for conflicting with the first `Acetyl`.
    /// # Errors
    /// Only if a composition maps to multiple masses in the registry, all other problems skip
    /// the intent and are returned as warnings.
    pub fn map_mods(
        &self,
        intents: &[ModificationIntent],
        calculator: Option<&dyn MassCalculator>,
    ) -> MapperResult<MappedModifications> {
        let mut mapped = MappedModifications::default();
        let mut signals = Vec::new();
        for (index, intent) in intents.iter().enumerate() {
            if let Some(resolved) = self.resolve(index, intent, calculator, &mut signals)? {
                match resolved.mod_type {
                    ModType::Fixed => mapped.fixed.push(resolved),
                    ModType::Optional => mapped.optional.push(resolved),
                }
            }
        }
        Ok((mapped, signals))
    }

    fn resolve(
        &self,
        index: usize,
        intent: &ModificationIntent,
        calculator: Option<&dyn MassCalculator>,
        signals: &mut Vec<MapperIssue>,
    ) -> Result<Option<ResolvedModification>, MapperIssue> {
        let Ok(mod_type) = intent.mod_type.parse::<ModType>() else {
            signal(
                signals,
                MapperError::InvalidModType,
                index,
                "Invalid modification type",
                &format!(
                    "'{}' is not a valid type, use 'fix' or 'opt'",
                    intent.mod_type
                ),
            );
            return Ok(None);
        };

        let (candidates, composition) = if let Some(spec) = &intent.composition {
            let composition = match spec.resolve() {
                Ok(composition) if !composition.is_empty() => composition,
                Ok(_) => {
                    signal(
                        signals,
                        MapperError::InvalidComposition,
                        index,
                        "Empty composition",
                        "The composition does not contain any elements",
                    );
                    return Ok(None);
                }
                Err(error) => {
                    log::warn!("{error}");
                    signals.push(error);
                    return Ok(None);
                }
            };
            let key = composition.hill_notation();
            let positions = self.index().get(&IndexKey::composition(&key));
            if positions.is_empty() {
                return Ok(Some(user_defined(
                    index,
                    intent,
                    mod_type,
                    composition,
                    calculator,
                    signals,
                )));
            }
            // A composition with multiple masses means the registry is not to be trusted
            self.composition_to_mass(&key)?;
            let narrowed: Vec<usize> = positions
                .iter()
                .copied()
                .filter(|p| {
                    self.record(*p).is_some_and(|record| match (&intent.name, &intent.id) {
                        (Some(name), _) => record.name == *name,
                        (None, Some(id)) => record.accession_id == *id,
                        (None, None) => true,
                    })
                })
                .collect();
            if narrowed.is_empty() {
                signal(
                    signals,
                    MapperError::Ambiguous,
                    index,
                    "Composition known under a different name",
                    &format!(
                        "The composition '{key}' is not known as '{}' but as: {}",
                        intent
                            .name
                            .as_deref()
                            .or_else(|| intent.id.as_ref().map(AccessionId::as_str))
                            .unwrap_or_default(),
                        positions
                            .iter()
                            .filter_map(|p| self.record(*p))
                            .map(|r| format!("{} ({})", r.name, r.accession_id))
                            .join(", ")
                    ),
                );
                return Ok(None);
            }
            (narrowed, Some(composition))
        } else if let Some(name) = &intent.name {
            let positions = self.index().get(&IndexKey::name(name));
            if positions.is_empty() {
                signal(
                    signals,
                    MapperError::Unmapped,
                    index,
                    "Unknown modification name",
                    &format!("'{name}' is not a known modification name, give a known name or accession or add the composition"),
                );
                return Ok(None);
            }
            (positions.to_vec(), None)
        } else if let Some(id) = &intent.id {
            let positions = self.index().get(&IndexKey::Id(id.clone()));
            if positions.is_empty() {
                signal(
                    signals,
                    MapperError::Unmapped,
                    index,
                    "Unknown modification accession",
                    &format!("'{id}' is not a known modification accession, give a known name or accession or add the composition"),
                );
                return Ok(None);
            }
            (positions.to_vec(), None)
        } else {
            signal(
                signals,
                MapperError::MissingKey,
                index,
                "No modification given",
                "Give at least one of name, id, or composition",
            );
            return Ok(None);
        };

        let candidates: Vec<&ModificationRecord> =
            candidates.iter().filter_map(|p| self.record(*p)).collect();
        let Some(record) = candidates
            .iter()
            .find(|record| disagreement(record, intent, composition.as_ref()).is_none())
            .or_else(|| candidates.first())
            .copied()
        else {
            return Ok(None);
        };
        if candidates.len() > 1 {
            signal(
                signals,
                MapperError::Disambiguated,
                index,
                "Multiple modifications matched",
                &format!(
                    "{} modifications matched, the first was taken: {} ({})",
                    candidates.len(),
                    record.name,
                    record.accession_id
                ),
            );
        }
        if let Some(field) = disagreement(record, intent, composition.as_ref()) {
            signal(
                signals,
                MapperError::Conflict,
                index,
                "Conflicting modification definition",
                &format!(
                    "The given {field} does not agree with the modification {} ({})",
                    record.name, record.accession_id
                ),
            );
            return Ok(None);
        }

        let neutral_loss = intent.neutral_loss.map(|directive| match directive {
            NeutralLossDirective::Registry => ResolvedNeutralLoss::Registry(
                self.name_to_neutral_losses(&record.name)
                    .into_iter()
                    .filter(|(site, _)| *site == &*intent.amino_acid)
                    .map(|(_, mass)| mass)
                    .collect(),
            ),
            NeutralLossDirective::Mass(mass) => ResolvedNeutralLoss::Explicit(mass),
        });

        Ok(Some(ResolvedModification {
            sequence_index: index,
            amino_acid: intent.amino_acid.clone(),
            position: intent.position.clone(),
            name: record.name.clone(),
            id: Some(record.accession_id.clone()),
            mass: record.monoisotopic_mass,
            composition: record.composition.clone(),
            neutral_loss,
            original: intent.original_payload(),
            registry: true,
            mod_type,
        }))
    }
}

fn user_defined(
    index: usize,
    intent: &ModificationIntent,
    mod_type: ModType,
    composition: Composition,
    calculator: Option<&dyn MassCalculator>,
    signals: &mut Vec<MapperIssue>,
) -> ResolvedModification {
    let name: Box<str> = intent
        .name
        .clone()
        .unwrap_or_else(|| composition.hill_notation().into_boxed_str());
    let mass = intent
        .mass
        .or_else(|| calculator.and_then(|c| c.monoisotopic_mass(&composition)));
    signal(
        signals,
        MapperError::UserDefined,
        index,
        "User defined modification",
        &format!(
            "The composition '{}' is not known, it is used as user defined modification '{name}'{}",
            composition.hill_notation(),
            if mass.is_none() {
                " without a mass"
            } else {
                ""
            }
        ),
    );
    ResolvedModification {
        sequence_index: index,
        amino_acid: intent.amino_acid.clone(),
        position: intent.position.clone(),
        name,
        id: intent.id.clone(),
        mass,
        composition,
        neutral_loss: intent.neutral_loss.map(|directive| match directive {
            NeutralLossDirective::Registry => ResolvedNeutralLoss::Registry(Vec::new()),
            NeutralLossDirective::Mass(mass) => ResolvedNeutralLoss::Explicit(mass),
        }),
        original: intent.original_payload(),
        registry: false,
        mod_type,
    }
}

/// Check if the explicit fields of the intent agree with this record, returns the name of the
/// first field that does not agree.
fn disagreement(
    record: &ModificationRecord,
    intent: &ModificationIntent,
    composition: Option<&Composition>,
) -> Option<&'static str> {
    if intent.name.as_ref().is_some_and(|name| *name != record.name) {
        Some("name")
    } else if intent
        .id
        .as_ref()
        .is_some_and(|id| *id != record.accession_id)
    {
        Some("id")
    } else if intent
        .mass
        .is_some_and(|mass| record.monoisotopic_mass != Some(mass))
    {
        Some("mass")
    } else if composition.is_some_and(|composition| *composition != record.composition) {
        Some("composition")
    } else {
        None
    }
}
