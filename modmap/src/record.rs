//! The modification records as read from the reference sources.

use serde::{Deserialize, Serialize};

use crate::Composition;

/// The accession of a modification record. Reference records use numeric accessions (`35`),
/// user defined records use `u` prefixed ones (`u1`), so all accessions are kept as text.
/// Numbers can be used directly when looking up records.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct AccessionId(Box<str>);

impl AccessionId {
    /// Get the accession as text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// See if this is the empty accession, which is used for records without `record_id`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for AccessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccessionId {
    fn from(value: &str) -> Self {
        Self(value.trim().into())
    }
}

impl From<String> for AccessionId {
    fn from(value: String) -> Self {
        value.as_str().into()
    }
}

impl From<&String> for AccessionId {
    fn from(value: &String) -> Self {
        value.as_str().into()
    }
}

impl From<&Self> for AccessionId {
    fn from(value: &Self) -> Self {
        value.clone()
    }
}

macro_rules! numeric_accession {
    ($($t:ty),+) => {
        $(
            impl From<$t> for AccessionId {
                fn from(value: $t) -> Self {
                    Self(value.to_string().into_boxed_str())
                }
            }
        )+
    };
}

numeric_accession!(u32, u64, usize, i32, i64);

impl Serialize for AccessionId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAccession {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl<'de> Deserialize<'de> for AccessionId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawAccession::deserialize(deserializer)? {
            RawAccession::Text(text) => text.into(),
            RawAccession::Unsigned(number) => number.into(),
            RawAccession::Signed(number) => number.into(),
        })
    }
}

/// A site a modification can be placed on, with its classification (eg `Post-translational`).
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Specificity {
    /// The site, an amino acid one letter code or a terminal (`N-term`, `C-term`, ...)
    pub site: Box<str>,
    /// The classification as given in the reference source
    pub classification: Box<str>,
}

impl Specificity {
    /// Create a new specificity
    pub fn new(site: impl Into<Box<str>>, classification: impl Into<Box<str>>) -> Self {
        Self {
            site: site.into(),
            classification: classification.into(),
        }
    }
}

/// A neutral loss that can occur for a modification on a specific site.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct NeutralLoss {
    /// The site this loss applies to
    pub site: Box<str>,
    /// The monoisotopic mass of the lost part
    pub mass: f64,
    /// The composition of the lost part
    pub composition: Composition,
}

/// A single modification definition.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ModificationRecord {
    /// The accession, empty if the source did not define one
    pub accession_id: AccessionId,
    /// The name, not necessarily unique in the registry
    pub name: Box<str>,
    /// The monoisotopic mass delta, `None` if the source did not define a delta
    pub monoisotopic_mass: Option<f64>,
    /// The composition delta, empty if unknown
    pub composition: Composition,
    /// All sites this modification is known for
    pub specificities: Vec<Specificity>,
    /// All known neutral losses (with non zero mass)
    pub neutral_losses: Vec<NeutralLoss>,
}

impl ModificationRecord {
    /// Create a new record without any specificities or neutral losses
    pub fn new(
        accession_id: impl Into<AccessionId>,
        name: impl Into<Box<str>>,
        monoisotopic_mass: Option<f64>,
        composition: Composition,
    ) -> Self {
        Self {
            accession_id: accession_id.into(),
            name: name.into(),
            monoisotopic_mass,
            composition,
            specificities: Vec::new(),
            neutral_losses: Vec::new(),
        }
    }

    /// Add a specificity
    #[must_use]
    pub fn with_specificity(mut self, site: &str, classification: &str) -> Self {
        self.specificities.push(Specificity::new(site, classification));
        self
    }

    /// Add a neutral loss, a loss with zero mass is ignored
    #[must_use]
    pub fn with_neutral_loss(mut self, site: &str, mass: f64, composition: Composition) -> Self {
        if mass != 0.0 {
            self.neutral_losses.push(NeutralLoss {
                site: site.into(),
                mass,
                composition,
            });
        }
        self
    }

    /// The canonical composition key of this record
    pub fn composition_key(&self) -> String {
        self.composition.hill_notation()
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn accession_from_numbers_and_text() {
        assert_eq!(AccessionId::from(35), AccessionId::from("35"));
        assert_eq!(AccessionId::from(35_u64), AccessionId::from(" 35 "));
        assert_eq!(AccessionId::from("u1").as_str(), "u1");
        assert!(AccessionId::default().is_empty());
    }

    #[test]
    fn accession_json() {
        let ids: Vec<AccessionId> = serde_json::from_str(r#"[35, "35", "u2", -1]"#).unwrap();
        assert_eq!(ids[0], ids[1]);
        assert_eq!(ids[2].as_str(), "u2");
        assert_eq!(ids[3].as_str(), "-1");
        assert_eq!(serde_json::to_string(&ids[0]).unwrap(), r#""35""#);
    }

    #[test]
    fn zero_neutral_loss_ignored() {
        let record = ModificationRecord::new(35, "Oxidation", Some(15.994915), Composition::new())
            .with_specificity("M", "Post-translational")
            .with_neutral_loss("M", 0.0, Composition::new())
            .with_neutral_loss("M", 63.998285, Composition::from_iter([("C", 1), ("H", 4)]));
        assert_eq!(record.specificities.len(), 1);
        assert_eq!(record.neutral_losses.len(), 1);
        assert_eq!(record.neutral_losses[0].mass, 63.998285);
    }
}
