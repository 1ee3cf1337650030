//! Elemental compositions, their canonical Hill ordered key, and monoisotopic mass calculation.

use std::{
    collections::{BTreeMap, HashMap},
    num::{IntErrorKind, ParseIntError},
    str::FromStr,
};

use context_error::*;
use serde::{Deserialize, Serialize};

use crate::{MapperError, MapperIssue};

/// An elemental composition, a signed count per element symbol. Isotopes are written with their
/// mass number in front of the symbol (`13C`, `2H`). Element counts of zero are never stored.
///
/// ```rust
/// use modmap::Composition;
/// let a: Composition = "H(2) C(2) O".parse().unwrap();
/// let b = Composition::from_iter([("O", 1), ("C", 2), ("H", 2)]);
/// assert_eq!(a, b);
/// assert_eq!(a.hill_notation(), "C(2)H(2)O(1)");
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Composition(BTreeMap<Box<str>, i32>);

impl Composition {
    /// Create an empty composition
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add the given amount of an element, removing the element if the total reaches zero. The
    /// total saturates at the bounds of `i32`, use [`Self::checked_add`] to detect that.
    pub fn add(&mut self, symbol: &str, count: i32) {
        let total = self.get(symbol).saturating_add(count);
        self.set(symbol, total);
    }

    /// Add the given amount of an element, returning the new total. Returns `None` and leaves
    /// the composition untouched if the total does not fit in an `i32`.
    pub fn checked_add(&mut self, symbol: &str, count: i32) -> Option<i32> {
        let total = self.get(symbol).checked_add(count)?;
        self.set(symbol, total);
        Some(total)
    }

    fn set(&mut self, symbol: &str, total: i32) {
        if total == 0 {
            self.0.remove(symbol);
        } else {
            self.0.insert(symbol.into(), total);
        }
    }

    /// Get the count for this element (zero if absent)
    pub fn get(&self, symbol: &str) -> i32 {
        self.0.get(symbol).copied().unwrap_or_default()
    }

    /// See if this composition does not contain any elements
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of distinct elements
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// All elements with their counts, in lexicographic symbol order
    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.0.iter().map(|(s, n)| (s.as_ref(), *n))
    }

    /// The canonical key for this composition: carbon and hydrogen first (if present), then all
    /// other elements in lexicographic order, each written as `Symbol(count)`. Two compositions
    /// with the same elements always give the same key, regardless of insertion order.
    pub fn hill_notation(&self) -> String {
        ["C", "H"]
            .iter()
            .filter_map(|major| self.0.get_key_value(*major))
            .chain(
                self.0
                    .iter()
                    .filter(|(symbol, _)| !matches!(symbol.as_ref(), "C" | "H")),
            )
            .map(|(symbol, count)| format!("{symbol}({count})"))
            .collect()
    }

    /// The Unimod style notation, space separated with the count left out if it is one.
    pub fn unimod_notation(&self) -> String {
        ["C", "H"]
            .iter()
            .filter_map(|major| self.0.get_key_value(*major))
            .chain(
                self.0
                    .iter()
                    .filter(|(symbol, _)| !matches!(symbol.as_ref(), "C" | "H")),
            )
            .map(|(symbol, count)| {
                if *count == 1 {
                    symbol.to_string()
                } else {
                    format!("{symbol}({count})")
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for Composition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hill_notation())
    }
}

impl<S: AsRef<str>> FromIterator<(S, i32)> for Composition {
    fn from_iter<T: IntoIterator<Item = (S, i32)>>(iter: T) -> Self {
        let mut composition = Self::new();
        for (symbol, count) in iter {
            composition.add(symbol.as_ref(), count);
        }
        composition
    }
}

impl<'de> Deserialize<'de> for Composition {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::<Box<str>, i32>::deserialize(deserializer).map(|map| map.into_iter().collect())
    }
}

fn invalid_composition(text: &str, explanation: impl Into<String>) -> MapperIssue {
    BoxedError::new(
        MapperError::InvalidComposition,
        "Invalid composition",
        explanation.into(),
        Context::show(text.to_string()),
    )
}

const fn explain_number_error(error: &ParseIntError) -> &'static str {
    match error.kind() {
        IntErrorKind::Empty => "is empty",
        IntErrorKind::InvalidDigit => "contains an invalid character",
        IntErrorKind::NegOverflow => "is too small to fit in the internal representation",
        IntErrorKind::PosOverflow => "is too big to fit in the internal representation",
        _ => "is not a valid number",
    }
}

impl FromStr for Composition {
    type Err = MapperIssue;

    /// Parse the Unimod style (`H(3) C(2) N O`), the canonical key (`C(2)H(3)N(1)O(1)`), and
    /// compact Hill notation (`C2H3NO`, `H-1N1O2`). In compact notation isotopes have to be
    /// written with parentheses or separated by whitespace (`C2 13C(2)`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let bytes = value.as_bytes();
        let mut composition = Self::new();
        let mut index = 0;

        while index < bytes.len() {
            if bytes[index].is_ascii_whitespace() {
                index += 1;
                continue;
            }
            let start = index;
            while index < bytes.len() && bytes[index].is_ascii_digit() {
                index += 1;
            }
            if !bytes.get(index).is_some_and(u8::is_ascii_uppercase) {
                return Err(invalid_composition(
                    value,
                    format!(
                        "Unexpected character at position {index}, an element should start with a capital letter, optionally preceded by an isotope number. Eg: 'H(13) C(12) 13C(2) N O(3)'."
                    ),
                ));
            }
            index += 1;
            while index < bytes.len() && bytes[index].is_ascii_lowercase() {
                index += 1;
            }
            let symbol = &value[start..index];

            let count = if bytes.get(index) == Some(&b'(') {
                let close = value[index..]
                    .find(')')
                    .map(|offset| index + offset)
                    .ok_or_else(|| {
                        invalid_composition(value, "The amount of an element should be closed by ')'")
                    })?;
                let count = value[index + 1..close].trim().parse::<i32>().map_err(|err| {
                    invalid_composition(
                        value,
                        format!("The element amount {}", explain_number_error(&err)),
                    )
                })?;
                index = close + 1;
                count
            } else if bytes
                .get(index)
                .is_some_and(|b| *b == b'-' || b.is_ascii_digit())
            {
                // Compact Hill notation, the count directly follows the symbol
                let count_start = index;
                index += 1;
                while index < bytes.len() && bytes[index].is_ascii_digit() {
                    index += 1;
                }
                value[count_start..index].parse::<i32>().map_err(|err| {
                    invalid_composition(
                        value,
                        format!("The element amount {}", explain_number_error(&err)),
                    )
                })?
            } else {
                1
            };
            composition.checked_add(symbol, count).ok_or_else(|| {
                invalid_composition(
                    value,
                    format!("The total amount of '{symbol}' is too big to be stored"),
                )
            })?;
        }
        Ok(composition)
    }
}

/// Calculate the monoisotopic mass of a composition. Used for compositions that are not known in
/// the registry. Any `Fn(&Composition) -> Option<f64>` can be used as calculator.
pub trait MassCalculator {
    /// The monoisotopic mass, or `None` if this composition contains unknown elements.
    fn monoisotopic_mass(&self, composition: &Composition) -> Option<f64>;
}

impl<F: Fn(&Composition) -> Option<f64>> MassCalculator for F {
    fn monoisotopic_mass(&self, composition: &Composition) -> Option<f64> {
        self(composition)
    }
}

/// Monoisotopic masses of the elements and isotopes commonly found in modification definitions.
const MONOISOTOPIC_MASSES: &[(&str, f64)] = &[
    ("H", 1.00782503207),
    ("2H", 2.0141017778),
    ("Li", 7.01600455),
    ("B", 11.0093054),
    ("C", 12.0),
    ("13C", 13.0033548378),
    ("N", 14.0030740048),
    ("15N", 15.0001088982),
    ("O", 15.99491461956),
    ("18O", 17.9991610),
    ("F", 18.99840322),
    ("Na", 22.9897692809),
    ("Mg", 23.985041700),
    ("Al", 26.98153863),
    ("Si", 27.9769265325),
    ("P", 30.97376163),
    ("S", 31.97207100),
    ("Cl", 34.96885268),
    ("K", 38.96370668),
    ("Ca", 39.96259098),
    ("Cr", 51.9405075),
    ("Mn", 54.9380451),
    ("Fe", 55.9349375),
    ("Ni", 57.9353429),
    ("Co", 58.9331950),
    ("Cu", 62.9295975),
    ("Zn", 63.9291422),
    ("As", 74.9215965),
    ("Br", 78.9183371),
    ("Se", 79.9165213),
    ("Mo", 97.9054082),
    ("Pd", 105.903486),
    ("Ag", 106.905097),
    ("Cd", 113.9033585),
    ("I", 126.904473),
    ("Gd", 157.9241039),
    ("Pt", 194.9647911),
    ("Au", 196.9665687),
    ("Hg", 201.970643),
];

/// A [`MassCalculator`] backed by a table of monoisotopic element masses.
#[derive(Clone, Debug)]
pub struct ElementMasses {
    masses: HashMap<Box<str>, f64>,
}

impl Default for ElementMasses {
    fn default() -> Self {
        Self {
            masses: MONOISOTOPIC_MASSES
                .iter()
                .map(|(symbol, mass)| ((*symbol).into(), *mass))
                .collect(),
        }
    }
}

impl ElementMasses {
    /// Add or overwrite the mass of an element or isotope
    #[must_use]
    pub fn with_element(mut self, symbol: &str, mass: f64) -> Self {
        self.masses.insert(symbol.into(), mass);
        self
    }
}

impl MassCalculator for ElementMasses {
    fn monoisotopic_mass(&self, composition: &Composition) -> Option<f64> {
        composition.iter().try_fold(0.0, |total, (symbol, count)| {
            self.masses
                .get(symbol)
                .map(|mass| total + mass * f64::from(count))
        })
    }
}
