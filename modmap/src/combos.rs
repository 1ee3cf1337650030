//! Combinatorial mass sum search over the distinct masses in the tabular view.

use std::collections::HashSet;

use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::ModificationTable;

/// An inclusive mass window around a target. For `decimals` places the window is
/// `[value - 5·10^-(decimals+1), value + 4·10^-(decimals+1)]`, skewed toward lower masses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MassWindow {
    /// The lowest accepted mass
    pub lower: f64,
    /// The highest accepted mass
    pub upper: f64,
}

impl MassWindow {
    /// The window for a target known up to the given number of decimal places
    ///
    /// ```rust
    /// use modmap::MassWindow;
    /// let window = MassWindow::around(18.0, 0);
    /// assert!(window.contains(17.99));
    /// assert!(window.contains(18.4));
    /// assert!(!window.contains(18.5));
    /// assert!(!window.contains(17.4));
    /// ```
    pub fn around(value: f64, decimals: u8) -> Self {
        let step = 10_f64.powi(-i32::from(decimals) - 1);
        Self {
            lower: 5.0f64.mul_add(-step, value),
            upper: 4.0f64.mul_add(step, value),
        }
    }

    /// See if this mass lies in the window (bounds inclusive)
    pub fn contains(&self, mass: f64) -> bool {
        (self.lower..=self.upper).contains(&mass)
    }
}

/// A single combination: the summed mass and the names of the modifications that make it.
pub type Combo = (f64, Vec<Box<str>>);

/// All combinations with replacement of `arity` modifications, sorted on summed mass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComboTable {
    arity: usize,
    combos: Vec<Combo>,
}

impl ComboTable {
    /// Build the table for the given arity. The inputs are the distinct (mass, name) pairs of the
    /// table, in order of first appearance. The number of combinations grows as
    /// `distinct_masses^arity`, only small arities are practical.
    pub fn build(table: &ModificationTable, arity: usize) -> Self {
        let mut seen = HashSet::new();
        let pairs: Vec<(f64, &str)> = table
            .rows()
            .iter()
            .filter_map(|row| row.monoisotopic_mass.map(|mass| (mass, row.name.as_ref())))
            .filter(|(mass, name)| seen.insert((OrderedFloat(*mass), *name)))
            .collect();

        let mut combos: Vec<Combo> = if arity == 0 {
            Vec::new()
        } else {
            (0..pairs.len())
                .combinations_with_replacement(arity)
                .map(|combination| {
                    (
                        combination.iter().map(|i| pairs[*i].0).sum(),
                        combination.iter().map(|i| pairs[*i].1.into()).collect(),
                    )
                })
                .collect()
        };
        combos.sort_by(|a, b| a.0.total_cmp(&b.0));
        log::debug!(
            "Built combination table of arity {arity} with {} combinations from {} masses",
            combos.len(),
            pairs.len()
        );
        Self { arity, combos }
    }

    /// The number of modifications per combination
    pub const fn arity(&self) -> usize {
        self.arity
    }

    /// All combinations, sorted on mass
    pub fn combos(&self) -> &[Combo] {
        &self.combos
    }

    /// The number of combinations
    pub fn len(&self) -> usize {
        self.combos.len()
    }

    /// See if there are no combinations
    pub fn is_empty(&self) -> bool {
        self.combos.is_empty()
    }

    /// All combinations with their summed mass in the window
    pub fn search(&self, window: MassWindow) -> &[Combo] {
        let start = self.combos.partition_point(|c| c.0 < window.lower);
        let end = self.combos.partition_point(|c| c.0 <= window.upper);
        &self.combos[start..end.max(start)]
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::{Composition, ModificationRecord};

    fn table(masses: &[f64]) -> ModificationTable {
        let records: Vec<_> = masses
            .iter()
            .map(|m| ModificationRecord::new("", format!("{m:.2}"), Some(*m), Composition::new()))
            .collect();
        ModificationTable::build(&records)
    }

    #[test]
    fn window() {
        let window = MassWindow::around(9.030, 3);
        assert!(window.contains(9.030193));
        assert!(!window.contains(9.032697));
        let wider = MassWindow::around(9.030, 2);
        assert!(wider.contains(9.030193));
        assert!(wider.contains(9.032697));
        let zero = MassWindow::around(18.0, 0);
        assert!(zero.contains(17.99));
        assert!(!zero.contains(22.99));
    }

    #[test]
    fn pairs_zero_decimals() {
        let combos = ComboTable::build(&table(&[0.4, 0.5, 0.7, 1.1, 1.4, 1.5]), 2);
        assert_eq!(combos.len(), 21);
        let found = combos.search(MassWindow::around(1.0, 0));
        assert_eq!(found.len(), 6);
        assert!(found.windows(2).all(|w| w[0].0 <= w[1].0));
        let expected: Vec<Box<str>> = vec!["0.40".into(), "0.40".into()];
        assert_eq!(found[0].1, expected);
    }

    #[test]
    fn pairs_with_duplicates() {
        let combos = ComboTable::build(
            &table(&[0.34, 0.45, 0.60, 0.64, 0.45, 0.56, 0.67, 0.78]),
            2,
        );
        // The duplicate 0.45 is only used once
        assert_eq!(combos.len(), 28);
        assert_eq!(combos.search(MassWindow::around(1.0, 1)).len(), 3);
    }

    #[test]
    fn pairs_two_decimals() {
        let combos = ComboTable::build(
            &table(&[0.33, 0.45, 0.60, 0.64, 0.45, 0.56, 0.67, 0.78]),
            2,
        );
        let found = combos.search(MassWindow::around(1.0, 2));
        assert_eq!(found.len(), 1);
        let expected: Vec<Box<str>> = vec!["0.33".into(), "0.67".into()];
        assert_eq!(found[0].1, expected);
    }

    #[test]
    fn single_and_empty() {
        let combos = ComboTable::build(&table(&[1.0, 2.0]), 1);
        assert_eq!(combos.len(), 2);
        assert_eq!(combos.arity(), 1);
        assert!(ComboTable::build(&table(&[1.0]), 0).is_empty());
        assert!(combos.search(MassWindow::around(5.0, 2)).is_empty());
    }
}
