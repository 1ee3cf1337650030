//! The tabular view, one row per record, specificity, and neutral loss.

use crate::{AccessionId, Composition, ModificationRecord};

/// A single row of the [`ModificationTable`]. The site fields are `None` for records without
/// (non artefact) specificities, the loss fields are `None` for sites without neutral losses.
#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    /// The position of the record this row derives from
    pub position: usize,
    /// The record name
    pub name: Box<str>,
    /// The record accession
    pub accession_id: AccessionId,
    /// The record mass
    pub monoisotopic_mass: Option<f64>,
    /// The record composition
    pub composition: Composition,
    /// The site
    pub site: Option<Box<str>>,
    /// The classification of this site
    pub classification: Option<Box<str>>,
    /// The composition of the neutral loss on this site
    pub neutral_loss_composition: Option<Composition>,
    /// The mass of the neutral loss on this site
    pub neutral_loss_mass: Option<f64>,
}

/// The flattened view on all records, in record order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModificationTable {
    rows: Vec<TableRow>,
}

impl ModificationTable {
    /// Expand all records into rows
    pub fn build(records: &[ModificationRecord]) -> Self {
        let mut rows = Vec::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            let base = TableRow {
                position,
                name: record.name.clone(),
                accession_id: record.accession_id.clone(),
                monoisotopic_mass: record.monoisotopic_mass,
                composition: record.composition.clone(),
                site: None,
                classification: None,
                neutral_loss_composition: None,
                neutral_loss_mass: None,
            };
            if record.specificities.is_empty() {
                rows.push(base);
                continue;
            }
            for specificity in &record.specificities {
                let site_row = TableRow {
                    site: Some(specificity.site.clone()),
                    classification: Some(specificity.classification.clone()),
                    ..base.clone()
                };
                let mut losses = record
                    .neutral_losses
                    .iter()
                    .filter(|loss| loss.site == specificity.site)
                    .peekable();
                if losses.peek().is_none() {
                    rows.push(site_row);
                    continue;
                }
                for loss in losses {
                    rows.push(TableRow {
                        neutral_loss_composition: Some(loss.composition.clone()),
                        neutral_loss_mass: Some(loss.mass),
                        ..site_row.clone()
                    });
                }
            }
        }
        Self { rows }
    }

    /// All rows
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// The number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// See if there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
