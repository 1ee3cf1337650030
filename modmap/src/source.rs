//! Reading and writing Unimod style reference sources.
//!
//! A source is an XML file (optionally gzipped) with `mod` elements. Every `mod` has a `title`
//! and `record_id`, a `delta` with the monoisotopic mass and `element` children, and any number
//! of `specificity` elements that in turn can contain `NeutralLoss` elements. Namespaces are
//! ignored, so both the official `umod:` prefixed files and unprefixed files are read.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use context_error::*;
use roxmltree::{Document, Node, ParsingOptions};
use serde::{Deserialize, Serialize};

use crate::{
    AccessionId, Composition, MapperError, MapperIssue, ModificationRecord, NeutralLoss,
    Specificity, hash_reader::HashReader,
};

/// How a reference source is treated when it does not exist.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceRole {
    /// The main reference, a registry cannot be built without it
    Primary,
    /// A source that has to exist
    #[default]
    Required,
    /// A source that is skipped if it does not exist, eg the user defined modifications
    Optional,
}

/// A single reference source location.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ReferenceSource {
    /// The path, if it ends in `.gz` it is decompressed on the fly
    pub path: PathBuf,
    /// What to do if this source does not exist
    #[serde(default)]
    pub role: SourceRole,
}

impl ReferenceSource {
    /// A primary source
    pub fn primary(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            role: SourceRole::Primary,
        }
    }

    /// A required source
    pub fn required(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            role: SourceRole::Required,
        }
    }

    /// An optional source
    pub fn optional(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            role: SourceRole::Optional,
        }
    }
}

/// The version of a loaded source, identified by the sha256 of its (decompressed) content.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct SourceVersion {
    /// The path the source was read from
    pub path: PathBuf,
    /// The sha256 hash of the content
    pub hash: Vec<u8>,
    /// The number of records read from this source
    pub records: usize,
}

impl SourceVersion {
    /// Get the hash formatted as hex string.
    pub fn hash_hex(&self) -> String {
        self.hash.iter().map(|n| format!("{n:02x}")).collect()
    }
}

/// Load all given sources in order, skipping optional sources that do not exist.
/// # Errors
/// If a primary or required source does not exist or if any existing source could not be read
/// or parsed.
pub(crate) fn load_sources(
    sources: &[ReferenceSource],
) -> Result<(Vec<ModificationRecord>, Vec<SourceVersion>), MapperIssue> {
    let mut records = Vec::new();
    let mut versions = Vec::new();
    for source in sources {
        if !source.path.exists() {
            match source.role {
                SourceRole::Optional => {
                    log::info!(
                        "Optional reference source {} does not exist, skipped",
                        source.path.display()
                    );
                    continue;
                }
                SourceRole::Primary => {
                    return Err(BoxedError::new(
                        MapperError::MissingPrimarySource,
                        "Primary reference source does not exist",
                        "A registry cannot be built without its primary reference source",
                        Context::none().source(source.path.to_string_lossy()).to_owned(),
                    ));
                }
                SourceRole::Required => {
                    return Err(BoxedError::new(
                        MapperError::MissingSource,
                        "Reference source does not exist",
                        "This reference source is not optional",
                        Context::none().source(source.path.to_string_lossy()).to_owned(),
                    ));
                }
            }
        }
        let (parsed, version) = read_source(&source.path)?;
        log::info!(
            "Read {} modifications from {} (sha256 {})",
            parsed.len(),
            source.path.display(),
            version.hash_hex()
        );
        records.extend(parsed);
        versions.push(version);
    }
    Ok((records, versions))
}

/// Read all modifications from a single source file.
/// # Errors
/// If the file could not be opened, read, or parsed.
pub fn read_source(path: &Path) -> Result<(Vec<ModificationRecord>, SourceVersion), MapperIssue> {
    let file = File::open(path).map_err(|e| {
        BoxedError::new(
            MapperError::SourceCouldNotBeOpened,
            "Reference source could not be opened",
            e.to_string(),
            Context::none().source(path.to_string_lossy()).to_owned(),
        )
    })?;
    let compressed = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    let inner: Box<dyn Read> = if compressed {
        Box::new(flate2::bufread::GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    let mut reader = HashReader::new(inner);
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(|e| {
        BoxedError::new(
            MapperError::SourceCouldNotBeOpened,
            "Reference source could not be read",
            e.to_string(),
            Context::none().source(path.to_string_lossy()).to_owned(),
        )
    })?;
    let records = parse_modifications(&text, &path.to_string_lossy())?;
    let version = SourceVersion {
        path: path.to_path_buf(),
        hash: reader.hash(),
        records: records.len(),
    };
    Ok((records, version))
}

/// Parse all modifications from the text of a Unimod style XML file, in document order. The
/// `source` is only used in error messages.
/// # Errors
/// If the text is not valid XML, a `mod` misses its title, or a number could not be parsed.
pub fn parse_modifications(
    text: &str,
    source: &str,
) -> Result<Vec<ModificationRecord>, MapperIssue> {
    let document = Document::parse_with_options(
        text,
        ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        },
    )
    .map_err(|e| {
        BoxedError::new(
            MapperError::SourceCouldNotBeParsed,
            "Invalid XML in reference source",
            e.to_string(),
            Context::none().source(source.to_string()).to_owned(),
        )
    })?;

    document
        .descendants()
        .filter(|node| node.has_tag_name("mod"))
        .map(|node| parse_mod(node, source))
        .collect()
}

fn parse_error(source: &str, short: &str, long: impl Into<String>) -> MapperIssue {
    BoxedError::new(
        MapperError::SourceCouldNotBeParsed,
        short.to_string(),
        long.into(),
        Context::none().source(source.to_string()).to_owned(),
    )
}

fn number_attribute<T: FromStr>(
    node: Node<'_, '_>,
    attribute: &str,
    source: &str,
) -> Result<Option<T>, MapperIssue> {
    node.attribute(attribute)
        .map(|value| {
            value.trim().parse::<T>().map_err(|_| {
                parse_error(
                    source,
                    "Invalid number in reference source",
                    format!(
                        "The attribute '{attribute}' of element '{}' is not a valid number: '{value}'",
                        node.tag_name().name()
                    ),
                )
            })
        })
        .transpose()
}

/// The composition of a `delta` or `NeutralLoss` element, taken from its `element` children or
/// if there are none from the `composition` attribute.
fn parse_composition(node: Node<'_, '_>, source: &str) -> Result<Composition, MapperIssue> {
    let mut composition = Composition::new();
    let mut any_element = false;
    for element in node.children().filter(|n| n.has_tag_name("element")) {
        any_element = true;
        let symbol = element.attribute("symbol").ok_or_else(|| {
            parse_error(
                source,
                "Element without symbol",
                "Every 'element' should have a 'symbol' attribute",
            )
        })?;
        let number = number_attribute::<i32>(element, "number", source)?.unwrap_or(1);
        composition.checked_add(symbol, number).ok_or_else(|| {
            parse_error(
                source,
                "Element amount too big",
                format!("The total amount of '{symbol}' does not fit in a 32 bit number"),
            )
        })?;
    }
    // A composition of '0' is used for losses without any elements
    if !any_element
        && let Some(formula) = node.attribute("composition")
        && formula.trim() != "0"
    {
        composition = formula.parse()?;
    }
    Ok(composition)
}

fn parse_mod(node: Node<'_, '_>, source: &str) -> Result<ModificationRecord, MapperIssue> {
    let name = node.attribute("title").ok_or_else(|| {
        parse_error(
            source,
            "Modification without title",
            format!(
                "The modification with record_id '{}' does not have a title",
                node.attribute("record_id").unwrap_or_default()
            ),
        )
    })?;
    let mut record = ModificationRecord::new(
        AccessionId::from(node.attribute("record_id").unwrap_or_default()),
        name,
        None,
        Composition::new(),
    );

    for child in node.children() {
        if child.has_tag_name("delta") {
            record.monoisotopic_mass = number_attribute(child, "mono_mass", source)?;
            record.composition = parse_composition(child, source)?;
        } else if child.has_tag_name("specificity") {
            let site = child.attribute("site").unwrap_or_default();
            let classification = child.attribute("classification").unwrap_or_default();
            if classification == "Artefact" {
                continue;
            }
            record.specificities.push(Specificity::new(site, classification));
            for loss in child.children().filter(|n| n.has_tag_name("NeutralLoss")) {
                let mass = number_attribute::<f64>(loss, "mono_mass", source)?.unwrap_or(0.0);
                if mass == 0.0 {
                    continue;
                }
                record.neutral_losses.push(NeutralLoss {
                    site: site.into(),
                    mass,
                    composition: parse_composition(loss, source)?,
                });
            }
        }
    }
    Ok(record)
}

const UNIMOD_NAMESPACE: &str = "http://www.unimod.org/xmlns/schema/unimod_2";

#[derive(Serialize)]
struct UnimodDocument<'a> {
    #[serde(rename = "@xmlns:umod")]
    namespace: &'static str,
    #[serde(rename = "umod:modifications")]
    modifications: ModificationList<'a>,
}

#[derive(Serialize)]
struct ModificationList<'a> {
    #[serde(rename = "umod:mod")]
    mods: Vec<ModElement<'a>>,
}

#[derive(Serialize)]
struct ModElement<'a> {
    #[serde(rename = "@title")]
    title: &'a str,
    #[serde(rename = "@full_name")]
    full_name: &'a str,
    #[serde(rename = "@record_id")]
    record_id: &'a str,
    #[serde(rename = "umod:specificity")]
    specificities: Vec<SpecificityElement<'a>>,
    #[serde(rename = "umod:delta", skip_serializing_if = "Option::is_none")]
    delta: Option<DeltaElement<'a>>,
}

#[derive(Serialize)]
struct SpecificityElement<'a> {
    #[serde(rename = "@site")]
    site: &'a str,
    #[serde(rename = "@classification")]
    classification: &'a str,
    #[serde(rename = "umod:NeutralLoss")]
    neutral_losses: Vec<LossElement<'a>>,
}

#[derive(Serialize)]
struct LossElement<'a> {
    #[serde(rename = "@mono_mass")]
    mono_mass: f64,
    #[serde(rename = "@composition")]
    composition: String,
    #[serde(rename = "umod:element")]
    elements: Vec<ElementEntry<'a>>,
}

#[derive(Serialize)]
struct DeltaElement<'a> {
    #[serde(rename = "@mono_mass", skip_serializing_if = "Option::is_none")]
    mono_mass: Option<f64>,
    #[serde(rename = "@composition")]
    composition: String,
    #[serde(rename = "umod:element")]
    elements: Vec<ElementEntry<'a>>,
}

#[derive(Serialize)]
struct ElementEntry<'a> {
    #[serde(rename = "@symbol")]
    symbol: &'a str,
    #[serde(rename = "@number")]
    number: i32,
}

fn elements(composition: &Composition) -> Vec<ElementEntry<'_>> {
    composition
        .iter()
        .map(|(symbol, number)| ElementEntry { symbol, number })
        .collect()
}

impl<'a> From<&'a ModificationRecord> for ModElement<'a> {
    fn from(record: &'a ModificationRecord) -> Self {
        Self {
            title: &record.name,
            full_name: &record.name,
            record_id: record.accession_id.as_str(),
            specificities: record
                .specificities
                .iter()
                .map(|specificity| SpecificityElement {
                    site: &specificity.site,
                    classification: &specificity.classification,
                    neutral_losses: record
                        .neutral_losses
                        .iter()
                        .filter(|loss| loss.site == specificity.site)
                        .map(|loss| LossElement {
                            mono_mass: loss.mass,
                            composition: loss.composition.unimod_notation(),
                            elements: elements(&loss.composition),
                        })
                        .collect(),
                })
                .collect(),
            delta: (record.monoisotopic_mass.is_some() || !record.composition.is_empty()).then(
                || DeltaElement {
                    mono_mass: record.monoisotopic_mass,
                    composition: record.composition.unimod_notation(),
                    elements: elements(&record.composition),
                },
            ),
        }
    }
}

fn write_error(path: &Path, explanation: String) -> MapperIssue {
    BoxedError::new(
        MapperError::SourceCouldNotBeWritten,
        "User modifications could not be written",
        explanation,
        Context::none().source(path.to_string_lossy()).to_owned(),
    )
}

/// Serialise the records as a `umod:` namespaced Unimod document
fn records_to_xml(path: &Path, records: &[ModificationRecord]) -> Result<String, MapperIssue> {
    let document = UnimodDocument {
        namespace: UNIMOD_NAMESPACE,
        modifications: ModificationList {
            mods: records.iter().map(ModElement::from).collect(),
        },
    };
    let mut text =
        String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n");
    let mut serializer = quick_xml::se::Serializer::with_root(&mut text, Some("umod:unimod"))
        .map_err(|e| write_error(path, e.to_string()))?;
    serializer.indent(' ', 2);
    document
        .serialize(serializer)
        .map_err(|e| write_error(path, e.to_string()))?;
    text.push('\n');
    Ok(text)
}

/// Write the given records as a Unimod style XML file, overwriting any existing file. If the
/// path ends in `.gz` the file is gzipped. Masses are written with full precision, so reading
/// the file back gives identical records.
/// # Errors
/// If the records could not be serialised or the file could not be created or written to.
pub fn write_user_records(path: &Path, records: &[ModificationRecord]) -> Result<(), MapperIssue> {
    let text = records_to_xml(path, records)?;
    let file = File::create(path).map_err(|e| write_error(path, e.to_string()))?;
    let compressed = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    let written = if compressed {
        let mut encoder =
            flate2::write::GzEncoder::new(BufWriter::new(file), flate2::Compression::default());
        encoder
            .write_all(text.as_bytes())
            .and_then(|()| encoder.finish())
            .and_then(|mut writer| writer.flush())
    } else {
        let mut writer = BufWriter::new(file);
        writer
            .write_all(text.as_bytes())
            .and_then(|()| writer.flush())
    };
    written.map_err(|e| write_error(path, e.to_string()))
}
