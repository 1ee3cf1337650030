//! Build a registry from the bundled reference files and run lookups against it

use context_error::FullErrorContent;

use std::path::{Path, PathBuf};

use modmap::{
    AccessionId, Composition, MapperConfig, MapperError, ReferenceSource, Registry,
    UserModification,
};

fn data() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

fn registry() -> Registry {
    Registry::build(MapperConfig::in_directory(data())).unwrap()
}

fn ids(list: Vec<&AccessionId>) -> Vec<&str> {
    list.into_iter().map(AccessionId::as_str).collect()
}

#[test]
fn build_from_directory() {
    let registry = registry();
    assert_eq!(registry.len(), 18);
    assert_eq!(registry.versions().len(), 2);
    assert_eq!(registry.versions()[0].records, 16);
    assert_eq!(registry.versions()[1].records, 2);
    assert_eq!(registry.versions()[0].hash_hex().len(), 64);
    assert_eq!(registry.index().duplicate_names(), vec!["Acetyl"]);
}

#[test]
fn rebuild_is_idempotent() {
    let mut registry = registry();
    let records = registry.records().to_vec();
    let rows = registry.table().len();
    let versions = registry.versions().to_vec();
    registry.rebuild().unwrap();
    assert_eq!(registry.records(), records.as_slice());
    assert_eq!(registry.table().len(), rows);
    assert_eq!(registry.versions(), versions.as_slice());
}

#[test]
fn missing_primary_is_fatal() {
    let directory = tempfile::tempdir().unwrap();
    let error = Registry::build(MapperConfig::in_directory(directory.path())).unwrap_err();
    assert!(matches!(error.get_kind(), MapperError::MissingPrimarySource));
    assert!(error.get_kind().is_fatal());
}

#[test]
fn missing_required_is_fatal() {
    let error = Registry::build(
        MapperConfig::in_directory(data())
            .with_source(ReferenceSource::required(data().join("does_not_exist.xml"))),
    )
    .unwrap_err();
    assert!(matches!(error.get_kind(), MapperError::MissingSource));
}

#[test]
fn missing_optional_is_skipped() {
    let registry = Registry::build(MapperConfig::new([
        ReferenceSource::primary(data().join("unimod.xml")),
        ReferenceSource::optional(data().join("does_not_exist.xml")),
    ]))
    .unwrap();
    assert_eq!(registry.len(), 16);
    assert_eq!(registry.versions().len(), 1);
}

#[test]
fn gzipped_primary() {
    use std::io::Write;

    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("unimod.xml.gz");
    let mut encoder = flate2::write::GzEncoder::new(
        std::fs::File::create(&path).unwrap(),
        flate2::Compression::default(),
    );
    encoder
        .write_all(&std::fs::read(data().join("unimod.xml")).unwrap())
        .unwrap();
    encoder.finish().unwrap();

    let plain = registry();
    let compressed = Registry::build(MapperConfig::new([ReferenceSource::primary(&path)])).unwrap();
    assert_eq!(compressed.records(), &plain.records()[..16]);
    assert_eq!(compressed.versions()[0].hash, plain.versions()[0].hash);
}

#[test]
fn oxidation_round_trip() {
    let registry = registry();
    let id = registry.name_to_first_id("Oxidation").unwrap();
    assert_eq!(id.as_str(), "35");
    assert_eq!(registry.id_to_first_name(35), Some("Oxidation"));
    let mass = registry.id_to_first_mass(id).unwrap();
    assert_eq!(mass, 15.994915);
    assert_eq!(registry.mass_to_names(mass), vec!["Oxidation"]);
    let composition = registry.name_to_first_composition("Oxidation").unwrap();
    assert_eq!(composition.hill_notation(), "O(1)");
    assert_eq!(registry.composition_to_names("O(1)"), vec!["Oxidation"]);
    assert_eq!(registry.composition_to_mass("O(1)").unwrap(), Some(mass));
    assert_eq!(registry.name_to_specificity_sites("Oxidation"), vec!["M"]);
    assert_eq!(
        registry.name_to_neutral_losses("Oxidation"),
        vec![("M", 63.998285)]
    );
}

#[test]
fn duplicate_names_are_deterministic() {
    let registry = registry();
    assert_eq!(ids(registry.name_to_ids("Acetyl")), vec!["1", "u1"]);
    assert_eq!(registry.name_to_masses("Acetyl"), vec![42.010565, 42.010565]);
    assert_eq!(
        registry.name_to_first_id("Acetyl").map(AccessionId::as_str),
        Some("1")
    );
    assert_eq!(registry.name_to_specificity_sites("Acetyl"), vec!["K", "N-term", "S"]);
    assert_eq!(registry.name_to_specificities("Acetyl").len(), 2);
    for _ in 0..5 {
        assert_eq!(registry.name_to_first_id("Acetyl"), registry.name_to_first_id("Acetyl"));
    }
}

#[test]
fn composition_keys_are_order_independent() {
    let registry = registry();
    let a: Composition = "H(3) C(2) N O".parse().unwrap();
    let b: Composition = "C2H3NO".parse().unwrap();
    let c = Composition::from_iter([("O", 1), ("N", 1), ("H", 3), ("C", 2)]);
    assert_eq!(a.hill_notation(), b.hill_notation());
    assert_eq!(a.hill_notation(), c.hill_notation());
    assert_eq!(
        registry.composition_to_names(&a.hill_notation()),
        vec!["Carbamidomethyl", "Ala->Gln", "Gly->Asn", "Gly"]
    );
    assert_eq!(
        ids(registry.composition_to_ids(&c.hill_notation())),
        vec!["4", "1100", "1101", "1102"]
    );
    assert_eq!(
        registry.composition_to_mass("C(2)H(3)N(1)O(1)").unwrap(),
        Some(57.021464)
    );
    assert_eq!(registry.composition_to_mass("C(99)").unwrap(), None);
}

#[test]
fn inconsistent_composition() {
    let directory = tempfile::tempdir().unwrap();
    let extra = directory.path().join("extra.xml");
    std::fs::write(
        &extra,
        r#"<unimod><mod title="Heavy oxygen" record_id="x1"><delta mono_mass="16.5"><element symbol="O" number="1"/></delta></mod></unimod>"#,
    )
    .unwrap();
    let registry = Registry::build(
        MapperConfig::in_directory(data()).with_source(ReferenceSource::required(&extra)),
    )
    .unwrap();
    let error = registry.composition_to_mass("O(1)").unwrap_err();
    assert!(matches!(
        error.get_kind(),
        MapperError::InconsistentComposition
    ));
    assert_eq!(registry.composition_to_names("O(1)"), vec!["Oxidation", "Heavy oxygen"]);
}

#[test]
fn approximate_mass() {
    let registry = registry();
    assert_eq!(
        ids(registry.approximate_mass_to_ids(18.0, 0)),
        vec!["127", "329", "608", "1079", "1167", "1922"]
    );
    assert_eq!(
        registry.approximate_mass_to_names(9.03, 2),
        vec!["Label:13C(9)", "Cation:Li"]
    );
    assert_eq!(registry.approximate_mass_to_compositions(15.995, 3).len(), 1);
    assert!(registry.approximate_mass_to_ids(1000.0, 0).is_empty());
}

#[test]
fn mass_range() {
    let registry = registry();
    assert_eq!(
        ids(registry.mass_range_to_ids(18.0, 0)),
        vec!["127", "329", "608", "1079", "1167", "1922"]
    );
    assert_eq!(ids(registry.mass_range_to_ids(9.030, 2)), vec!["184", "1105"]);
    assert_eq!(ids(registry.mass_range_to_ids(9.030, 3)), vec!["184"]);
    assert_eq!(registry.mass_range_to_names(9.030, 3), vec!["Label:13C(9)"]);
    assert_eq!(
        registry.mass_range_to_compositions(57.02, 2).len(),
        4
    );
    assert_eq!(registry.mass_range_to_names(57.02, 2).len(), 4);
}

#[test]
fn mass_range_keeps_every_record() {
    let registry = registry();
    let compositions = registry.mass_range_to_compositions(42.01, 2);
    assert_eq!(registry.mass_range_to_names(42.01, 2), vec!["Acetyl"]);
    assert_eq!(ids(registry.mass_range_to_ids(42.01, 2)), vec!["1", "u1"]);
    assert_eq!(compositions.len(), 2);
    assert_eq!(compositions[0], compositions[1]);

    let shared = registry.mass_range_to_compositions(57.02, 2);
    assert_eq!(shared.len(), 4);
    assert!(shared.iter().all(|c| c.hill_notation() == "C(2)H(3)N(1)O(1)"));
}

#[test]
fn records_without_delta() {
    let registry = registry();
    assert_eq!(registry.id_to_names(2000), vec!["Unfinished"]);
    assert!(registry.id_to_masses(2000).is_empty());
    assert_eq!(registry.id_to_first_mass(2000), None);
    assert!(registry.id_to_first_composition(2000).unwrap().is_empty());
}

#[test]
fn artefacts_are_skipped() {
    let registry = registry();
    assert_eq!(registry.name_to_specificity_sites("Oxidation"), vec!["M"]);
    assert_eq!(registry.name_to_specificity_sites("Gly"), vec!["K"]);
    assert!(registry.name_to_specificity_sites("Cation:Li").is_empty());
}

#[test]
fn combinations() {
    let mut registry = registry();
    let found = registry.mass_to_combos(31.98983, 2, 3);
    assert_eq!(found.len(), 1);
    let expected: Vec<Box<str>> = vec!["Oxidation".into(), "Oxidation".into()];
    assert_eq!(found[0].1, expected);
    assert!((found[0].0 - 31.98983).abs() < 1e-9);
    assert!(registry.mass_to_combos(31.98983, 0, 3).is_empty());
}

#[test]
fn write_user_modification() {
    let directory = tempfile::tempdir().unwrap();
    std::fs::copy(data().join("unimod.xml"), directory.path().join("unimod.xml")).unwrap();
    std::fs::copy(data().join("usermod.xml"), directory.path().join("usermod.xml")).unwrap();
    let mut registry = Registry::build(MapperConfig::in_directory(directory.path())).unwrap();

    let id = registry
        .write_user_record(
            UserModification::new(
                "Propionyl-test",
                56.026215,
                Composition::from_iter([("C", 3), ("H", 4), ("O", 1)]),
            )
            .with_specificity("K", "Chemical derivative"),
            None,
        )
        .unwrap();
    assert_eq!(id.as_str(), "u3");
    assert_eq!(registry.len(), 19);
    assert_eq!(registry.name_to_first_id("Propionyl-test"), Some(&id));
    assert_eq!(registry.id_to_first_mass("u3"), Some(56.026215));
    assert_eq!(
        registry.composition_to_names("C(3)H(4)O(1)"),
        vec!["Propionyl-test"]
    );

    let reloaded = Registry::build(MapperConfig::in_directory(directory.path())).unwrap();
    assert_eq!(reloaded.records(), registry.records());
}

#[test]
fn write_gzipped_user_modification() {
    let directory = tempfile::tempdir().unwrap();
    let user = directory.path().join("usermod.xml.gz");
    let config = || {
        MapperConfig::new([
            ReferenceSource::primary(data().join("unimod.xml")),
            ReferenceSource::optional(&user),
        ])
    };
    let mut registry = Registry::build(config()).unwrap();
    assert_eq!(registry.len(), 16);

    let id = registry
        .write_user_record(
            UserModification::new(
                "Propionyl-test",
                56.026215,
                Composition::from_iter([("C", 3), ("H", 4), ("O", 1)]),
            )
            .with_specificity("K", "Chemical derivative"),
            None,
        )
        .unwrap();
    assert_eq!(registry.len(), 17);
    let bytes = std::fs::read(&user).unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);

    let reloaded = Registry::build(config()).unwrap();
    assert_eq!(reloaded.records(), registry.records());
    assert_eq!(reloaded.name_to_first_id("Propionyl-test"), Some(&id));
}
