//! An example to show how to look up modifications in a data directory
use std::io::Write;

use modmap::{MapperConfig, Registry};

fn main() {
    let config = std::env::args().nth(1).map_or_else(
        || MapperConfig::user_data_dir().expect("No data directory could be found"),
        MapperConfig::in_directory,
    );
    let registry = match Registry::build(config) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    for version in registry.versions() {
        println!(
            "Read {} modifications from {} (sha256 {})",
            version.records,
            version.path.display(),
            version.hash_hex()
        );
    }

    println!(
        "Search for modifications by name, accession (prefix with '#'), or mass (prefix with '~', eg '~15.995')"
    );

    loop {
        print!("?:");
        std::io::stdout().flush().unwrap();
        let mut term = String::new();
        if std::io::stdin().read_line(&mut term).unwrap() == 0 {
            break;
        }
        let term = term.trim();
        if term.is_empty() {
            continue;
        }
        let records: Vec<_> = if let Some(id) = term.strip_prefix('#') {
            registry
                .index()
                .get(&modmap::IndexKey::id(id))
                .iter()
                .filter_map(|p| registry.record(*p))
                .collect()
        } else if let Some(mass) = term.strip_prefix('~') {
            let Ok(value) = mass.trim().parse::<f64>() else {
                println!("Not a valid mass");
                continue;
            };
            let decimals = mass.split_once('.').map_or(0, |(_, d)| d.len() as u8);
            registry
                .records()
                .iter()
                .filter(|r| {
                    r.monoisotopic_mass
                        .is_some_and(|m| modmap::MassWindow::around(value, decimals).contains(m))
                })
                .collect()
        } else {
            registry
                .index()
                .get(&modmap::IndexKey::name(term))
                .iter()
                .filter_map(|p| registry.record(*p))
                .collect()
        };
        if records.is_empty() {
            println!("No matches found");
        }
        for record in records {
            println!(
                " >{} '{}': {} {}",
                record.accession_id,
                record.name,
                record
                    .monoisotopic_mass
                    .map_or_else(|| "-".to_string(), |m| m.to_string()),
                record.composition
            );
            for specificity in &record.specificities {
                println!("\t{}|{}", specificity.site, specificity.classification);
            }
        }
    }
}
