//! Upgrade `.lvproj` files to the current schema in place.
//!
//! Usage: `cargo run -p lv-core --example migrate_projects [FILES...]`.
//! With no arguments, every `.lvproj` under `projects/` is considered.

use lv_core::Project;
use lv_core::project::{FILE_VERSION, schema_major};
use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let paths: Vec<PathBuf> = if args.len() > 1 {
        args[1..].iter().map(PathBuf::from).collect()
    } else {
        let mut paths = Vec::new();
        if let Ok(entries) = fs::read_dir("projects") {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|e| e == "lvproj") {
                    paths.push(path);
                }
            }
        }
        paths
    };

    let mut migrated = 0;
    let mut skipped = 0;

    for path in &paths {
        let input = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("skip {}: {e}", path.display());
                skipped += 1;
                continue;
            }
        };

        let current = serde_json::from_str::<serde_json::Value>(&input)
            .ok()
            .and_then(|v| schema_major(&v).ok());
        if current == Some(3) {
            log::debug!("{} already at {FILE_VERSION}", path.display());
            skipped += 1;
            continue;
        }

        let output = match Project::from_json(&input).and_then(|p| p.to_json()) {
            Ok(text) => text,
            Err(e) => {
                log::error!("{}: {e}", path.display());
                skipped += 1;
                continue;
            }
        };

        if let Err(e) = fs::write(path, output) {
            log::error!("writing {}: {e}", path.display());
            skipped += 1;
        } else {
            migrated += 1;
            println!("✓ {}", path.display());
        }
    }

    println!("\nMigrated: {migrated}, Skipped: {skipped}");
}
