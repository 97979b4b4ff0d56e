//! App discovery: scanning the apps directory and ordering codes.

use std::path::Path;

use crate::error::Result;

/// List app codes from the file entries of `dir`.
///
/// Subdirectories and reserved file names are skipped. Entries are sorted by
/// file name so the scan order does not depend on the filesystem, and the
/// extension is stripped to form the code.
pub fn scan_directory(dir: &Path, reserved: &[String]) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if reserved.iter().any(|r| *r == name) {
            log::debug!("Skipping reserved entry {name}");
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names
        .iter()
        .filter_map(|name| Path::new(name).file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .collect())
}

/// Final app order: the priority codes that were discovered, in priority
/// order, followed by the rest of `scanned` in scan order. Reserved codes are
/// dropped and every code appears once.
pub fn order_codes(priority: &[String], scanned: &[String], reserved: &[String]) -> Vec<String> {
    let mut discovered: Vec<&String> = Vec::with_capacity(scanned.len());
    for code in scanned {
        if !reserved.contains(code) && !discovered.contains(&code) {
            discovered.push(code);
        }
    }

    let mut ordered: Vec<String> = Vec::with_capacity(discovered.len());
    for code in priority {
        if ordered.contains(code) {
            continue;
        }
        if discovered.contains(&code) {
            ordered.push(code.clone());
        } else {
            log::warn!("Priority app '{code}' was not discovered, skipping");
        }
    }
    for code in discovered {
        if !ordered.contains(code) {
            ordered.push(code.clone());
        }
    }
    ordered
}
