//! Collects prebuilt engine binaries into a compiled-in payload table.
//!
//! Scans `native/<platform>/<architecture>/` under the crate (or the
//! directory named by `SIMPLE_CHESS_NATIVE_DIR`) and writes
//! `$OUT_DIR/payloads.rs`. Missing directories produce an empty table.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Result};
use std::path::{Path, PathBuf};

const LIBRARY_EXTENSIONS: [&str; 3] = ["so", "dll", "dylib"];

fn main() -> Result<()> {
    println!("cargo:rerun-if-env-changed=SIMPLE_CHESS_NATIVE_DIR");

    let native_dir = match env::var_os("SIMPLE_CHESS_NATIVE_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => Path::new(&env::var("CARGO_MANIFEST_DIR").unwrap_or_default()).join("native"),
    };

    let mut entries = Vec::new();
    if native_dir.is_dir() {
        println!("cargo:rerun-if-changed={}", native_dir.display());
        collect(&native_dir, &mut entries)?;
    } else if let Some(parent) = native_dir.parent().filter(|parent| parent.is_dir()) {
        // picks up the payload directory once it is created
        println!("cargo:rerun-if-changed={}", parent.display());
    }
    entries.sort();

    let mut source = String::from("&[\n");
    for (key, path) in &entries {
        println!("cargo:rerun-if-changed={}", path.display());
        writeln!(source, "    ({key:?}, include_bytes!({:?}) as &[u8]),", path.display().to_string())
            .map_err(io::Error::other)?;
    }
    source.push(']');

    let out = PathBuf::from(env::var("OUT_DIR").unwrap_or_default()).join("payloads.rs");
    fs::write(out, source)
}

/// Pushes `(resource key, absolute path)` for every library file two levels
/// below `root`.
fn collect(root: &Path, entries: &mut Vec<(String, PathBuf)>) -> Result<()> {
    for platform in fs::read_dir(root)? {
        let platform = platform?.path();
        if !platform.is_dir() {
            continue;
        }
        for arch in fs::read_dir(&platform)? {
            let arch = arch?.path();
            if !arch.is_dir() {
                continue;
            }
            for file in fs::read_dir(&arch)? {
                let file = file?.path();
                let is_library = file
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| LIBRARY_EXTENSIONS.contains(&ext));
                if !file.is_file() || !is_library {
                    continue;
                }
                let key = format!(
                    "/native/{}/{}/{}",
                    name_of(&platform),
                    name_of(&arch),
                    name_of(&file)
                );
                entries.push((key, fs::canonicalize(&file)?));
            }
        }
    }
    Ok(())
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
