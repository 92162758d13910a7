use crate::error::QuickFuzzResult;
use crate::payload::Payload;
use std::fs;
use std::path::Path;

/// File inside a payload folder that holds one payload per line
pub const ONELINERS_FILE: &str = "oneliners.txt";

/// Loads every payload of `dir`. The payloads are read as binary data, files are visited in
/// file name order. The file [`ONELINERS_FILE`] is split into one payload per line (the line
/// ending stays part of the payload), every other file becomes one payload. Symlinks are
/// followed, files that can not be read are skipped with a warning.
/// # Errors
/// If the folder can not be read.
pub fn load_payload_dir(dir: &Path) -> QuickFuzzResult<Vec<Payload>> {
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(fs::DirEntry::file_name);

    let mut payloads = vec![];
    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Skipping payload file '{}': {err}", path.display());
                continue;
            }
        };
        if entry.file_name() == ONELINERS_FILE {
            let before = payloads.len();
            payloads.extend(split_lines(&content).map(Payload::from));
            tracing::debug!(
                "Loaded {} oneliners from {}",
                payloads.len() - before,
                path.display()
            );
        } else {
            payloads.push(Payload::new(content));
        }
    }
    Ok(payloads)
}

/// Splits after every `\n`, keeping it. A last line without newline is kept as well.
fn split_lines(content: &[u8]) -> impl Iterator<Item = &[u8]> {
    content.split_inclusive(|b| *b == b'\n')
}
