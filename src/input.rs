// src/input.rs
use anyhow::{Context, Result};
use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use crate::extract::ClipboardPayload;

/// Build a payload from a plain-text file (or stdin when `None`) and an
/// optional HTML file.
pub fn load_payload(text: Option<&Path>, html: Option<&Path>) -> Result<ClipboardPayload> {
    let plain = match text {
        Some(path) => read_lossy(path)?,
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("reading plain text from stdin")?;
            String::from_utf8_lossy(&buf).into_owned()
        }
    };

    Ok(match html {
        Some(path) => ClipboardPayload::with_markup(plain, read_lossy(path)?),
        None => ClipboardPayload::text(plain),
    })
}

fn read_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
