use crate::error::SubcastError;

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

/// Default output location: next to the audio file, with an `.html` extension.
pub fn output_path<P: AsRef<Path>>(audio: P) -> PathBuf {
    audio.as_ref().with_extension("html")
}

/// Path to put in a linked audio source, as the page will resolve it. A
/// relative audio path is rewritten relative to the page's directory; when
/// that cannot be worked out lexically the canonical absolute path is used.
pub fn link_target<P: AsRef<Path>, Q: AsRef<Path>>(audio: P, output: Q) -> String {
    let audio = audio.as_ref();
    if audio.is_absolute() {
        return audio.to_string_lossy().into_owned();
    }
    let page_dir = output.as_ref().parent().unwrap_or_else(|| Path::new(""));
    match relative_to(audio, page_dir) {
        Some(rel) => rel.to_string_lossy().into_owned(),
        None => fs::canonicalize(audio)
            .unwrap_or_else(|_| audio.to_path_buf())
            .to_string_lossy()
            .into_owned(),
    }
}

/// `target` as seen from `base`, both relative to the same directory.
/// `None` when either path steps outside it or is absolute.
fn relative_to(target: &Path, base: &Path) -> Option<PathBuf> {
    let target = plain_components(target)?;
    let base = plain_components(base)?;
    let common = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base.len() {
        rel.push("..");
    }
    for component in &target[common..] {
        rel.push(component);
    }
    Some(rel)
}

fn plain_components(path: &Path) -> Option<Vec<&OsStr>> {
    path.components()
        .filter(|c| *c != Component::CurDir)
        .map(|c| match c {
            Component::Normal(name) => Some(name),
            _ => None,
        })
        .collect()
}

pub fn serialise<P: AsRef<Path>>(html: &str, output: P) -> Result<(), SubcastError> {
    let output = output.as_ref();
    let failure = |source| SubcastError::WriteFailure {
        path: output.to_path_buf(),
        source,
    };

    let file = File::create(output).map_err(failure)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(html.as_bytes()).map_err(failure)?;
    writer.flush().map_err(failure)?;
    Ok(())
}
