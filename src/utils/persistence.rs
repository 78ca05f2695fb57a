//! Atomic file replacement shared by the store file and the config file.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

pub(crate) const TMP_SUFFIX: &str = "tmp";

/// Appends `suffix` to the extension of `path` (`store.json` -> `store.json.tmp`).
pub(crate) fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut staged = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, suffix),
        None => suffix.to_string(),
    };
    staged.set_extension(ext);
    staged
}

/// Stages `data` next to `path`, syncs it, then renames it into place so
/// readers see either the old or the new content.
pub(crate) fn replace_file(path: &Path, data: &str) -> io::Result<()> {
    let tmp = with_suffix(path, TMP_SUFFIX);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp, path)
}
