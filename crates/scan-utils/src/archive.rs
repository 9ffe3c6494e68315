//! ZIP archive utilities for unpacking bundled tool folders.

use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

use zip::read::ZipArchive;

/// Extract every entry whose name starts with `prefix` into `output_dir`,
/// keeping the entry's path (prefix included) below `output_dir`.
///
/// Entries that would land outside `output_dir` are rejected.
pub fn extract_prefix(zip_path: &Path, prefix: &str, output_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let file = File::open(zip_path)?;
    let mut archive = ZipArchive::new(file)?;
    let mut extracted = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        if !name.starts_with(prefix) {
            continue;
        }

        let out_path = safe_join(output_dir, &name).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("archive entry escapes target directory: {}", name),
            )
        })?;

        if name.ends_with('/') {
            std::fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut outfile = File::create(&out_path)?;
        io::copy(&mut entry, &mut outfile)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode))?;
        }

        extracted.push(out_path);
    }

    log::debug!(
        "Extracted {} entries under '{}' from {}",
        extracted.len(),
        prefix,
        zip_path.display()
    );
    Ok(extracted)
}

/// Join an archive entry name onto `root`, refusing absolute paths and `..`.
fn safe_join(root: &Path, name: &str) -> Option<PathBuf> {
    let mut out = root.to_path_buf();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}
