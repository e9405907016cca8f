//! Document-storage root and the mapping of relative resource paths onto it.

use std::path::{Component, Path, PathBuf};

use crate::domain::FetchError;

const APP_DIR: &str = "media-screen";

/// `$XDG_DATA_HOME/media-screen`, the directory downloads are written to.
pub fn document_root() -> Result<PathBuf, xdg::BaseDirectoriesError> {
    let xdg_dirs = xdg::BaseDirectories::new()?;
    Ok(xdg_dirs.get_data_home().join(APP_DIR))
}

/// Join `relative` onto `root`. A leading `/` is ignored; `..` and empty paths are refused.
pub fn resolve(root: &Path, relative: &str) -> Result<PathBuf, FetchError> {
    let relative = Path::new(relative.trim_start_matches('/'));

    let mut resolved = root.to_path_buf();
    let mut pushed = false;
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                pushed = true;
            }
            Component::CurDir => {}
            _ => {
                return Err(FetchError::Io(format!(
                    "refusing to write outside the storage root: {}",
                    relative.display()
                )))
            }
        }
    }

    if !pushed {
        return Err(FetchError::Io("empty target path".to_string()));
    }
    Ok(resolved)
}
