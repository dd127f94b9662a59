//! Download directory resolution
//!
//! Downloads land either in a directory the user typed into the form or in the
//! platform's standard Downloads folder. Relative user paths are resolved
//! against the server's working directory, never left relative, so that the
//! file offer endpoint and the downloader agree on the same location.

use crate::utils::config::AppSettings;
use crate::utils::error::Result;
use path_absolutize::Absolutize;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Sub-folder created inside the platform Downloads directory
const DOWNLOAD_SUBDIR: &str = "mediagrab";

/// Get the default downloads directory.
///
/// Returns: `$HOME/Downloads/mediagrab` on most platforms, falling back to
/// `./downloads` if no home directory can be determined.
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .map(|dir| dir.join(DOWNLOAD_SUBDIR))
        .unwrap_or_else(|| {
            warn!("Could not determine Downloads directory, using ./downloads");
            PathBuf::from("downloads")
        })
}

/// Pick the output directory for a request without touching the filesystem.
pub fn pick_output_dir(user_supplied: Option<&str>, settings: &AppSettings) -> PathBuf {
    let chosen = match user_supplied.map(str::trim).filter(|p| !p.is_empty()) {
        Some(path) => PathBuf::from(path),
        None => settings
            .download_location
            .clone()
            .unwrap_or_else(default_download_dir),
    };

    absolutize(&chosen)
}

/// Resolve the output directory for a request and make sure it exists.
pub async fn resolve_output_dir(
    user_supplied: Option<&str>,
    settings: &AppSettings,
) -> Result<PathBuf> {
    let dir = pick_output_dir(user_supplied, settings);
    tokio::fs::create_dir_all(&dir).await?;
    debug!(dir = %dir.display(), "Resolved output directory");
    Ok(dir)
}

/// A file name is safe to serve when it cannot escape its directory.
pub fn is_safe_file_name(name: &str) -> bool {
    if name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn absolutize(path: &Path) -> PathBuf {
    match path.absolutize() {
        Ok(abs) => abs.into_owned(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to absolutize path");
            path.to_path_buf()
        }
    }
}
