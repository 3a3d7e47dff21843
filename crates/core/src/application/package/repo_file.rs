// Repository file helpers (apt lists, yum .repo files, pacman.conf)

use std::path::Path;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::port::KeyFetcher;

/// Write `contents` to `path`, creating the parent directory if needed
pub(crate) async fn write(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    debug!(path = %path.display(), bytes = contents.len(), "Repository file written");
    Ok(())
}

/// Remove `path`; a missing file is reported as `AppError::NotFound`
pub(crate) async fn remove(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "Repository file removed");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::NotFound(path.display().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Remove `path`, treating a missing file as already removed
pub(crate) async fn remove_if_exists(path: &Path) -> Result<()> {
    match remove(path).await {
        Err(AppError::NotFound(_)) => Ok(()),
        other => other,
    }
}

/// Contents of a yum/dnf `.repo` file
///
/// A single URL ending in `.repo` is downloaded verbatim; otherwise the
/// URLs become the `baseurl` of an `[alias]` stanza.
pub(crate) async fn yum_repo(fetcher: &dyn KeyFetcher, alias: &str, urls: &[&str]) -> Result<Vec<u8>> {
    if let [url] = urls {
        if url.ends_with(".repo") {
            return fetcher.fetch(url).await;
        }
    }

    let mut stanza = format!("[{alias}]\nname={alias}\nbaseurl={}\n", urls.join("\n        "));
    stanza.push_str("enabled=1\ngpgcheck=1\n");
    Ok(stanza.into_bytes())
}

/// Append a `[alias]` section to pacman.conf
pub(crate) fn pacman_add_section(conf: &str, alias: &str, urls: &[&str]) -> Result<String> {
    if find_section(conf, alias).is_some() {
        return Err(AppError::InvalidInput(format!(
            "repository already configured: {}",
            alias
        )));
    }

    let mut out = conf.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&format!("\n[{}]\n", alias));
    for url in urls {
        out.push_str(&format!("Server = {}\n", url));
    }
    Ok(out)
}

/// Remove the `[alias]` section (header up to the next section) from pacman.conf
pub(crate) fn pacman_remove_section(conf: &str, alias: &str) -> Result<String> {
    let (start, end) = find_section(conf, alias)
        .ok_or_else(|| AppError::NotFound(format!("pacman repository {}", alias)))?;

    let lines: Vec<&str> = conf.lines().collect();
    let mut kept: Vec<&str> = lines[..start].to_vec();
    // drop the blank separator left behind by add
    while kept.last().is_some_and(|l| l.trim().is_empty()) {
        kept.pop();
    }
    kept.extend_from_slice(&lines[end..]);

    let mut out = kept.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

/// Line range `[header, next header)` of a pacman.conf section
fn find_section(conf: &str, alias: &str) -> Option<(usize, usize)> {
    let header = format!("[{}]", alias);
    let lines: Vec<&str> = conf.lines().collect();
    let start = lines.iter().position(|l| l.trim() == header)?;
    let mut end = lines[start + 1..]
        .iter()
        .position(|l| l.trim_start().starts_with('['))
        .map_or(lines.len(), |i| start + 1 + i);
    while end > start + 1 && lines[end - 1].trim().is_empty() {
        end -= 1;
    }
    Some((start, end))
}
