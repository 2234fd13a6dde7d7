//! Discovery of session log files for a project.
//!
//! Logs live under `<home>/.claude/projects/<sanitized-project>/*.jsonl`,
//! where the sanitized name is the absolute project path with every `/`
//! replaced by `-`. Discovery never fails on an empty corpus; it returns an
//! empty list and lets the dashboard surface that as a banner.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::path::{Path, PathBuf};

use crate::error::LoadError;

pub struct LogDiscovery {
    home: Option<PathBuf>,
}

impl LogDiscovery {
    pub fn new() -> Self {
        Self { home: dirs::home_dir() }
    }

    /// Override the home directory (for tests).
    pub fn with_home(home: PathBuf) -> Self {
        Self { home: Some(home) }
    }

    /// Find log files for the project, newest-irrelevant files optionally
    /// skipped by `start_time`. The filter is advisory: extra files are fine
    /// because the timeline re-filters by entry timestamp.
    pub fn find_log_files(
        &self,
        project_path: &Path,
        start_time: Option<DateTime<Utc>>,
    ) -> Vec<PathBuf> {
        let Some(home) = &self.home else {
            return Vec::new();
        };

        let project_dir = home
            .join(".claude")
            .join("projects")
            .join(sanitize_project_path(project_path));

        if !project_dir.is_dir() {
            return Vec::new();
        }

        let pattern = project_dir.join("*.jsonl");
        let mut files: Vec<PathBuf> = match glob::glob(&pattern.to_string_lossy()) {
            Ok(paths) => paths.filter_map(Result::ok).collect(),
            Err(e) => {
                tracing::warn!("bad glob pattern for {}: {}", project_dir.display(), e);
                return Vec::new();
            }
        };

        if let Some(cutoff) = start_time {
            files.retain(|path| match file_timestamp(path) {
                Some(ts) => ts >= cutoff,
                None => true,
            });
        }

        files.sort();
        files
    }
}

impl Default for LogDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve the project root: an explicit override, or the current working
/// directory. The only fatal error in the whole pipeline.
pub fn resolve_project_root(override_path: Option<&Path>) -> Result<PathBuf, LoadError> {
    match override_path {
        Some(p) => Ok(p.to_path_buf()),
        None => std::env::current_dir().map_err(|e| LoadError::Resolver {
            reason: format!("cannot determine current directory: {}", e),
        }),
    }
}

/// `/home/user/dev/myproject` -> `-home-user-dev-myproject`.
fn sanitize_project_path(path: &Path) -> String {
    path.to_string_lossy().replace('/', "-")
}

/// Best-effort timestamp for a log file: a date encoded in the filename
/// (`YYYY-MM-DD` or `YYYY-MM-DD-HH-MM-SS` prefix), falling back to mtime.
fn file_timestamp(path: &Path) -> Option<DateTime<Utc>> {
    if let Some(ts) = timestamp_from_name(path) {
        return Some(ts);
    }
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

fn timestamp_from_name(path: &Path) -> Option<DateTime<Utc>> {
    let stem = path.file_stem()?.to_str()?;
    let parts: Vec<&str> = stem.split('-').collect();

    if parts.len() >= 6 {
        let candidate = parts[..6].join("-");
        if let Ok(naive) = NaiveDateTime::parse_from_str(&candidate, "%Y-%m-%d-%H-%M-%S") {
            return Local
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }
    if parts.len() >= 3 {
        let candidate = parts[..3].join("-");
        if let Ok(date) = NaiveDate::parse_from_str(&candidate, "%Y-%m-%d") {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Local
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }
    None
}
