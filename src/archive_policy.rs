// Archive policy: storage root + retention buckets, built from plugin directives.
// Immutable: every directive yields a new policy, so instances never share mutable defaults.

use std::path::{Path, PathBuf};

/// Directive key replacing the retention bucket list.
pub const RRAS_DIRECTIVE: &str = "RRAs";
/// Directive key for the storage root directory.
pub const ROOTDIR_DIRECTIVE: &str = "rrd_rootdir";
/// Directive key enabling grid summary archives.
pub const GRID_SUMMARY_DIRECTIVE: &str = "grid_summary";

pub const DEFAULT_ROOT_DIR: &str = "/var/lib/ganglia/rrds";

/// Roughly one day at full resolution up to ~8.5 years at one sample per 5760 steps.
pub const DEFAULT_ARCHIVE_SPECS: [&str; 5] = [
    "RRA:AVERAGE:0.5:1:244",
    "RRA:AVERAGE:0.5:24:244",
    "RRA:AVERAGE:0.5:168:244",
    "RRA:AVERAGE:0.5:672:244",
    "RRA:AVERAGE:0.5:5760:374",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePolicy {
    root_directory: PathBuf,
    archive_specs: Vec<String>,
    grid_summary: bool,
}

impl Default for ArchivePolicy {
    fn default() -> Self {
        Self {
            root_directory: PathBuf::from(DEFAULT_ROOT_DIR),
            archive_specs: DEFAULT_ARCHIVE_SPECS.iter().map(|s| s.to_string()).collect(),
            grid_summary: false,
        }
    }
}

/// Trim whitespace, then surrounding double quotes.
fn unquote(s: &str) -> &str {
    s.trim().trim_matches('"')
}

impl ArchivePolicy {
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    pub fn archive_specs(&self) -> &[String] {
        &self.archive_specs
    }

    /// Whether grid notifications persist their summary metrics.
    pub fn grid_summary(&self) -> bool {
        self.grid_summary
    }

    /// Fold directives over the defaults, in order. Unknown keys are ignored.
    pub fn from_directives<'a, I>(directives: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        directives
            .into_iter()
            .fold(Self::default(), |policy, (key, value)| {
                policy.with_directive(key, value)
            })
    }

    /// Apply one directive. Invalid values leave the policy unchanged.
    pub fn with_directive(self, key: &str, value: &str) -> Self {
        match key {
            RRAS_DIRECTIVE => self.with_archive_specs(value),
            ROOTDIR_DIRECTIVE => self.with_root_directory(value),
            GRID_SUMMARY_DIRECTIVE => self.with_grid_summary(value),
            _ => {
                tracing::debug!(directive = key, "ignoring unknown rrd directive");
                self
            }
        }
    }

    /// Only an existing directory is accepted; anything else keeps the current root.
    fn with_root_directory(self, value: &str) -> Self {
        let candidate = Path::new(unquote(value));
        if candidate.is_dir() {
            Self {
                root_directory: candidate.to_path_buf(),
                ..self
            }
        } else {
            tracing::debug!(path = %candidate.display(), "rrd_rootdir is not a directory; keeping {}", self.root_directory.display());
            self
        }
    }

    /// Replaces the whole list. An empty value yields no buckets; creation then fails per metric.
    fn with_archive_specs(self, value: &str) -> Self {
        let archive_specs = value
            .split_whitespace()
            .map(unquote)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            archive_specs,
            ..self
        }
    }

    fn with_grid_summary(self, value: &str) -> Self {
        let grid_summary = match unquote(value).to_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => {
                tracing::debug!(value = other, "unrecognized grid_summary value; keeping current");
                return self;
            }
        };
        Self {
            grid_summary,
            ..self
        }
    }
}
