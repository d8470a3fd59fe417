//! URL extraction from a source tree
//!
//! Walks the tree depth-first with jwalk, pruning ignored directories at the
//! readdir level, and scans every allow-listed text file line by line.

use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};
use log::{debug, info, warn};
use serde::Serialize;

use super::{LinkIndex, Occurrence};
use crate::config::LinkCheckConfig;
use crate::utils::{PREVIEW_MAX_CHARS, is_valid_url, safe_truncate_chars, url_spans};

/// Counters gathered while walking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub urls_found: usize,
    pub urls_skipped: usize,
}

/// Builds a `LinkIndex` from a directory tree
#[derive(Debug, Clone)]
pub struct UrlExtractor {
    extensions: Vec<String>,
    ignored_dirs: Vec<String>,
    skip_patterns: Vec<String>,
    excluded_paths: Vec<PathBuf>,
}

impl UrlExtractor {
    #[must_use]
    pub fn new(extensions: Vec<String>, ignored_dirs: Vec<String>, skip_patterns: Vec<String>) -> Self {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            ignored_dirs,
            skip_patterns,
            excluded_paths: Vec::new(),
        }
    }

    /// Never descend into this directory (absolute path)
    #[must_use]
    pub fn exclude_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded_paths.push(path.into());
        self
    }

    #[must_use]
    pub fn from_config(config: &LinkCheckConfig) -> Self {
        Self::new(
            config.extensions().to_vec(),
            config.ignored_dirs().to_vec(),
            config.skip_patterns().to_vec(),
        )
        .exclude_path(config.report_dir())
    }

    /// Walk `root` and index every URL found
    ///
    /// Unreadable files and walk errors are logged and skipped.
    #[must_use]
    pub fn extract(&self, root: &Path) -> (LinkIndex, ExtractionStats) {
        let mut index = LinkIndex::new(root);
        let mut stats = ExtractionStats::default();

        for path in self.discover_files(root) {
            let text = match std::fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Skipping unreadable file {}: {e}", path.display());
                    stats.files_skipped += 1;
                    continue;
                }
            };

            let relative = path.strip_prefix(root).unwrap_or(&path);
            self.scan_text(relative, &text, &mut index, &mut stats);
            stats.files_scanned += 1;
        }

        info!(
            "Extracted {} unique URLs ({} occurrences) from {} files",
            index.len(),
            stats.urls_found,
            stats.files_scanned
        );
        (index, stats)
    }

    /// Scan one file's text and append its occurrences to `index`
    pub fn scan_text(
        &self,
        file: &Path,
        text: &str,
        index: &mut LinkIndex,
        stats: &mut ExtractionStats,
    ) {
        for (line_no, line) in text.lines().enumerate() {
            for span in url_spans(line) {
                let url = &line[span];
                if self.is_skipped(url, line) {
                    stats.urls_skipped += 1;
                    continue;
                }
                if !is_valid_url(url) {
                    continue;
                }

                let trimmed = line.trim();
                index.record_occurrence(
                    url,
                    Occurrence {
                        file: file.to_path_buf(),
                        line: line_no + 1,
                        preview: (!trimmed.is_empty())
                            .then(|| safe_truncate_chars(trimmed, PREVIEW_MAX_CHARS).to_string()),
                    },
                );
                stats.urls_found += 1;
            }
        }
    }

    fn is_skipped(&self, url: &str, line: &str) -> bool {
        if self.skip_patterns.iter().any(|p| url.contains(p.as_str())) {
            return true;
        }
        // Template literal interpolation: the URL is built at runtime
        url.contains("${") && line.contains('`')
    }

    fn has_allowed_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
    }

    /// Files under `root` with an allowed extension, in sorted walk order
    fn discover_files(&self, root: &Path) -> Vec<PathBuf> {
        let ignored = self.ignored_dirs.clone();
        let excluded = self.excluded_paths.clone();

        WalkDir::new(root)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(false)
            .follow_links(false)
            .process_read_dir(move |_depth, _path, _state, entries| {
                entries.retain(|entry| match entry {
                    Ok(entry) if entry.file_type().is_dir() => {
                        entry
                            .file_name()
                            .to_str()
                            .is_some_and(|name| !ignored.iter().any(|dir| dir == name))
                            && !excluded.contains(&entry.path())
                    }
                    Ok(_) => true,
                    Err(_) => true,
                });
            })
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) if entry.file_type().is_file() => Some(entry.path()),
                Ok(_) => None,
                Err(e) => {
                    warn!("Walk error under {}: {e}", root.display());
                    None
                }
            })
            .filter(|path| {
                let allowed = self.has_allowed_extension(path);
                if !allowed {
                    debug!("Ignoring {}", path.display());
                }
                allowed
            })
            .collect()
    }
}
