//! Dead-link comments for URLs left without a replacement
//!
//! Every line still holding such a URL gets a trailing comment in the
//! comment syntax of its file type. Lines that already carry the marker are
//! skipped, so annotating twice changes nothing. File types without a
//! line-level comment syntax (JSON) are left alone.

use std::path::Path;

use chrono::Utc;
use log::{debug, info, warn};

use super::{ApplySummary, ReplacementAction, ReplacementApplier, ReplacementNote};
use crate::error::{LinkrotError, LinkrotResult};
use crate::link_index::LinkIndex;
use crate::utils::url_spans;

/// Text every annotation contains
pub const DEAD_LINK_MARKER: &str = "linkrot: dead link";

/// Comment appended to annotated lines of `path`, by extension
#[must_use]
pub fn annotation_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "md" | "html" | "htm" => Some("<!-- linkrot: dead link, no working replacement found -->"),
        "mdx" => Some("{/* linkrot: dead link, no working replacement found */}"),
        "ts" | "tsx" | "js" | "jsx" | "mjs" | "cjs" => {
            Some("// linkrot: dead link, no working replacement found")
        }
        _ => None,
    }
}

/// Append `comment` to every unmarked line that holds the URL `url`
///
/// Returns the new content and the annotated 1-based lines. Line endings,
/// including `\r\n`, are kept as they were.
#[must_use]
pub fn annotate_lines(content: &str, url: &str, comment: &str) -> (String, Vec<usize>) {
    let mut out = String::with_capacity(content.len());
    let mut annotated = Vec::new();

    for (i, line) in content.split_inclusive('\n').enumerate() {
        let body = line.trim_end_matches(['\n', '\r']);
        let holds_url = body.contains(url) && url_spans(body).any(|span| &body[span] == url);
        if holds_url && !body.contains(DEAD_LINK_MARKER) {
            out.push_str(body);
            out.push(' ');
            out.push_str(comment);
            out.push_str(&line[body.len()..]);
            annotated.push(i + 1);
        } else {
            out.push_str(line);
        }
    }
    (out, annotated)
}

impl ReplacementApplier {
    /// Annotate the lines of each URL in `urls` across the files it was indexed in
    pub async fn annotate(&mut self, urls: &[String], index: &LinkIndex) -> ApplySummary {
        let mut summary = ApplySummary::default();
        for url in urls {
            for file in index.files_for(url) {
                match self.annotate_file(url, &file).await {
                    Ok(Some(action)) => summary.actions.push(action),
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Annotation failed: {e}");
                        summary.errors.push(e.to_string());
                    }
                }
            }
        }

        info!(
            "Annotated {} dead URLs in {} files{}",
            urls.len(),
            summary.actions.len(),
            if self.dry_run { " (dry run)" } else { "" }
        );
        summary
    }

    async fn annotate_file(
        &mut self,
        url: &str,
        path: &Path,
    ) -> LinkrotResult<Option<ReplacementAction>> {
        let Some(comment) = annotation_for(path) else {
            debug!("No comment syntax for {}, leaving {url}", path.display());
            return Ok(None);
        };

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LinkrotError::io(path, e))?;
        let (updated, lines) = annotate_lines(&content, url, comment);
        if lines.is_empty() {
            return Ok(None);
        }

        if !self.dry_run {
            tokio::fs::write(path, updated)
                .await
                .map_err(|e| LinkrotError::io(path, e))?;
            self.cache.invalidate(path);
        }

        Ok(Some(ReplacementAction {
            file: path.strip_prefix(&self.root).unwrap_or(path).to_path_buf(),
            old_url: url.to_string(),
            new_url: url.to_string(),
            applied_at: Utc::now(),
            note: ReplacementNote::DeadLinkAnnotation,
            occurrences_replaced: lines.len(),
            lines,
            dry_run: self.dry_run,
        }))
    }
}
