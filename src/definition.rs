//! Jump-to-definition on top of the project registry.
//!
//! Given the file an editor has open and the symbol under the cursor, find
//! the project, refresh its index (rate-limited), and look the name up.
//! Opening the resulting file and scrolling to the line is the caller's job.

use std::ops::Range;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::indexing::{ProjectIndex, ScanOutcome};
use crate::project::ProjectRegistry;
use crate::{IndexError, IndexResult, SymbolLocation};

/// Outcome of a definition lookup within a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionMatch {
    NotFound,
    Single(SymbolLocation),
    /// Same name defined more than once; the caller picks one
    Multiple(Vec<SymbolLocation>),
}

impl DefinitionMatch {
    pub fn from_locations(mut locations: Vec<SymbolLocation>) -> Self {
        match locations.len() {
            0 => DefinitionMatch::NotFound,
            1 => DefinitionMatch::Single(locations.remove(0)),
            _ => DefinitionMatch::Multiple(locations),
        }
    }

    pub fn locations(&self) -> &[SymbolLocation] {
        match self {
            DefinitionMatch::NotFound => &[],
            DefinitionMatch::Single(location) => std::slice::from_ref(location),
            DefinitionMatch::Multiple(locations) => locations,
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, DefinitionMatch::NotFound)
    }
}

pub struct DefinitionFinder {
    registry: Arc<ProjectRegistry>,
    auto_save: bool,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for DefinitionFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefinitionFinder")
            .field("registry", &self.registry)
            .field("auto_save", &self.auto_save)
            .finish()
    }
}

impl DefinitionFinder {
    /// Finder over `registry`; saving after scans follows `index.auto_save`.
    pub fn new(registry: Arc<ProjectRegistry>) -> Self {
        let auto_save = registry.config().auto_save;
        Self {
            registry,
            auto_save,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ProjectRegistry> {
        &self.registry
    }

    /// Find where `name` is defined, blocking the caller while rescanning.
    ///
    /// `Err(IndexError::ProjectNotFound)` means `open_file` is not inside any
    /// project; callers should treat that as "not applicable".
    pub fn find_definition(&self, open_file: &Path, name: &str) -> IndexResult<DefinitionMatch> {
        let project = resolve(&self.registry, open_file)?;
        if name.is_empty() {
            return Ok(DefinitionMatch::NotFound);
        }

        let outcome = project.index_with_cancel(false, &self.shutdown);
        if self.should_save(&outcome) {
            save_logged(&project);
        }

        Ok(DefinitionMatch::from_locations(project.find_symbol_locations(name)))
    }

    /// [`find_definition`](Self::find_definition) with project discovery and
    /// the scan moved to a blocking worker, and the save detached from the
    /// lookup.
    ///
    /// Opening a project for the first time reads its cache, so that runs on
    /// the worker too.
    pub async fn find_definition_async(
        &self,
        open_file: &Path,
        name: &str,
    ) -> IndexResult<DefinitionMatch> {
        let registry = Arc::clone(&self.registry);
        let open_file = open_file.to_path_buf();
        let cancel = self.shutdown.child_token();
        let scan = !name.is_empty();

        let (project, outcome) = tokio::task::spawn_blocking(move || {
            let project = resolve(&registry, &open_file)?;
            let outcome = scan.then(|| project.index_with_cancel(false, &cancel));
            Ok::<_, IndexError>((project, outcome))
        })
        .await??;

        if outcome.is_some_and(|outcome| self.should_save(&outcome)) {
            let saver = Arc::clone(&project);
            tokio::task::spawn_blocking(move || save_logged(&saver));
        }

        Ok(DefinitionMatch::from_locations(project.find_symbol_locations(name)))
    }

    /// Cancel in-flight and future scans started by this finder.
    ///
    /// Lookups keep answering from the entries indexed so far.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    fn should_save(&self, outcome: &ScanOutcome) -> bool {
        self.auto_save && outcome.is_completed()
    }
}

fn resolve(registry: &ProjectRegistry, open_file: &Path) -> IndexResult<Arc<ProjectIndex>> {
    registry
        .project_for(open_file)
        .ok_or_else(|| IndexError::ProjectNotFound {
            path: open_file.to_path_buf(),
        })
}

fn save_logged(project: &ProjectIndex) {
    if let Err(e) = project.save() {
        tracing::warn!("[definition] {e}");
    }
}

fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// The symbol name to look up for an editor selection.
///
/// `selection` is a byte range into `text`. A non-empty selection is used
/// verbatim; an empty one (a cursor) expands to the identifier around it.
pub fn query_symbol(text: &str, selection: Range<usize>) -> Option<&str> {
    if text.is_empty() {
        return None;
    }

    if selection.start != selection.end {
        let start = selection.start.min(selection.end);
        let end = selection.start.max(selection.end);
        return text.get(start..end).filter(|selected| !selected.is_empty());
    }

    let cursor = selection.start.min(text.len());
    if !text.is_char_boundary(cursor) {
        return None;
    }

    // Identifier bytes are ASCII, so these scans never split a character
    let bytes = text.as_bytes();
    let mut begin = cursor;
    while begin > 0 && is_identifier_byte(bytes[begin - 1]) {
        begin -= 1;
    }
    let mut end = cursor;
    while end < bytes.len() && is_identifier_byte(bytes[end]) {
        end += 1;
    }

    (begin < end).then(|| &text[begin..end])
}
