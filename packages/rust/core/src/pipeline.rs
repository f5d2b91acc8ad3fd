//! End-to-end `build` pipeline: files → records → entities → substituted
//! markup → section tree → search index.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use styleguide_shared::{Diagnostics, RawStyle, Result, StyleguideError, SubstitutionConfig};
use styleguide_substitute::{SelectorIndex, Substitutor};

use crate::entity::Entity;
use crate::search::{self, SearchRecord};
use crate::transform::{self, StyleGuide};

/// Configuration for [`run`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Stylesheets to crawl. Order does not matter; files are sorted.
    pub files: Vec<PathBuf>,
    /// Shortcode behavior.
    pub substitution: SubstitutionConfig,
}

/// Result of [`run`].
#[derive(Debug)]
pub struct PipelineOutput {
    /// Grouped entities with substituted markup.
    pub guide: StyleGuide,
    /// Flat search records.
    pub index: Vec<SearchRecord>,
    /// Non-fatal notices from every stage.
    pub diagnostics: Diagnostics,
    pub file_count: usize,
    pub entity_count: usize,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each file is crawled.
    fn file_crawled(&self, path: &std::path::Path, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, output: &PipelineOutput);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn file_crawled(&self, _path: &std::path::Path, _current: usize, _total: usize) {}
    fn done(&self, _output: &PipelineOutput) {}
}

/// Run the full pipeline.
///
/// 1. Crawl every file into records
/// 2. Resolve types and build entities
/// 3. Build the selector index from all entities
/// 4. Substitute shortcodes in every markup field
/// 5. Group by section and build the search index
///
/// Fatal crawl errors abort the run; everything else ends up in
/// [`PipelineOutput::diagnostics`].
#[instrument(skip_all, fields(file_count = config.files.len()))]
pub fn run(config: &PipelineConfig, progress: &dyn ProgressReporter) -> Result<PipelineOutput> {
    let start = Instant::now();
    let mut diagnostics = Diagnostics::new();

    // --- Phase 1: Crawl ---
    progress.phase("Crawling stylesheets");
    let files = styleguide_crawler::sort_paths(&config.files);
    let styles = crawl(&files, progress)?;

    // --- Phase 2: Entities ---
    progress.phase("Building entities");
    let mut entities = transform::build_entities(&styles, &mut diagnostics);

    // --- Phase 3: Substitution ---
    progress.phase("Substituting markup");
    substitute_markup(&mut entities, &config.substitution, &mut diagnostics);

    // --- Phase 4: Grouping + search ---
    progress.phase("Grouping sections");
    let entity_count = entities.len();
    let guide = transform::for_view(entities);
    let index = search::build_index(&guide);

    let output = PipelineOutput {
        guide,
        index,
        diagnostics,
        file_count: files.len(),
        entity_count,
        elapsed: start.elapsed(),
    };

    info!(
        files = output.file_count,
        entities = output.entity_count,
        warnings = output.diagnostics.len(),
        elapsed_ms = output.elapsed.as_millis() as u64,
        "pipeline complete"
    );

    progress.done(&output);
    Ok(output)
}

/// Crawl `files` in path order, reporting progress per file.
pub fn crawl(files: &[PathBuf], progress: &dyn ProgressReporter) -> Result<Vec<RawStyle>> {
    if files.is_empty() {
        return Err(StyleguideError::validation("no stylesheet files to process"));
    }

    styleguide_crawler::process_files(files, |path, current, total| {
        progress.file_crawled(path, current, total)
    })
}

/// Replace shortcodes in every entity's markup.
///
/// The selector index is built from the complete entity set before any
/// markup is touched, so `include` always sees unsubstituted markup.
pub fn substitute_markup(
    entities: &mut [Entity],
    config: &SubstitutionConfig,
    diagnostics: &mut Diagnostics,
) {
    let index = SelectorIndex::build(
        entities
            .iter()
            .filter_map(|e| Some((e.selector.as_deref()?, e.markup.as_deref()?))),
    );
    let substitutor = Substitutor::new(config.clone(), index);

    for entity in entities.iter_mut() {
        if let Some(markup) = entity.markup.take() {
            entity.markup = Some(substitutor.substitute(&markup, diagnostics));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
