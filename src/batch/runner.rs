//! Batch query orchestration.

use std::fmt;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::chunk::chunk;
use super::input::QueryInput;
use crate::client::Hit;
use crate::config::SessionConfig;
use crate::error::FerroError;

/// Hard upper bound on the number of terms sent in one request.
pub const MAX_QUERY: usize = 1000;

/// Configuration for one batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Terms per request, never above [`MAX_QUERY`].
    pub step: NonZeroUsize,
    /// Pause after each request.
    pub delay: Duration,
    /// Skip the pause when the whole input fits in one request.
    pub skip_single_batch_delay: bool,
    /// Log per-batch progress and a duplicate/missing summary.
    pub verbose: bool,
    /// Keep response bodies unparsed.
    pub raw: bool,
    /// Return results together with duplicate and missing terms.
    pub return_all: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            step: NonZeroUsize::new(MAX_QUERY).unwrap_or(NonZeroUsize::MIN),
            delay: Duration::from_secs(1),
            skip_single_batch_delay: false,
            verbose: true,
            raw: false,
            return_all: false,
        }
    }
}

impl BatchConfig {
    /// Create a new batch configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take step, delay and the single-batch policy from a session.
    pub fn from_session(session: &SessionConfig) -> Self {
        Self::default()
            .step(session.step)
            .delay(session.delay_duration())
            .skip_single_batch_delay(session.skip_single_batch_delay)
    }

    /// Set the batch size, clamped to `1..=MAX_QUERY`.
    pub fn step(mut self, step: usize) -> Self {
        let clamped = step.clamp(1, MAX_QUERY);
        self.step = NonZeroUsize::new(clamped).unwrap_or(NonZeroUsize::MIN);
        self
    }

    /// Set the inter-batch delay.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Configure the single-batch delay policy.
    pub fn skip_single_batch_delay(mut self, skip: bool) -> Self {
        self.skip_single_batch_delay = skip;
        self
    }

    /// Configure progress logging.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Configure raw passthrough.
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Configure the full report.
    pub fn return_all(mut self, return_all: bool) -> Self {
        self.return_all = return_all;
        self
    }
}

/// What the batches look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    /// Variant ids; hits are concatenated.
    Ids,
    /// Query terms; not-found and duplicate terms are tracked.
    Terms,
}

/// Progress of a batch run, reported after each request.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchProgress {
    /// 1-based batch number.
    pub batch: usize,
    /// 1-based index of the first term in this batch.
    pub first: usize,
    /// 1-based index of the last term in this batch.
    pub last: usize,
    /// Whether the response came from the cache.
    pub from_cache: bool,
    /// Time since the run started.
    pub elapsed: Duration,
}

/// Raw response for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResponse {
    pub from_cache: bool,
    pub body: String,
}

/// A term that matched more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateTerm {
    pub query: String,
    pub count: usize,
}

/// Results of a term query with duplicate and missing terms.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct QueryReport {
    #[serde(rename = "out")]
    pub results: Vec<Hit>,
    #[serde(rename = "dup")]
    pub duplicates: Vec<DuplicateTerm>,
    pub missing: Vec<String>,
}

/// Result of a batch run.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Concatenated hits of all batches.
    Hits(Vec<Hit>),
    /// The unparsed body of the only batch.
    Raw(String),
    /// Unparsed bodies, one per batch.
    RawBatches(Vec<String>),
    /// Hits plus duplicate and missing terms.
    Report(QueryReport),
}

impl BatchOutcome {
    /// Parsed hits, if the outcome carries them.
    pub fn hits(&self) -> Option<&[Hit]> {
        match self {
            BatchOutcome::Hits(hits) => Some(hits),
            BatchOutcome::Report(report) => Some(&report.results),
            BatchOutcome::Raw(_) | BatchOutcome::RawBatches(_) => None,
        }
    }

    /// Consume into parsed hits; raw outcomes yield none.
    pub fn into_hits(self) -> Vec<Hit> {
        match self {
            BatchOutcome::Hits(hits) => hits,
            BatchOutcome::Report(report) => report.results,
            BatchOutcome::Raw(_) | BatchOutcome::RawBatches(_) => Vec::new(),
        }
    }

    /// The report, if one was requested.
    pub fn report(&self) -> Option<&QueryReport> {
        match self {
            BatchOutcome::Report(report) => Some(report),
            _ => None,
        }
    }
}

type Sleeper<'a> = Box<dyn FnMut(Duration) + 'a>;
type ProgressFn<'a> = Box<dyn FnMut(&BatchProgress) + 'a>;

/// Drives a per-batch fetch over chunked input.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use ferro_myvariant::batch::{BatchConfig, BatchMode, BatchResponse, BatchRunner};
///
/// let config = BatchConfig::new().step(2).delay(Duration::ZERO).verbose(false);
/// let mut runner = BatchRunner::new(config);
/// let outcome = runner
///     .run(BatchMode::Ids, "a,b,c".into(), |batch| {
///         let hits: Vec<String> = batch.iter().map(|id| format!(r#"{{"_id":"{}"}}"#, id)).collect();
///         Ok(BatchResponse { from_cache: false, body: format!("[{}]", hits.join(",")) })
///     })
///     .unwrap();
/// assert_eq!(outcome.hits().unwrap().len(), 3);
/// ```
pub struct BatchRunner<'a> {
    config: BatchConfig,
    sleeper: Sleeper<'a>,
    progress: Option<ProgressFn<'a>>,
}

impl fmt::Debug for BatchRunner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchRunner")
            .field("config", &self.config)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl<'a> BatchRunner<'a> {
    /// Create a runner that sleeps with [`std::thread::sleep`].
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            sleeper: Box::new(std::thread::sleep),
            progress: None,
        }
    }

    /// Replace the blocking sleep, e.g. to record delays in tests.
    pub fn with_sleeper(mut self, sleeper: impl FnMut(Duration) + 'a) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Register a callback invoked after every batch.
    pub fn with_progress(mut self, progress: impl FnMut(&BatchProgress) + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run `fetch` over every batch of `input`.
    ///
    /// The first error, whether from the input or from `fetch`, aborts the run
    /// and nothing collected so far is returned.
    pub fn run<F>(
        &mut self,
        mode: BatchMode,
        input: QueryInput<'_>,
        mut fetch: F,
    ) -> Result<BatchOutcome, FerroError>
    where
        F: FnMut(&[String]) -> Result<BatchResponse, FerroError>,
    {
        let start = Instant::now();
        let track_terms = mode == BatchMode::Terms && !self.config.raw;

        let mut hits: Vec<Hit> = Vec::new();
        let mut raw_bodies: Vec<String> = Vec::new();
        let mut seen: IndexMap<String, usize> = IndexMap::new();
        let mut missing: Vec<String> = Vec::new();

        let mut chunks = chunk(input.into_terms(), self.config.step).peekable();
        let mut batch_no = 0;

        while let Some(next) = chunks.next() {
            batch_no += 1;
            let (first, last) = (next.first_index(), next.last_index());
            let batch = next.items.into_iter().collect::<Result<Vec<String>, _>>()?;

            if self.config.verbose {
                info!("querying {}-{}...", first, last);
            }
            let response = fetch(&batch)?;
            if self.config.verbose {
                if response.from_cache {
                    info!("querying {}-{}: done (from cache)", first, last);
                } else {
                    info!("querying {}-{}: done", first, last);
                }
            }

            if self.config.raw {
                raw_bodies.push(response.body);
            } else {
                let page: Vec<Hit> = serde_json::from_str(&response.body)?;
                if track_terms {
                    for hit in &page {
                        record_term(hit, &mut seen, &mut missing);
                    }
                }
                hits.extend(page);
            }

            if let Some(progress) = self.progress.as_mut() {
                progress(&BatchProgress {
                    batch: batch_no,
                    first,
                    last,
                    from_cache: response.from_cache,
                    elapsed: start.elapsed(),
                });
            }

            // Release this batch before the next one is pulled by the peek
            drop(batch);
            // Peek only when the answer can change the delay policy
            let only_batch = self.config.skip_single_batch_delay
                && batch_no == 1
                && chunks.peek().is_none();
            if !self.config.delay.is_zero() && !only_batch {
                (self.sleeper)(self.config.delay);
            }
        }

        if batch_no == 0 {
            return Err(FerroError::empty_input("ids/terms"));
        }
        debug!("{} batches in {:?}", batch_no, start.elapsed());

        if self.config.raw {
            return Ok(if raw_bodies.len() == 1 {
                BatchOutcome::Raw(raw_bodies.remove(0))
            } else {
                BatchOutcome::RawBatches(raw_bodies)
            });
        }
        if !track_terms {
            return Ok(BatchOutcome::Hits(hits));
        }

        let duplicates: Vec<DuplicateTerm> = seen
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(query, count)| DuplicateTerm { query, count })
            .collect();

        if self.config.verbose {
            info!("finished");
            if !duplicates.is_empty() {
                warn!(
                    "{} input query terms found dup hits: {:?}",
                    duplicates.len(),
                    duplicates
                        .iter()
                        .map(|d| (d.query.as_str(), d.count))
                        .collect::<Vec<_>>()
                );
            }
            if !missing.is_empty() {
                warn!(
                    "{} input query terms found no hit: {:?}",
                    missing.len(),
                    missing
                );
            }
            if !self.config.return_all && (!duplicates.is_empty() || !missing.is_empty()) {
                info!("pass return_all to get details on duplicate and missing terms");
            }
        }

        if self.config.return_all {
            Ok(BatchOutcome::Report(QueryReport {
                results: hits,
                duplicates,
                missing,
            }))
        } else {
            Ok(BatchOutcome::Hits(hits))
        }
    }
}

fn record_term(hit: &Hit, seen: &mut IndexMap<String, usize>, missing: &mut Vec<String>) {
    let Some(query) = hit.query() else {
        debug!("hit without a query term: {:?}", hit.id());
        return;
    };
    if hit.is_notfound() {
        missing.push(query);
    } else {
        *seen.entry(query).or_insert(0) += 1;
    }
}
