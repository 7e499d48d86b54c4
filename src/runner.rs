use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use thiserror::Error;
use tokio::time::Instant;

use crate::disclosure::DEFAULT_STATIC_BASE;
use crate::output::{self, FilingReport};
use crate::payload::{self, AnnouncementRecord, CompanyOverview, PayloadError};

const INPUT_EXTENSIONS: [&str; 3] = ["json", "jsonp", "txt"];
const OVERVIEW_MARKER: &str = "overview";
const ANNOUNCE_MARKER: &str = "announce";

#[derive(Clone, Debug)]
pub struct Options {
    pub inputs: Vec<String>,
    pub input_dir: Option<String>,
    pub overview: Option<String>,
    pub announce: Option<String>,
    pub static_base: String,
    pub concurrency: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            input_dir: None,
            overview: None,
            announce: None,
            static_base: DEFAULT_STATIC_BASE.to_string(),
            concurrency: 4,
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("no inputs provided (inputs and input_dir are both empty)")]
    NoInputs,

    #[error("invalid concurrency {value}, expected positive integer")]
    InvalidConcurrency { value: usize },

    #[error("invalid static base URL: {url}")]
    InvalidStaticBase { url: String },

    #[error("failed to read {kind}: {path}: {source}")]
    FileRead {
        kind: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {kind}: {path}: {source}")]
    Decode {
        kind: &'static str,
        path: String,
        #[source]
        source: PayloadError,
    },
}

#[derive(Clone, Debug)]
pub struct Failure {
    pub path: String,
    pub error: String,
}

#[derive(Clone, Debug)]
pub struct BatchResult {
    pub elapsed: Duration,
    pub reports: Vec<FilingReport>,
    pub failures: Vec<Failure>,
}

#[derive(Clone, Debug)]
pub struct Runner {
    options: Options,
}

impl Runner {
    pub fn new(options: Options) -> Result<Self, RunnerError> {
        let has_dir = options.input_dir.as_deref().unwrap_or_default().trim() != "";
        if options.inputs.iter().all(|i| i.trim().is_empty()) && !has_dir {
            return Err(RunnerError::NoInputs);
        }
        if options.concurrency == 0 {
            return Err(RunnerError::InvalidConcurrency {
                value: options.concurrency,
            });
        }
        match reqwest::Url::parse(&options.static_base) {
            Ok(url) if !url.cannot_be_a_base() => {}
            _ => {
                return Err(RunnerError::InvalidStaticBase {
                    url: options.static_base.clone(),
                })
            }
        }
        Ok(Self { options })
    }

    pub async fn run(&self) -> Result<BatchResult, RunnerError> {
        self.run_with_progress(ProgressBar::hidden()).await
    }

    /// Inputs that fail to read or decode land in `failures`; only a broken
    /// input directory or an explicit overview or announce file aborts the
    /// batch.
    pub async fn run_with_progress(&self, pb: ProgressBar) -> Result<BatchResult, RunnerError> {
        let started_at = Instant::now();

        let inputs = collect_inputs(&self.options.inputs, self.options.input_dir.as_deref()).await?;
        if inputs.is_empty() {
            return Err(RunnerError::NoInputs);
        }
        pb.set_length(inputs.len() as u64);

        let shared_overview = match self.options.overview.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(load_overview(path).await?),
            _ => None,
        };
        let shared_announcements = match self.options.announce.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(load_announcements(path).await?),
            _ => None,
        };

        let static_base = self.options.static_base.as_str();
        let outcomes: Vec<(PathBuf, Result<FilingReport, RunnerError>)> = stream::iter(inputs)
            .map(|path| {
                let pb = pb.clone();
                let shared_overview = shared_overview.as_ref();
                let shared_announcements = shared_announcements.as_deref();
                async move {
                    let outcome =
                        process_input(&path, shared_overview, shared_announcements, static_base)
                            .await;
                    pb.inc(1);
                    (path, outcome)
                }
            })
            .buffered(self.options.concurrency)
            .collect()
            .await;

        let mut reports = Vec::new();
        let mut failures = Vec::new();
        for (path, outcome) in outcomes {
            match outcome {
                Ok(report) => reports.push(report),
                Err(e) => failures.push(Failure {
                    path: path.to_string_lossy().to_string(),
                    error: e.to_string(),
                }),
            }
        }

        Ok(BatchResult {
            elapsed: started_at.elapsed(),
            reports,
            failures,
        })
    }
}

/// `942.overview.json` and `942.announce.json` ride along with `942.json`.
pub(crate) fn is_companion_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| {
            let parts: Vec<&str> = n.split('.').collect();
            parts.len() >= 3
                && matches!(parts[parts.len() - 2], OVERVIEW_MARKER | ANNOUNCE_MARKER)
        })
        .unwrap_or(false)
}

fn has_input_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| INPUT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// `942.json` pairs with `942.<marker>.json` in the same directory.
pub(crate) fn sibling_file(path: &Path, marker: &str) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let ext = path.extension()?.to_str()?;
    Some(path.with_file_name(format!("{stem}.{marker}.{ext}")))
}

pub(crate) async fn collect_inputs(
    inputs: &[String],
    input_dir: Option<&str>,
) -> Result<Vec<PathBuf>, RunnerError> {
    let mut out: Vec<PathBuf> = inputs
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .map(crate::config::expand_tilde)
        .collect();

    if let Some(dir) = input_dir.filter(|d| !d.trim().is_empty()) {
        let dir = crate::config::expand_tilde_string(dir.trim());
        let mut rd = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| RunnerError::FileRead {
                kind: "input_dir",
                path: dir.clone(),
                source: e,
            })?;
        let mut found: Vec<PathBuf> = Vec::new();
        loop {
            match rd.next_entry().await {
                Ok(Some(entry)) => {
                    let is_file = entry
                        .file_type()
                        .await
                        .map(|ft| ft.is_file())
                        .unwrap_or(false);
                    let path = entry.path();
                    if !is_file || !has_input_extension(&path) || is_companion_file(&path) {
                        continue;
                    }
                    found.push(path);
                }
                Ok(None) => break,
                Err(e) => {
                    return Err(RunnerError::FileRead {
                        kind: "input_dir",
                        path: dir,
                        source: e,
                    })
                }
            }
        }
        found.sort();
        out.extend(found);
    }

    Ok(out)
}

async fn load_overview(path: &str) -> Result<CompanyOverview, RunnerError> {
    let path = crate::config::expand_tilde_string(path.trim());
    let body = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| RunnerError::FileRead {
            kind: "overview",
            path: path.clone(),
            source: e,
        })?;
    payload::parse_overview(&body).map_err(|e| RunnerError::Decode {
        kind: "overview",
        path,
        source: e,
    })
}

async fn load_announcements(path: &str) -> Result<Vec<AnnouncementRecord>, RunnerError> {
    let path = crate::config::expand_tilde_string(path.trim());
    let body = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| RunnerError::FileRead {
            kind: "announcements",
            path: path.clone(),
            source: e,
        })?;
    payload::parse_announcements(&body).map_err(|e| RunnerError::Decode {
        kind: "announcements",
        path,
        source: e,
    })
}

async fn sibling_if_present(path: &Path, marker: &str) -> Option<String> {
    let candidate = sibling_file(path, marker)?;
    if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
        Some(candidate.to_string_lossy().to_string())
    } else {
        None
    }
}

async fn process_input(
    path: &Path,
    shared_overview: Option<&CompanyOverview>,
    shared_announcements: Option<&[AnnouncementRecord]>,
    static_base: &str,
) -> Result<FilingReport, RunnerError> {
    let display = path.to_string_lossy().to_string();
    let body = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RunnerError::FileRead {
            kind: "payload",
            path: display.clone(),
            source: e,
        })?;
    let filing = payload::parse_filing(&body).map_err(|e| RunnerError::Decode {
        kind: "payload",
        path: display.clone(),
        source: e,
    })?;

    let sibling_overview = match shared_overview {
        Some(_) => None,
        None => match sibling_if_present(path, OVERVIEW_MARKER).await {
            Some(candidate) => Some(load_overview(&candidate).await?),
            None => None,
        },
    };
    let overview = shared_overview.or(sibling_overview.as_ref());

    let sibling_announcements = match shared_announcements {
        Some(_) => None,
        None => match sibling_if_present(path, ANNOUNCE_MARKER).await {
            Some(candidate) => Some(load_announcements(&candidate).await?),
            None => None,
        },
    };
    let announcements = shared_announcements
        .or(sibling_announcements.as_deref())
        .unwrap_or_default();

    Ok(output::build_report(
        &display,
        &filing,
        overview,
        announcements,
        static_base,
    ))
}
