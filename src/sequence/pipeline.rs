//! Encoding a whole frame sequence into ARF files.

use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;

use super::manifest::{ManifestError, SequenceConfig};
use crate::codec::{Direction, EncodingKind, Playback, encode_pair};
use crate::error::ArfError;
use crate::raster::{RasterFrame, bmp};

/// Errors from running a sequence.
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    #[error("Invalid manifest: {0}")]
    Manifest(#[from] ManifestError),
    #[error("Failed to decode frame {path:?}: {source}")]
    Frame {
        path: PathBuf,
        #[source]
        source: ArfError,
    },
    #[error("Failed to write {path:?}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: ArfError,
    },
}

/// Result of encoding one frame pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairReport {
    pub output: PathBuf,
    pub direction: Direction,
    /// Header count: changed pixels (sparse) or touched lines (run-length).
    pub entry_count: u32,
    pub bytes: u64,
}

/// Statistics from a sequence run.
#[derive(Debug, Clone)]
pub struct SequenceReport {
    pub encoding: EncodingKind,
    pub pairs: Vec<PairReport>,
}

impl SequenceReport {
    /// Total bytes across all streams.
    pub fn total_bytes(&self) -> u64 {
        self.pairs.iter().map(|p| p.bytes).sum()
    }

    /// Output paths in playback order.
    pub fn outputs(&self) -> impl Iterator<Item = &Path> {
        self.pairs.iter().map(|p| p.output.as_path())
    }
}

impl fmt::Display for SequenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} streams, {} bytes total ({} encoding)",
            self.pairs.len(),
            self.total_bytes(),
            self.encoding
        )
    }
}

/// Output file name for a pair: `<previous>2<current>_<n>.arf`.
pub fn output_name(previous: &Path, current: &Path, n: usize) -> String {
    let stem = |p: &Path| {
        p.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    format!("{}2{}_{}.arf", stem(previous), stem(current), n)
}

/// A frame pair to encode, by frame index.
#[derive(Debug, Clone, Copy)]
struct PairJob {
    previous: usize,
    current: usize,
    /// 1-based stream number used in the file name.
    number: usize,
}

/// Pairs in playback order: each frame to the next, then optionally the
/// last frame back to the first.
fn pair_jobs(config: &SequenceConfig) -> Vec<PairJob> {
    let n = config.frames.len();
    let mut jobs: Vec<PairJob> = (1..n)
        .map(|i| PairJob {
            previous: i - 1,
            current: i,
            number: i,
        })
        .collect();
    if config.loop_back && n > 1 {
        jobs.push(PairJob {
            previous: n - 1,
            current: 0,
            number: n,
        });
    }
    jobs
}

fn load_frame(path: &Path) -> Result<RasterFrame, SequenceError> {
    fs::read(path)
        .map_err(ArfError::from)
        .and_then(|bytes| bmp::decode(&bytes))
        .map_err(|source| SequenceError::Frame {
            path: path.to_path_buf(),
            source,
        })
}

fn write_stream(
    previous: &RasterFrame,
    current: &RasterFrame,
    direction: Direction,
    encoding: EncodingKind,
    output: PathBuf,
) -> Result<PairReport, SequenceError> {
    let result = File::create(&output)
        .map_err(ArfError::from)
        .and_then(|file| {
            encode_pair(previous, current, direction, encoding, BufWriter::new(file))
        })
        .map(|(_, stats)| stats);

    match result {
        Ok(stats) => {
            debug!(
                "{}: {} entries, {} bytes",
                output.display(),
                stats.entry_count,
                stats.bytes
            );
            Ok(PairReport {
                output,
                direction,
                entry_count: stats.entry_count,
                bytes: stats.bytes,
            })
        }
        Err(source) => Err(SequenceError::Output {
            path: output,
            source,
        }),
    }
}

/// Encode every pair of a sequence into `output_dir`.
///
/// Relative frame paths resolve against `base_dir`. Pair `previous ->
/// current` is drawn with the direction of `previous`. The first failing
/// pair aborts the run; streams already written stay on disk.
pub fn encode_sequence(
    config: &SequenceConfig,
    base_dir: &Path,
    output_dir: &Path,
) -> Result<SequenceReport, SequenceError> {
    config.validate()?;
    fs::create_dir_all(output_dir).map_err(|e| SequenceError::Output {
        path: output_dir.to_path_buf(),
        source: e.into(),
    })?;

    let paths: Vec<PathBuf> = config.frames.iter().map(|f| base_dir.join(&f.path)).collect();
    let jobs = pair_jobs(config);
    let start = Instant::now();

    info!(
        "Encoding {} frames into {} {} streams{}",
        paths.len(),
        jobs.len(),
        config.encoding,
        if config.parallel { " (parallel)" } else { "" }
    );

    let pairs = if config.parallel {
        encode_parallel(config, &paths, &jobs, output_dir)?
    } else {
        encode_sequential(config, &paths, &jobs, output_dir)?
    };

    let report = SequenceReport {
        encoding: config.encoding,
        pairs,
    };
    info!("{} in {:.2}s", report, start.elapsed().as_secs_f32());
    Ok(report)
}

/// One decode per frame; the current frame moves into the previous slot.
fn encode_sequential(
    config: &SequenceConfig,
    paths: &[PathBuf],
    jobs: &[PairJob],
    output_dir: &Path,
) -> Result<Vec<PairReport>, SequenceError> {
    let mut reports = Vec::with_capacity(jobs.len());
    let mut previous = load_frame(&paths[0])?;
    // Kept only for the closing loop-back pair
    let first = config.loop_back.then(|| previous.clone());

    for job in jobs.iter().filter(|j| j.current != 0) {
        let current = load_frame(&paths[job.current])?;
        let output = output_dir.join(output_name(&paths[job.previous], &paths[job.current], job.number));
        reports.push(write_stream(
            &previous,
            &current,
            config.frames[job.previous].direction,
            config.encoding,
            output,
        )?);
        previous = current;
    }

    if let (Some(first), Some(job)) = (first, jobs.iter().find(|j| j.current == 0)) {
        let output = output_dir.join(output_name(&paths[job.previous], &paths[0], job.number));
        reports.push(write_stream(
            &previous,
            &first,
            config.frames[job.previous].direction,
            config.encoding,
            output,
        )?);
    }

    Ok(reports)
}

/// Decode every frame up front, then encode all pairs independently.
fn encode_parallel(
    config: &SequenceConfig,
    paths: &[PathBuf],
    jobs: &[PairJob],
    output_dir: &Path,
) -> Result<Vec<PairReport>, SequenceError> {
    let frames: Vec<RasterFrame> = paths
        .par_iter()
        .map(|p| load_frame(p))
        .collect::<Result<_, _>>()?;

    jobs.par_iter()
        .map(|job| {
            let output =
                output_dir.join(output_name(&paths[job.previous], &paths[job.current], job.number));
            write_stream(
                &frames[job.previous],
                &frames[job.current],
                config.frames[job.previous].direction,
                config.encoding,
                output,
            )
        })
        .collect()
}

/// Replay a sequence's streams from its first frame.
///
/// Yields the frame after each stream; with loop-back the final frame equals
/// the first.
pub fn play_sequence(
    first_frame: RasterFrame,
    report: &SequenceReport,
) -> Result<Vec<RasterFrame>, SequenceError> {
    let mut streams = Vec::with_capacity(report.pairs.len());
    for pair in &report.pairs {
        let bytes = fs::read(&pair.output).map_err(|e| SequenceError::Output {
            path: pair.output.clone(),
            source: e.into(),
        })?;
        streams.push(bytes);
    }

    Playback::new(first_frame, streams.iter())
        .zip(&report.pairs)
        .map(|(frame, pair)| {
            frame.map_err(|source| SequenceError::Output {
                path: pair.output.clone(),
                source,
            })
        })
        .collect()
}
