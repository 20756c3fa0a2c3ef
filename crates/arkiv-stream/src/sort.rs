use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::TempDir;
use tracing::debug;

use crate::error::Result;
use crate::record::{RecordReader, RecordWriter};

/// Memory bounds for the external sorter.
#[derive(Clone, Debug)]
pub struct SortConfig {
    /// Records sorted in memory per run.
    pub chunk_size: usize,
    /// Maximum sorted runs merged in one pass.
    pub merge_fan_in: usize,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            chunk_size: 10_000,
            merge_fan_in: 16,
        }
    }
}

/// What one sort invocation did. Returned for observability and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SortReport {
    /// Records read from the input stream.
    pub records: u64,
    /// Sorted runs produced by the split phase.
    pub runs_created: usize,
    /// K-way merges performed.
    pub merges: usize,
    /// Temporary files created in total (runs + merge outputs).
    pub temp_files_created: usize,
}

/// Sort an arbitrarily large record stream with bounded memory.
///
/// Reads `input` through [`RecordReader`] in `chunk_size` batches, sorts each
/// batch in memory (stable), and writes one run file per batch. Runs are then
/// repeatedly k-way merged (up to `merge_fan_in` at a time, ties broken by
/// input-run order) until one file remains, which becomes `output`.
///
/// All intermediate files live in a temporary directory beside `output` and
/// are removed on success and on every failure path; the input file is never
/// touched. A zero-entry input produces a valid sentinel-only output in one
/// pass.
pub fn sort_large_file<T, F>(
    input: &Path,
    output: &Path,
    config: &SortConfig,
    compare: F,
) -> Result<SortReport>
where
    T: Serialize + DeserializeOwned,
    F: Fn(&T, &T) -> Ordering,
{
    let chunk_size = config.chunk_size.max(1);
    let fan_in = config.merge_fan_in.max(2);

    // Arena for all intermediate files. Dropping it (success or error)
    // removes whatever is left inside.
    let parent = output.parent().filter(|p| !p.as_os_str().is_empty());
    let arena = tempfile::Builder::new()
        .prefix(".arkiv-sort-")
        .tempdir_in(parent.unwrap_or_else(|| Path::new(".")))?;

    let mut report = SortReport::default();
    let mut temp_seq = 0usize;
    let mut runs: VecDeque<PathBuf> = VecDeque::new();

    // Split phase: one sorted run per chunk.
    let mut chunk: Vec<T> = Vec::new();
    for record in RecordReader::<T>::open(input)? {
        chunk.push(record?);
        report.records += 1;
        if chunk.len() == chunk_size {
            runs.push_back(write_run(&arena, &mut temp_seq, &mut chunk, &compare)?);
        }
    }
    if !chunk.is_empty() {
        runs.push_back(write_run(&arena, &mut temp_seq, &mut chunk, &compare)?);
    }
    report.runs_created = runs.len();
    report.temp_files_created = runs.len();
    debug!(records = report.records, runs = report.runs_created, "split phase complete");

    if runs.is_empty() {
        // Zero entries: sentinel-only output, no merge phase.
        RecordWriter::<T>::create(output)?.close()?;
        return Ok(report);
    }

    // Merge phase: rounds of k-way merges over consecutive runs, strictly
    // left to right. Run order is preserved across rounds, so ties between
    // equal keys always resolve to the earlier input position.
    while runs.len() > 1 {
        let mut next_round = VecDeque::with_capacity(runs.len() / fan_in + 1);
        while !runs.is_empty() {
            if runs.len() == 1 {
                next_round.extend(runs.pop_front());
                break;
            }
            let take = fan_in.min(runs.len());
            let batch: Vec<PathBuf> = runs.drain(..take).collect();
            let merged = next_temp_path(&arena, &mut temp_seq);

            merge_runs(&batch, &merged, &compare)?;
            for run in &batch {
                fs::remove_file(run)?;
            }

            next_round.push_back(merged);
            report.merges += 1;
            report.temp_files_created += 1;
        }
        runs = next_round;
    }

    // Exactly one run remains: it is the result. The arena sits beside the
    // output, so a rename stays on one filesystem.
    let last = runs.pop_front().unwrap_or_default();
    fs::rename(&last, output)?;
    debug!(
        records = report.records,
        merges = report.merges,
        output = %output.display(),
        "sort complete"
    );
    Ok(report)
}

fn write_run<T, F>(
    arena: &TempDir,
    temp_seq: &mut usize,
    chunk: &mut Vec<T>,
    compare: &F,
) -> Result<PathBuf>
where
    T: Serialize,
    F: Fn(&T, &T) -> Ordering,
{
    chunk.sort_by(|a, b| compare(a, b));
    let path = next_temp_path(arena, temp_seq);
    let mut writer = RecordWriter::create(&path)?;
    for record in chunk.drain(..) {
        writer.write(&record)?;
    }
    writer.close()?;
    Ok(path)
}

fn next_temp_path(arena: &TempDir, temp_seq: &mut usize) -> PathBuf {
    let path = arena.path().join(format!("run-{:06}.jsonl", *temp_seq));
    *temp_seq += 1;
    path
}

/// Stable k-way merge: at each step the globally-smallest head advances,
/// ties resolved in favor of the earliest input run.
fn merge_runs<T, F>(inputs: &[PathBuf], output: &Path, compare: &F) -> Result<()>
where
    T: Serialize + DeserializeOwned,
    F: Fn(&T, &T) -> Ordering,
{
    let mut readers = Vec::with_capacity(inputs.len());
    for path in inputs {
        readers.push(RecordReader::<T>::open(path)?);
    }

    let mut heads: Vec<Option<T>> = Vec::with_capacity(readers.len());
    for reader in &mut readers {
        heads.push(reader.next().transpose()?);
    }

    let mut writer = RecordWriter::create(output)?;
    loop {
        let mut best: Option<usize> = None;
        for (i, head) in heads.iter().enumerate() {
            let Some(candidate) = head else { continue };
            let smaller = match best.and_then(|b| heads[b].as_ref()) {
                Some(current) => compare(candidate, current) == Ordering::Less,
                None => true,
            };
            if smaller {
                best = Some(i);
            }
        }

        let Some(i) = best else { break };
        let record = heads[i].take().expect("selected head is non-empty");
        writer.write(&record)?;
        heads[i] = readers[i].next().transpose()?;
    }
    writer.close()
}
