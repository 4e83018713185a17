//! Benchmark experiment: times `Setup`/`Update`/`Search` over a configurable
//! workload and reports storage and communication overhead, as CSV or JSON.

use std::fs;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::core::client::{decrypt_results, prepare_search};
use crate::core::gatekeeper::Gatekeeper;
use crate::core::server::Server;
use crate::core::types::Operation;
use crate::curve::POINT_BYTES;
use crate::error::Result;
use crate::experiment::Experiment;

/// Illustrative per-entry TSet size (compressed address + AE-wrapped
/// payload + scalar α), rounded the way a pairing curve's larger
/// serialization would land. `run_benchmark` measures actual sizes via
/// [`crate::core::server::Server::tset_size_bytes`] rather than this
/// constant; it is kept for reference alongside [`POINT_BYTES`].
pub const TSET_ENTRY_SIZE: usize = 113;

/// Illustrative per-entry XSet size (one compressed group element), rounded
/// to 33 B for a pairing curve's compressed G₁ serialization; this crate's
/// actual Ristretto points are [`POINT_BYTES`] (32) —
/// `Server::xset_size_bytes` measures the real total directly rather than
/// multiplying by either constant.
pub const XSET_ENTRY_SIZE: usize = POINT_BYTES;

/// Parameters controlling workload size and shape.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkConfig {
    /// Keyword universe size.
    pub num_keywords: usize,
    /// Document universe size.
    pub num_files: usize,
    /// `ℓ`, cross-tags per update.
    pub cross_tags_l: usize,
    /// `k`, β samples per cross keyword.
    pub cross_tags_k: usize,
    /// Expected conjunction result size (informational; not enforced).
    pub result_set_size: usize,
    /// Update operations to issue.
    pub num_updates: usize,
    /// Search operations to issue.
    pub num_searches: usize,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_keywords: 100,
            num_files: 1000,
            cross_tags_l: 3,
            cross_tags_k: 2,
            result_set_size: 10,
            num_updates: 100,
            num_searches: 10,
        }
    }
}

/// Timing, storage, and communication measurements from one benchmark run.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    /// Time to run `Setup`, in milliseconds.
    pub setup_time_ms: f64,
    /// Total time spent in `Update` calls, in milliseconds.
    pub total_update_time_ms: f64,
    /// `total_update_time_ms / num_updates`.
    pub avg_update_time_ms: f64,
    /// Total time spent in `Search` calls (token gen + prepare + server
    /// search + decrypt), in milliseconds.
    pub total_search_time_ms: f64,
    /// `total_search_time_ms / num_searches`.
    pub avg_search_time_ms: f64,
    /// Total TSet storage, in bytes.
    pub tset_size_bytes: usize,
    /// Total XSet storage, in bytes.
    pub xset_size_bytes: usize,
    /// `tset_size_bytes + xset_size_bytes`.
    pub total_storage_bytes: usize,
    /// Size of one search token, in bytes.
    pub token_size_bytes: usize,
    /// The configuration this result was produced under.
    #[serde(flatten)]
    pub config: BenchmarkConfig,
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn token_size_bytes(token: &crate::core::types::SearchToken) -> usize {
    token.strap.len()
        + token.bstag.iter().map(Vec::len).sum::<usize>()
        + token.delta.iter().map(Vec::len).sum::<usize>()
        + token.bxtrap.iter().flatten().map(Vec::len).sum::<usize>()
        + token.env.len()
}

/// Runs a single benchmark pass and returns its measurements.
pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkResult> {
    let setup_start = Instant::now();
    let mut gatekeeper = Gatekeeper::setup_with_params(10, config.cross_tags_l, config.cross_tags_k)?;
    let mut server = Server::new();
    let setup_time_ms = elapsed_ms(setup_start);

    let keywords: Vec<Vec<u8>> = (0..config.num_keywords).map(|i| format!("keyword_{i}").into_bytes()).collect();
    let file_ids: Vec<Vec<u8>> = (0..config.num_files).map(|i| format!("file_{i}").into_bytes()).collect();

    let update_start = Instant::now();
    for i in 0..config.num_updates {
        let keyword = &keywords[i % keywords.len()];
        let file_id = &file_ids[i % file_ids.len()];
        let meta = gatekeeper.update(Operation::Add, file_id, keyword);
        server.update(&meta);
    }
    let total_update_time_ms = elapsed_ms(update_start);

    let search_keywords: Vec<Vec<u8>> = (0..config.num_searches)
        .map(|i| keywords[i % config.num_keywords.max(1)].clone())
        .collect();

    let mut last_token_size = 0usize;
    let search_start = Instant::now();
    for keyword in &search_keywords {
        let query = vec![keyword.clone()];
        let token = gatekeeper.gen_token_simplified(&query)?;
        last_token_size = token_size_bytes(&token);
        let req = prepare_search(&token, &query, gatekeeper.update_counts())?;
        let results = server.search(&req);
        decrypt_results(&results, &token)?;
    }
    let total_search_time_ms = elapsed_ms(search_start);

    let tset_size_bytes = server.tset_size_bytes();
    let xset_size_bytes = server.xset_size_bytes();

    Ok(BenchmarkResult {
        setup_time_ms,
        total_update_time_ms,
        avg_update_time_ms: total_update_time_ms / config.num_updates.max(1) as f64,
        total_search_time_ms,
        avg_search_time_ms: total_search_time_ms / config.num_searches.max(1) as f64,
        tset_size_bytes,
        xset_size_bytes,
        total_storage_bytes: tset_size_bytes + xset_size_bytes,
        token_size_bytes: last_token_size,
        config,
    })
}

/// The CSV header matching [`BenchmarkResult::to_csv_row`]'s column order.
pub fn csv_header() -> &'static str {
    "setup_time_ms,total_update_time_ms,avg_update_time_ms,total_search_time_ms,avg_search_time_ms,\
tset_size_bytes,xset_size_bytes,total_storage_bytes,token_size_bytes,\
num_keywords,num_files,cross_tags_l,cross_tags_k,result_set_size,num_updates,num_searches"
}

impl BenchmarkResult {
    /// Renders this result as a single CSV row, in [`csv_header`] order.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            self.setup_time_ms,
            self.total_update_time_ms,
            self.avg_update_time_ms,
            self.total_search_time_ms,
            self.avg_search_time_ms,
            self.tset_size_bytes,
            self.xset_size_bytes,
            self.total_storage_bytes,
            self.token_size_bytes,
            self.config.num_keywords,
            self.config.num_files,
            self.config.cross_tags_l,
            self.config.cross_tags_k,
            self.config.result_set_size,
            self.config.num_updates,
            self.config.num_searches,
        )
    }

    /// Renders this result as a JSON object.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| crate::error::NomosError::CryptoError {
            reason: format!("failed to serialize benchmark result: {e}"),
        })
    }
}

/// Writes `result` to `path` as CSV (header plus one row). Export failures
/// are the caller's to decide whether to treat as fatal.
pub fn write_csv_file(result: &BenchmarkResult, path: &str) -> std::io::Result<()> {
    fs::write(path, format!("{}\n{}\n", csv_header(), result.to_csv_row()))
}

/// Writes `result` to `path` as pretty-printed JSON.
pub fn write_json_file(result: &BenchmarkResult, path: &str) -> Result<()> {
    let json = result.to_json()?;
    fs::write(path, json).map_err(|e| crate::error::NomosError::CryptoError {
        reason: format!("failed to write {path}: {e}"),
    })
}

/// Runs [`run_benchmark`] with the default configuration, prints a CSV row
/// to stdout, and best-effort exports `benchmark_result.{csv,json}` to the
/// working directory.
pub struct BenchmarkExperiment {
    config: BenchmarkConfig,
    result: Option<BenchmarkResult>,
}

impl BenchmarkExperiment {
    /// A benchmark experiment using the default workload configuration.
    pub fn new() -> Self {
        BenchmarkExperiment {
            config: BenchmarkConfig::default(),
            result: None,
        }
    }
}

impl Default for BenchmarkExperiment {
    fn default() -> Self {
        Self::new()
    }
}

impl Experiment for BenchmarkExperiment {
    fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let result = run_benchmark(self.config.clone())?;
        info!(
            setup_ms = result.setup_time_ms,
            avg_update_ms = result.avg_update_time_ms,
            avg_search_ms = result.avg_search_time_ms,
            total_storage_bytes = result.total_storage_bytes,
            "benchmark complete"
        );
        println!("{}", csv_header());
        println!("{}", result.to_csv_row());

        if let Err(e) = write_csv_file(&result, "benchmark_result.csv") {
            warn!(error = %e, "failed to export benchmark_result.csv");
        }
        if let Err(e) = write_json_file(&result, "benchmark_result.json") {
            warn!(error = %e, "failed to export benchmark_result.json");
        }

        self.result = Some(result);
        Ok(())
    }

    fn teardown(&mut self) {
        self.result = None;
    }

    fn name(&self) -> &str {
        "benchmark"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn benchmark_runs_and_reports_nonzero_storage() {
        let config = BenchmarkConfig {
            num_keywords: 5,
            num_files: 5,
            num_updates: 10,
            num_searches: 3,
            ..BenchmarkConfig::default()
        };
        let result = run_benchmark(config).unwrap();
        assert!(result.tset_size_bytes > 0);
        assert!(result.xset_size_bytes > 0);
        assert_eq!(result.total_storage_bytes, result.tset_size_bytes + result.xset_size_bytes);
        assert!(result.token_size_bytes > 0);
    }

    #[test]
    fn csv_row_has_one_value_per_header_column() {
        let config = BenchmarkConfig {
            num_keywords: 3,
            num_files: 3,
            num_updates: 3,
            num_searches: 2,
            ..BenchmarkConfig::default()
        };
        let result = run_benchmark(config).unwrap();
        let header_cols = csv_header().split(',').count();
        let row_cols = result.to_csv_row().split(',').count();
        assert_eq!(header_cols, row_cols);
    }

    #[test]
    fn json_round_trips_through_serde() {
        let config = BenchmarkConfig {
            num_keywords: 3,
            num_files: 3,
            num_updates: 3,
            num_searches: 2,
            ..BenchmarkConfig::default()
        };
        let result = run_benchmark(config).unwrap();
        let json = result.to_json().unwrap();
        assert!(json.contains("setup_time_ms"));
        assert!(json.contains("num_keywords"));
    }
}
