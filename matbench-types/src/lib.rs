use serde::{Deserialize, Serialize};

/// Maximum absolute per-element difference for two results to count as equal.
pub const EPSILON: f32 = 1e-4;

/// Flat row-major index of cell (i, j) in an n x n matrix.
#[inline]
pub fn index(i: usize, j: usize, n: usize) -> usize {
    i * n + j
}

/// Recover (i, j) from a flat row-major index.
#[inline]
pub fn coords(idx: usize, n: usize) -> (usize, usize) {
    (idx / n, idx % n)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyTag {
    Sequential,
    Threaded,
    Naive,
    Local,
    Tiled1d,
}

impl StrategyTag {
    pub const ALL: [StrategyTag; 5] = [
        StrategyTag::Sequential,
        StrategyTag::Threaded,
        StrategyTag::Naive,
        StrategyTag::Local,
        StrategyTag::Tiled1d,
    ];

    /// Report prefix used in console output.
    pub fn label(self) -> &'static str {
        match self {
            StrategyTag::Sequential => "Seq",
            StrategyTag::Threaded => "Threaded",
            StrategyTag::Naive => "Naive",
            StrategyTag::Local => "Local",
            StrategyTag::Tiled1d => "1D",
        }
    }

    pub fn parse(s: &str) -> Option<StrategyTag> {
        match s {
            "seq" | "sequential" => Some(StrategyTag::Sequential),
            "threaded" => Some(StrategyTag::Threaded),
            "naive" => Some(StrategyTag::Naive),
            "local" => Some(StrategyTag::Local),
            "1d" | "tiled1d" => Some(StrategyTag::Tiled1d),
            _ => None,
        }
    }

    pub fn dispatch_kind(self) -> DispatchKind {
        match self {
            StrategyTag::Sequential | StrategyTag::Threaded => DispatchKind::Direct,
            StrategyTag::Naive | StrategyTag::Local | StrategyTag::Tiled1d => DispatchKind::Kernel,
        }
    }
}

/// Direct host compute vs. compiled-kernel invocation through a backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchKind {
    Direct,
    Kernel,
}

/// Concrete index space for one kernel dispatch.
///
/// For `Grid1d` the workgroup size must evenly divide `len`; backends reject
/// the dispatch otherwise.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexSpace {
    Grid2d { rows: u32, cols: u32 },
    Grid1d { len: u32, workgroup: u32 },
}

impl IndexSpace {
    /// Total number of work items enumerated by this space.
    pub fn items(self) -> u64 {
        match self {
            IndexSpace::Grid2d { rows, cols } => rows as u64 * cols as u64,
            IndexSpace::Grid1d { len, .. } => len as u64,
        }
    }
}

/// One timed dispatch: throughput in MFLOPS (flops per microsecond) derived
/// from 2*N^3 flops over the wall-clock elapsed time.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct TimingSample {
    pub tag: StrategyTag,
    pub n: usize,
    pub elapsed_us: u64,
    pub mflops: u64,
}

/// What to run: problem sizes, strategy order, and adapter selection,
/// carried as data so per-platform runs differ only in configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    /// Substring matched against adapter names; empty matches the first one.
    #[serde(default)]
    pub adapter: String,
    #[serde(default = "default_sizes")]
    pub sizes: Vec<usize>,
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyTag>,
    /// Timed dispatches per (strategy, size) pair; the median is reported.
    #[serde(default = "default_rounds")]
    pub rounds: usize,
}

fn default_sizes() -> Vec<usize> {
    vec![512]
}

fn default_strategies() -> Vec<StrategyTag> {
    StrategyTag::ALL.to_vec()
}

fn default_rounds() -> usize {
    1
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            adapter: String::new(),
            sizes: default_sizes(),
            strategies: default_strategies(),
            rounds: default_rounds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_row_major() {
        assert_eq!(index(0, 0, 4), 0);
        assert_eq!(index(1, 0, 4), 4);
        assert_eq!(index(2, 3, 4), 11);
    }

    #[test]
    fn coords_round_trip() {
        let n = 7;
        for i in 0..n {
            for j in 0..n {
                assert_eq!(coords(index(i, j, n), n), (i, j));
            }
        }
    }

    #[test]
    fn tags_parse_their_cli_names() {
        assert_eq!(StrategyTag::parse("seq"), Some(StrategyTag::Sequential));
        assert_eq!(StrategyTag::parse("threaded"), Some(StrategyTag::Threaded));
        assert_eq!(StrategyTag::parse("naive"), Some(StrategyTag::Naive));
        assert_eq!(StrategyTag::parse("local"), Some(StrategyTag::Local));
        assert_eq!(StrategyTag::parse("1d"), Some(StrategyTag::Tiled1d));
        assert_eq!(StrategyTag::parse("omp"), None);
    }

    #[test]
    fn kernel_strategies_are_kernel_kind() {
        assert_eq!(StrategyTag::Sequential.dispatch_kind(), DispatchKind::Direct);
        assert_eq!(StrategyTag::Threaded.dispatch_kind(), DispatchKind::Direct);
        assert_eq!(StrategyTag::Naive.dispatch_kind(), DispatchKind::Kernel);
        assert_eq!(StrategyTag::Local.dispatch_kind(), DispatchKind::Kernel);
        assert_eq!(StrategyTag::Tiled1d.dispatch_kind(), DispatchKind::Kernel);
    }

    #[test]
    fn config_defaults_cover_every_strategy() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.sizes, vec![512]);
        assert_eq!(cfg.strategies.len(), 5);
        assert_eq!(cfg.strategies[0], StrategyTag::Sequential);
        assert_eq!(cfg.rounds, 1);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: RunConfig = serde_json::from_str(r#"{"sizes": [128, 256]}"#).unwrap();
        assert_eq!(cfg.sizes, vec![128, 256]);
        assert_eq!(cfg.strategies.len(), 5);
        assert!(cfg.adapter.is_empty());
        assert_eq!(cfg.rounds, 1);
    }

    #[test]
    fn config_rounds_is_overridable() {
        let cfg: RunConfig = serde_json::from_str(r#"{"rounds": 10}"#).unwrap();
        assert_eq!(cfg.rounds, 10);
        assert_eq!(cfg.sizes, vec![512]);
    }

    #[test]
    fn index_space_item_counts() {
        assert_eq!(IndexSpace::Grid2d { rows: 8, cols: 8 }.items(), 64);
        assert_eq!(IndexSpace::Grid1d { len: 8, workgroup: 2 }.items(), 8);
    }
}
