use std::time::{Duration, Instant};

use matbench_types::{IndexSpace, StrategyTag, TimingSample};
use tracing::debug;

use crate::backend::Accelerator;
use crate::kernels::{self, TILE};
use crate::{cpu, Error};

/// Workgroup size for the 1D row-per-item strategy: N/16 work items per
/// group. Two cases at the edges:
/// N below 16 (the 3x3 oracle fixture) falls back to single-item groups,
/// and N not a multiple of 16 is rejected rather than silently clipped.
pub fn tiled_workgroup(n: u32) -> Result<u32, Error> {
    if n == 0 {
        return Err(Error::Invocation("empty index space".into()));
    }
    if n < TILE {
        return Ok(1);
    }
    if n % TILE != 0 {
        return Err(Error::Invocation(format!(
            "1D tiled dispatch needs N divisible by {TILE}, got N={n}"
        )));
    }
    Ok(n / TILE)
}

/// Whether the driver may schedule `tag` at problem size `n`.
pub fn supports(tag: StrategyTag, n: usize) -> bool {
    match tag {
        StrategyTag::Tiled1d => tiled_workgroup(n as u32).is_ok(),
        _ => true,
    }
}

/// Run one strategy over the given inputs, returning the output matrix and
/// the elapsed wall clock. The clock covers only the compute for CPU
/// strategies, and the full transfer-in / kernel / transfer-out round trip
/// for kernel strategies; kernel compilation is never timed.
pub fn dispatch<B: Accelerator>(
    backend: &B,
    tag: StrategyTag,
    n: usize,
    a: &[f32],
    b: &[f32],
) -> Result<(Vec<f32>, Duration), Error> {
    debug_assert_eq!(a.len(), n * n);
    debug_assert_eq!(b.len(), n * n);

    match tag {
        StrategyTag::Sequential => Ok(timed(|| cpu::sequential(n, a, b))),
        StrategyTag::Threaded => Ok(timed(|| cpu::threaded(n, a, b))),
        StrategyTag::Naive => timed_kernel(backend, &kernels::naive(n), grid2d(n), n, a, b),
        StrategyTag::Local => {
            timed_kernel(backend, &kernels::local_staging(n), grid2d(n), n, a, b)
        }
        StrategyTag::Tiled1d => {
            let workgroup = tiled_workgroup(n as u32)?;
            let space = IndexSpace::Grid1d {
                len: n as u32,
                workgroup,
            };
            timed_kernel(backend, &kernels::row_per_item(n, workgroup), space, n, a, b)
        }
    }
}

/// Repeat a dispatch `rounds` times and report the median elapsed time,
/// since a single wall-clock sample is noisy. Inputs are deterministic, so
/// every round computes the same matrix; the first round's output is kept
/// for the agreement check. Zero rounds is treated as one.
pub fn dispatch_rounds<B: Accelerator>(
    backend: &B,
    tag: StrategyTag,
    n: usize,
    rounds: usize,
    a: &[f32],
    b: &[f32],
) -> Result<(Vec<f32>, Duration), Error> {
    let (c, first) = dispatch(backend, tag, n, a, b)?;
    let mut times = vec![first];
    for _ in 1..rounds.max(1) {
        let (_, elapsed) = dispatch(backend, tag, n, a, b)?;
        times.push(elapsed);
    }
    times.sort();
    Ok((c, times[times.len() / 2]))
}

/// Derive the reported sample from an elapsed dispatch. Sub-microsecond
/// runs clamp to 1us so throughput stays finite.
pub fn sample(tag: StrategyTag, n: usize, elapsed: Duration) -> TimingSample {
    let elapsed_us = (elapsed.as_micros() as u64).max(1);
    let nflop = 2.0 * (n as f64).powi(3);
    TimingSample {
        tag,
        n,
        elapsed_us,
        mflops: (nflop / elapsed_us as f64) as u64,
    }
}

fn grid2d(n: usize) -> IndexSpace {
    IndexSpace::Grid2d {
        rows: n as u32,
        cols: n as u32,
    }
}

fn timed(f: impl FnOnce() -> Vec<f32>) -> (Vec<f32>, Duration) {
    let start = Instant::now();
    let c = f();
    (c, start.elapsed())
}

fn timed_kernel<B: Accelerator>(
    backend: &B,
    source: &str,
    space: IndexSpace,
    n: usize,
    a: &[f32],
    b: &[f32],
) -> Result<(Vec<f32>, Duration), Error> {
    let kernel = backend.compile(source, kernels::ENTRY)?;
    debug!(?space, n, "dispatching kernel");
    let start = Instant::now();
    let c = backend.invoke(&kernel, space, n as u32, a, b)?;
    Ok((c, start.elapsed()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SoftwareBackend;
    use crate::{approx_equal, generate};

    #[test]
    fn tiled_workgroup_policy() {
        assert!(matches!(tiled_workgroup(3), Ok(1)));
        assert!(matches!(tiled_workgroup(32), Ok(2)));
        assert!(matches!(tiled_workgroup(512), Ok(32)));
        assert!(matches!(tiled_workgroup(24), Err(Error::Invocation(_))));
        assert!(matches!(tiled_workgroup(0), Err(Error::Invocation(_))));
    }

    #[test]
    fn supports_guards_only_the_1d_strategy() {
        assert!(supports(StrategyTag::Naive, 24));
        assert!(supports(StrategyTag::Local, 24));
        assert!(!supports(StrategyTag::Tiled1d, 24));
        assert!(supports(StrategyTag::Tiled1d, 48));
    }

    #[test]
    fn every_strategy_agrees_with_the_baseline() {
        let n = 32;
        let (a, b) = generate(n);
        let (baseline, _) = dispatch(&SoftwareBackend, StrategyTag::Sequential, n, &a, &b).unwrap();
        for tag in [
            StrategyTag::Threaded,
            StrategyTag::Naive,
            StrategyTag::Local,
            StrategyTag::Tiled1d,
        ] {
            let (c, _) = dispatch(&SoftwareBackend, tag, n, &a, &b).unwrap();
            assert!(approx_equal(&baseline, &c).is_ok(), "{tag:?} diverged");
        }
    }

    #[test]
    fn tiled_dispatch_rejects_uneven_sizes() {
        let n = 24;
        let (a, b) = generate(n);
        let err = dispatch(&SoftwareBackend, StrategyTag::Tiled1d, n, &a, &b).unwrap_err();
        assert!(matches!(err, Error::Invocation(_)));
    }

    #[test]
    fn rounds_repeat_the_dispatch_but_keep_one_result() {
        let n = 16;
        let (a, b) = generate(n);
        let (single, _) = dispatch(&SoftwareBackend, StrategyTag::Naive, n, &a, &b).unwrap();
        for rounds in [0, 1, 5] {
            let (c, elapsed) =
                dispatch_rounds(&SoftwareBackend, StrategyTag::Naive, n, rounds, &a, &b).unwrap();
            assert_eq!(c, single);
            assert!(elapsed >= Duration::ZERO);
        }
    }

    #[test]
    fn sample_throughput_stays_finite() {
        let s = sample(StrategyTag::Sequential, 512, Duration::ZERO);
        assert_eq!(s.elapsed_us, 1);
        assert!(s.mflops > 0);

        let s = sample(StrategyTag::Naive, 256, Duration::from_micros(1000));
        assert_eq!(s.mflops, (2.0 * 256f64.powi(3) / 1000.0) as u64);
    }
}
