//! Benchmark driver: Init -> VerifyBaselines -> for each problem size, run
//! every configured strategy in fixed order and gate each result against
//! the cached sequential baseline -> Done. Any failure is terminal; nothing
//! is retried.

use matbench_types::{RunConfig, StrategyTag, TimingSample};
use tracing::{info, warn};

use crate::backend::Accelerator;
use crate::{approx_equal, dispatch, generate, verify, Error};

pub fn run<B: Accelerator>(backend: &B, config: &RunConfig) -> Result<Vec<TimingSample>, Error> {
    // Every configured strategy must clear the oracle before any timing.
    for &tag in &config.strategies {
        verify::verify_strategy(backend, tag)?;
    }
    info!(
        strategies = config.strategies.len(),
        "all strategies verified against the 3x3 oracle"
    );

    let mut samples = Vec::new();
    for &n in &config.sizes {
        let (a, b) = generate(n);

        // Sequential always runs first: its output is the baseline every
        // other strategy for this size is compared against.
        let (baseline, elapsed) =
            dispatch::dispatch_rounds(backend, StrategyTag::Sequential, n, config.rounds, &a, &b)?;
        if config.strategies.contains(&StrategyTag::Sequential) {
            samples.push(dispatch::sample(StrategyTag::Sequential, n, elapsed));
        }

        for &tag in config
            .strategies
            .iter()
            .filter(|&&tag| tag != StrategyTag::Sequential)
        {
            if !dispatch::supports(tag, n) {
                warn!(
                    tag = tag.label(),
                    n, "skipping: workgroup divisor does not divide N"
                );
                continue;
            }

            let (c, elapsed) = dispatch::dispatch_rounds(backend, tag, n, config.rounds, &a, &b)?;
            approx_equal(&baseline, &c).map_err(|failure| {
                Error::Agreement(format!(
                    "{}: N={n}: diverged from sequential baseline: {failure:?}",
                    tag.label()
                ))
            })?;
            samples.push(dispatch::sample(tag, n, elapsed));
        }
    }

    Ok(samples)
}
