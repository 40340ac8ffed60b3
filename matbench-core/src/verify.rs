//! Reference oracle: a fixed 3x3 case with small-integer inputs, so every
//! strategy must reproduce the expected product exactly. A strategy that
//! fails here never reaches a timing run; a timing number for an incorrect
//! kernel is worse than no number.

use matbench_types::StrategyTag;
use tracing::debug;

use crate::backend::Accelerator;
use crate::{dispatch, exact_equal, Error};

pub const ORACLE_N: usize = 3;

#[rustfmt::skip]
pub const ORACLE_A: [f32; 9] = [
    5.0,  6.0,  3.0,
    7.0,  2.0, -2.0,
    4.0, -1.0,  8.0,
];

#[rustfmt::skip]
pub const ORACLE_B: [f32; 9] = [
    -3.0, 0.0, 1.0,
     3.0, 5.0, 6.0,
    -2.0, 4.0, 7.0,
];

#[rustfmt::skip]
pub const ORACLE_C: [f32; 9] = [
     -3.0, 42.0, 62.0,
    -11.0,  2.0,  5.0,
    -31.0, 27.0, 54.0,
];

/// Run one strategy on the fixture and require exact equality.
pub fn verify_strategy<B: Accelerator>(backend: &B, tag: StrategyTag) -> Result<(), Error> {
    let (c, _) = dispatch::dispatch(backend, tag, ORACLE_N, &ORACLE_A, &ORACLE_B)?;
    exact_equal(&ORACLE_C, &c).map_err(|failure| {
        Error::Verification(format!("{}: 3x3 oracle mismatch: {failure:?}", tag.label()))
    })?;
    debug!(tag = tag.label(), "oracle check passed");
    Ok(())
}
