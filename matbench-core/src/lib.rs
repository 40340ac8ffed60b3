pub use matbench_types::{
    coords, index, DispatchKind, IndexSpace, RunConfig, StrategyTag, TimingSample, EPSILON,
};

pub mod backend;
mod compare;
pub mod cpu;
pub mod dispatch;
pub mod driver;
mod generate;
pub mod gpu;
pub mod kernels;
pub mod verify;

pub use compare::{approx_equal, exact_equal, CompareFailure, Mismatch};
pub use generate::generate;

#[derive(Debug)]
pub enum Error {
    /// No adapter matched the selection criteria.
    Setup(String),
    /// Kernel source failed to compile; carries the build log.
    Build(String),
    /// A dispatch could not be issued or completed.
    Invocation(String),
    /// A strategy's output failed the exact 3x3 oracle check.
    Verification(String),
    /// A timed run diverged from the sequential baseline beyond EPSILON.
    Agreement(String),
}
