use matbench_types::{index, IndexSpace};
use tracing::debug;

use crate::Error;

/// The narrow capability the harness needs from an accelerator: compile a
/// kernel source and bind an entry point, then execute it over an index
/// space with the input matrices transferred in and the result transferred
/// out. Every dispatch is synchronous from the caller's perspective.
pub trait Accelerator {
    type Kernel;

    fn compile(&self, source: &str, entry: &str) -> Result<Self::Kernel, Error>;

    fn invoke(
        &self,
        kernel: &Self::Kernel,
        space: IndexSpace,
        n: u32,
        a: &[f32],
        b: &[f32],
    ) -> Result<Vec<f32>, Error>;
}

/// Shared dispatch-configuration check: a 1D workgroup must be non-zero and
/// evenly divide the index space.
pub fn validate_space(space: IndexSpace) -> Result<(), Error> {
    if let IndexSpace::Grid1d { len, workgroup } = space {
        if workgroup == 0 || len % workgroup != 0 {
            return Err(Error::Invocation(format!(
                "workgroup size {workgroup} does not evenly divide index space of {len}"
            )));
        }
    }
    Ok(())
}

/// Pure-software reference backend: enumerates the same index space a real
/// accelerator would and computes each work item's partition on the host.
/// Lets the kernel-dispatch strategies run, and be tested, without hardware.
pub struct SoftwareBackend;

#[derive(Debug)]
pub struct SoftwareKernel {
    entry: String,
}

impl Accelerator for SoftwareBackend {
    type Kernel = SoftwareKernel;

    fn compile(&self, source: &str, entry: &str) -> Result<SoftwareKernel, Error> {
        if !source.contains(&format!("fn {entry}(")) {
            return Err(Error::Build(format!(
                "entry point `{entry}` not found in kernel source"
            )));
        }
        Ok(SoftwareKernel {
            entry: entry.to_string(),
        })
    }

    fn invoke(
        &self,
        kernel: &SoftwareKernel,
        space: IndexSpace,
        n: u32,
        a: &[f32],
        b: &[f32],
    ) -> Result<Vec<f32>, Error> {
        validate_space(space)?;
        debug!(entry = %kernel.entry, ?space, n, "software dispatch");

        let n = n as usize;
        let mut c = vec![0.0f32; n * n];
        match space {
            // One work item per output cell.
            IndexSpace::Grid2d { rows, cols } => {
                for i in 0..rows as usize {
                    for j in 0..cols as usize {
                        c[index(i, j, n)] = cell(n, a, b, i, j);
                    }
                }
            }
            // One work item per output row.
            IndexSpace::Grid1d { len, .. } => {
                for i in 0..len as usize {
                    for j in 0..n {
                        c[index(i, j, n)] = cell(n, a, b, i, j);
                    }
                }
            }
        }
        Ok(c)
    }
}

fn cell(n: usize, a: &[f32], b: &[f32], i: usize, j: usize) -> f32 {
    let mut sum = 0.0f32;
    for k in 0..n {
        sum += a[index(i, k, n)] * b[index(k, j, n)];
    }
    sum
}
