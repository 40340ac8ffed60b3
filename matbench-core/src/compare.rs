use matbench_types::EPSILON;

/// One diverging element, reported for diagnosis on comparison failure.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Mismatch {
    pub index: usize,
    pub expected: f32,
    pub got: f32,
}

/// Why two result buffers failed to compare equal.
#[derive(Clone, Debug, PartialEq)]
pub enum CompareFailure {
    /// The buffers hold different element counts, so element-wise
    /// comparison is meaningless.
    Length { expected: usize, got: usize },
    /// Same length, but these elements diverge.
    Elements(Vec<Mismatch>),
}

/// Cap on reported mismatches; a wrong kernel diverges almost everywhere.
const MAX_REPORTED: usize = 8;

fn collect<F>(expected: &[f32], got: &[f32], differs: F) -> Result<(), CompareFailure>
where
    F: Fn(f32, f32) -> bool,
{
    if expected.len() != got.len() {
        return Err(CompareFailure::Length {
            expected: expected.len(),
            got: got.len(),
        });
    }
    let mismatches: Vec<Mismatch> = expected
        .iter()
        .zip(got.iter())
        .enumerate()
        .filter(|&(_, (&e, &g))| differs(e, g))
        .take(MAX_REPORTED)
        .map(|(index, (&expected, &got))| Mismatch {
            index,
            expected,
            got,
        })
        .collect();
    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(CompareFailure::Elements(mismatches))
    }
}

/// Tolerant check: |expected - got| < EPSILON per element. Gates every
/// parallel or accelerated run against the sequential baseline, since
/// device reduction order may round differently than the host loop.
pub fn approx_equal(expected: &[f32], got: &[f32]) -> Result<(), CompareFailure> {
    collect(expected, got, |e, g| !((e - g).abs() < EPSILON))
}

/// Exact check, used only by the oracle: the 3x3 fixture is all small
/// integers, so every strategy must reproduce it bit-for-bit.
pub fn exact_equal(expected: &[f32], got: &[f32]) -> Result<(), CompareFailure> {
    collect(expected, got, |e, g| e != g)
}
