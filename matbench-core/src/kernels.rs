//! WGSL kernel sources for the accelerated strategies.
//!
//! Matrix dimension and workgroup shape are baked into the source text per
//! dispatch, since WGSL fixes both at compile time. All kernels share the
//! same binding signature: A and B read-only, C read-write, row-major.

/// Entry point shared by every kernel.
pub const ENTRY: &str = "main";

/// Workgroup edge for the 2D kernels and divisor for the 1D index space.
pub const TILE: u32 = 16;

fn header(n: usize) -> String {
    format!(
        "\
const N: u32 = {n}u;

@group(0) @binding(0) var<storage, read>       a: array<f32>;
@group(0) @binding(1) var<storage, read>       b: array<f32>;
@group(0) @binding(2) var<storage, read_write> c: array<f32>;
"
    )
}

/// One work item per output cell over a 2D (N, N) space, each performing the
/// full N-length inner reduction against global memory.
pub fn naive(n: usize) -> String {
    format!(
        r#"{header}
@compute @workgroup_size({tile}, {tile})
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {{
    let i = gid.y;
    let j = gid.x;
    if (i >= N || j >= N) {{ return; }}
    var sum: f32 = 0.0;
    for (var k: u32 = 0u; k < N; k = k + 1u) {{
        sum = sum + a[i * N + k] * b[k * N + j];
    }}
    c[i * N + j] = sum;
}}
"#,
        header = header(n),
        tile = TILE,
    )
}

/// Same 2D partitioning as `naive`, but each workgroup cooperatively stages
/// square tiles of A and B in workgroup-local storage before reducing, so
/// every global element is fetched once per tile instead of once per item.
pub fn local_staging(n: usize) -> String {
    format!(
        r#"{header}
const TILE: u32 = {tile}u;

var<workgroup> a_tile: array<f32, {tile_sq}>;
var<workgroup> b_tile: array<f32, {tile_sq}>;

@compute @workgroup_size({tile}, {tile})
fn main(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(local_invocation_id)  lid: vec3<u32>,
) {{
    let i = gid.y;
    let j = gid.x;
    let li = lid.y;
    let lj = lid.x;

    var sum: f32 = 0.0;
    let tiles = (N + TILE - 1u) / TILE;
    for (var t: u32 = 0u; t < tiles; t = t + 1u) {{
        let ak = t * TILE + lj;
        let bk = t * TILE + li;
        a_tile[li * TILE + lj] = select(0.0, a[i * N + ak], i < N && ak < N);
        b_tile[li * TILE + lj] = select(0.0, b[bk * N + j], bk < N && j < N);
        workgroupBarrier();

        for (var k: u32 = 0u; k < TILE; k = k + 1u) {{
            sum = sum + a_tile[li * TILE + k] * b_tile[k * TILE + lj];
        }}
        workgroupBarrier();
    }}

    if (i < N && j < N) {{
        c[i * N + j] = sum;
    }}
}}
"#,
        header = header(n),
        tile = TILE,
        tile_sq = TILE * TILE,
    )
}

/// Coarser granularity: a 1D space of N work items, each computing one full
/// output row. The caller chooses the workgroup size; it must divide N.
pub fn row_per_item(n: usize, workgroup: u32) -> String {
    format!(
        r#"{header}
@compute @workgroup_size({workgroup})
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {{
    let i = gid.x;
    if (i >= N) {{ return; }}
    for (var j: u32 = 0u; j < N; j = j + 1u) {{
        var sum: f32 = 0.0;
        for (var k: u32 = 0u; k < N; k = k + 1u) {{
            sum = sum + a[i * N + k] * b[k * N + j];
        }}
        c[i * N + j] = sum;
    }}
}}
"#,
        header = header(n),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_bake_the_dimension() {
        assert!(naive(96).contains("const N: u32 = 96u;"));
        assert!(local_staging(96).contains("const N: u32 = 96u;"));
        assert!(row_per_item(96, 6).contains("@workgroup_size(6)"));
    }

    #[test]
    fn sources_expose_the_shared_entry_point() {
        for src in [naive(16), local_staging(16), row_per_item(16, 1)] {
            assert!(src.contains(&format!("fn {ENTRY}(")));
        }
    }
}
