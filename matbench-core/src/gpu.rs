use matbench_types::IndexSpace;
use tracing::{debug, info, info_span};
use wgpu::{
    BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingType, BufferBindingType, BufferDescriptor, BufferUsages,
    CommandEncoderDescriptor, ComputePassDescriptor, ComputePipeline, ComputePipelineDescriptor,
    PipelineCompilationOptions, PipelineLayoutDescriptor, ShaderModuleDescriptor, ShaderSource,
    ShaderStages,
};

use crate::backend::{validate_space, Accelerator};
use crate::kernels::TILE;
use crate::Error;

/// Explicit compute target: adapter, device, and queue bound once and passed
/// into dispatchers by reference. No process-wide default device state.
pub struct WgpuContext {
    _instance: wgpu::Instance,
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_name: String,
}

pub struct WgpuKernel {
    pipeline: ComputePipeline,
    layout: BindGroupLayout,
}

impl WgpuContext {
    /// Select the first adapter whose name contains `filter` (empty matches
    /// the first adapter), logging every candidate so a failed match is
    /// diagnosable.
    pub fn new(filter: &str) -> Result<Self, Error> {
        let _span = info_span!("gpu_init", filter).entered();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());

        let mut chosen = None;
        for adapter in instance.enumerate_adapters(wgpu::Backends::all()) {
            let info = adapter.get_info();
            info!(name = %info.name, backend = ?info.backend, "available adapter");
            if chosen.is_none() && info.name.contains(filter) {
                chosen = Some(adapter);
            }
        }
        let adapter = chosen
            .ok_or_else(|| Error::Setup(format!("no adapter found matching `{filter}`")))?;
        let adapter_name = adapter.get_info().name;
        info!(name = %adapter_name, "running on");

        let (device, queue) = pollster::block_on(
            adapter.request_device(&wgpu::DeviceDescriptor::default(), None),
        )
        .map_err(|e| Error::Setup(format!("failed to create device: {e}")))?;

        Ok(Self {
            _instance: instance,
            device,
            queue,
            adapter_name,
        })
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }
}

impl Accelerator for WgpuContext {
    type Kernel = WgpuKernel;

    /// Shader build failures are collected through a validation error scope
    /// so the backend's log reaches the caller instead of a device panic.
    fn compile(&self, source: &str, entry: &str) -> Result<WgpuKernel, Error> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(entry),
            source: ShaderSource::Wgsl(source.into()),
        });

        let layout = self
            .device
            .create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some("matmul bind group layout"),
                entries: &[
                    storage_entry(0, true),
                    storage_entry(1, true),
                    storage_entry(2, false),
                ],
            });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: None,
                bind_group_layouts: &[&layout],
                push_constant_ranges: &[],
            });

        let pipeline = self
            .device
            .create_compute_pipeline(&ComputePipelineDescriptor {
                label: Some(entry),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some(entry),
                compilation_options: PipelineCompilationOptions::default(),
                cache: None,
            });

        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(Error::Build(err.to_string()));
        }
        debug!(entry, shader_len = source.len(), "kernel compiled");

        Ok(WgpuKernel { pipeline, layout })
    }

    /// Full round trip, timed by the caller as one unit: transfer A and B to
    /// device buffers, run the kernel over the index space, copy C back
    /// through a staging buffer and block on the read.
    fn invoke(
        &self,
        kernel: &WgpuKernel,
        space: IndexSpace,
        n: u32,
        a: &[f32],
        b: &[f32],
    ) -> Result<Vec<f32>, Error> {
        validate_space(space)?;
        let (groups_x, groups_y) = workgroup_counts(space);
        debug!(?space, n, items = space.items(), groups_x, groups_y, "gpu dispatch");

        let bytes = (n as u64) * (n as u64) * 4;
        let d_a = self.storage_buffer("A", bytes);
        let d_b = self.storage_buffer("B", bytes);
        let d_c = self.storage_buffer("C", bytes);
        let staging = self.device.create_buffer(&BufferDescriptor {
            label: Some("Staging"),
            size: bytes,
            usage: BufferUsages::COPY_DST | BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&BindGroupDescriptor {
            label: None,
            layout: &kernel.layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: d_a.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: d_b.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: d_c.as_entire_binding(),
                },
            ],
        });

        self.queue.write_buffer(&d_a, 0, &to_bytes(a));
        self.queue.write_buffer(&d_b, 0, &to_bytes(b));

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor { label: None });
        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&kernel.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        encoder.copy_buffer_to_buffer(&d_c, 0, &staging, 0, bytes);
        self.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        slice.map_async(wgpu::MapMode::Read, |_| {});
        self.device.poll(wgpu::Maintain::Wait);

        let mapped = slice.get_mapped_range();
        let c = mapped
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
            .collect();
        drop(mapped);
        staging.unmap();
        debug!("gpu readback complete");

        Ok(c)
    }
}

impl WgpuContext {
    fn storage_buffer(&self, label: &str, size: u64) -> wgpu::Buffer {
        self.device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        })
    }
}

fn storage_entry(binding: u32, read_only: bool) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: ShaderStages::COMPUTE,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Workgroup counts for a dispatch. 2D kernels use fixed TILE x TILE groups
/// with in-kernel bounds checks; 1D spaces are pre-validated to divide.
fn workgroup_counts(space: IndexSpace) -> (u32, u32) {
    match space {
        IndexSpace::Grid2d { rows, cols } => ((cols + TILE - 1) / TILE, (rows + TILE - 1) / TILE),
        IndexSpace::Grid1d { len, workgroup } => (len / workgroup, 1),
    }
}

fn to_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid2d_rounds_workgroup_counts_up() {
        assert_eq!(
            workgroup_counts(IndexSpace::Grid2d { rows: 32, cols: 32 }),
            (2, 2)
        );
        assert_eq!(
            workgroup_counts(IndexSpace::Grid2d { rows: 3, cols: 3 }),
            (1, 1)
        );
    }

    #[test]
    fn grid1d_uses_exact_division() {
        assert_eq!(
            workgroup_counts(IndexSpace::Grid1d {
                len: 512,
                workgroup: 32
            }),
            (16, 1)
        );
    }
}
