//! wgpu device, queue and adapter initialization.

use std::sync::Arc;

use crate::GpuError;
use crate::readback::readback_size;

/// Core wgpu handles shared by the pipeline's resources.
pub struct GpuContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    pub adapter_name: String,
    /// Largest 2D texture edge the device accepts.
    pub max_texture_dim: u32,
    /// Largest buffer the device accepts, which bounds frame readback.
    pub max_buffer_size: u64,
}

impl GpuContext {
    /// Create a headless context on the best available adapter.
    pub fn new() -> Result<Self, GpuError> {
        pollster::block_on(Self::new_async())
    }

    async fn new_async() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;

        let adapter_name = adapter.get_info().name;
        // Full-resolution exports need the adapter's texture and buffer
        // limits, not the downlevel defaults.
        let limits = adapter.limits();
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("darkroom_device"),
                required_features: wgpu::Features::empty(),
                required_limits: limits.clone(),
                ..Default::default()
            })
            .await?;

        tracing::debug!(
            adapter = %adapter_name,
            max_texture_dim = limits.max_texture_dimension_2d,
            max_buffer_size = limits.max_buffer_size,
            "created GPU device"
        );
        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            adapter_name,
            max_texture_dim: limits.max_texture_dimension_2d,
            max_buffer_size: limits.max_buffer_size,
        })
    }

    /// Wrap an existing device, e.g. one shared with a host application.
    pub fn from_device(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        let limits = device.limits();
        Self {
            device,
            queue,
            adapter_name: String::from("external"),
            max_texture_dim: limits.max_texture_dimension_2d,
            max_buffer_size: limits.max_buffer_size,
        }
    }

    /// Check that an image of the given dimensions can be bound and read
    /// back on this device.
    pub fn check_size(&self, width: u32, height: u32) -> Result<(), GpuError> {
        check_limits(width, height, self.max_texture_dim, self.max_buffer_size)
    }
}

fn check_limits(width: u32, height: u32, max_dim: u32, max_buffer: u64) -> Result<(), GpuError> {
    if width > max_dim || height > max_dim {
        return Err(GpuError::TooLarge {
            width,
            height,
            limit: max_dim,
        });
    }
    let bytes = readback_size(width, height);
    if bytes > max_buffer {
        return Err(GpuError::ReadbackTooLarge {
            bytes,
            limit: max_buffer,
        });
    }
    Ok(())
}
