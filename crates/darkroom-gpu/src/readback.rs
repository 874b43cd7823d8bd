//! GPU-to-CPU readback of rendered frames.

use darkroom_core::image::PhotoImage;

use crate::GpuError;
use crate::buffers::{GpuImageHandle, RGBA32F_BYTES};

/// Row pitch of a texture-to-buffer copy, padded to the copy alignment.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * RGBA32F_BYTES;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Staging buffer bytes needed to read back a `width` x `height` frame.
pub fn readback_size(width: u32, height: u32) -> u64 {
    padded_bytes_per_row(width) as u64 * height as u64
}

/// Staging buffer reused across frames while it is large enough.
#[derive(Default)]
pub struct Readback {
    staging: Option<wgpu::Buffer>,
}

impl Readback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a copy of the render target into the staging buffer.
    pub fn copy_to_staging(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        handle: &GpuImageHandle,
    ) {
        let row_pitch = padded_bytes_per_row(handle.width);
        let size = readback_size(handle.width, handle.height);
        let staging = match self.staging.take() {
            Some(buf) if buf.size() >= size => buf,
            _ => device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("darkroom_frame_staging"),
                size,
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                mapped_at_creation: false,
            }),
        };

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &handle.target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(row_pitch),
                    rows_per_image: Some(handle.height),
                },
            },
            wgpu::Extent3d {
                width: handle.width,
                height: handle.height,
                depth_or_array_layers: 1,
            },
        );
        self.staging = Some(staging);
    }

    /// Map the staging buffer, wait for the GPU and strip the row padding.
    ///
    /// Must be called after the encoder from [`Self::copy_to_staging`] was
    /// submitted.
    pub fn read_image(
        &self,
        device: &wgpu::Device,
        handle: &GpuImageHandle,
    ) -> Result<PhotoImage, GpuError> {
        let staging = self
            .staging
            .as_ref()
            .ok_or_else(|| GpuError::Readback("nothing was copied to staging".into()))?;
        let row_pitch = padded_bytes_per_row(handle.width) as usize;
        let size = row_pitch as u64 * handle.height as u64;
        let slice = staging.slice(..size);

        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| GpuError::Readback(e.to_string()))?;
        rx.recv()
            .map_err(|e| GpuError::Readback(e.to_string()))?
            .map_err(|e| GpuError::Readback(e.to_string()))?;

        let row_bytes = (handle.width * RGBA32F_BYTES) as usize;
        let mut pixels = Vec::with_capacity(handle.pixel_count());
        {
            let data = slice.get_mapped_range();
            for row in data.chunks_exact(row_pitch) {
                pixels.extend(
                    row[..row_bytes]
                        .chunks_exact(RGBA32F_BYTES as usize)
                        .map(bytemuck::pod_read_unaligned::<[f32; 4]>),
                );
            }
        }
        staging.unmap();

        Ok(PhotoImage {
            width: handle.width,
            height: handle.height,
            pixels,
        })
    }
}
