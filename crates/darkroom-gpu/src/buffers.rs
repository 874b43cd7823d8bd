//! GPU textures for the adjustment pipeline.

use darkroom_core::grading::curves::{CURVE_LUT_SIZE, CurveLut};
use darkroom_core::image::PhotoImage;
use darkroom_core::mask::{CompositeLayer, MAX_LOCAL_MASKS};

/// Bytes per `Rgba32Float` texel.
pub const RGBA32F_BYTES: u32 = 16;

fn extent(width: u32, height: u32, layers: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: layers,
    }
}

/// The bound image and the render target it is processed into.
pub struct GpuImageHandle {
    pub source: wgpu::Texture,
    pub source_view: wgpu::TextureView,
    pub target: wgpu::Texture,
    pub target_view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl GpuImageHandle {
    /// Upload a [`PhotoImage`] and allocate a target of the same size.
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, image: &PhotoImage) -> Self {
        let size = extent(image.width, image.height, 1);
        let source = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("darkroom_source_image"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &source,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * RGBA32F_BYTES),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("darkroom_render_target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        Self {
            source_view: source.create_view(&wgpu::TextureViewDescriptor::default()),
            target_view: target.create_view(&wgpu::TextureViewDescriptor::default()),
            source,
            target,
            width: image.width,
            height: image.height,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn destroy(&self) {
        self.source.destroy();
        self.target.destroy();
    }
}

/// The 256-entry tone curve table, one texel per entry.
pub struct CurveTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl CurveTexture {
    pub fn new(device: &wgpu::Device) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("darkroom_curve_lut"),
            size: extent(CURVE_LUT_SIZE as u32, 1, 1),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D1,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    pub fn upload(&self, queue: &wgpu::Queue, lut: &CurveLut) {
        let entries = lut.to_rgba();
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&entries),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(CURVE_LUT_SIZE as u32 * RGBA32F_BYTES),
                rows_per_image: None,
            },
            extent(CURVE_LUT_SIZE as u32, 1, 1),
        );
    }
}

/// Texture size for `layers` mask layers over a `width` x `height` image.
///
/// Without layers the shader never samples the masks, so a single texel
/// stands in for the binding.
pub fn mask_extent(width: u32, height: u32, layers: u32) -> wgpu::Extent3d {
    match layers.min(MAX_LOCAL_MASKS as u32) {
        0 => extent(1, 1, 1),
        layers => extent(width, height, layers),
    }
}

/// Per-layer blend weights, one array layer per rendered mask.
pub struct MaskTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
    /// Mask layers the texture holds, 0 for the placeholder.
    pub layers: u32,
}

impl MaskTexture {
    pub fn new(device: &wgpu::Device, width: u32, height: u32, layers: u32) -> Self {
        let layers = layers.min(MAX_LOCAL_MASKS as u32);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("darkroom_mask_layers"),
            size: mask_extent(width, height, layers),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("darkroom_mask_layers_view"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });
        Self {
            texture,
            view,
            width,
            height,
            layers,
        }
    }

    /// Write each layer's coverage times opacity into its array layer.
    ///
    /// Layers beyond the texture's capacity are ignored.
    pub fn upload(&self, queue: &wgpu::Queue, layers: &[CompositeLayer]) {
        let pixels = self.width as usize * self.height as usize;
        for (index, layer) in layers.iter().take(self.layers as usize).enumerate() {
            let weights: Vec<f32> = (0..pixels).map(|idx| layer.weight(idx)).collect();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &self.texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: index as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                bytemuck::cast_slice(&weights),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.width * 4),
                    rows_per_image: Some(self.height),
                },
                extent(self.width, self.height, 1),
            );
        }
    }

    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_texture_is_placeholder_without_layers() {
        let size = mask_extent(6000, 4000, 0);
        assert_eq!((size.width, size.height, size.depth_or_array_layers), (1, 1, 1));
    }

    #[test]
    fn test_mask_texture_holds_only_rendered_layers() {
        let size = mask_extent(640, 480, 2);
        assert_eq!((size.width, size.height, size.depth_or_array_layers), (640, 480, 2));
        let capped = mask_extent(640, 480, 20);
        assert_eq!(capped.depth_or_array_layers, MAX_LOCAL_MASKS as u32);
    }
}
