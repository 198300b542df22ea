use crate::error::{ViewerError, ViewerResult};

/// Textura lista para el pipeline de quads. El bind group mantiene vivos
/// la textura, la vista y el sampler.
pub struct Texture {
    pub bind_group: wgpu::BindGroup,
    /// Tamaño en píxeles físicos.
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("Texture BG Layout"),
        })
    }

    /// Sube bytes crudos (4 bytes por píxel) en el formato indicado.
    #[allow(clippy::too_many_arguments)]
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        bytes: &[u8],
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        label: Option<&str>,
    ) -> ViewerResult<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || bytes.len() < expected {
            return Err(ViewerError::Gpu(format!(
                "bitmap inválido {}x{} ({} bytes)",
                width,
                height,
                bytes.len()
            )));
        }
        let max_side = device.limits().max_texture_dimension_2d;
        if width > max_side || height > max_side {
            return Err(ViewerError::Gpu(format!(
                "textura {}x{} supera el máximo {}",
                width, height, max_side
            )));
        }

        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &bytes[..expected],
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&view) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&sampler) },
            ],
            label,
        });

        Ok(Self {
            bind_group,
            width,
            height,
        })
    }

    /// Iconos y texto generados con `image` (RGBA).
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        image: &image::RgbaImage,
        label: Option<&str>,
    ) -> ViewerResult<Self> {
        let (width, height) = image.dimensions();
        Self::from_bytes(
            device,
            queue,
            layout,
            image.as_raw(),
            width,
            height,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            label,
        )
    }
}
