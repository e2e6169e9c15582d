use winit::dpi::PhysicalSize;

/// Depth buffer sized to match a window surface.
///
/// Recreated whenever the surface is reconfigured with a new size.
pub struct DepthTarget {
    format: wgpu::TextureFormat,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthTarget {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, size: PhysicalSize<u32>) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("vrcube depth"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { format, texture, view }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Replaces the texture when `size` differs from the current extent.
    pub fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        let current = self.texture.size();
        if current.width == size.width && current.height == size.height {
            return;
        }
        *self = Self::new(device, self.format, size);
    }
}
