//! Render pipeline descriptors and compiled pipeline objects.

use crate::gpu::buffer::GPUBuffer;
use crate::pixel::PixelFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
    Float32x4,
    Unorm8x4,
}

impl VertexFormat {
    pub fn size_bytes(self) -> u64 {
        match self {
            Self::Float32x2 => 8,
            Self::Float32x3 => 12,
            Self::Float32x4 => 16,
            Self::Unorm8x4 => 4,
        }
    }

    fn to_wgpu(self) -> wgpu::VertexFormat {
        match self {
            Self::Float32x2 => wgpu::VertexFormat::Float32x2,
            Self::Float32x3 => wgpu::VertexFormat::Float32x3,
            Self::Float32x4 => wgpu::VertexFormat::Float32x4,
            Self::Unorm8x4 => wgpu::VertexFormat::Unorm8x4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexStepMode {
    PerVertex,
    PerInstance,
}

#[derive(Debug, Clone)]
pub struct VertexAttribute {
    pub format: VertexFormat,
    pub offset: u64,
    pub shader_location: u32,
}

#[derive(Debug, Clone)]
pub struct VertexBufferLayout {
    pub stride: u64,
    pub step_mode: VertexStepMode,
    pub attributes: Vec<VertexAttribute>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

impl BlendFactor {
    fn to_wgpu(self) -> wgpu::BlendFactor {
        match self {
            Self::Zero => wgpu::BlendFactor::Zero,
            Self::One => wgpu::BlendFactor::One,
            Self::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
            Self::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
            Self::DstAlpha => wgpu::BlendFactor::DstAlpha,
            Self::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
        }
    }
}

/// Porter-Duff blend state, sufficient for every blend mode the compositor
/// supports without a destination-texture copy. Blends that need the
/// current destination color go through the `XferProcessor` fragment chain
/// instead, with the pipeline's blend state fixed at `Replace`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendState {
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
}

impl BlendState {
    pub const SRC_OVER: Self = Self {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::OneMinusSrcAlpha,
    };

    pub const REPLACE: Self = Self {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::Zero,
    };

    fn to_wgpu(self) -> wgpu::BlendState {
        let component = wgpu::BlendComponent {
            src_factor: self.src_factor.to_wgpu(),
            dst_factor: self.dst_factor.to_wgpu(),
            operation: wgpu::BlendOperation::Add,
        };
        wgpu::BlendState {
            color: component,
            alpha: component,
        }
    }
}

/// A uniform-block slot assignment: which binding index a named block binds
/// to, used by `RenderPass::set_uniform_buffer`.
#[derive(Debug, Clone)]
pub struct UniformBlockSlot {
    pub binding: u32,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct RenderPipelineDescriptor {
    pub label: &'static str,
    pub vertex_shader_source: String,
    pub fragment_shader_source: String,
    pub vertex_buffers: Vec<VertexBufferLayout>,
    pub color_format: PixelFormat,
    pub sample_count: u32,
    pub blend: Option<BlendState>,
    pub uniform_blocks: Vec<UniformBlockSlot>,
    pub sampler_count: u32,
}

/// A compiled, immutable pipeline owned by [`crate::global_cache::GlobalCache`].
pub struct RenderPipeline {
    pub(crate) raw: wgpu::RenderPipeline,
    pub(crate) bind_group_layout: wgpu::BindGroupLayout,
    pub(crate) uniform_blocks: Vec<UniformBlockSlot>,
    pub(crate) sampler_count: u32,
    /// Lazily created and cached: the uniform ring buffer is one stable
    /// `wgpu::Buffer` for the whole context lifetime, so every draw using
    /// this pipeline can share one bind group and vary only the dynamic
    /// offset passed to `set_bind_group` at draw time.
    bind_group: std::cell::RefCell<Option<wgpu::BindGroup>>,
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("sampler_count", &self.sampler_count)
            .finish()
    }
}

impl RenderPipeline {
    pub fn raw(&self) -> &wgpu::RenderPipeline {
        &self.raw
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Returns the cached uniform bind group, creating it on first use.
    /// Binds the whole `uniform_buffer` at each declared block's binding
    /// index with `has_dynamic_offset` (see `compile` below); the caller
    /// supplies the actual offset into the ring via `set_bind_group`'s
    /// dynamic-offsets array.
    pub fn uniform_bind_group(&self, device: &wgpu::Device, uniform_buffer: &GPUBuffer) -> wgpu::BindGroup {
        if let Some(existing) = self.bind_group.borrow().as_ref() {
            return existing.clone();
        }
        let entries: Vec<wgpu::BindGroupEntry> = self
            .uniform_blocks
            .iter()
            .map(|block| wgpu::BindGroupEntry {
                binding: block.binding,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: uniform_buffer.raw(),
                    offset: 0,
                    size: std::num::NonZeroU64::new(block.size),
                }),
            })
            .collect();
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tgfx-core uniform bind group"),
            layout: &self.bind_group_layout,
            entries: &entries,
        });
        *self.bind_group.borrow_mut() = Some(bind_group.clone());
        bind_group
    }
}

pub(crate) fn compile(
    device: &wgpu::Device,
    desc: &RenderPipelineDescriptor,
) -> RenderPipeline {
    let vs_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(desc.label),
        source: wgpu::ShaderSource::Wgsl(desc.vertex_shader_source.clone().into()),
    });
    let fs_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(desc.label),
        source: wgpu::ShaderSource::Wgsl(desc.fragment_shader_source.clone().into()),
    });

    let mut bind_entries = Vec::new();
    for block in &desc.uniform_blocks {
        bind_entries.push(wgpu::BindGroupLayoutEntry {
            binding: block.binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: None,
            },
            count: None,
        });
    }
    let first_sampler_binding = desc.uniform_blocks.len() as u32;
    for i in 0..desc.sampler_count {
        bind_entries.push(wgpu::BindGroupLayoutEntry {
            binding: first_sampler_binding + i * 2,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
        bind_entries.push(wgpu::BindGroupLayoutEntry {
            binding: first_sampler_binding + i * 2 + 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
    }

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(desc.label),
        entries: &bind_entries,
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(desc.label),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let attribute_sets: Vec<Vec<wgpu::VertexAttribute>> = desc
        .vertex_buffers
        .iter()
        .map(|layout| {
            layout
                .attributes
                .iter()
                .map(|a| wgpu::VertexAttribute {
                    format: a.format.to_wgpu(),
                    offset: a.offset,
                    shader_location: a.shader_location,
                })
                .collect()
        })
        .collect();

    let vertex_layouts: Vec<wgpu::VertexBufferLayout> = desc
        .vertex_buffers
        .iter()
        .zip(attribute_sets.iter())
        .map(|(layout, attributes)| wgpu::VertexBufferLayout {
            array_stride: layout.stride,
            step_mode: match layout.step_mode {
                VertexStepMode::PerVertex => wgpu::VertexStepMode::Vertex,
                VertexStepMode::PerInstance => wgpu::VertexStepMode::Instance,
            },
            attributes,
        })
        .collect();

    let raw = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &vs_module,
            entry_point: Some("vs_main"),
            buffers: &vertex_layouts,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &fs_module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: crate::gpu::texture::to_wgpu_format(desc.color_format),
                blend: desc.blend.map(BlendState::to_wgpu),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: desc.sample_count,
            ..Default::default()
        },
        multiview: None,
        cache: None,
    });

    RenderPipeline {
        raw,
        bind_group_layout,
        uniform_blocks: desc.uniform_blocks.clone(),
        sampler_count: desc.sampler_count,
        bind_group: std::cell::RefCell::new(None),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    ClampToEdge,
    Repeat,
    MirrorRepeat,
    ClampToBorder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerDescriptor {
    pub address_mode_u: AddressMode,
    pub address_mode_v: AddressMode,
    pub filter: FilterMode,
}

impl SamplerDescriptor {
    pub const DEFAULT: Self = Self {
        address_mode_u: AddressMode::ClampToEdge,
        address_mode_v: AddressMode::ClampToEdge,
        filter: FilterMode::Linear,
    };
}
