//! Backend capability surface consulted by shader templating and the
//! uniform ring buffer.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Gl,
    Metal,
    WebGpu,
}

/// Read-only per-backend feature set.
#[derive(Debug, Clone)]
pub struct ShaderCaps {
    pub backend: Backend,
    /// GLSL version header / Metal language version string, informational.
    pub shader_version_header: &'static str,
    pub framebuffer_fetch_supported: bool,
    /// Name of the reserved fragment-output variable when framebuffer fetch
    /// is supported; unused otherwise.
    pub framebuffer_fetch_output_name: &'static str,
    pub max_fragment_samplers: u32,
    pub max_uniform_buffer_size: u32,
    pub uniform_buffer_offset_alignment: u64,
}

impl ShaderCaps {
    /// Conservative defaults for a wgpu-backed WebGPU/Vulkan/D3D12/Metal
    /// device; `uniform_buffer_offset_alignment` mirrors
    /// `wgpu::Limits::min_uniform_buffer_offset_alignment` which is 256 on
    /// virtually every adapter wgpu exposes.
    pub fn for_wgpu(limits: &wgpu::Limits) -> Self {
        Self {
            backend: Backend::WebGpu,
            shader_version_header: "#version 450",
            framebuffer_fetch_supported: false,
            framebuffer_fetch_output_name: "",
            max_fragment_samplers: limits.max_sampled_textures_per_shader_stage.min(16),
            max_uniform_buffer_size: limits.max_uniform_buffer_binding_size,
            uniform_buffer_offset_alignment: limits.min_uniform_buffer_offset_alignment as u64,
        }
    }
}
