//! WGSL source templates for the compositor's built-in geometry
//! processors. Real backends would template these per [`crate::gpu::caps::ShaderCaps`]
//! (precision, framebuffer-fetch availability); this crate's draw ops are
//! limited to solid/gradient fills so one vertex layout covers all of them.

pub const RECT_VERTEX_SHADER: &str = r#"
struct Viewport {
    size: vec2<f32>,
};
@group(0) @binding(0) var<uniform> viewport: Viewport;

struct VertexIn {
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
};

struct VertexOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(in: VertexIn) -> VertexOut {
    var out: VertexOut;
    let ndc_x = in.position.x / viewport.size.x * 2.0 - 1.0;
    let ndc_y = 1.0 - in.position.y / viewport.size.y * 2.0;
    out.clip_position = vec4<f32>(ndc_x, ndc_y, 0.0, 1.0);
    out.color = in.color;
    return out;
}
"#;

pub const RECT_FRAGMENT_SHADER: &str = r#"
struct FragmentIn {
    @location(0) color: vec4<f32>,
};

@fragment
fn fs_main(in: FragmentIn) -> @location(0) vec4<f32> {
    return in.color;
}
"#;
