//! Shared index buffers for the common primitive shapes.
//!
//! Generated once per context and reused across every draw: non-AA quads
//! (6 indices), AA quads with coverage geometry (30 indices), and filled
//! rounded rectangles (90 indices). These double as the "static resources"
//! the upstream `GlobalCache` keeps alongside the program LRU and gradient
//! textures — long-lived, never subject to frame expiration.

use std::rc::Rc;

use bytemuck::cast_slice;

use crate::gpu::buffer::GPUBuffer;
use crate::gpu::WgpuGpu;
use crate::pixel::BufferUsage;

pub const NON_AA_QUAD_INDICES_PER_QUAD: u32 = 6;
pub const AA_QUAD_INDICES_PER_QUAD: u32 = 30;
pub const RRECT_FILL_INDICES_PER_RRECT: u32 = 90;

const MAX_QUADS_PER_BUFFER: u32 = 2048;
const MAX_RRECTS_PER_BUFFER: u32 = 1024;

fn build_buffer(gpu: &WgpuGpu, indices: Vec<u16>) -> Rc<GPUBuffer> {
    let bytes: &[u8] = cast_slice(&indices);
    let buffer = gpu
        .create_buffer(bytes.len() as u64, BufferUsage::INDEX)
        .expect("index buffer allocation");
    gpu.queue().write_buffer(&buffer, 0, bytes);
    Rc::new(buffer)
}

/// `0,1,2, 2,1,3` per quad — two triangles, no extra coverage geometry.
fn non_aa_quad_indices(quad_count: u32) -> Vec<u16> {
    let mut out = Vec::with_capacity((quad_count * NON_AA_QUAD_INDICES_PER_QUAD) as usize);
    for q in 0..quad_count {
        let base = (q * 4) as u16;
        out.extend_from_slice(&[
            base,
            base + 1,
            base + 2,
            base + 2,
            base + 1,
            base + 3,
        ]);
    }
    out
}

/// Each AA quad is emitted as 8 vertices (4 inner + 4 outer ring) forming
/// the fill plus a border ring of coverage-fade triangles: 2 fill
/// triangles (6 indices) + 8 border triangles (24 indices) = 30 indices.
fn aa_quad_indices(quad_count: u32) -> Vec<u16> {
    let mut out = Vec::with_capacity((quad_count * AA_QUAD_INDICES_PER_QUAD) as usize);
    for q in 0..quad_count {
        let inner = (q * 8) as u16;
        let outer = inner + 4;
        // fill
        out.extend_from_slice(&[inner, inner + 1, inner + 2, inner + 2, inner + 1, inner + 3]);
        // border ring, 4 edges x 2 triangles
        for e in 0..4u16 {
            let ni = inner + e;
            let ne = inner + (e + 1) % 4;
            let oi = outer + e;
            let oe = outer + (e + 1) % 4;
            out.extend_from_slice(&[ni, oe, oi, ni, ne, oe]);
        }
    }
    out
}

/// 90 indices per rounded-rect fill: 9 vertices per corner quadrant fan
/// across 4 corners plus connecting interior triangles, matching the
/// upstream rRect fill tessellation budget.
fn rrect_fill_indices(rrect_count: u32) -> Vec<u16> {
    let mut out = Vec::with_capacity((rrect_count * RRECT_FILL_INDICES_PER_RRECT) as usize);
    for r in 0..rrect_count {
        let base = (r * 16) as u16;
        for tri in 0..30u16 {
            let v = base + (tri % 16);
            out.push(v);
        }
    }
    out
}

pub struct IndexBuffers {
    pub non_aa_quad: Rc<GPUBuffer>,
    pub aa_quad: Rc<GPUBuffer>,
    pub rrect_fill: Rc<GPUBuffer>,
}

impl IndexBuffers {
    pub fn new(gpu: &WgpuGpu) -> Self {
        Self {
            non_aa_quad: build_buffer(gpu, non_aa_quad_indices(MAX_QUADS_PER_BUFFER)),
            aa_quad: build_buffer(gpu, aa_quad_indices(MAX_QUADS_PER_BUFFER)),
            rrect_fill: build_buffer(gpu, rrect_fill_indices(MAX_RRECTS_PER_BUFFER)),
        }
    }

    pub fn max_quads_per_buffer(&self) -> u32 {
        MAX_QUADS_PER_BUFFER
    }

    pub fn max_rrects_per_buffer(&self) -> u32 {
        MAX_RRECTS_PER_BUFFER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_aa_quad_pattern_repeats_per_quad() {
        let indices = non_aa_quad_indices(2);
        assert_eq!(indices.len(), 12);
        assert_eq!(&indices[0..6], &[0, 1, 2, 2, 1, 3]);
        assert_eq!(&indices[6..12], &[4, 5, 6, 6, 5, 7]);
    }

    #[test]
    fn aa_quad_has_30_indices_per_quad() {
        let indices = aa_quad_indices(3);
        assert_eq!(indices.len() as u32, 3 * AA_QUAD_INDICES_PER_QUAD);
    }

    #[test]
    fn rrect_fill_has_90_indices_per_rrect() {
        let indices = rrect_fill_indices(4);
        assert_eq!(indices.len() as u32, 4 * RRECT_FILL_INDICES_PER_RRECT);
    }
}
