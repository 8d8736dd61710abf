//! Gradient color LUT cache: one small texture per (colors, positions) key,
//! capped at 32 entries, LRU evicted.

use std::num::NonZeroUsize;
use std::rc::Rc;

use lru::LruCache;

use crate::color::Color;
use crate::gpu::texture::GPUTexture;
use crate::gpu::WgpuGpu;
use crate::pixel::{ImageOrigin, PixelFormat, TextureUsage};

pub const GRADIENT_CACHE_CAPACITY: usize = 32;
const LUT_WIDTH: u32 = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct GradientKey {
    colors: Vec<[u8; 4]>,
    positions: Vec<u32>, // fixed-point, bit-exact hashing/equality
}

impl GradientKey {
    pub fn new(colors: &[Color], positions: &[f32]) -> Self {
        Self {
            colors: colors
                .iter()
                .map(|c| {
                    let p = c.premultiply();
                    [
                        (p.r.clamp(0.0, 1.0) * 255.0).round() as u8,
                        (p.g.clamp(0.0, 1.0) * 255.0).round() as u8,
                        (p.b.clamp(0.0, 1.0) * 255.0).round() as u8,
                        (p.a.clamp(0.0, 1.0) * 255.0).round() as u8,
                    ]
                })
                .collect(),
            positions: positions
                .iter()
                .map(|p| (p.clamp(0.0, 1.0) * 65535.0).round() as u32)
                .collect(),
        }
    }
}

impl Eq for GradientKey {}
impl std::hash::Hash for GradientKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.colors.hash(state);
        self.positions.hash(state);
    }
}

pub struct GradientCache {
    lru: LruCache<GradientKey, Rc<GPUTexture>>,
}

impl Default for GradientCache {
    fn default() -> Self {
        Self::new()
    }
}

impl GradientCache {
    pub fn new() -> Self {
        Self {
            lru: LruCache::new(NonZeroUsize::new(GRADIENT_CACHE_CAPACITY).unwrap()),
        }
    }

    pub fn len(&self) -> usize {
        self.lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lru.is_empty()
    }

    pub fn get_or_build(&mut self, gpu: &WgpuGpu, key: GradientKey) -> Rc<GPUTexture> {
        if let Some(found) = self.lru.get(&key) {
            return found.clone();
        }
        let lut = rasterize_lut(&key);
        let texture = gpu
            .create_texture(&crate::gpu::TextureDescriptor {
                width: LUT_WIDTH,
                height: 1,
                format: PixelFormat::Rgba8888,
                mip_level_count: 1,
                sample_count: 1,
                usage: TextureUsage::TEXTURE_BINDING,
            })
            .expect("gradient LUT texture allocation");
        gpu.queue().write_texture(
            &texture,
            crate::px::PxRect::from_ltwh(0, 0, LUT_WIDTH as i32, 1),
            &lut,
            LUT_WIDTH * 4,
        );
        let _ = ImageOrigin::TopLeft;
        let rc = Rc::new(texture);
        self.lru.put(key, rc.clone());
        rc
    }
}

fn rasterize_lut(key: &GradientKey) -> Vec<u8> {
    let mut out = vec![0u8; (LUT_WIDTH * 4) as usize];
    if key.colors.is_empty() {
        return out;
    }
    for x in 0..LUT_WIDTH {
        let t = x as f32 / (LUT_WIDTH - 1) as f32;
        let t_fixed = (t * 65535.0).round() as u32;
        let mut lo = 0usize;
        for (i, &p) in key.positions.iter().enumerate() {
            if p <= t_fixed {
                lo = i;
            }
        }
        let hi = (lo + 1).min(key.colors.len() - 1);
        let span = key.positions.get(hi).copied().unwrap_or(65535)
            .saturating_sub(key.positions.get(lo).copied().unwrap_or(0))
            .max(1) as f32;
        let local_t = ((t_fixed.saturating_sub(key.positions.get(lo).copied().unwrap_or(0))) as f32
            / span)
            .clamp(0.0, 1.0);
        let c0 = key.colors[lo];
        let c1 = key.colors[hi];
        let idx = (x * 4) as usize;
        for channel in 0..4 {
            let a = c0[channel] as f32;
            let b = c1[channel] as f32;
            out[idx + channel] = (a + (b - a) * local_t).round() as u8;
        }
    }
    out
}
