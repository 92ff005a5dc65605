use std::path::Path;

use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u16;

/// A rendered frame in RGBA8 format.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Straight-alpha copy as an `image` buffer.
    pub fn to_rgba_image(&self) -> ReelResult<image::RgbaImage> {
        let mut data = self.data.clone();
        if self.premultiplied {
            unpremultiply_in_place(&mut data);
        }
        image::RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| ReelError::validation("frame data size mismatch with width*height*4"))
    }

    /// Resample to `width`x`height` (straight alpha in, straight alpha out).
    pub fn resized(&self, width: u32, height: u32) -> ReelResult<FrameRGBA> {
        if width == 0 || height == 0 {
            return Err(ReelError::validation("resize target must be non-zero"));
        }
        let img = self.to_rgba_image()?;
        let out = if (img.width(), img.height()) == (width, height) {
            img
        } else {
            image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle)
        };
        Ok(FrameRGBA {
            width,
            height,
            data: out.into_raw(),
            premultiplied: false,
        })
    }

    /// Opaque RGBA8 with alpha composited over `bg`.
    pub fn flatten_over(&self, bg: Rgba8, dst: &mut Vec<u8>) -> ReelResult<()> {
        dst.resize(self.data.len(), 0);
        if self.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(dst, &self.data, bg.to_array())
        } else {
            let mut premul = self.data.clone();
            premultiply_in_place(&mut premul);
            flatten_premul_over_bg_to_opaque_rgba8(dst, &premul, bg.to_array())
        }
    }

    pub fn save_png(&self, path: &Path) -> ReelResult<()> {
        use anyhow::Context as _;

        ensure_parent_dir(path)?;
        self.to_rgba_image()?
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("failed to write png '{}'", path.display()))?;
        Ok(())
    }
}

/// Render target owned by one reel instance.
pub struct Surface {
    canvas: Canvas,
    pub(crate) pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface").field("canvas", &self.canvas).finish()
    }
}

impl Surface {
    pub fn new(canvas: Canvas) -> ReelResult<Self> {
        let canvas = Canvas::new(canvas.width, canvas.height)?;
        let (w, h) = canvas_u16(canvas)?;
        Ok(Self {
            canvas,
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Premultiplied RGBA8 pixels, row-major.
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub fn snapshot(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.pixels().to_vec(),
            premultiplied: true,
        }
    }

    /// Composite the pixmap over an opaque `bg`, leaving every pixel with full alpha.
    pub fn flatten_onto(&mut self, bg: Rgba8) {
        let bg = [u16::from(bg.r), u16::from(bg.g), u16::from(bg.b)];
        for px in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            let inv = 255u16 - u16::from(px[3]);
            if inv == 0 {
                continue;
            }
            for c in 0..3 {
                px[c] = (u16::from(px[c]) + mul_div255_u16(bg[c], inv)).min(255) as u8;
            }
            px[3] = 255;
        }
    }

    pub fn clear(&mut self, color: Rgba8) {
        let premul = premul_rgba8(color.r, color.g, color.b, color.a);
        for px in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&premul);
        }
    }
}

pub(crate) fn canvas_u16(canvas: Canvas) -> ReelResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| ReelError::evaluation("surface width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| ReelError::evaluation("surface height exceeds u16"))?;
    Ok((w, h))
}

fn premul_rgba8(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    let af = (a as u16) + 1;
    let premul = |c: u8| -> u8 { (((c as u16) * af) >> 8) as u8 };
    [premul(r), premul(g), premul(b), a]
}

fn premultiply_in_place(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = mul_div255_u16(u16::from(*c), a) as u8;
        }
    }
}

fn unpremultiply_in_place(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> ReelResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::validation(
            "flatten expects equal-length rgba8 buffers",
        ));
    }

    let bg = [bg_rgba[0] as u16, bg_rgba[1] as u16, bg_rgba[2] as u16];
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let inv = 255u16 - s[3] as u16;
        for c in 0..3 {
            d[c] = (s[c] as u16 + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
