use crate::foundation::error::{YoyError, YoyResult};

pub type PremulRgba8 = [u8; 4];

/// Source-over for one premultiplied pixel.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

/// Composite a premultiplied overlay onto `dst` in place.
pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> YoyResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(YoyError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Convert premultiplied RGBA8 to straight alpha in place.
pub fn unpremultiply_in_place(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 || a == 0 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

/// Flatten straight-alpha RGBA8 over an opaque background.
pub fn flatten_straight_over_bg(dst: &mut [u8], src: &[u8], bg_rgba: [u8; 4]) -> YoyResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(YoyError::encode(
            "flatten_straight_over_bg expects equal-length rgba8 buffers",
        ));
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255u16 - a;
        for i in 0..3 {
            let c = u16::from(mul_div255(u16::from(s[i]), a))
                + u16::from(mul_div255(u16::from(bg_rgba[i]), inv));
            d[i] = c.min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
