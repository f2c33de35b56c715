use image::{GrayImage, Luma};

const BINS: usize = 256;

/// Contrast-limited adaptive histogram equalization on a single channel.
///
/// The image is split into a `cols` x `rows` grid; each tile gets its own
/// clipped-histogram lookup table and pixels blend the four nearest tables
/// bilinearly. `clip_limit` is relative to a flat histogram, so the absolute
/// per-bin ceiling is `clip_limit * tile_area / 256` (at least 1).
pub fn clahe(channel: &GrayImage, clip_limit: f32, cols: u32, rows: u32) -> GrayImage {
    let (width, height) = channel.dimensions();
    if width == 0 || height == 0 {
        return channel.clone();
    }

    let tile_w = width.div_ceil(cols.clamp(1, width));
    let tile_h = height.div_ceil(rows.clamp(1, height));
    // every tile must start inside the image
    let cols = width.div_ceil(tile_w);
    let rows = height.div_ceil(tile_h);

    let mut luts = vec![[0u8; BINS]; (cols * rows) as usize];
    for ty in 0..rows {
        for tx in 0..cols {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);
            luts[(ty * cols + tx) as usize] = tile_lut(channel, (x0, y0, x1, y1), clip_limit);
        }
    }

    let mut out = GrayImage::new(width, height);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let value = channel.get_pixel(x, y)[0] as usize;

        let (tx1, tx2, xa) = neighbours(x, tile_w, cols);
        let (ty1, ty2, ya) = neighbours(y, tile_h, rows);

        let lut = |tx: u32, ty: u32| luts[(ty * cols + tx) as usize][value] as f32;
        let top = lut(tx1, ty1) * (1.0 - xa) + lut(tx2, ty1) * xa;
        let bottom = lut(tx1, ty2) * (1.0 - xa) + lut(tx2, ty2) * xa;
        let blended = top * (1.0 - ya) + bottom * ya;

        *pixel = Luma([blended.round().clamp(0.0, 255.0) as u8]);
    }
    out
}

/// Two nearest tile indices along one axis and the weight of the second.
fn neighbours(coord: u32, tile: u32, count: u32) -> (u32, u32, f32) {
    let t = (coord as f32 + 0.5) / tile as f32 - 0.5;
    let first = t.floor();
    let weight = t - first;
    let last = count as i64 - 1;
    let t1 = (first as i64).clamp(0, last) as u32;
    let t2 = (first as i64 + 1).clamp(0, last) as u32;
    (t1, t2, weight)
}

fn tile_lut(channel: &GrayImage, (x0, y0, x1, y1): (u32, u32, u32, u32), clip_limit: f32) -> [u8; BINS] {
    let mut hist = [0u32; BINS];
    for y in y0..y1 {
        for x in x0..x1 {
            hist[channel.get_pixel(x, y)[0] as usize] += 1;
        }
    }

    let area = ((x1 - x0) * (y1 - y0)).max(1);
    let ceiling = ((clip_limit * area as f32 / BINS as f32) as u32).max(1);

    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > ceiling {
            excess += *bin - ceiling;
            *bin = ceiling;
        }
    }

    let per_bin = excess / BINS as u32;
    let residual = (excess % BINS as u32) as usize;
    for bin in hist.iter_mut() {
        *bin += per_bin;
    }
    if residual > 0 {
        let step = (BINS / residual).max(1);
        for bin in hist.iter_mut().step_by(step).take(residual) {
            *bin += 1;
        }
    }

    let scale = 255.0 / area as f32;
    let mut lut = [0u8; BINS];
    let mut cumulative = 0u32;
    for (value, count) in hist.iter().enumerate() {
        cumulative += count;
        lut[value] = (cumulative as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_channel_stays_flat() {
        let flat = GrayImage::from_pixel(64, 48, Luma([90]));
        let out = clahe(&flat, 2.0, 8, 8);
        let first = out.get_pixel(0, 0)[0];
        assert!(out.pixels().all(|p| p[0] == first));
    }

    #[test]
    fn loose_clip_limit_stretches_low_contrast_gradient() {
        let gradient = GrayImage::from_fn(128, 128, |x, _| Luma([100 + (x / 16) as u8]));
        let out = clahe(&gradient, 40.0, 8, 8);

        let spread = |img: &GrayImage| {
            let min = img.pixels().map(|p| p[0]).min().unwrap();
            let max = img.pixels().map(|p| p[0]).max().unwrap();
            max - min
        };
        assert!(spread(&out) > spread(&gradient));
    }

    #[test]
    fn every_small_size_keeps_its_dimensions() {
        for height in 1..=64 {
            for width in 1..=64 {
                let img = GrayImage::from_fn(width, height, |x, y| Luma([((x * 7 + y * 3) % 256) as u8]));
                let out = clahe(&img, 2.0, 8, 8);
                assert_eq!(out.dimensions(), (width, height));
            }
        }
    }

    #[test]
    fn ragged_grid_drops_empty_tiles() {
        // 20 px over 8 tiles gives 3 px tiles, so only 7 columns fit
        let img = GrayImage::from_fn(20, 20, |x, y| Luma([(x * 10 + y) as u8]));
        let out = clahe(&img, 2.0, 8, 8);
        assert_eq!(out.dimensions(), (20, 20));
    }

    #[test]
    fn tiny_images_use_fewer_tiles() {
        let tiny = GrayImage::from_fn(3, 2, |x, y| Luma([(x * 40 + y * 10) as u8]));
        let out = clahe(&tiny, 2.0, 8, 8);
        assert_eq!(out.dimensions(), (3, 2));
    }
}
