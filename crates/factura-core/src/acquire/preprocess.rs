use crate::error::FacturaError;
use image::GrayImage;
use std::path::{Path, PathBuf};

/// Neighborhood size for the adaptive threshold.
const BLOCK: u32 = 11;
/// Constant subtracted from the neighborhood mean.
const OFFSET: i32 = 2;

/// Load a rasterized page, binarize it and write the prepared image back
/// into the workspace for the OCR engine.
pub fn prepare_page(
    input: &Path,
    workspace: &Path,
    page_number: usize,
) -> Result<PathBuf, FacturaError> {
    let img = image::open(input)
        .map_err(|e| FacturaError::Rasterize(format!("cannot open page image {}: {e}", input.display())))?;
    let binarized = binarize(&img.to_luma8());
    let out = workspace.join(format!("page-{page_number}-bin.png"));
    binarized
        .save(&out)
        .map_err(|e| FacturaError::Rasterize(format!("cannot write prepared page: {e}")))?;
    Ok(out)
}

/// Adaptive mean thresholding: a pixel is white when it exceeds the mean
/// of its neighborhood minus a small offset. If the result comes out
/// mostly black (dark background scan), polarity is inverted so the OCR
/// engine always sees dark glyphs on white.
pub fn binarize(gray: &GrayImage) -> GrayImage {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return gray.clone();
    }

    // Integral image, one row/column of zero padding.
    let mut integral = vec![0u64; ((w + 1) * (h + 1)) as usize];
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += gray.get_pixel(x, y)[0] as u64;
            let idx = ((y + 1) * (w + 1) + (x + 1)) as usize;
            integral[idx] = integral[idx - (w + 1) as usize] + row_sum;
        }
    }

    let radius = BLOCK / 2;
    let mut out = GrayImage::new(w, h);
    let mut white: u64 = 0;
    for y in 0..h {
        for x in 0..w {
            let x0 = x.saturating_sub(radius);
            let y0 = y.saturating_sub(radius);
            let x1 = (x + radius + 1).min(w);
            let y1 = (y + radius + 1).min(h);
            let area = ((x1 - x0) * (y1 - y0)) as u64;

            let sum = window_sum(&integral, w, x0, y0, x1, y1);
            let mean = (sum / area) as i32;
            let value = if (gray.get_pixel(x, y)[0] as i32) > mean - OFFSET {
                white += 1;
                255u8
            } else {
                0u8
            };
            out.put_pixel(x, y, image::Luma([value]));
        }
    }

    // Mean after thresholding below mid-gray means a dark background.
    let total = (w * h) as u64;
    if white * 255 / total < 127 {
        for pixel in out.pixels_mut() {
            pixel[0] = 255 - pixel[0];
        }
    }
    out
}

fn window_sum(integral: &[u64], w: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> u64 {
    let stride = (w + 1) as usize;
    let a = integral[y0 as usize * stride + x0 as usize];
    let b = integral[y0 as usize * stride + x1 as usize];
    let c = integral[y1 as usize * stride + x0 as usize];
    let d = integral[y1 as usize * stride + x1 as usize];
    d + a - b - c
}
