//! PNG encoding for rendered figures.
//!
//! Supports two encoding modes:
//! - **Indexed PNG (color type 3)**: used when the figure has ≤256 unique
//!   colours, which is typical for a white background with six arrow colours
//!   and antialiased text.
//! - **RGBA PNG (color type 6)**: fallback for figures with more colours.
//!
//! Both modes can carry a `pHYs` chunk recording the resolution in dots per
//! inch, so viewers and print pipelines see the intended physical size.

use rayon::prelude::*;
use std::collections::HashMap;
use std::io::Write;

use crate::error::{RenderError, Result};

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel palette extraction
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const METRES_PER_INCH: f64 = 0.0254;

/// Pixels per metre for a resolution in dots per inch.
pub fn dpi_to_ppm(dpi: u32) -> u32 {
    (dpi as f64 / METRES_PER_INCH).round() as u32
}

/// Encode RGBA pixels, choosing indexed or RGBA output automatically.
///
/// # Arguments
/// - `pixels`: RGBA pixel data (4 bytes per pixel, straight alpha)
/// - `width`, `height`: image size in pixels
/// - `dpi`: resolution written to `pHYs`, or `None` to omit the chunk
pub fn encode_png(pixels: &[u8], width: usize, height: usize, dpi: Option<u32>) -> Result<Vec<u8>> {
    if pixels.len() != width * height * 4 {
        return Err(RenderError::Encode(format!(
            "{} bytes for a {}x{} RGBA image",
            pixels.len(),
            width,
            height
        )));
    }

    let num_pixels = pixels.len() / 4;

    // Try to extract a palette (use parallel version for larger images)
    let palette_result = if num_pixels >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    };

    match palette_result {
        Some((palette, indices)) => encode_png_indexed(width, height, &palette, &indices, dpi),
        None => encode_png_rgba(pixels, width, height, dpi),
    }
}

/// Pack RGBA bytes into a u32 for faster hashing and comparison
#[inline(always)]
fn pack_color(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24)
}

#[inline(always)]
fn unpack_color(packed: u32) -> (u8, u8, u8, u8) {
    (
        packed as u8,
        (packed >> 8) as u8,
        (packed >> 16) as u8,
        (packed >> 24) as u8,
    )
}

type Palette = Vec<(u8, u8, u8, u8)>;

/// Sequential palette extraction for small images.
fn extract_palette_sequential(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / 4);

    for chunk in pixels.chunks_exact(4) {
        let packed = pack_color(chunk[0], chunk[1], chunk[2], chunk[3]);

        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push((chunk[0], chunk[1], chunk[2], chunk[3]));
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Parallel palette extraction for larger images.
///
/// Unique colours are collected per chunk, merged and capped at 256, then
/// pixels are mapped to palette indices in a second parallel pass.
fn extract_palette_parallel(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
    let chunk_size = (pixels.len() / 4 / rayon::current_num_threads()).max(256) * 4;

    let unique_colors: Vec<u32> = pixels
        .par_chunks(chunk_size)
        .flat_map(|chunk| {
            let mut local_colors: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            for pixel in chunk.chunks_exact(4) {
                local_colors.insert(pack_color(pixel[0], pixel[1], pixel[2], pixel[3]), ());
                // Early exit if we definitely have too many colors
                if local_colors.len() > MAX_PALETTE_SIZE {
                    break;
                }
            }
            local_colors.into_keys().collect::<Vec<_>>()
        })
        .collect();

    let mut global_colors: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Palette = Vec::with_capacity(MAX_PALETTE_SIZE);

    for packed in unique_colors {
        if !global_colors.contains_key(&packed) {
            if palette.len() >= MAX_PALETTE_SIZE {
                return None;
            }
            global_colors.insert(packed, palette.len() as u8);
            palette.push(unpack_color(packed));
        }
    }

    let pixels_per_chunk = chunk_size / 4;
    let mut indices = vec![0u8; pixels.len() / 4];

    indices
        .par_chunks_mut(pixels_per_chunk)
        .enumerate()
        .for_each(|(chunk_idx, idx_chunk)| {
            let pixel_start = chunk_idx * pixels_per_chunk * 4;
            for (i, idx) in idx_chunk.iter_mut().enumerate() {
                let o = pixel_start + i * 4;
                if o + 3 < pixels.len() {
                    let packed = pack_color(pixels[o], pixels[o + 1], pixels[o + 2], pixels[o + 3]);
                    *idx = *global_colors.get(&packed).unwrap_or(&0);
                }
            }
        });

    Some((palette, indices))
}

fn ihdr(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&(width as u32).to_be_bytes());
    data.extend_from_slice(&(height as u32).to_be_bytes());
    data.push(8); // bit depth
    data.push(color_type);
    data.push(0); // compression method
    data.push(0); // filter method
    data.push(0); // interlace method
    data
}

/// `pHYs` payload: pixels per metre on both axes, unit = metre.
fn phys(dpi: u32) -> Vec<u8> {
    let ppm = dpi_to_ppm(dpi);
    let mut data = Vec::with_capacity(9);
    data.extend_from_slice(&ppm.to_be_bytes());
    data.extend_from_slice(&ppm.to_be_bytes());
    data.push(1);
    data
}

/// Encode an indexed PNG (color type 3) from palette and indices.
pub fn encode_png_indexed(
    width: usize,
    height: usize,
    palette: &[(u8, u8, u8, u8)],
    indices: &[u8],
    dpi: Option<u32>,
) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    if let Some(dpi) = dpi {
        write_chunk(&mut png, b"pHYs", &phys(dpi));
    }

    let plte_data: Vec<u8> = palette.iter().flat_map(|&(r, g, b, _)| [r, g, b]).collect();
    write_chunk(&mut png, b"PLTE", &plte_data);

    // tRNS only if any palette entry is translucent
    if palette.iter().any(|(_, _, _, a)| *a < 255) {
        let trns_data: Vec<u8> = palette.iter().map(|(_, _, _, a)| *a).collect();
        write_chunk(&mut png, b"tRNS", &trns_data);
    }

    let idat_data = deflate_scanlines(indices, width, height)?;
    write_chunk(&mut png, b"IDAT", &idat_data);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Encode an RGBA PNG (color type 6).
pub fn encode_png_rgba(
    pixels: &[u8],
    width: usize,
    height: usize,
    dpi: Option<u32>,
) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 6));

    if let Some(dpi) = dpi {
        write_chunk(&mut png, b"pHYs", &phys(dpi));
    }

    let idat_data = deflate_scanlines(pixels, width * 4, height)?;
    write_chunk(&mut png, b"IDAT", &idat_data);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Write a PNG chunk: length, type, data, CRC over type and data.
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Prefix each `row_bytes` scanline with filter type 0 and zlib-compress.
fn deflate_scanlines(data: &[u8], row_bytes: usize, height: usize) -> Result<Vec<u8>> {
    let mut uncompressed = Vec::with_capacity(height * (1 + row_bytes));
    for row in data.chunks_exact(row_bytes.max(1)).take(height) {
        uncompressed.push(0); // filter type: none
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&uncompressed)
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))
}

/// Iterate over the chunks of an encoded PNG as (type, data).
pub fn chunks(png: &[u8]) -> impl Iterator<Item = ([u8; 4], &[u8])> {
    let mut offset = PNG_SIGNATURE.len();
    std::iter::from_fn(move || {
        let len_bytes = png.get(offset..offset + 4)?;
        let len = u32::from_be_bytes(len_bytes.try_into().ok()?) as usize;
        let chunk_type: [u8; 4] = png.get(offset + 4..offset + 8)?.try_into().ok()?;
        let data = png.get(offset + 8..offset + 8 + len)?;
        offset += 12 + len;
        Some((chunk_type, data))
    })
}

/// Resolution recorded in a PNG's `pHYs` chunk, in dots per inch.
pub fn read_dpi(png: &[u8]) -> Option<f64> {
    let (_, data) = chunks(png).find(|(t, _)| t == b"pHYs")?;
    if data.len() != 9 || data[8] != 1 {
        return None;
    }
    let ppm = u32::from_be_bytes(data[0..4].try_into().ok()?);
    Some(ppm as f64 * METRES_PER_INCH)
}
