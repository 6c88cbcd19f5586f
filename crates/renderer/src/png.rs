//! PNG encoding for RGBA overlay images.
//!
//! Supports two encoding modes:
//! - **Indexed PNG (color type 3)**: Used when the image has ≤256 unique
//!   RGBA values. Classified rasters always qualify (one color per class
//!   plus transparent), so this is the normal path.
//! - **RGBA PNG (color type 6)**: Fallback for images with >256 colors.
//!
//! Use `create_png_auto` for automatic mode selection, or `create_png` for
//! explicit RGBA encoding.

use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::io::Write;

use crate::RenderError;

/// PNG file signature
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel palette extraction
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

type Palette = Vec<(u8, u8, u8, u8)>;

/// Create a PNG image with automatic format selection.
///
/// - If ≤256 unique colors: uses indexed PNG (smaller, faster)
/// - Otherwise: uses RGBA PNG (full color)
///
/// # Arguments
/// - `pixels`: RGBA pixel data (4 bytes per pixel)
/// - `width`: Image width in pixels
/// - `height`: Image height in pixels
pub fn create_png_auto(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, RenderError> {
    check_dimensions(pixels, width, height)?;
    let num_pixels = pixels.len() / 4;

    let palette_result = if num_pixels >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    };

    match palette_result {
        Some((palette, indices)) => create_png_indexed(width, height, &palette, &indices),
        None => create_png(pixels, width, height),
    }
}

fn check_dimensions(pixels: &[u8], width: usize, height: usize) -> Result<(), RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyImage);
    }
    if pixels.len() != width * height * 4 {
        return Err(RenderError::DimensionMismatch {
            expected: width * height * 4,
            actual: pixels.len(),
        });
    }
    Ok(())
}

/// Pack RGBA bytes into a u32 for faster hashing and comparison
#[inline(always)]
fn pack_color(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24)
}

/// Unpack u32 back to RGBA tuple
#[inline(always)]
fn unpack_color(packed: u32) -> (u8, u8, u8, u8) {
    (
        packed as u8,
        (packed >> 8) as u8,
        (packed >> 16) as u8,
        (packed >> 24) as u8,
    )
}

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
/// 1. Collect unique colors per row band on the rayon pool
/// 2. Merge and bail out if more than 256
/// 3. Map every pixel to its palette index in parallel
fn extract_palette_parallel(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
    let pixels_per_chunk = (pixels.len() / 4 / rayon::current_num_threads()).max(256);
    let chunk_bytes = pixels_per_chunk * 4;

    let local_sets: Vec<HashSet<u32>> = pixels
        .par_chunks(chunk_bytes)
        .map(|chunk| {
            let mut local = HashSet::with_capacity(MAX_PALETTE_SIZE);
            for pixel in chunk.chunks_exact(4) {
                local.insert(pack_color(pixel[0], pixel[1], pixel[2], pixel[3]));
                if local.len() > MAX_PALETTE_SIZE {
                    break;
                }
            }
            local
        })
        .collect();

    // Deterministic palette order regardless of thread scheduling
    let mut unique: Vec<u32> = local_sets.into_iter().flatten().collect();
    unique.sort_unstable();
    unique.dedup();
    if unique.len() > MAX_PALETTE_SIZE {
        return None;
    }

    let color_to_index: HashMap<u32, u8> = unique
        .iter()
        .enumerate()
        .map(|(idx, &packed)| (packed, idx as u8))
        .collect();
    let palette: Palette = unique.iter().map(|&packed| unpack_color(packed)).collect();

    let indices: Vec<u8> = pixels
        .par_chunks_exact(4)
        .map(|pixel| {
            let packed = pack_color(pixel[0], pixel[1], pixel[2], pixel[3]);
            color_to_index.get(&packed).copied().unwrap_or(0)
        })
        .collect();

    Some((palette, indices))
}

/// Create an indexed PNG (color type 3) from palette and indices.
///
/// 1 byte per pixel instead of 4, plus a tRNS chunk when any palette
/// entry is not fully opaque.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[(u8, u8, u8, u8)],
    indices: &[u8],
) -> Result<Vec<u8>, RenderError> {
    if indices.len() != width * height {
        return Err(RenderError::DimensionMismatch {
            expected: width * height,
            actual: indices.len(),
        });
    }

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    // PLTE chunk (palette)
    let mut plte_data = Vec::with_capacity(palette.len() * 3);
    for (r, g, b, _) in palette {
        plte_data.extend_from_slice(&[*r, *g, *b]);
    }
    write_chunk(&mut png, b"PLTE", &plte_data);

    // tRNS chunk (alpha per palette entry)
    if palette.iter().any(|(_, _, _, a)| *a < 255) {
        let trns_data: Vec<u8> = palette.iter().map(|(_, _, _, a)| *a).collect();
        write_chunk(&mut png, b"tRNS", &trns_data);
    }

    let idat_data = deflate_scanlines(indices, width, height)?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Create a PNG image from RGBA pixel data (color type 6).
///
/// # Arguments
/// - `pixels`: RGBA pixel data (4 bytes per pixel)
/// - `width`: Image width in pixels
/// - `height`: Image height in pixels
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, RenderError> {
    check_dimensions(pixels, width, height)?;

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 6));

    let idat_data = deflate_scanlines(pixels, width * 4, height)?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// IHDR payload: 8-bit depth, no interlace.
fn ihdr(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(color_type);
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    ihdr_data
}

/// Write a PNG chunk: length, type, data, CRC over type + data.
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Prefix each scanline of `row_bytes` with filter type 0 and zlib-compress.
fn deflate_scanlines(data: &[u8], row_bytes: usize, height: usize) -> Result<Vec<u8>, RenderError> {
    let mut uncompressed = Vec::with_capacity(height * (1 + row_bytes));
    for row in data.chunks_exact(row_bytes).take(height) {
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
