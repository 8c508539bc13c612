//! Indexed PNG encoding (color type 3).
//!
//! Tiles and legends are always quantized through a known ≤256-entry
//! palette, so the encoder only speaks indexed PNG: PLTE for the colors,
//! tRNS for per-entry alpha, one index byte per pixel in IDAT.

use std::io::Write;

/// Encode an indexed PNG from a palette and per-pixel indices.
///
/// # Arguments
/// - `width`, `height`: image dimensions in pixels
/// - `palette`: RGBA palette entries (≤256)
/// - `indices`: one palette index per pixel, row-major
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[(u8, u8, u8, u8)],
    indices: &[u8],
) -> Result<Vec<u8>, String> {
    if palette.is_empty() || palette.len() > 256 {
        return Err(format!("palette size {} not in 1..=256", palette.len()));
    }
    if indices.len() != width * height {
        return Err(format!(
            "index count {} does not match {}x{} image",
            indices.len(),
            width,
            height
        ));
    }

    let mut png = Vec::new();

    // PNG signature
    png.extend_from_slice(&[137, 80, 78, 71, 13, 10, 26, 10]);

    // IHDR chunk
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth (8 bits per palette index)
    ihdr_data.push(3); // color type 3 = indexed
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    // PLTE chunk (palette)
    let mut plte_data = Vec::with_capacity(palette.len() * 3);
    for (r, g, b, _) in palette {
        plte_data.push(*r);
        plte_data.push(*g);
        plte_data.push(*b);
    }
    write_chunk(&mut png, b"PLTE", &plte_data);

    // tRNS chunk (transparency) - only if any entry has alpha < 255
    let has_transparency = palette.iter().any(|(_, _, _, a)| *a < 255);
    if has_transparency {
        let trns_data: Vec<u8> = palette.iter().map(|(_, _, _, a)| *a).collect();
        write_chunk(&mut png, b"tRNS", &trns_data);
    }

    // IDAT chunk (image data)
    let idat_data = deflate_idat_indexed(indices, width, height)
        .map_err(|e| format!("IDAT compression failed: {}", e))?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    // IEND chunk
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Write a PNG chunk: length, type, data, CRC.
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let crc_data = [chunk_type.as_slice(), data].concat();
    let crc = crc32fast::hash(&crc_data);
    png.extend_from_slice(&crc.to_be_bytes());
}

/// Deflate indexed image data for the IDAT chunk. Each scanline is a
/// filter byte (0 = none) followed by `width` index bytes.
fn deflate_idat_indexed(
    indices: &[u8],
    width: usize,
    height: usize,
) -> Result<Vec<u8>, std::io::Error> {
    let mut uncompressed = Vec::with_capacity(height * (1 + width));

    for y in 0..height {
        uncompressed.push(0); // filter type: none
        let row_start = y * width;
        uncompressed.extend_from_slice(&indices[row_start..row_start + width]);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&uncompressed)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

    #[test]
    fn test_create_png_indexed() {
        let palette = [(0, 0, 0, 0), (255, 0, 0, 255), (0, 255, 0, 255)];
        let indices = [1, 2, 2, 1];

        let png = create_png_indexed(2, 2, &palette, &indices).unwrap();
        assert_eq!(&png[0..8], &PNG_SIGNATURE);

        // IHDR starts right after the signature: 4-byte length, type, data.
        assert_eq!(&png[12..16], b"IHDR");
        let width = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        let height = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
        assert_eq!((width, height), (2, 2));
        assert_eq!(png[25], 3); // color type: indexed
    }

    #[test]
    fn test_trns_only_when_transparent() {
        let opaque = [(10, 20, 30, 255)];
        let png = create_png_indexed(1, 1, &opaque, &[0]).unwrap();
        assert!(!contains_chunk(&png, b"tRNS"));

        let translucent = [(10, 20, 30, 128)];
        let png = create_png_indexed(1, 1, &translucent, &[0]).unwrap();
        assert!(contains_chunk(&png, b"tRNS"));
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let palette = [(0, 0, 0, 255)];
        assert!(create_png_indexed(2, 2, &palette, &[0, 0, 0]).is_err());
        assert!(create_png_indexed(1, 1, &[], &[0]).is_err());
    }

    fn contains_chunk(png: &[u8], name: &[u8; 4]) -> bool {
        png.windows(4).any(|w| w == name)
    }
}
