use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Encode a grid of digital numbers as the 16-bit grayscale
/// TIFF layout the cameras write.
pub fn write_radiometric_tiff(path: &Path, dns: &[u16], width: u32, height: u32) {
    let mut bytes = Vec::with_capacity(dns.len() * 2);
    for dn in dns {
        bytes.extend_from_slice(&dn.to_ne_bytes());
    }
    let writer = BufWriter::new(File::create(path).unwrap());
    image::tiff::TiffEncoder::new(writer)
        .encode(&bytes, width, height, image::ColorType::L16)
        .unwrap();
}

/// A plain visible-light JPEG with no EXIF block.
pub fn write_visible_jpeg(path: &Path) {
    let img = image::RgbImage::from_pixel(8, 6, image::Rgb([120, 80, 40]));
    img.save(path).unwrap();
}
