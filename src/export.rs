//! Export collaborator: processed PNG for a single image, zip archive for a
//! multi-image set.
//!
//! Export always runs the same parameter resolution as live preview; what
//! the user sees is what lands in the file. Output is produced in memory as
//! named byte buffers so the caller decides where they go (download, disk,
//! frontend transfer).

use std::io::{Cursor, Write};

use image::RgbaImage;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::Result;
use crate::loader::SourceImage;
use crate::processor::{self, ProcessingParams};

/// A finished export: suggested filename plus encoded contents.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// UTC date stamp used in export filenames.
fn date_stamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// PNG-encode a pixel buffer in memory.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}

/// Export one image, fully processed, named `{stem}_{YYYY-MM-DD}.png`.
pub fn export_single(source: &SourceImage, params: &ProcessingParams) -> Result<ExportFile> {
    let processed = processor::process_image_par(&source.image, params);
    let bytes = encode_png(&processed)?;
    let name = format!("{}_{}.png", source.name, date_stamp());
    tracing::info!(file = %name, "exported image");
    Ok(ExportFile { name, bytes })
}

/// Export a multi-image set as `processed_images_{YYYY-MM-DD}.zip`, one
/// `{stem}_processed.png` entry per image.
///
/// An image that fails to encode is skipped with a warning; the entries
/// already written stay intact.
pub fn export_batch(sources: &[SourceImage], params: &ProcessingParams) -> Result<ExportFile> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for source in sources {
        let processed = processor::process_image_par(&source.image, params);
        let encoded = match encode_png(&processed) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(name = %source.name, error = %e, "skipping image in batch export");
                continue;
            }
        };
        let options = SimpleFileOptions::default();
        writer.start_file(format!("{}_processed.png", source.name), options)?;
        writer.write_all(&encoded)?;
    }

    let bytes = writer.finish()?.into_inner();
    let name = format!("processed_images_{}.zip", date_stamp());
    tracing::info!(file = %name, count = sources.len(), "exported archive");
    Ok(ExportFile { name, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::RgbaColor;
    use crate::ops::TransparencyState;
    use crate::processor::OperatorSet;
    use image::Rgba;

    fn keyed_params() -> ProcessingParams {
        ProcessingParams {
            transparency: OperatorSet {
                history: vec![TransparencyState {
                    color: Some(RgbaColor::opaque(255, 0, 255)),
                    tolerance: 10,
                }],
                staging: TransparencyState::default(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_single_export_name_and_contents() {
        let source = SourceImage::new(
            "sprite",
            RgbaImage::from_pixel(3, 3, Rgba([255, 0, 255, 255])),
        );
        let export = export_single(&source, &keyed_params()).unwrap();

        assert!(export.name.starts_with("sprite_"));
        assert!(export.name.ends_with(".png"));
        // stem + "_YYYY-MM-DD" + ".png"
        assert_eq!(export.name.len(), "sprite".len() + 1 + 10 + 4);

        let decoded = image::load_from_memory(&export.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(1, 1), &Rgba([255, 0, 255, 0]));
    }

    #[test]
    fn test_batch_export_zip_layout() {
        let sources = vec![
            SourceImage::new("first", RgbaImage::from_pixel(2, 2, Rgba([255, 0, 255, 255]))),
            SourceImage::new("second", RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255]))),
        ];
        let export = export_batch(&sources, &keyed_params()).unwrap();
        assert!(export.name.starts_with("processed_images_"));
        assert!(export.name.ends_with(".zip"));

        let mut archive = zip::ZipArchive::new(Cursor::new(export.bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        assert!(archive.by_name("first_processed.png").is_ok());
        assert!(archive.by_name("second_processed.png").is_ok());

        let mut entry_bytes = Vec::new();
        std::io::Read::read_to_end(
            &mut archive.by_name("second_processed.png").unwrap(),
            &mut entry_bytes,
        )
        .unwrap();
        let decoded = image::load_from_memory(&entry_bytes).unwrap().to_rgba8();
        // Not within tolerance of the keyed color: untouched
        assert_eq!(decoded.get_pixel(0, 0), &Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_export_uses_same_resolution_as_preview() {
        let source = SourceImage::new(
            "frame",
            RgbaImage::from_pixel(4, 4, Rgba([255, 0, 255, 255])),
        );
        let params = keyed_params();
        let preview = processor::process_image(&source.image, &params);

        let export = export_single(&source, &params).unwrap();
        let decoded = image::load_from_memory(&export.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.as_raw(), preview.as_raw());
    }
}
