//! Image decode collaborator.
//!
//! Decoding stays off the interactive thread: each file gets its own blocking
//! task and the results are joined in input order, so a multi-file drop keeps
//! the order the files arrived in. Any decode failure fails the whole load;
//! the caller's image list is only replaced on full success.

use std::path::PathBuf;

use image::RgbaImage;

use crate::error::{ChromaError, Result};

/// A decoded image plus its display name (the file stem).
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub name: String,
    pub image: RgbaImage,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }
}

/// Decode a set of image files concurrently, preserving input order.
pub async fn load_images(paths: Vec<PathBuf>) -> Result<Vec<SourceImage>> {
    if paths.is_empty() {
        return Err(ChromaError::InvalidParameter(
            "No input files provided".to_string(),
        ));
    }

    let mut handles = Vec::with_capacity(paths.len());
    for path in paths {
        handles.push(tokio::task::spawn_blocking(move || -> Result<SourceImage> {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown")
                .to_string();
            let image = image::open(&path)
                .map_err(|e| {
                    ChromaError::Processing(format!("Failed to load {}: {}", path.display(), e))
                })?
                .to_rgba8();
            Ok(SourceImage { name, image })
        }));
    }

    let mut images = Vec::with_capacity(handles.len());
    for handle in handles {
        let loaded = handle
            .await
            .map_err(|e| ChromaError::Processing(format!("Task join error: {}", e)))??;
        images.push(loaded);
    }

    tracing::debug!(count = images.len(), "loaded image set");
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[tokio::test]
    async fn test_load_preserves_input_order() {
        let dir = std::env::temp_dir().join("chromakey_loader_test");
        std::fs::create_dir_all(&dir).unwrap();

        let mut paths = Vec::new();
        for (i, name) in ["zeta", "alpha", "mid"].iter().enumerate() {
            let path = dir.join(format!("{}.png", name));
            let img = RgbaImage::from_pixel(2, 2, Rgba([i as u8, 0, 0, 255]));
            img.save(&path).unwrap();
            paths.push(path);
        }

        let images = load_images(paths).await.unwrap();
        let names: Vec<&str> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
        assert_eq!(images[1].image.get_pixel(0, 0), &Rgba([1, 0, 0, 255]));
    }

    #[tokio::test]
    async fn test_missing_file_fails_the_load() {
        let paths = vec![PathBuf::from("/definitely/not/here.png")];
        assert!(load_images(paths).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        assert!(load_images(Vec::new()).await.is_err());
    }
}
