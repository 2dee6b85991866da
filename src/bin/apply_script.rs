//! Headless harness: replay an action script against a set of images and
//! write the export next to the current directory.
//!
//! Usage: apply_script <script.json> <image> [image...]

use std::path::PathBuf;

use chromakey_studio::{export, loader, EditSession};

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        eprintln!("Usage: apply_script <script.json> <image> [image...]");
        std::process::exit(1);
    }

    let script_path = PathBuf::from(&args[0]);
    let image_paths: Vec<PathBuf> = args[1..].iter().map(PathBuf::from).collect();

    let raw = match std::fs::read_to_string(&script_path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Failed to read {}: {}", script_path.display(), e);
            std::process::exit(1);
        }
    };

    let mut session = EditSession::new();
    if let Err(e) = session.load_script(&raw) {
        eprintln!("Invalid action script: {}", e);
        std::process::exit(1);
    }
    session.run_script();

    let images = match loader::load_images(image_paths).await {
        Ok(images) => images,
        Err(e) => {
            eprintln!("Failed to load images: {}", e);
            std::process::exit(1);
        }
    };

    let params = session.processing_params();
    let export = if images.len() == 1 {
        export::export_single(&images[0], &params)
    } else {
        export::export_batch(&images, &params)
    };

    match export {
        Ok(file) => {
            if let Err(e) = std::fs::write(&file.name, &file.bytes) {
                eprintln!("Failed to write {}: {}", file.name, e);
                std::process::exit(1);
            }
            println!("Wrote {} ({} bytes)", file.name, file.bytes.len());
        }
        Err(e) => {
            eprintln!("Export failed: {}", e);
            std::process::exit(1);
        }
    }
}
