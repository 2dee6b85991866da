//! Chromakey Studio core: color-keyed transparency and selective recolor.
//!
//! The engine takes a pixel buffer plus a resolved parameter snapshot and
//! returns a new buffer; it knows nothing about files, canvases or windows.
//! Around it sit the edit session (staging + per-operator undo/redo
//! histories + recordable action scripts) and thin collaborators for decode
//! and export.

pub mod color;
pub mod error;
pub mod export;
pub mod history;
pub mod loader;
pub mod ops;
pub mod processor;
pub mod session;

pub use color::RgbaColor;
pub use error::{ChromaError, Result};
pub use export::ExportFile;
pub use loader::SourceImage;
pub use ops::{Action, ColorChangeState, TransparencyState, UnaffectedColorState};
pub use processor::{process_image, process_image_par, ProcessingParams};
pub use session::EditSession;
