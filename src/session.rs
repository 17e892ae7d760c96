//! Session-scoped state shared by the analyzer and the builder.

use crate::input::{FileKind, ImageStore, UploadedFile};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Holds the image store and the code-block id counter for one session.
///
/// Construct one per independent set of inputs; `clear` drops registered
/// images between sessions. The code-block counter keeps counting across
/// `clear` so ids stay unique within a process run.
#[derive(Debug, Default)]
pub struct Session {
    images: ImageStore,
    code_blocks: AtomicU64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with every image file already registered
    pub fn with_files(files: &[UploadedFile]) -> Self {
        let mut session = Self::new();
        session.register_images(files);
        session
    }

    pub fn register_images(&mut self, files: &[UploadedFile]) {
        let mut registered = 0;
        for file in files.iter().filter(|f| f.kind == FileKind::Image) {
            self.images.register(&file.name, file.content.clone());
            registered += 1;
        }
        debug!("Registered {} images", registered);
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Next id for an addressable code block
    pub fn next_code_block_id(&self) -> u64 {
        self.code_blocks.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_files_registers_images_only() {
        let files = vec![
            UploadedFile::from_bytes("img/logo.png", &[1, 2, 3]).unwrap(),
            UploadedFile::text("index.html", FileKind::Markup, "<img src=\"img/logo.png\">"),
        ];
        let session = Session::with_files(&files);
        assert_eq!(session.images().len(), 1);
        assert!(session.images().resolve("./img/logo.png").is_some());
    }

    #[test]
    fn test_code_block_ids_are_monotonic() {
        let session = Session::new();
        assert_eq!(session.next_code_block_id(), 1);
        assert_eq!(session.next_code_block_id(), 2);
    }

    #[test]
    fn test_clear_keeps_counter() {
        let files = vec![UploadedFile::from_bytes("a.gif", b"GIF").unwrap()];
        let mut session = Session::with_files(&files);
        session.next_code_block_id();
        session.clear();
        assert!(session.images().is_empty());
        assert_eq!(session.next_code_block_id(), 2);
    }
}
