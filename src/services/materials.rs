use lopdf::Document;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

// Files above this size are still processed, but flagged as slow
pub const LARGE_FILE_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum MaterialsError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse PDF: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Text of every course PDF, concatenated in file-name order
#[derive(Debug, Clone, Default)]
pub struct CourseMaterials {
    pub text: String,
    pub file_count: usize,
    pub total_bytes: u64,
}

impl CourseMaterials {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Extract the text of every page of a PDF.
///
/// Returns an empty string when the file cannot be read or parsed.
pub fn extract_pdf_text(path: &Path) -> String {
    match try_extract_pdf_text(path) {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to read PDF {}: {}", path.display(), e);
            String::new()
        }
    }
}

fn try_extract_pdf_text(path: &Path) -> Result<String, MaterialsError> {
    let doc = Document::load(path)?;

    // get_pages is keyed by page number, so iteration is already in reading order
    let mut text = String::new();
    for page_number in doc.get_pages().keys() {
        text.push_str(&doc.extract_text(&[*page_number])?);
    }

    Ok(text)
}

/// Load every `*.pdf` file directly inside `dir`
pub fn load_course_materials(dir: &Path) -> CourseMaterials {
    let pdf_files = match list_pdf_files(dir) {
        Ok(files) => files,
        Err(e) => {
            error!(
                "Failed to list course materials in {}: {}",
                dir.display(),
                e
            );
            return CourseMaterials::default();
        }
    };

    if pdf_files.is_empty() {
        warn!("No PDF files found in {}", dir.display());
        return CourseMaterials::default();
    }

    let mut materials = CourseMaterials::default();

    for (idx, path) in pdf_files.iter().enumerate() {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        info!("Processing {} ({}/{})", name, idx + 1, pdf_files.len());

        let size = fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
        if size > LARGE_FILE_BYTES {
            warn!(
                "{} is large ({:.1}MB); processing may take a while",
                name,
                size as f64 / (1024.0 * 1024.0)
            );
        }

        let content = extract_pdf_text(path);
        if !content.is_empty() {
            materials
                .text
                .push_str(&format!("\n[{}]\n{}\n\n", name, content));
        }

        materials.file_count += 1;
        materials.total_bytes += size;
    }

    info!(
        "Course materials loaded: {} files, {:.1}MB total",
        materials.file_count,
        materials.total_bytes as f64 / (1024.0 * 1024.0)
    );

    materials
}

fn list_pdf_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
