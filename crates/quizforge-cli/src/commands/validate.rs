//! The `quizforge validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizforge_core::parser::{load_document, load_document_directory, validate_document};

pub fn execute(document_path: PathBuf) -> Result<()> {
    let documents = if document_path.is_dir() {
        load_document_directory(&document_path)?
    } else {
        vec![load_document(&document_path)?]
    };

    let mut total_warnings = 0;

    for document in &documents {
        let resource = document.resource();
        println!(
            "Document: {} ({} pages, {} questions)",
            resource.id,
            document.page_count(),
            document.questions().count()
        );

        let warnings = validate_document(document);
        for w in &warnings {
            let prefix = w
                .location
                .as_ref()
                .map(|loc| format!("  [{loc}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All documents valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
