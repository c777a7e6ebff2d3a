//! Text of all open documents, concatenated for the clipboard

use std::fmt::Write as _;

use tracing::debug;

use super::view::EditorView;

/// Concatenate every open text document under a `// File: <path>` header
///
/// Documents without a backing file or without text are left out. Returns
/// an empty string when nothing qualifies.
pub fn collect_contents(view: &dyn EditorView) -> String {
    let mut contents = String::new();

    let documents = match view.documents() {
        Ok(documents) => documents,
        Err(e) => {
            debug!("Failed to enumerate documents for copy: {}", e);
            return contents;
        }
    };

    for document in documents {
        let path = match view.document_path(document) {
            Ok(Some(path)) => path,
            Ok(None) => continue,
            Err(e) => {
                debug!("Skipping {} in copy: {}", document, e);
                continue;
            }
        };
        let text = match view.document_text(document) {
            Ok(Some(text)) => text,
            Ok(None) => continue,
            Err(e) => {
                debug!("Skipping {} in copy: {}", path.display(), e);
                continue;
            }
        };

        let _ = writeln!(contents, "// File: {}", path.display());
        let _ = writeln!(contents, "{}", text);
        contents.push('\n');
    }

    contents
}
