// src/transform/sass.rs

//! SCSS/SASS compilation via `grass`.

use std::path::Path;

use grass::{InputSyntax, Options, OutputStyle};

use crate::errors::{MinifydError, Result};

/// Compile SCSS or SASS source to compressed CSS.
///
/// The dialect is chosen from the source file's extension (`.sass` is the
/// indented syntax); `@use`/`@import` resolve relative to the source file's
/// directory.
pub fn compile_sass(source: &str, source_path: &Path) -> Result<String> {
    let syntax = match source_path.extension().and_then(|e| e.to_str()) {
        Some("sass") => InputSyntax::Sass,
        _ => InputSyntax::Scss,
    };

    let mut options = Options::default()
        .style(OutputStyle::Compressed)
        .input_syntax(syntax);
    if let Some(parent) = source_path.parent() {
        options = options.load_path(parent);
    }

    grass::from_string(source.to_owned(), &options)
        .map_err(|err| MinifydError::transform("SCSS", err.to_string()))
}
