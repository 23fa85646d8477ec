//! Image compression command.
//!
//! Shrinks an image the same way catalog uploads are shrunk and prints the
//! resulting `data:` URL, ready to paste into a product's `images` or
//! `templates`.
//!
//! ```bash
//! pawcase-cli compress corgi.jpg --max-dimension 1200 --quality 75 > corgi.txt
//! ```

use std::path::Path;

use thiserror::Error;

use pawcase_storefront::services::imaging::{self, CompressOptions, ImageError};

#[derive(Debug, Error)]
pub enum CompressError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Compress `path` and print the data URL to stdout.
///
/// # Errors
///
/// Returns `CompressError` if the file cannot be read or is not an image.
pub fn run(path: &Path, options: CompressOptions) -> Result<(), CompressError> {
    let bytes = std::fs::read(path).map_err(|source| CompressError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let image = imaging::compress(&bytes, options)?;
    tracing::info!(
        input_bytes = bytes.len(),
        output_bytes = image.bytes.len(),
        width = image.width,
        height = image.height,
        mime = image.mime,
        "Compressed"
    );

    #[allow(clippy::print_stdout)]
    {
        println!("{}", image.to_data_url());
    }
    Ok(())
}
