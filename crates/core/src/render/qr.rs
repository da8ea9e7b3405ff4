//! QR code render step
//!
//! Encodes the attendee barcode as a PNG next to the nametag and points the
//! template's `qr_code` picture at it.

use std::path::{Path, PathBuf};

use image::Luma;
use qrcode::QrCode;

use crate::error::{Error, Result};
use crate::models::Attendee;
use crate::template::TemplateEngine;

/// Registry name of the step
pub const STEP_NAME: &str = "embed_qr";

/// Picture slot replaced in the template
pub const IMAGE_SLOT: &str = "qr_code";

/// Smallest edge of the generated image in pixels
const MIN_DIMENSION: u32 = 256;

/// Image path for a nametag: same directory and stem, `_qr.png` suffix
pub fn qr_image_path(output_path: &Path) -> PathBuf {
    let stem = output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "nametag".to_string());
    output_path.with_file_name(format!("{}_qr.png", stem))
}

/// Render `data` as a QR PNG at `path`
pub fn write_qr_png(data: &str, path: &Path) -> Result<()> {
    let code = QrCode::new(data.as_bytes()).map_err(|e| Error::render_step(STEP_NAME, e))?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
        .build();
    image
        .save(path)
        .map_err(|e| Error::render_step(STEP_NAME, e))?;
    Ok(())
}

/// Built-in step: QR image from the attendee barcode
pub fn embed_qr_from_barcode(
    engine: &mut dyn TemplateEngine,
    attendee: &Attendee,
    output_path: &Path,
) -> Result<()> {
    if attendee.barcode.is_empty() {
        return Err(Error::render_step(
            STEP_NAME,
            format!("attendee {} has no barcode", attendee.id()),
        ));
    }

    let image_path = qr_image_path(output_path);
    write_qr_png(&attendee.barcode, &image_path)?;
    tracing::debug!(attendee_id = %attendee.id(), path = %image_path.display(), "Wrote QR image");

    engine.replace_named_image(IMAGE_SLOT, &image_path)
}
