//! Placeholder detection for fetched bodies.

use std::io::Cursor;

use crate::config::ContentConfig;

use super::fetch::FetchOutcome;

/// Decide whether `body` is a real image.
///
/// Only the header is decoded, so a truncated body still classifies. Bodies
/// that are not a recognizable image (HTML error pages, empty responses) and
/// images below `min_dimension` in both axes are placeholders.
pub fn inspect(body: &[u8], cfg: &ContentConfig) -> FetchOutcome {
    if body.is_empty() {
        return FetchOutcome::Degenerate;
    }
    let reader = match image::ImageReader::new(Cursor::new(body)).with_guessed_format() {
        Ok(r) => r,
        Err(_) => return FetchOutcome::Degenerate,
    };
    match reader.into_dimensions() {
        Ok((w, h)) if w < cfg.min_dimension && h < cfg.min_dimension => {
            tracing::debug!(width = w, height = h, "placeholder-sized image");
            FetchOutcome::Degenerate
        }
        Ok(_) => FetchOutcome::Loaded,
        Err(e) => {
            tracing::debug!("body is not a decodable image: {}", e);
            FetchOutcome::Degenerate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        RgbaImage::new(width, height)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn real_image_loads() {
        assert_eq!(inspect(&png(40, 30), &ContentConfig::default()), FetchOutcome::Loaded);
    }

    #[test]
    fn one_by_one_is_placeholder() {
        assert_eq!(inspect(&png(1, 1), &ContentConfig::default()), FetchOutcome::Degenerate);
    }

    #[test]
    fn thin_but_long_image_is_real() {
        assert_eq!(inspect(&png(1, 50), &ContentConfig::default()), FetchOutcome::Loaded);
    }

    #[test]
    fn non_image_and_empty_bodies_are_placeholders() {
        let cfg = ContentConfig::default();
        assert_eq!(inspect(b"", &cfg), FetchOutcome::Degenerate);
        assert_eq!(
            inspect(b"<html><body>502 Bad Gateway</body></html>", &cfg),
            FetchOutcome::Degenerate
        );
    }
}
