//! Scannable rendering of payment requests.

use crate::Result;
use qrcode::render::{svg, unicode};
use qrcode::{EcLevel, QrCode};

// Encoded byte-for-byte so a scanner hands back the exact string.
fn encode(payment_request: &str) -> Result<QrCode> {
    Ok(QrCode::with_error_correction_level(
        payment_request.as_bytes(),
        EcLevel::M,
    )?)
}

/// Render as an SVG document, `size` pixels square at minimum.
pub fn render_payment_request_svg(payment_request: &str, size: u32) -> Result<String> {
    let code = encode(payment_request)?;
    Ok(code
        .render::<svg::Color<'_>>()
        .min_dimensions(size, size)
        .build())
}

/// Render for a terminal using half-block characters.
pub fn render_payment_request_text(payment_request: &str) -> Result<String> {
    let code = encode(payment_request)?;
    Ok(code
        .render::<unicode::Dense1x2>()
        .quiet_zone(true)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST: &str = "lnbc100n1pjexampleq9xyz0qsp5deadbeefdeadbeefdeadbeefdeadbeef";

    #[test]
    fn test_svg_render() {
        let svg = render_payment_request_svg(REQUEST, 150).unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_text_render() {
        let text = render_payment_request_text(REQUEST).unwrap();
        assert!(text.lines().count() > 10);
    }

    #[test]
    fn test_oversized_payload_fails() {
        let huge = "lnbc".repeat(2000);
        let err = render_payment_request_svg(&huge, 150).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Render);
    }
}
