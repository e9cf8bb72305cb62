//! Raster compositor: draw a styled render over the original image at a
//! caller-chosen opacity and re-encode the canvas as JPEG.

use crate::data_url::DataUrl;
use crate::error::ComposeError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use std::io::Cursor;
use std::time::Duration;

/// Composite `styled` over `original` at `opacity` percent.
///
/// The passthrough extremes return their input untouched without decoding
/// anything: `opacity >= 100` yields `styled`, `opacity == 0` yields
/// `original`. Otherwise both data URLs are decoded, the styled image is
/// scaled to the original's dimensions, drawn over it source-over at
/// `styled alpha × opacity / 100`, and the canvas is returned as a JPEG
/// data URL at `quality`.
///
/// Decoding, blending and encoding run on the blocking pool; only the wait
/// is bounded by `timeout` — a task that overruns keeps running detached,
/// but the caller gets [`ComposeError::Timeout`] instead of stalling.
pub async fn blend_images(
    original: &str,
    styled: &str,
    opacity: u8,
    quality: u8,
    timeout: Duration,
) -> Result<String, ComposeError> {
    if opacity >= 100 {
        return Ok(styled.to_string());
    }
    if opacity == 0 {
        return Ok(original.to_string());
    }

    let original = original.to_string();
    let styled = styled.to_string();
    let blend =
        tokio::task::spawn_blocking(move || blend_blocking(&original, &styled, opacity, quality));

    match tokio::time::timeout(timeout, blend).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(ComposeError::Canceled),
        Err(_) => Err(ComposeError::Timeout(timeout)),
    }
}

fn blend_blocking(
    original: &str,
    styled: &str,
    opacity: u8,
    quality: u8,
) -> Result<String, ComposeError> {
    let mut canvas = decode_image(original)?.to_rgb8();
    let overlay = decode_image(styled)?.to_rgba8();

    let (width, height) = canvas.dimensions();
    tracing::debug!(width, height, opacity, "compositing styled image over original");

    let overlay = if overlay.dimensions() == (width, height) {
        overlay
    } else {
        image::imageops::resize(&overlay, width, height, FilterType::Triangle)
    };

    let opacity = u32::from(opacity);
    for (base, over) in canvas.pixels_mut().zip(overlay.pixels()) {
        // Source-over: the overlay pixel's own alpha scaled by the opacity
        // weight, rounded blend per channel.
        let alpha = u32::from(over[3]) * opacity / 100;
        for channel in 0..3 {
            let blended =
                (u32::from(over[channel]) * alpha + u32::from(base[channel]) * (255 - alpha) + 127)
                    / 255;
            base[channel] = u8::try_from(blended).unwrap_or(u8::MAX);
        }
    }

    encode_jpeg_data_url(&canvas, quality)
}

fn decode_image(input: &str) -> Result<DynamicImage, ComposeError> {
    let url = DataUrl::parse(input).map_err(|err| ComposeError::Input(err.to_string()))?;
    let bytes = url.decode()?;
    Ok(image::load_from_memory(&bytes)?)
}

fn encode_jpeg_data_url(canvas: &RgbImage, quality: u8) -> Result<String, ComposeError> {
    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut jpeg), quality);
    canvas.write_with_encoder(encoder)?;
    Ok(DataUrl::new(mime::IMAGE_JPEG.as_ref(), BASE64.encode(&jpeg)).to_string())
}
