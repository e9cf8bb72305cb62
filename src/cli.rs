use crate::config::LookConfig;
use crate::credential::ApiKey;
use crate::data_url::DataUrl;
use crate::metrics::LookMetrics;
use crate::service::LookService;
use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

/// `looklab` - photographic look analysis and transfer via Gemini.
#[derive(Parser, Debug)]
#[command(name = "looklab")]
#[command(version = "0.1.0")]
#[command(about = "Analyze and transfer photographic looks.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score contrast, saturation, warmth, uniformity and exposure
    Analyze {
        /// Image file to score
        image: PathBuf,

        /// Gemini API key (falls back to GEMINI_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Print the scores as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply the look of a reference image to a target image
    Transfer {
        /// Reference image carrying the look
        #[arg(short, long)]
        reference: PathBuf,

        /// Target image to restyle
        #[arg(short, long)]
        target: PathBuf,

        /// Blend strength 0-100; 100 keeps the generated image as-is
        #[arg(short, long, default_value = "80")]
        intensity: u8,

        /// Style preset named in the instruction
        #[arg(short, long, default_value = "cinematic")]
        preset: String,

        /// Where to write the styled image
        #[arg(short, long, default_value = "styled.jpg")]
        output: PathBuf,

        /// Gemini API key (falls back to GEMINI_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = LookConfig::load_or_init()?;
    config.apply_env_overrides();
    let service = LookService::new(config);

    match cli.command {
        Commands::Analyze {
            image,
            api_key,
            json,
        } => {
            let key = resolve_api_key(api_key)?;
            let image = read_image(&image)?;
            let metrics = service
                .analyze_look_metrics(&key, &image.to_string())
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                print_metrics(&metrics);
            }
            Ok(())
        }

        Commands::Transfer {
            reference,
            target,
            intensity,
            preset,
            output,
            api_key,
        } => {
            let key = resolve_api_key(api_key)?;
            let reference = read_image(&reference)?;
            let target = read_image(&target)?;

            let styled = service
                .apply_look_transfer(
                    &key,
                    &reference.to_string(),
                    &target.to_string(),
                    intensity,
                    &preset,
                )
                .await?;

            write_image(&output, &styled)?;
            println!("Wrote {}", output.display());
            Ok(())
        }
    }
}

/// `--api-key` wins; `GEMINI_API_KEY` is the fallback. The library itself
/// never reads the environment.
fn resolve_api_key(flag: Option<String>) -> Result<ApiKey> {
    let raw = match flag {
        Some(key) => key,
        None => std::env::var("GEMINI_API_KEY").unwrap_or_default(),
    };
    ApiKey::new(raw).context("No API key found. Pass --api-key or set GEMINI_API_KEY")
}

fn read_image(path: &Path) -> Result<DataUrl> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mime_type = detect_mime(&bytes, path);
    Ok(DataUrl::new(mime_type, BASE64.encode(&bytes)))
}

/// Magic bytes first, file extension next, JPEG as the final default.
fn detect_mime(bytes: &[u8], path: &Path) -> String {
    infer::get(bytes)
        .map(|info| info.mime_type().to_string())
        .or_else(|| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .and_then(mime_from_extension)
        })
        .unwrap_or_else(|| mime::IMAGE_JPEG.as_ref().to_string())
}

fn mime_from_extension(ext: &str) -> Option<String> {
    match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg".into()),
        "png" => Some("image/png".into()),
        "webp" => Some("image/webp".into()),
        _ => None,
    }
}

fn write_image(path: &Path, data_url: &str) -> Result<()> {
    let url = DataUrl::parse(data_url)?;
    let bytes = url
        .decode()
        .context("Styled image payload is not valid base64")?;
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn print_metrics(metrics: &LookMetrics) {
    println!("contrast    {:>3}", metrics.contrast);
    println!("saturation  {:>3}", metrics.saturation);
    println!("warmth      {:>3}", metrics.warmth);
    println!("uniformity  {:>3}", metrics.uniformity);
    println!("exposure    {:>3}", metrics.exposure);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flag_key_is_used() {
        let key = resolve_api_key(Some("flag-key".to_string())).unwrap();
        assert_eq!(format!("{key:?}"), "ApiKey([REDACTED])");
    }

    #[test]
    fn blank_flag_key_is_rejected() {
        assert!(resolve_api_key(Some("   ".to_string())).is_err());
    }

    #[test]
    fn mime_from_extension_covers_raster_types() {
        assert_eq!(mime_from_extension("JPG").as_deref(), Some("image/jpeg"));
        assert_eq!(mime_from_extension("png").as_deref(), Some("image/png"));
        assert_eq!(mime_from_extension("webp").as_deref(), Some("image/webp"));
        assert!(mime_from_extension("txt").is_none());
    }

    #[test]
    fn detect_mime_prefers_magic_bytes_over_extension() {
        let png_magic = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        assert_eq!(
            detect_mime(&png_magic, Path::new("photo.jpg")),
            "image/png"
        );
    }

    #[test]
    fn detect_mime_falls_back_to_extension_then_jpeg() {
        let opaque = [0x00, 0x11, 0x22, 0x33];
        assert_eq!(detect_mime(&opaque, Path::new("shot.webp")), "image/webp");
        assert_eq!(detect_mime(&opaque, Path::new("shot.bin")), "image/jpeg");
    }

    #[test]
    fn read_image_builds_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        let png_magic = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        fs::write(&path, png_magic).unwrap();

        let url = read_image(&path).unwrap();
        assert_eq!(url.mime_type(), "image/png");
        assert_eq!(url.decode().unwrap(), png_magic);
    }

    #[test]
    fn write_image_round_trips_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");

        write_image(&path, "data:image/jpeg;base64,QUJD").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"ABC");
    }

    #[test]
    fn write_image_rejects_non_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        assert!(write_image(&path, "no image").is_err());
    }
}
