use std::path::PathBuf;

use anyhow::{ensure, Context, Result};

/// Application configuration loaded from environment variables.
/// Built once at startup and handed to the components that need it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential for the generative model. Left empty when unset; the
    /// model API rejects the first call in that case.
    pub google_api_key: String,
    pub gemini_api_base: String,
    pub bind_addr: String,
    pub port: u16,
    /// The only front-end origin allowed through CORS.
    pub allowed_origin: String,
    /// Directory containing the pdfium shared library. `None` binds the system copy.
    pub pdfium_lib_path: Option<PathBuf>,
    /// Target width of the rendered first page.
    pub render_width_px: i32,
    /// Upper bound on the rendered height; tall pages scale down to fit.
    pub render_max_height_px: i32,
    pub max_upload_bytes: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            google_api_key: or_default("GOOGLE_API_KEY", ""),
            gemini_api_base: or_default(
                "GEMINI_API_BASE",
                "https://generativelanguage.googleapis.com/v1beta",
            )
            .trim_end_matches('/')
            .to_string(),
            bind_addr: or_default("BIND_ADDR", "0.0.0.0"),
            port: or_default("PORT", "5000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            allowed_origin: or_default("ALLOWED_ORIGIN", "http://localhost:5173"),
            pdfium_lib_path: lookup("PDFIUM_LIB_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            render_width_px: parse_pixels(
                "RENDER_WIDTH_PX",
                &or_default("RENDER_WIDTH_PX", "1700"),
            )?,
            render_max_height_px: parse_pixels(
                "RENDER_MAX_HEIGHT_PX",
                &or_default("RENDER_MAX_HEIGHT_PX", "2200"),
            )?,
            max_upload_bytes: or_default("MAX_UPLOAD_BYTES", "20971520")
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            rust_log: or_default("RUST_LOG", "info"),
        })
    }
}

/// Pixel sizes are handed to pdfium as `i32` and must be at least 1.
fn parse_pixels(key: &str, value: &str) -> Result<i32> {
    let px = value
        .parse::<i32>()
        .with_context(|| format!("{key} must be a positive integer no larger than {}", i32::MAX))?;
    ensure!(px > 0, "{key} must be a positive integer, got {px}");
    Ok(px)
}
