use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

pub const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// The opaque encoded raster a completed signature is reported as. An empty
/// string means "no signature".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureImage(String);

impl SignatureImage {
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn from_data_url(url: String) -> Self {
        Self(url)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode back to raw PNG bytes, e.g. for attaching to outgoing mail.
    pub fn png_bytes(&self) -> Result<Vec<u8>> {
        decode_data_url(&self.0)
    }
}

/// Encode an RGBA buffer as a PNG.
pub fn encode_png(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let img = image::RgbaImage::from_raw(width, height, rgba.to_vec())
        .ok_or_else(|| anyhow!("rgba buffer does not match {width}x{height}"))?;
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageOutputFormat::Png,
    )
    .context("encode signature bitmap as png")?;
    Ok(bytes)
}

pub fn to_data_url(png: &[u8]) -> String {
    format!("{DATA_URL_PREFIX}{}", general_purpose::STANDARD.encode(png))
}

pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let encoded = url
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or_else(|| anyhow!("not a png data url"))?;
    general_purpose::STANDARD
        .decode(encoded)
        .context("decode signature data url payload")
}
