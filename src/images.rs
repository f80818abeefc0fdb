//! Image loading – best-effort fetch and decode of cover, banner and portrait
//! artwork.
//!
//! A failed image never aborts an export: [`ImageLoader::load`] logs a
//! warning and returns `None`, and the painter draws its fallback instead.
//! There is a single attempt per call and no retry.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};

/// Default per-request timeout for remote images.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Refuse to buffer remote images larger than this.
const MAX_IMAGE_BYTES: u64 = 32 * 1024 * 1024;

/// Encoded image bytes together with their pixel dimensions.
#[derive(Clone, PartialEq)]
pub struct LoadedImage {
    pub bytes: Vec<u8>,
    pub px_width: u32,
    pub px_height: u32,
}

impl LoadedImage {
    /// Decode `bytes` with the `image` crate to validate them and read the
    /// intrinsic size.
    pub fn decode(bytes: Vec<u8>) -> Result<Self, String> {
        let img = ::image::load_from_memory(&bytes).map_err(|e| format!("decode error: {e}"))?;
        let (px_width, px_height) = (img.width(), img.height());
        if px_width == 0 || px_height == 0 {
            return Err("image has zero size".to_string());
        }
        Ok(Self {
            bytes,
            px_width,
            px_height,
        })
    }

    /// Width / height.
    pub fn aspect_ratio(&self) -> f32 {
        self.px_width as f32 / self.px_height as f32
    }
}

impl fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedImage")
            .field("bytes", &self.bytes.len())
            .field("px_width", &self.px_width)
            .field("px_height", &self.px_height)
            .finish()
    }
}

/// Source of raster artwork.
///
/// Implementors only provide [`fetch`](ImageLoader::fetch); the provided
/// [`load`](ImageLoader::load) handles absent URLs, decoding and the
/// fail-to-absence policy.
pub trait ImageLoader {
    /// Retrieve the raw encoded bytes behind `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, String>;

    /// Fetch and decode `url`. Empty or missing URLs return `None` without
    /// calling [`fetch`](ImageLoader::fetch).
    fn load(&self, url: Option<&str>) -> Option<LoadedImage> {
        let url = url.map(str::trim).filter(|u| !u.is_empty())?;
        let result = self.fetch(url).and_then(LoadedImage::decode);
        match result {
            Ok(img) => {
                log::debug!(
                    "Loaded image {} ({}x{} px)",
                    preview(url),
                    img.px_width,
                    img.px_height
                );
                Some(img)
            }
            Err(e) => {
                log::warn!("Skipping image {} — {e}", preview(url));
                None
            }
        }
    }
}

/// Loads `data:` URIs, `http(s)://` URLs and local file paths.
pub struct HttpImageLoader {
    agent: ureq::Agent,
}

impl HttpImageLoader {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// A hanging request gives up after `timeout` and the image is treated
    /// as absent.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, String> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| format!("HTTP request failed: {e}"))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_IMAGE_BYTES)
            .read_to_end(&mut bytes)
            .map_err(|e| format!("Failed to read response: {e}"))?;
        Ok(bytes)
    }
}

impl Default for HttpImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader for HttpImageLoader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, String> {
        if url.starts_with("data:") {
            parse_data_uri(url)
        } else if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch_remote(url)
        } else {
            let path = url.strip_prefix("file://").unwrap_or(url);
            std::fs::read(path).map_err(|e| format!("Failed to read file: {e}"))
        }
    }
}

/// A loader that never produces an image; every section uses its fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImages;

impl ImageLoader for NoImages {
    fn fetch(&self, _url: &str) -> Result<Vec<u8>, String> {
        Err("image loading disabled".to_string())
    }
}

/// Serves bytes that were fetched ahead of time, keyed by URL.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageLoader {
    images: HashMap<String, Vec<u8>>,
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.images.insert(url.into(), bytes);
    }

    pub fn with(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(url, bytes);
        self
    }
}

impl ImageLoader for MemoryImageLoader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, String> {
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| "no bytes registered for this URL".to_string())
    }
}

/// Parse a `data:<mime>;base64,<data>` URI and return the raw decoded bytes.
pub fn parse_data_uri(src: &str) -> Result<Vec<u8>, String> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URI".to_string())?;
    let comma_pos = rest.find(',').ok_or_else(|| {
        "Invalid data URI: missing `,` separator between header and data".to_string()
    })?;
    let header = &rest[..comma_pos];
    if !header.contains(";base64") {
        return Err("Only base64-encoded data URIs are supported".to_string());
    }
    BASE64_STD
        .decode(rest[comma_pos + 1..].trim())
        .map_err(|e| format!("Base64 decode error: {e}"))
}

/// Shorten data URIs for log output.
fn preview(url: &str) -> String {
    if url.chars().count() > 80 {
        let head: String = url.chars().take(80).collect();
        format!("{head:?}…")
    } else {
        format!("{url:?}")
    }
}
