//! Fonts and images an export has to wait for.
//!
//! Every wait is bounded by the exporter's asset timeout. A font that
//! cannot be found or loaded in time falls back to the monospace stack; an
//! image that cannot be fetched or decoded is left out of the frame. Both
//! are reported as [`ResourceError`] warnings, never as failures.

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::ImageFormat;
use resvg::usvg::fontdb;
use tokio::sync::OnceCell;

use crate::error::ResourceError;

/// Families tried, in order, when the requested one is unavailable.
pub const FALLBACK_MONOSPACE: &[&str] = &[
    "JetBrains Mono",
    "Fira Code",
    "SF Mono",
    "Menlo",
    "Consolas",
    "DejaVu Sans Mono",
    "Liberation Mono",
    "Courier New",
];

const FALLBACK_SANS: &[&str] = &["Inter", "Segoe UI", "Helvetica Neue", "Helvetica", "Arial", "DejaVu Sans", "Liberation Sans"];

const GENERIC_FAMILIES: &[&str] = &["monospace", "sans-serif", "serif", "cursive", "fantasy", "system-ui"];

/// An image ready to embed: a `data:` URI plus its pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, Arc<EmbeddedImage>>,
    order: VecDeque<String>,
}

/// Remote images keyed by their exact URL.
///
/// A different URL is always a miss, so a newly supplied image can never
/// be shadowed by an older one. Oldest entries are evicted first.
#[derive(Debug, Default)]
pub struct ImageCache {
    inner: Mutex<CacheInner>,
    max_size: usize,
}

impl ImageCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            max_size,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn get(&self, url: &str) -> Option<Arc<EmbeddedImage>> {
        self.lock().entries.get(url).cloned()
    }

    pub fn insert(&self, url: String, image: Arc<EmbeddedImage>) {
        if self.max_size == 0 {
            return;
        }
        let mut guard = self.lock();
        if guard.entries.insert(url.clone(), image).is_none() {
            guard.order.push_back(url);
        }
        while guard.entries.len() > self.max_size {
            let Some(oldest) = guard.order.pop_front() else {
                break;
            };
            guard.entries.remove(&oldest);
        }
    }

    pub fn clear(&self) {
        let mut guard = self.lock();
        guard.entries.clear();
        guard.order.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fonts resolved for one export.
#[derive(Debug, Clone)]
pub struct PreparedFonts {
    pub database: Arc<fontdb::Database>,
    /// CSS font-family list for code text
    pub code_stack: String,
    pub warnings: Vec<ResourceError>,
}

/// Lazily loaded, shared-read font database.
#[derive(Debug)]
pub struct FontLibrary {
    database: OnceCell<Arc<fontdb::Database>>,
    system_fonts: bool,
    font_dirs: Vec<PathBuf>,
}

impl FontLibrary {
    pub fn new(system_fonts: bool, font_dirs: Vec<PathBuf>) -> Self {
        Self {
            database: OnceCell::new(),
            system_fonts,
            font_dirs,
        }
    }

    /// Load the database once; later calls reuse it.
    async fn database(&self) -> Arc<fontdb::Database> {
        self.database
            .get_or_init(|| async {
                let system_fonts = self.system_fonts;
                let dirs = self.font_dirs.clone();
                let loaded = tokio::task::spawn_blocking(move || load_database(system_fonts, &dirs)).await;
                match loaded {
                    Ok(db) => Arc::new(db),
                    Err(err) => {
                        tracing::warn!(%err, "font loading task failed");
                        Arc::new(fontdb::Database::new())
                    }
                }
            })
            .await
            .clone()
    }

    /// Wait (bounded) for fonts and decide the code font stack.
    pub async fn prepare(&self, family: &str, timeout: Duration) -> PreparedFonts {
        let _scope = crate::perf::scope("export.fonts");
        let loaded = tokio::time::timeout(timeout, self.database()).await.ok();
        resolve_fonts(loaded, family, timeout)
    }
}

/// Pick the code font stack from a loaded database, or from nothing when
/// loading did not finish within `timeout`.
fn resolve_fonts(loaded: Option<Arc<fontdb::Database>>, family: &str, timeout: Duration) -> PreparedFonts {
    let mut warnings = Vec::new();
    let database = loaded.unwrap_or_else(|| {
        let err = ResourceError::FontTimeout {
            timeout_ms: duration_ms(timeout),
        };
        tracing::warn!(%err, "font loading timed out");
        warnings.push(err);
        Arc::new(fontdb::Database::new())
    });

    let family = family.trim();
    let generic = GENERIC_FAMILIES.iter().any(|g| g.eq_ignore_ascii_case(family));
    let requested = if family.is_empty() || generic {
        None
    } else if has_family(&database, family) {
        Some(family)
    } else {
        if warnings.is_empty() {
            let err = ResourceError::FontUnavailable {
                family: family.to_string(),
            };
            tracing::warn!(%err, "font fallback");
            warnings.push(err);
        }
        None
    };
    crate::perf::log_event(
        "export.fonts",
        format!("family={family} resolved={}", requested.is_some()),
    );

    PreparedFonts {
        database,
        code_stack: font_stack(requested),
        warnings,
    }
}

fn load_database(system_fonts: bool, dirs: &[PathBuf]) -> fontdb::Database {
    let _scope = crate::perf::scope("export.fonts.load");
    let mut db = fontdb::Database::new();
    if system_fonts {
        db.load_system_fonts();
    }
    for dir in dirs {
        db.load_fonts_dir(dir);
    }
    if let Some(mono) = FALLBACK_MONOSPACE.iter().find(|name| has_family(&db, name)) {
        db.set_monospace_family(*mono);
    }
    if let Some(sans) = FALLBACK_SANS.iter().find(|name| has_family(&db, name)) {
        db.set_sans_serif_family(*sans);
    }
    tracing::debug!(faces = db.len(), "font database loaded");
    db
}

pub fn has_family(db: &fontdb::Database, family: &str) -> bool {
    db.faces()
        .any(|face| face.families.iter().any(|(name, _)| name.eq_ignore_ascii_case(family)))
}

/// CSS font-family list: the requested family (if usable) ahead of the
/// monospace fallbacks.
pub fn font_stack(requested: Option<&str>) -> String {
    let quote = |name: &str| format!("'{}'", name.replace(['\'', '"'], ""));
    requested
        .into_iter()
        .chain(FALLBACK_MONOSPACE.iter().copied())
        .map(quote)
        .chain(std::iter::once("monospace".to_string()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Fetches and decodes images referenced by a frame.
#[derive(Debug)]
pub struct ImageLoader {
    cache: ImageCache,
    base_dir: Option<PathBuf>,
    #[cfg(feature = "remote")]
    client: reqwest::Client,
}

impl ImageLoader {
    pub fn new(cache_size: usize, base_dir: Option<PathBuf>) -> Self {
        Self {
            cache: ImageCache::new(cache_size),
            base_dir,
            #[cfg(feature = "remote")]
            client: reqwest::Client::new(),
        }
    }

    pub const fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Load one image within `timeout`.
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceError`] describing why the image is unavailable.
    pub async fn load(&self, url: &str, timeout: Duration) -> Result<Arc<EmbeddedImage>, ResourceError> {
        if let Some(hit) = self.cache.get(url) {
            return Ok(hit);
        }
        let image = tokio::time::timeout(timeout, self.fetch_and_decode(url))
            .await
            .map_err(|_| ResourceError::ImageTimeout {
                url: url.to_string(),
                timeout_ms: duration_ms(timeout),
            })??;
        let image = Arc::new(image);
        if is_remote(url) {
            self.cache.insert(url.to_string(), Arc::clone(&image));
        }
        Ok(image)
    }

    async fn fetch_and_decode(&self, url: &str) -> Result<EmbeddedImage, ResourceError> {
        let bytes = self.fetch(url).await?;
        decode(url, &bytes)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ResourceError> {
        let fetch_error = |reason: String| ResourceError::ImageFetch {
            url: url.to_string(),
            reason,
        };
        if let Some(rest) = url.strip_prefix("data:") {
            return decode_data_uri(rest).map_err(fetch_error);
        }
        if is_remote(url) {
            return self.fetch_remote(url).await;
        }
        let path = self.resolve_path(url.strip_prefix("file://").unwrap_or(url));
        tokio::fs::read(&path).await.map_err(|err| fetch_error(err.to_string()))
    }

    #[cfg(feature = "remote")]
    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, ResourceError> {
        let fetch_error = |reason: String| ResourceError::ImageFetch {
            url: url.to_string(),
            reason,
        };
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| fetch_error(err.to_string()))?;
        let bytes = response.bytes().await.map_err(|err| fetch_error(err.to_string()))?;
        Ok(bytes.to_vec())
    }

    #[cfg(not(feature = "remote"))]
    #[allow(clippy::unused_async)]
    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, ResourceError> {
        Err(ResourceError::ImageFetch {
            url: url.to_string(),
            reason: "built without the `remote` feature".to_string(),
        })
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn is_remote(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Payload of a `data:` URI (the part after `data:`).
fn decode_data_uri(rest: &str) -> Result<Vec<u8>, String> {
    let (meta, payload) = rest.split_once(',').ok_or("missing `,` in data URI")?;
    if meta.ends_with(";base64") {
        BASE64
            .decode(payload.trim())
            .map_err(|err| err.to_string())
    } else {
        Ok(percent_decode(payload))
    }
}

fn percent_decode(text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && let Some(value) = text
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        {
            out.push(value);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

/// Validate image bytes and build an embeddable data URI. Formats resvg
/// cannot read are re-encoded as PNG.
fn decode(url: &str, bytes: &[u8]) -> Result<EmbeddedImage, ResourceError> {
    let decode_error = |reason: String| ResourceError::ImageDecode {
        url: url.to_string(),
        reason,
    };
    if looks_like_svg(bytes) {
        return Ok(EmbeddedImage {
            data_uri: format!("data:image/svg+xml;base64,{}", BASE64.encode(bytes)),
            width: 0,
            height: 0,
        });
    }
    let format = image::guess_format(bytes).map_err(|err| decode_error(err.to_string()))?;
    let decoded = image::load_from_memory_with_format(bytes, format).map_err(|err| decode_error(err.to_string()))?;
    let (width, height) = (decoded.width(), decoded.height());
    let (mime, payload) = match format {
        ImageFormat::Png => ("image/png", bytes.to_vec()),
        ImageFormat::Jpeg => ("image/jpeg", bytes.to_vec()),
        ImageFormat::Gif => ("image/gif", bytes.to_vec()),
        _ => {
            let mut png = Vec::new();
            decoded
                .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
                .map_err(|err| decode_error(err.to_string()))?;
            ("image/png", png)
        }
    };
    Ok(EmbeddedImage {
        data_uri: format!("data:{mime};base64,{}", BASE64.encode(payload)),
        width,
        height,
    })
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}
