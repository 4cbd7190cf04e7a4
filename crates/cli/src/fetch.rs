//! Source and image fetching over HTTP(S) and the local filesystem.

use deck_core::{Error, FetchedImage, ImageFetcher, Result};
use image::GenericImageView;
use log::debug;
use url::Url;

/// Fetch the source document from an http(s) URL or a local file path.
///
/// Returns the document text and, for remote sources, the base URL used to
/// resolve relative image references.
pub fn fetch_source(input: &str) -> Result<(String, Option<Url>)> {
    if input.starts_with("http://") || input.starts_with("https://") {
        let base = Url::parse(input).map_err(|e| Error::SourceFetch(e.to_string()))?;
        let response = reqwest::blocking::get(base.clone())
            .and_then(|response| response.error_for_status())
            .map_err(|e| Error::SourceFetch(e.to_string()))?;
        let html = response
            .text()
            .map_err(|e| Error::SourceFetch(e.to_string()))?;
        debug!("fetched {} bytes from {base}", html.len());
        return Ok((html, Some(base)));
    }

    let html = std::fs::read_to_string(input)
        .map_err(|e| Error::SourceFetch(format!("{input}: {e}")))?;
    Ok((html, None))
}

/// Image resolution over HTTP(S): resolves references against the page URL,
/// downloads the bytes, and decodes the intrinsic pixel dimensions.
#[derive(Debug, Clone, Default)]
pub struct WebImageFetcher {
    base: Option<Url>,
}

impl WebImageFetcher {
    /// Create a fetcher resolving relative references against `base`.
    pub fn new(base: Option<Url>) -> Self {
        Self { base }
    }

    fn resolve(&self, reference: &str) -> Result<Url> {
        if let Ok(absolute) = Url::parse(reference) {
            return Ok(absolute);
        }
        match &self.base {
            Some(base) => base.join(reference).map_err(|e| Error::ImageFetch {
                url: reference.to_string(),
                reason: e.to_string(),
            }),
            None => Err(Error::ImageFetch {
                url: reference.to_string(),
                reason: "relative reference with no base URL".to_string(),
            }),
        }
    }
}

impl ImageFetcher for WebImageFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedImage> {
        let resolved = self.resolve(url)?;
        let fetch_error = |reason: String| Error::ImageFetch {
            url: url.to_string(),
            reason,
        };

        let response = reqwest::blocking::get(resolved.clone())
            .and_then(|response| response.error_for_status())
            .map_err(|e| fetch_error(e.to_string()))?;
        let bytes = response
            .bytes()
            .map_err(|e| fetch_error(e.to_string()))?
            .to_vec();

        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| fetch_error(format!("decode failed: {e}")))?;
        let (width_px, height_px) = decoded.dimensions();
        debug!("fetched {resolved}: {width_px}x{height_px} px, {} bytes", bytes.len());

        Ok(FetchedImage {
            bytes,
            width_px,
            height_px,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute_reference() {
        let fetcher = WebImageFetcher::new(None);
        let resolved = fetcher.resolve("https://example.com/a.png").unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/a.png");
    }

    #[test]
    fn test_resolve_relative_against_base() {
        let base = Url::parse("https://example.com/articles/page.html").unwrap();
        let fetcher = WebImageFetcher::new(Some(base));
        let resolved = fetcher.resolve("../images/a.png").unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/images/a.png");
    }

    #[test]
    fn test_resolve_relative_without_base_fails() {
        let fetcher = WebImageFetcher::new(None);
        let err = fetcher.resolve("images/a.png").unwrap_err();
        assert!(matches!(err, Error::ImageFetch { .. }));
    }

    #[test]
    fn test_missing_file_is_a_source_fetch_error() {
        let err = fetch_source("/definitely/not/here.html").unwrap_err();
        assert!(matches!(err, Error::SourceFetch(_)));
    }
}
