//! # Bundle Sources
//!
//! Where a plugin's entry document comes from.
//!
//! ```text
//! "https://host/x.html"     ──► Remote  (one GET, no retry)
//! "/public/plugins/x.html"  ──► Local   <public_dir>/plugins/x.html
//! "/opt/bundles/x.html"     ──► Local   as given
//! ""                        ──► ValidationError
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use till_core::validation::ValidationResult;
use till_core::ValidationError;

const PUBLIC_PREFIX: &str = "/public/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleSource {
    Remote(String),
    Local(PathBuf),
}

impl BundleSource {
    /// Classifies a raw source string. `/public/...` resolves under `public_dir`.
    pub fn parse(raw: &str, public_dir: &Path) -> ValidationResult<Self> {
        let raw = raw.trim();

        if raw.is_empty() {
            return Err(ValidationError::required("bundleUrl"));
        }

        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Ok(BundleSource::Remote(raw.to_string()));
        }

        match raw.strip_prefix(PUBLIC_PREFIX) {
            Some(rest) if !rest.is_empty() => Ok(BundleSource::Local(public_dir.join(rest))),
            Some(_) => Err(ValidationError::InvalidFormat {
                field: "bundleUrl".to_string(),
                reason: "names a directory, not a document".to_string(),
            }),
            None => Ok(BundleSource::Local(PathBuf::from(raw))),
        }
    }
}

impl fmt::Display for BundleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleSource::Remote(url) => write!(f, "{}", url),
            BundleSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sources() {
        let public = Path::new("web/public");

        assert_eq!(
            BundleSource::parse(" https://cdn.example/faq.html ", public).unwrap(),
            BundleSource::Remote("https://cdn.example/faq.html".to_string())
        );
        assert_eq!(
            BundleSource::parse("/public/plugins/faq.html", public).unwrap(),
            BundleSource::Local(PathBuf::from("web/public/plugins/faq.html"))
        );
        assert_eq!(
            BundleSource::parse("/srv/bundles/faq.html", public).unwrap(),
            BundleSource::Local(PathBuf::from("/srv/bundles/faq.html"))
        );
    }

    #[test]
    fn test_parse_rejects_blank_and_bare_public() {
        let public = Path::new("web/public");
        assert_eq!(
            BundleSource::parse("   ", public),
            Err(ValidationError::required("bundleUrl"))
        );
        assert!(BundleSource::parse("/public/", public).is_err());
    }
}
