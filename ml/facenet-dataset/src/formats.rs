//! Image format selection for audit walks.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// File extensions attempted by default, lowercase and without the dot.
pub const DEFAULT_EXTENSIONS: [&str; 4] = ["bmp", "jpg", "jpeg", "png"];

/// Set of file extensions considered decodable images.
///
/// Matching is case-insensitive and ignores a leading dot, so `photo.PNG`
/// matches the `png` entry and `.jpg` can be passed as either `jpg` or
/// `.jpg`.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use facenet_dataset::ImageFormats;
///
/// let formats = ImageFormats::new();
/// assert!(formats.matches(Path::new("photo.png")));
/// assert!(!formats.matches(Path::new("notes.txt")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFormats {
    extensions: Vec<String>,
}

impl Default for ImageFormats {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageFormats {
    /// Creates the default format set ([`DEFAULT_EXTENSIONS`]).
    #[must_use]
    pub fn new() -> Self {
        Self::from_extensions(DEFAULT_EXTENSIONS)
    }

    /// Creates a format set from explicit extensions.
    ///
    /// Entries are normalized to lowercase with any leading dot removed.
    /// Empty entries are discarded.
    #[must_use]
    pub fn from_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { extensions }
    }

    /// Returns true if the path's extension is in the set.
    ///
    /// Paths without an extension never match.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|known| *known == ext)
            })
    }

    /// Returns the normalized extensions.
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Returns true if the set contains no extensions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_matches_common_images() {
        let formats = ImageFormats::new();
        assert!(formats.matches(Path::new("a.bmp")));
        assert!(formats.matches(Path::new("b.jpg")));
        assert!(formats.matches(Path::new("c.jpeg")));
        assert!(formats.matches(Path::new("d.png")));
        assert_eq!(formats.extensions().len(), 4);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let formats = ImageFormats::new();
        assert!(formats.matches(Path::new("SHOUT.PNG")));
        assert!(formats.matches(Path::new("Mixed.Jpg")));
    }

    #[test]
    fn non_images_do_not_match() {
        let formats = ImageFormats::new();
        assert!(!formats.matches(Path::new("notes.txt")));
        assert!(!formats.matches(Path::new("archive.tar.gz")));
        assert!(!formats.matches(Path::new("no_extension")));
    }

    #[test]
    fn custom_extensions() {
        let formats = ImageFormats::from_extensions(["png"]);
        assert!(formats.matches(Path::new("a.png")));
        assert!(!formats.matches(Path::new("b.jpg")));
    }

    #[test]
    fn extensions_are_normalized() {
        let formats = ImageFormats::from_extensions([".PNG", "Jpg", ""]);
        assert_eq!(formats.extensions(), ["png", "jpg"]);
        assert!(formats.matches(Path::new("a.png")));
        assert!(formats.matches(Path::new("b.jpg")));
    }

    #[test]
    fn empty_set() {
        let formats = ImageFormats::from_extensions(Vec::<String>::new());
        assert!(formats.is_empty());
        assert!(!formats.matches(Path::new("a.png")));
    }

    #[test]
    fn formats_serialization() {
        let formats = ImageFormats::new();
        let json = serde_json::to_string(&formats);
        assert!(json.is_ok());

        let parsed: std::result::Result<ImageFormats, _> =
            serde_json::from_str(&json.unwrap_or_default());
        assert_eq!(parsed.ok(), Some(formats));
    }
}
