use std::path::PathBuf;

use sdiff_source::Locator;

use crate::error::{SessionError, SessionResult};

/// Where to write the visualization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VisualizationTarget {
    /// Derive the file name from both sides' metadata, inside the
    /// configured output directory.
    Derived,
    Path(PathBuf),
}

/// One diff run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffSessionRequest {
    pub source1: String,
    pub source2: String,
    pub base_url: Option<String>,
    pub absolute: bool,
    pub output_path: Option<PathBuf>,
    pub visualization: Option<VisualizationTarget>,
}

impl DiffSessionRequest {
    pub fn new(source1: impl Into<String>, source2: impl Into<String>) -> Self {
        Self {
            source1: source1.into(),
            source2: source2.into(),
            base_url: None,
            absolute: false,
            output_path: None,
            visualization: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn absolute(mut self, absolute: bool) -> Self {
        self.absolute = absolute;
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn with_visualization(mut self, target: VisualizationTarget) -> Self {
        self.visualization = Some(target);
        self
    }

    /// The base URL that applies to relative locators, if any.
    pub fn effective_base_url(&self) -> Option<&str> {
        if self.absolute {
            None
        } else {
            self.base_url.as_deref()
        }
    }

    /// Reject requests that cannot be resolved, before any network call.
    ///
    /// Without an applicable base URL every source must be an existing file
    /// or an absolute URL.
    pub fn validate(&self) -> SessionResult<()> {
        if let Some(base) = self.effective_base_url() {
            if !Locator::is_absolute_url(base) {
                return Err(SessionError::Validation(format!(
                    "base URL {base:?} is not an absolute URL"
                )));
            }
            return Ok(());
        }

        for source in [&self.source1, &self.source2] {
            if !Locator::classify(source).is_file() && !Locator::is_absolute_url(source) {
                return Err(SessionError::Validation(format!(
                    "{source:?} is neither an existing file nor an absolute URL; \
                     give absolute URLs or a base URL"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn relative_sources_need_a_base_url() {
        let request = DiffSessionRequest::new("/2.29", "/dev");
        assert!(matches!(request.validate(), Err(SessionError::Validation(_))));

        let request = request.with_base_url("https://play.example.org");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn absolute_mode_ignores_the_base_url() {
        let request = DiffSessionRequest::new("/2.29", "https://b.example.org")
            .with_base_url("https://play.example.org")
            .absolute(true);
        assert_eq!(request.effective_base_url(), None);
        assert!(matches!(request.validate(), Err(SessionError::Validation(_))));
    }

    #[test]
    fn files_and_absolute_urls_pass() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{}").unwrap();
        let request = DiffSessionRequest::new(
            file.path().to_str().unwrap(),
            "https://play.example.org/2.30",
        );
        assert!(request.validate().is_ok());
    }

    #[test]
    fn second_source_is_checked_too() {
        let request = DiffSessionRequest::new("https://a.example.org", "relative/path");
        assert!(matches!(request.validate(), Err(SessionError::Validation(msg)) if msg.contains("relative/path")));
    }

    #[test]
    fn relative_base_url_is_rejected() {
        let request = DiffSessionRequest::new("/2.29", "/dev").with_base_url("play.example.org");
        assert!(matches!(request.validate(), Err(SessionError::Validation(_))));
    }
}
