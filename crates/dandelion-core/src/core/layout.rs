use std::path::{Path, PathBuf};

/// A location under the pipeline's output root, owned by exactly one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Directory(PathBuf),
    File(PathBuf),
}

impl Location {
    pub fn dir(relative: impl Into<PathBuf>) -> Self {
        Location::Directory(relative.into())
    }

    pub fn file(relative: impl Into<PathBuf>) -> Self {
        Location::File(relative.into())
    }

    pub fn relative(&self) -> &Path {
        match self {
            Location::Directory(p) | Location::File(p) => p,
        }
    }
}

/// Anchors relative [`Location`]s at the pipeline's output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, location: &Location) -> PathBuf {
        let relative = location.relative();
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.root.join(relative)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_locations_are_anchored_at_root() {
        let layout = OutputLayout::new("/data/run");
        assert_eq!(
            layout.resolve(&Location::dir("1_gsm")),
            PathBuf::from("/data/run/1_gsm")
        );
        assert_eq!(
            layout.resolve(&Location::file("xtb.h5")),
            PathBuf::from("/data/run/xtb.h5")
        );
    }

    #[test]
    fn absolute_locations_are_kept() {
        let layout = OutputLayout::new("/data/run");
        assert_eq!(
            layout.resolve(&Location::dir("/scratch/neb")),
            PathBuf::from("/scratch/neb")
        );
    }
}
