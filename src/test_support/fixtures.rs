//! Test fixtures for SDK trees.

use std::fs;
use std::path::{Path, PathBuf};

/// Builds a directory tree shaped like an unpacked VTK wheel SDK.
///
/// Each named component gets a `<root>/<name>/headers/cmake` directory with
/// a `vtk-config.cmake` file, next to a `lib` directory that should never
/// be matched.
#[derive(Debug, Clone)]
pub struct SdkTreeFixture {
    root: PathBuf,
    cmake_dirs: Vec<String>,
}

impl SdkTreeFixture {
    pub fn new(root: impl AsRef<Path>) -> Self {
        SdkTreeFixture {
            root: root.as_ref().to_path_buf(),
            cmake_dirs: Vec::new(),
        }
    }

    /// Add a component holding a `headers/cmake` directory.
    pub fn with_cmake_dir(mut self, component: impl Into<String>) -> Self {
        self.cmake_dirs.push(component.into());
        self
    }

    /// Write the tree and return the created CMake directories.
    pub fn create(&self) -> Vec<PathBuf> {
        fs::create_dir_all(self.root.join("lib")).unwrap();
        fs::write(self.root.join("lib").join("README.txt"), "libraries").unwrap();

        self.cmake_dirs
            .iter()
            .map(|component| {
                let dir = self.root.join(component).join("headers").join("cmake");
                fs::create_dir_all(&dir).unwrap();
                fs::write(dir.join("vtk-config.cmake"), "# vtk\n").unwrap();
                dir
            })
            .collect()
    }
}
