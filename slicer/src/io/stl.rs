//! ## STL Loader
//!
//! Reads ASCII or binary STL (`stl_io` auto-detects the variant) into a
//! [`plan_types::Mesh`]. The file is memory-mapped rather than read into a
//! `Vec<u8>` up front, following the teacher's `memmap2` usage in its own
//! mesh loader skeleton.
//!
//! Non-finite vertices are not filtered here; `slice::slice_mesh` already
//! drops them facet-by-facet with a warning, and duplicating that check at
//! load time would just scan the mesh twice.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use memmap2::Mmap;
use plan_types::{Facet, Mesh, Vertex};

use crate::error::SlicerError;

/// Loads a mesh from an STL file at `path`. The mesh's name is the file
/// stem (e.g. `bracket.stl` becomes `"bracket"`).
pub fn load(path: impl AsRef<Path>) -> Result<Mesh, SlicerError> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let file = File::open(path).map_err(|e| SlicerError::Io(path.display().to_string(), e.to_string()))?;

    // SAFETY: the file is not expected to be mutated by another process
    // while loading; `memmap2::Mmap::map` carries the usual caveat that
    // this cannot be fully enforced by the OS.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| SlicerError::Io(path.display().to_string(), e.to_string()))?;

    let mut cursor = Cursor::new(&mmap[..]);
    let indexed = stl_io::read_stl(&mut cursor)
        .map_err(|e| SlicerError::Io(path.display().to_string(), e.to_string()))?;

    let facets = indexed
        .faces
        .iter()
        .map(|tri| {
            let v = |i: usize| {
                let raw = indexed.vertices[tri.vertices[i]];
                Vertex::new(raw[0] as f64, raw[1] as f64, raw[2] as f64)
            };
            Facet::new(v(0), v(1), v(2))
        })
        .collect();

    Ok(Mesh::new(name, facets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_ascii_triangle(path: &Path) {
        let mut f = File::create(path).unwrap();
        writeln!(f, "solid test").unwrap();
        writeln!(f, "facet normal 0 0 1").unwrap();
        writeln!(f, "outer loop").unwrap();
        writeln!(f, "vertex 0 0 0").unwrap();
        writeln!(f, "vertex 1 0 0").unwrap();
        writeln!(f, "vertex 0 1 0").unwrap();
        writeln!(f, "endloop").unwrap();
        writeln!(f, "endfacet").unwrap();
        writeln!(f, "endsolid test").unwrap();
    }

    #[test]
    fn loads_single_facet_ascii_stl() {
        let dir = std::env::temp_dir();
        let path = dir.join("slicer_stl_loader_test.stl");
        write_ascii_triangle(&path);

        let mesh = load(&path).unwrap();
        assert_eq!(mesh.facet_count(), 1);
        assert_eq!(mesh.name, "slicer_stl_loader_test");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load("/nonexistent/path/does-not-exist.stl").unwrap_err();
        assert!(matches!(err, SlicerError::Io(_, _)));
    }
}
