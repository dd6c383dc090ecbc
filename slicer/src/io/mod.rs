//! # Model I/O
//!
//! Loading meshes from disk. Only STL (binary and ASCII) is in scope; the
//! teacher's OBJ/3MF loader stubs had no spec counterpart and were dropped
//! (see `DESIGN.md`).

pub mod stl;

pub use stl::load;
