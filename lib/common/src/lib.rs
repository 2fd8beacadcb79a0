//! Macros shared between the crates of the `rtgeom` workspace.

pub mod macros;
