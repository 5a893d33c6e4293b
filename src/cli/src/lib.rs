//! Image Retag CLI - rename a layer inside a `docker save` tarball.

pub mod commands;
