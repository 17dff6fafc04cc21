//! Virtual path handling
//!
//! Canonicalizes paths over the flat blob namespace, strips container names
//! typed into path fields, and joins/splits path segments.

mod normalize;
mod resolve;

pub use normalize::{
    Breadcrumb, SEPARATOR, Stripped, VirtualPath, breadcrumbs, join, normalize,
    strip_container_prefix,
};
pub use resolve::{parent, resolve};
