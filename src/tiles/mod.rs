//! Tile specifications and the shared-transform tile collection.

pub(crate) mod collection;
pub(crate) mod tile_spec;
