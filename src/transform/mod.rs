//! Coordinate transforms: the serializable spec model, resolved leaf transforms, ordered chains,
//! and scale estimation over a chain.

pub(crate) mod chain;
pub(crate) mod coordinate;
pub(crate) mod fit;
pub(crate) mod spec;
