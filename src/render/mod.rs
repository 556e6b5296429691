//! Render orchestration: level selection, per-tile compositing, and the canvas painter.

pub(crate) mod bounds;
pub(crate) mod canvas;
pub(crate) mod compose;
pub(crate) mod level;
pub(crate) mod pipeline;
pub(crate) mod request;
