//! Rendering state shared by the content-stream interpreter.

pub mod graphics_state;
