pub mod renderer;
pub mod summary;

pub use renderer::{render, Renderer};
pub use summary::SummaryFormatter;
