mod geometry;
mod renderer;
mod view;

pub use renderer::{MapLayers, MapRenderer};
pub use view::View;
