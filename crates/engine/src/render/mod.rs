mod canvas;
mod compositor;

pub use canvas::Canvas;
pub use compositor::Compositor;
