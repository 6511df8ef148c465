//! Frame rendering for Langton's ant: paints simulation state into RGBA images
//! and encodes them as PNG files or H.264/MP4 video.

pub mod color;
pub mod renderer;
pub mod video;

pub use color::{parse_color, Colors};
pub use renderer::{canvas_size, even_size, Renderer};
pub use video::{rgb_to_yuv420, VideoWriter, ENCODE_BATCH_SIZE};
