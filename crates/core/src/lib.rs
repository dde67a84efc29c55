pub mod audio;
pub mod dubbing;
pub mod pipeline;
pub mod shared;
pub mod video;
