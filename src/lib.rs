//! Batch asset-pipeline utilities: cubemap cross packing/unpacking and
//! sprite animation round-trips between PNG frame sequences and
//! alpha-capable WebM videos, with flood-fill background keying.
#![forbid(unsafe_code)]

pub mod config;
pub mod cubemap;
pub mod encode_ffmpeg;
pub mod error;
pub mod extract_ffmpeg;
pub mod frames;
pub mod keying;

pub use config::PipelineConfig;
pub use cubemap::FaceTag;
pub use encode_ffmpeg::{BatchStats, WebmEncodeConfig};
pub use error::{SpritemillError, SpritemillResult};
pub use extract_ffmpeg::ExtractStats;
pub use frames::AnimKey;
pub use keying::key_out_background;
