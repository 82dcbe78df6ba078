mod merger;
mod muxer;

pub use {
    merger::{MergeRequest, Merger},
    muxer::{FfmpegMuxer, Muxer},
};
