mod controller;
mod device;
mod merge_queue;
mod segmenter;

pub use {
    controller::{CaptureLayout, SegmentationConfig, VideoSegmentationController},
    device::{CaptureDevice, Resolution, SharedCaptureDevice, Transform},
};
