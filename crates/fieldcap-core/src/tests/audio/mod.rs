mod clip;
mod engine;
mod resampler;
