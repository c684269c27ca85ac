//! DSP stages — pure Rust so the browser build (WASM) and the CLI produce
//! identical output.

pub mod compressor;
pub mod filter;
pub mod formant;
pub mod graph;
pub mod noise;
pub mod spectrum;
pub mod tuner;
