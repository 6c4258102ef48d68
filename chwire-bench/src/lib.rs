//! Benchmark-only crate; see `benches/codec_benchmark.rs`.
