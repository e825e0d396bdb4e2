//! Core markup scanning primitives
//!
//! Fundamental building blocks for the engine:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Tokenizer: pull parser emitting line-tagged structural events
//! - Entities: predefined entity decoding/escaping with Cow
//! - Attributes: tolerant attribute parsing with quoting information
//! - Encoding: BOM detection and declared-encoding extraction

pub mod attributes;
pub mod encoding;
pub mod entities;
pub mod scanner;
pub mod tokenizer;
