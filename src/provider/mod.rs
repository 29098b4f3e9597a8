//! Adapters to the external services the radio is built on:
//! the music catalog (search, suggestions, watch context, lyrics)
//! and the audio extractor (stream urls, song metadata).

pub mod cache;
pub mod catalog;
pub mod error;
pub mod extractor;
pub mod innertube;

#[cfg(test)]
pub mod fake;
