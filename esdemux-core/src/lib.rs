//! # esdemux-core
//!
//! Container-independent building blocks for the esdemux demuxers.
//!
//! This crate provides the pieces shared by every container front end:
//! - Error handling types
//! - MSB-first bit reading/writing, used for codec configuration records
//!   and synthesized elementary-stream headers
//! - The [`Codec`] enumeration of elementary streams a demuxer can produce
//! - Annex-B start-code helpers

pub mod annexb;
pub mod bitstream;
pub mod error;
pub mod format;

pub use bitstream::{BitReader, BitWriter};
pub use error::{BitstreamError, ContainerError, Error, Result};
pub use format::{Codec, MediaKind};
