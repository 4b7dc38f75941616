//! A read-only accessor for MBTiles (SQLite) tile archives.
//!
//! An MBTiles archive bundles a tile pyramid and descriptive metadata in a
//! single SQLite file. This crate opens such a file, validates that the
//! required `tiles` and `metadata` tables exist, sniffs the tile format from
//! the magic bytes of one sampled payload, and then serves tile and metadata
//! reads:
//!
//! - [`MBTilesReader`] — opens the archive and exposes `read_tile`,
//!   `read_metadata` and the cached `format`.
//! - [`TileFormat`] — the closed set of recognized tile encodings.
//! - [`Metadata`] / [`MetadataValue`] — the coerced metadata document with
//!   per-key typing (integers, float lists, flat-merged JSON, plain text).
//!
//! There is no write path: the archive is assumed immutable for the
//! accessor's lifetime.

mod error;
mod metadata;
mod reader;
mod tile_format;

pub use error::{FormatError, MetadataError, OpenError, SchemaError, TileError};
pub use metadata::{Metadata, MetadataValue};
pub use reader::MBTilesReader;
pub use tile_format::{SNIFF_LEN, TileFormat};
