//! This module defines the `TileFormat` enum, representing the tile encodings
//! an MBTiles archive can hold, and the magic-byte sniffer that classifies a
//! tile payload prefix into one of them.
//!
//! The format is a property of the whole archive, not of an individual tile:
//! it is detected once from a single sampled row and assumed to hold for all
//! tiles.
//!
//! # Examples
//!
//! ```rust
//! use mbtiles_reader::TileFormat;
//!
//! let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
//! assert_eq!(TileFormat::from_magic_bytes(&png).unwrap(), TileFormat::PNG);
//!
//! // Anything that matches no binary image signature is assumed to be an
//! // uncompressed Mapbox Vector Tile.
//! assert_eq!(TileFormat::from_magic_bytes(b"not an image").unwrap(), TileFormat::MVT);
//!
//! assert_eq!(TileFormat::PNG.as_mime_str(), "image/png");
//! ```

use crate::error::FormatError;
use std::fmt::{Display, Formatter};

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Number of payload bytes the sniffer needs to see every marker it checks.
///
/// The WEBP container carries `RIFF` at offset 0 and `WEBP` at offset 8, so
/// an 8-byte sample would not be enough.
pub const SNIFF_LEN: usize = 12;

/// Enum representing the tile encodings recognized in an MBTiles archive.
///
/// # Variants
/// - `JPG` - JPEG image format
/// - `PNG` - PNG image format
/// - `WEBP` - WEBP image format
/// - `MVT` - uncompressed Mapbox Vector Tile (Protocol Buffer)
/// - `MVTGzip` - gzip-wrapped Mapbox Vector Tile
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TileFormat {
	JPG,
	PNG,
	WEBP,
	MVT,
	MVTGzip,
}

impl TileFormat {
	/// Classifies a tile payload prefix by its magic bytes.
	///
	/// `sample` should be the first [`SNIFF_LEN`] bytes of any one tile's
	/// payload (a shorter slice is accepted as long as it still contains a
	/// recognizable signature). A payload matching no binary image signature
	/// is assumed to be an uncompressed vector tile.
	///
	/// # Errors
	/// Returns [`FormatError::EmptySample`] for an empty sample and
	/// [`FormatError::Unrecognized`] when the sample is too short to even
	/// check the gzip magic.
	pub fn from_magic_bytes(sample: &[u8]) -> Result<Self, FormatError> {
		if sample.is_empty() {
			return Err(FormatError::EmptySample);
		}
		if sample.starts_with(&PNG_MAGIC) {
			return Ok(TileFormat::PNG);
		}
		if sample.starts_with(&JPG_MAGIC) {
			return Ok(TileFormat::JPG);
		}
		if sample.starts_with(&GZIP_MAGIC) {
			return Ok(TileFormat::MVTGzip);
		}
		if sample.len() >= SNIFF_LEN && &sample[0..4] == b"RIFF" && &sample[8..12] == b"WEBP" {
			return Ok(TileFormat::WEBP);
		}
		if sample.len() < GZIP_MAGIC.len() {
			return Err(FormatError::Unrecognized {
				prefix: sample.to_vec(),
			});
		}
		Ok(TileFormat::MVT)
	}

	/// Returns a lowercase string identifier for this tile format.
	pub fn as_str(&self) -> &str {
		match self {
			TileFormat::JPG => "jpg",
			TileFormat::PNG => "png",
			TileFormat::WEBP => "webp",
			TileFormat::MVT | TileFormat::MVTGzip => "pbf",
		}
	}

	/// Returns a MIME type string typically associated with this tile format.
	///
	/// Useful for a tile server setting `Content-Type` without re-sniffing.
	pub fn as_mime_str(&self) -> &str {
		match self {
			TileFormat::JPG => "image/jpeg",
			TileFormat::PNG => "image/png",
			TileFormat::WEBP => "image/webp",
			TileFormat::MVT | TileFormat::MVTGzip => "application/x-protobuf",
		}
	}
}

impl Display for TileFormat {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
