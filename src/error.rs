//! Error types for opening an archive and reading tiles or metadata.
//!
//! Every failure is surfaced to the immediate caller with enough context
//! (offending key, coordinate, underlying SQLite cause) to diagnose without
//! re-querying the store. Nothing is retried: the workload is local-file
//! reads, so there is no transient-failure classification.

use std::path::PathBuf;
use thiserror::Error;

/// The database is missing one of the required MBTiles tables.
///
/// This check is existence-only. Tables with the right names but wrong
/// columns pass validation and fail later, at query time, with a generic
/// query error.
#[derive(Debug, Error)]
#[error("missing one or more required tables: tiles, metadata")]
pub struct SchemaError;

/// Failures while sampling and classifying the tile format.
#[derive(Debug, Error)]
pub enum FormatError {
	/// The tiles table holds no row to sample.
	#[error("tiles table contains no tile to sample the format from")]
	EmptySample,

	/// The sampled prefix is too short to match any known magic sequence.
	#[error("tile data prefix {prefix:02X?} does not resolve to any known format")]
	Unrecognized { prefix: Vec<u8> },

	/// The sample query itself failed.
	#[error("failed to sample tile data: {0}")]
	Query(#[source] rusqlite::Error),
}

/// Failures while opening an archive, in precondition order.
#[derive(Debug, Error)]
pub enum OpenError {
	/// The file does not exist.
	#[error("file {0:?} does not exist")]
	NotFound(PathBuf),

	/// A sibling `-journal` file exists, signaling an in-progress write.
	#[error("refusing to open {0:?}: associated -journal file found (incomplete tileset)")]
	Incomplete(PathBuf),

	/// The database could not be opened, or the liveness probe failed.
	#[error("database connection is unusable: {0}")]
	ConnectionUnusable(#[source] rusqlite::Error),

	/// A required table is missing.
	#[error(transparent)]
	SchemaInvalid(#[from] SchemaError),

	/// The tile format could not be detected.
	#[error("cannot detect tile format: {0}")]
	FormatUndetectable(#[from] FormatError),

	/// Reading file metadata from the filesystem failed.
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// Failures while fetching a single tile.
#[derive(Debug, Error)]
pub enum TileError {
	/// No row matches the requested coordinate.
	#[error("no tile found at z:{z} x:{x} y:{y}")]
	NotFound { z: i64, x: i64, y: i64 },

	/// The lookup query failed.
	#[error("tile query failed: {0}")]
	QueryFailed(#[from] rusqlite::Error),
}

/// Failures while reading and coercing the metadata table.
#[derive(Debug, Error)]
pub enum MetadataError {
	/// A metadata value could not be coerced to its per-key type.
	#[error("cannot read metadata item {key:?}: {reason}")]
	ParseFailed { key: String, reason: String },

	/// The zoom-range scan over the tiles table failed, e.g. because the
	/// table is empty and the aggregates came back NULL.
	#[error("failed to determine the zoom range from the tiles table: {0}")]
	AggregateQueryFailed(#[source] rusqlite::Error),

	/// Enumerating the metadata table failed.
	#[error("metadata query failed: {0}")]
	QueryFailed(#[from] rusqlite::Error),
}
