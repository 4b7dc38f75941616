//! Read tiles and metadata from an MBTiles (SQLite) archive.
//!
//! The `MBTilesReader` opens the database read-only, validates that the
//! required `tiles` and `metadata` tables exist, sniffs the tile format once
//! from a single sampled row, and then serves repeated tile and metadata
//! reads over the same connection.
//!
//! ## Requirements
//! - The file must exist and must not have a sibling `<path>-journal` file
//!   (a journal signals an in-progress, not-yet-durable write).
//! - The `tiles` table must hold at least one row so the format can be
//!   detected.
//!
//! ## Usage
//! ```rust,no_run
//! use mbtiles_reader::MBTilesReader;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = MBTilesReader::open_path(Path::new("berlin.mbtiles"))?;
//!
//! println!("format: {}", reader.format());
//!
//! let metadata = reader.read_metadata()?;
//! let tile = reader.read_tile(14, 8803, 5376)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//! - Opening fails fast on the first failing precondition; see [`OpenError`].
//! - Reads surface store-level failures unretried; concurrent access is only
//!   as safe as SQLite's own concurrent-read guarantees.

use crate::{
	error::{FormatError, MetadataError, OpenError, SchemaError, TileError},
	metadata::{Metadata, MetadataValue, coerce_entry},
	tile_format::{SNIFF_LEN, TileFormat},
};
use rusqlite::{Connection, OpenFlags, params};
use std::{
	fs,
	path::{Path, PathBuf},
	time::{Duration, SystemTime, UNIX_EPOCH},
};

/// Read-only accessor for an MBTiles (SQLite) archive.
///
/// Owns the single shared connection for its whole lifetime. The archive is
/// assumed immutable once opened: nothing is re-validated per call, and the
/// detected [`TileFormat`] is cached from open.
pub struct MBTilesReader {
	path: PathBuf,
	modified: SystemTime,
	conn: Connection,
	format: TileFormat,
}

impl MBTilesReader {
	/// Opens an MBTiles archive and prepares it for reading.
	///
	/// Preconditions are checked in order and the first failure wins:
	/// file existence, absence of a `-journal` sibling, database liveness,
	/// required tables, detectable tile format.
	///
	/// # Errors
	/// Returns an [`OpenError`] naming the failed precondition.
	pub fn open_path(path: &Path) -> Result<MBTilesReader, OpenError> {
		log::debug!("open {path:?}");

		if !path.exists() {
			return Err(OpenError::NotFound(path.to_path_buf()));
		}

		// An associated journal file means the tileset is still being
		// written and must not be read yet, whatever its content.
		let mut journal = path.as_os_str().to_os_string();
		journal.push("-journal");
		if Path::new(&journal).exists() {
			return Err(OpenError::Incomplete(path.to_path_buf()));
		}

		let stat = fs::metadata(path)?;
		let modified = round_to_seconds(stat.modified()?);

		let conn = Connection::open_with_flags(
			path,
			OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI,
		)
		.map_err(OpenError::ConnectionUnusable)?;

		// Liveness probe. A non-SQLite file opens lazily and only fails
		// here; the half-open connection is dropped on this path.
		conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
			.map_err(OpenError::ConnectionUnusable)?;

		validate_required_tables(&conn)?;

		let format = detect_format(&conn)?;

		Ok(MBTilesReader {
			path: path.to_path_buf(),
			modified,
			conn,
			format,
		})
	}

	/// Fetch a single tile's raw bytes by exact coordinate match.
	///
	/// Coordinates are passed through to the archive's native row addressing;
	/// there is no flipping, no fuzzy matching and no nearest-zoom fallback.
	///
	/// # Errors
	/// Returns [`TileError::NotFound`] when no row matches the triple, and
	/// [`TileError::QueryFailed`] for any other store failure.
	pub fn read_tile(&self, z: i64, x: i64, y: i64) -> Result<Vec<u8>, TileError> {
		log::trace!("read tile z:{z} x:{x} y:{y}");

		self
			.conn
			.query_row(
				"SELECT tile_data FROM tiles WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3",
				params![z, x, y],
				|row| row.get::<_, Vec<u8>>(0),
			)
			.map_err(|err| match err {
				rusqlite::Error::QueryReturnedNoRows => TileError::NotFound { z, x, y },
				other => TileError::QueryFailed(other),
			})
	}

	/// Read and coerce the whole metadata table into a [`Metadata`] document.
	///
	/// Re-reads the store on every call; nothing is cached. Rows with empty
	/// string values are skipped entirely. When the document ends up lacking
	/// both `minzoom` and `maxzoom`, both are computed by scanning the tiles
	/// table for the zoom range (one key present means no fallback).
	///
	/// # Errors
	/// Returns a [`MetadataError`] naming the offending key on a coercion
	/// failure, or carrying the store failure otherwise. There is no partial
	/// document on failure.
	pub fn read_metadata(&self) -> Result<Metadata, MetadataError> {
		log::debug!("read metadata from {:?}", self.path);

		let mut doc = Metadata::new();

		let mut stmt = self
			.conn
			.prepare("SELECT name, value FROM metadata WHERE value != ''")?;
		let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

		for row in rows {
			let (name, value) = row?;
			coerce_entry(&mut doc, &name, &value)?;
		}

		if !doc.contains_key("minzoom") && !doc.contains_key("maxzoom") {
			let (minzoom, maxzoom) = self.zoom_range()?;
			doc.insert("minzoom".to_string(), MetadataValue::Integer(minzoom));
			doc.insert("maxzoom".to_string(), MetadataValue::Integer(maxzoom));
		}

		Ok(doc)
	}

	/// Returns the tile format detected at open. Never re-queries the store.
	pub fn format(&self) -> TileFormat {
		self.format
	}

	/// Returns the path the archive was opened from.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Returns the file's last-modified timestamp as captured at open,
	/// truncated to whole seconds.
	pub fn modified(&self) -> SystemTime {
		self.modified
	}

	/// Scan the tiles table for the minimum and maximum zoom level present.
	///
	/// # Errors
	/// Returns [`MetadataError::AggregateQueryFailed`] if the aggregate
	/// query errors, e.g. the NULL aggregates of an empty tiles table. The
	/// failure is propagated, never defaulted to zero.
	fn zoom_range(&self) -> Result<(i64, i64), MetadataError> {
		log::trace!("scan tiles table for zoom range");

		self
			.conn
			.query_row("SELECT min(zoom_level), max(zoom_level) FROM tiles", [], |row| {
				Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
			})
			.map_err(MetadataError::AggregateQueryFailed)
	}
}

impl std::fmt::Debug for MBTilesReader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MBTilesReader")
			.field("path", &self.path)
			.field("format", &self.format)
			.field("modified", &self.modified)
			.finish()
	}
}

/// Confirms the `tiles` and `metadata` tables exist in the database catalog.
///
/// Existence-only: column names and types are not checked, so tables with
/// the right names but the wrong shape pass here and fail at query time.
fn validate_required_tables(conn: &Connection) -> Result<(), SchemaError> {
	let count = conn
		.query_row(
			"SELECT count(*) FROM sqlite_master WHERE name IN ('tiles', 'metadata')",
			[],
			|row| row.get::<_, i64>(0),
		)
		.map_err(|_| SchemaError)?;

	if count < 2 {
		return Err(SchemaError);
	}
	Ok(())
}

/// Samples one tile payload and classifies the archive's tile format.
///
/// The query carries no ORDER BY: any one row is good enough, since the
/// format is assumed uniform across the archive.
fn detect_format(conn: &Connection) -> Result<TileFormat, FormatError> {
	match conn.query_row("SELECT tile_data FROM tiles LIMIT 1", [], |row| {
		row.get::<_, Vec<u8>>(0)
	}) {
		Ok(data) => TileFormat::from_magic_bytes(&data[..data.len().min(SNIFF_LEN)]),
		Err(rusqlite::Error::QueryReturnedNoRows) => Err(FormatError::EmptySample),
		Err(err) => Err(FormatError::Query(err)),
	}
}

fn round_to_seconds(timestamp: SystemTime) -> SystemTime {
	match timestamp.duration_since(UNIX_EPOCH) {
		Ok(elapsed) => UNIX_EPOCH + Duration::from_secs(elapsed.as_secs()),
		Err(_) => UNIX_EPOCH,
	}
}
