/// Errors from reading or writing world/board/save file data.
///
/// The byte-level parse/write routines in this crate historically returned `Result<T, String>`
/// with a `map_err`-built message at every fallible read/write; that stays as the error type
/// internal helpers use (it costs nothing extra, since `?` converts it into this type at the
/// public boundary below), but every `pub fn` that a caller can reach now returns this enum so
/// load/save failures can be matched on and logged structurally instead of string-matched.
#[derive(Debug, thiserror::Error)]
pub enum WorldFormatError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
	#[error("invalid world type: {0}")]
	InvalidWorldType(i16),
	#[error("board size cannot be negative")]
	NegativeBoardSize,
	#[error("wrong number of flags: {actual} (expected {expected})")]
	WrongFlagCount { actual: usize, expected: usize },
	#[error("a board must have at least one status element")]
	NoStatusElements,
	#[error("{0}")]
	Corrupt(String),
}

impl From<String> for WorldFormatError {
	fn from(message: String) -> WorldFormatError {
		WorldFormatError::Corrupt(message)
	}
}
