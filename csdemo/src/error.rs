use thiserror::Error;

/// The single error kind raised anywhere in the replication engine.
///
/// The source (`csgopp`) represents every failure as a `GameError`
/// constructed from a human-readable message; this mirrors that shape
/// while giving callers a handful of matchable variants for the
/// categories the design calls out, so code that wants to react
/// differently to e.g. a truncated stream vs. a missing lookup doesn't
/// have to parse the message.
#[derive(Debug, Error)]
pub enum GameError {
	/// The underlying byte stream ended, or a decoder was asked to read
	/// more bits/bytes than remained.
	#[error("unexpected end of stream: {0}")]
	UnexpectedEnd(String),

	/// A frame, packet, or net-message was malformed in a way that is
	/// fatal to the parse (bad tag, byte-limit not exhausted, CUSTOM_DATA).
	#[error("malformed wire data: {0}")]
	Malformed(String),

	/// A protocol invariant was violated: member access on a non-object
	/// type, out-of-bounds array index, type mismatch on a projection.
	#[error("protocol invariant violated: {0}")]
	InvariantViolated(String),

	/// A lookup that the wire format guarantees to succeed did not: a
	/// data table referenced by name, a server class referenced by id,
	/// an excluded property, a string-table entry.
	#[error("lookup failed: {0}")]
	LookupFailed(String),

	/// An observer callback raised an error; it propagates through
	/// `advance` exactly as any other `GameError` would.
	#[error("observer error: {0}")]
	Observer(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

pub type GameResult<T> = Result<T, GameError>;

impl GameError {
	pub fn unexpected_end(msg: impl Into<String>) -> Self {
		Self::UnexpectedEnd(msg.into())
	}

	pub fn malformed(msg: impl Into<String>) -> Self {
		Self::Malformed(msg.into())
	}

	pub fn invariant(msg: impl Into<String>) -> Self {
		Self::InvariantViolated(msg.into())
	}

	pub fn lookup(msg: impl Into<String>) -> Self {
		Self::LookupFailed(msg.into())
	}
}
