//! Error types returned while encoding or decoding DNS messages.

use std::io;
use thiserror::Error;

/// Everything that can go wrong turning a [`crate::Message`] into bytes,
/// or bytes back into a [`crate::Message`].
///
/// The codec never swallows an error internally. On failure the
/// in-progress message is discarded and the error is returned to the
/// caller of the encode/decode entry point.
#[derive(Error, Debug)]
pub enum WireError {
    /// The input ended while more bytes were expected.
    #[error("input truncated: ran out of bytes while decoding")]
    TruncatedInput,

    /// A compression pointer targets an offset outside the message, or
    /// does not point strictly backwards.
    #[error("compression pointer to invalid offset {0}")]
    InvalidOffset(u64),

    /// More label/pointer steps than bytes in the message. A well-formed
    /// message can never do this.
    #[error("compression pointer loop detected")]
    PointerLoop,

    /// A wire label claimed a length over 63.
    #[error("label longer than 63 octets")]
    LabelTooLong,

    /// A domain name exceeded 254 characters in its textual form.
    #[error("domain name '{0}' is too long")]
    NameTooLong(String),

    /// The empty string is not a valid domain name. (The root is `"."`.)
    #[error("empty domain names are not valid")]
    EmptyName,

    /// Consecutive dots produce an empty label, e.g. `"a..com"`.
    #[error("empty label in domain name '{0}'")]
    EmptyInnerLabel(String),

    /// A label contained a byte outside the letter/digit/hyphen set
    /// (an underscore is accepted as the leading character only).
    #[error("invalid byte {byte:#04x} in label '{label}'")]
    InvalidLabelByte { label: String, byte: u8 },

    /// A character-string longer than the 1-byte length prefix allows.
    #[error("character-string of {0} bytes exceeds the 255 byte limit")]
    CharacterStringTooLong(usize),

    /// A section held more than 65,535 entries.
    #[error("section count {0} does not fit in a u16")]
    SectionCountOverflow(usize),

    /// A record's RDATA did not satisfy its TYPE's layout, for example a
    /// parser consuming more or fewer bytes than rdlength said.
    #[error("malformed rdata: {0}")]
    MalformedRData(String),

    /// A question carried a TYPE this library has no variant for.
    /// Unknown TYPEs in record data do not raise this; they decode into
    /// [`crate::Resource::Unknown`].
    #[error("unsupported type ({0})")]
    UnsupportedType(u16),

    /// A CLASS value outside the registered set.
    #[error("invalid class ({0})")]
    InvalidClass(u16),

    /// An OPCODE value outside the registered set.
    #[error("invalid opcode ({0})")]
    InvalidOpcode(u8),

    /// Bytes remained after the final section was decoded.
    #[error("finished decoding with {0} bytes left over")]
    TrailingBytes(u64),

    /// A message too large for the TCP two-byte length prefix.
    #[error("message of {0} bytes does not fit a u16 length prefix")]
    MessageTooLong(usize),

    /// Any other I/O failure from the underlying cursor.
    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for WireError {
    fn from(err: io::Error) -> Self {
        // Cursor reads report a short buffer as UnexpectedEof.
        match err.kind() {
            io::ErrorKind::UnexpectedEof => WireError::TruncatedInput,
            _ => WireError::Io(err),
        }
    }
}
