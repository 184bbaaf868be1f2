//! Various traits to help parsing of DNS messages.

use crate::errors::WireError;
use crate::types::{Class, Type};
use byteorder::{ReadBytesExt, WriteBytesExt, BE};
use num_traits::FromPrimitive;
use std::io;
use std::io::Cursor;
use std::io::SeekFrom;

/// The longest a domain name may be in its textual form. One more octet
/// (the leading length byte or the root terminator) brings the wire form
/// to the 255 octet limit of rfc1035.
pub(crate) const MAX_NAME_LEN: usize = 254;

pub fn clamp<T: PartialOrd>(v: T, min: T, max: T) -> T {
    assert!(min < max);

    if v < min {
        min
    } else if v > max {
        max
    } else {
        v
    }
}

/// All types that implement `Seek` get methods defined in `SeekExt`
/// for free.
impl<S: io::Seek + ?Sized> SeekExt for S {}

pub trait SeekExt: io::Seek {
    /// Returns the total length of the underlying stream.
    fn total_len(&mut self) -> io::Result<u64> {
        let pos = self.stream_position()?;
        let len = self.seek(SeekFrom::End(0))?;

        // reset position
        self.seek(SeekFrom::Start(pos))?;

        Ok(len)
    }

    /// Returns the number of bytes remaining to be consumed.
    /// This is used as a way to check for malformed input.
    fn remaining(&mut self) -> io::Result<u64> {
        let pos = self.stream_position()?;
        Ok(self.total_len()?.saturating_sub(pos))
    }
}

/// All types that implement `Read` and `Seek` get methods defined
/// in `DNSReadExt` for free.
impl<R: io::Read + ?Sized + io::Seek> DNSReadExt for R {}

/// Extensions to io::Read to add some DNS specific types.
pub trait DNSReadExt: io::Read + io::Seek {
    /// Reads a domain name from the stream, following any compression
    /// pointers, and returns its textual form with a trailing dot.
    ///
    /// The cursor is left just after the name (after the first pointer,
    /// when one was followed).
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidOffset`] for a pointer that does not
    /// target an earlier byte of the message, [`WireError::PointerLoop`]
    /// if more label/pointer steps happen than the message has bytes,
    /// and [`WireError::NameTooLong`]/[`WireError::LabelTooLong`] when a
    /// limit is crossed.
    fn read_qname(&mut self) -> Result<String, WireError> {
        let total = self.total_len()?;
        let mut qname = String::new();

        // Where to rewind to once the name ends, set at the first pointer.
        let mut return_to = None;

        // A well-formed message never needs more steps than it has bytes;
        // each step either advances the cursor or jumps strictly backwards.
        let mut steps: u64 = 0;

        loop {
            steps += 1;
            if steps > total {
                return Err(WireError::PointerLoop);
            }

            let pos = self.stream_position()?;
            let len = self.read_u8()?;

            match len & 0xC0 {
                // A plain label of 1 to 63 octets, or the root terminator.
                0x00 => {
                    if len == 0 {
                        break;
                    }

                    let mut label = vec![0; len.into()];
                    self.read_exact(&mut label)?;

                    // Labels are ASCII on the wire. We don't insist on
                    // hostname rules here (that's the encoder's job), but
                    // arbitrary bytes don't belong in a domain name.
                    if let Some(&byte) = label.iter().find(|b| !b.is_ascii()) {
                        return Err(WireError::InvalidLabelByte {
                            label: String::from_utf8_lossy(&label).into_owned(),
                            byte,
                        });
                    }

                    qname.push_str(&String::from_utf8_lossy(&label));
                    qname.push('.');

                    if qname.len() > MAX_NAME_LEN {
                        return Err(WireError::NameTooLong(qname));
                    }
                }

                // A 14 bit pointer to an earlier occurrence.
                0xC0 => {
                    let b2 = self.read_u8()? as u64;
                    let ptr = ((len as u64 & 0x3F) << 8) | b2;

                    // Forward (or self) pointers can loop, and the encoder
                    // never produces them.
                    if ptr >= pos {
                        return Err(WireError::InvalidOffset(ptr));
                    }

                    if return_to.is_none() {
                        return_to = Some(self.stream_position()?);
                    }

                    self.seek(SeekFrom::Start(ptr))?;
                }

                // Top bits 01/10 would claim a label longer than 63.
                _ => return Err(WireError::LabelTooLong),
            }
        }

        if qname.is_empty() {
            qname.push('.'); // Root domain
        }

        if let Some(pos) = return_to {
            self.seek(SeekFrom::Start(pos))?;
        }

        Ok(qname)
    }

    /// Reads a length-prefixed character-string of 0 to 255 bytes.
    fn read_character_string(&mut self) -> Result<Vec<u8>, WireError> {
        let len = self.read_u8()?;
        let mut buf = vec![0; len.into()];
        self.read_exact(&mut buf)?;

        Ok(buf)
    }

    /// Reads a DNS Type.
    fn read_type(&mut self) -> Result<Type, WireError> {
        let r#type = self.read_u16::<BE>()?;
        let r#type = match FromPrimitive::from_u16(r#type) {
            Some(t) => t,
            None => return Err(WireError::UnsupportedType(r#type)),
        };

        Ok(r#type)
    }

    /// Reads a DNS Class.
    fn read_class(&mut self) -> Result<Class, WireError> {
        let class = self.read_u16::<BE>()?;
        let class = match FromPrimitive::from_u16(class) {
            Some(t) => t,
            None => return Err(WireError::InvalidClass(class)),
        };

        Ok(class)
    }
}

/// All types that implement `Write` and `Seek` get methods defined
/// in `DNSWriteExt` for free.
impl<W: io::Write + ?Sized + io::Seek> DNSWriteExt for W {}

/// Extensions to io::Write for the DNS length-prefixed types.
pub trait DNSWriteExt: io::Write + io::Seek {
    /// Writes a character-string, a 1-byte length followed by the bytes.
    fn write_character_string(&mut self, s: &[u8]) -> Result<(), WireError> {
        if s.len() > 255 {
            return Err(WireError::CharacterStringTooLong(s.len()));
        }

        self.write_u8(s.len() as u8)?;
        self.write_all(s)?;

        Ok(())
    }
}
