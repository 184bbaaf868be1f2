//! The per-TYPE resource record payloads and their wire parsers.

use crate::errors::WireError;
use crate::io::DNSReadExt;
use crate::types::{Extension, Type};
use byteorder::{ReadBytesExt, BE};
use num_traits::FromPrimitive;
use std::io::Cursor;
use std::io::Read;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;

/// Recource Record Definitions.
///
/// Every variant corresponds to one TYPE; constructing a [`crate::Record`]
/// with a `Resource` fixes the TYPE it encodes with. TYPEs this library
/// has no variant for, and records of classes other than `IN`, are kept
/// byte-for-byte in [`Resource::Unknown`].
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Debug, PartialEq)]
pub enum Resource {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),

    // Single domain names
    NS(String),
    MD(String),
    MF(String),
    CNAME(String),
    MB(String),
    MG(String),
    MR(String),
    PTR(String),

    SOA(SOA),
    NULL(Vec<u8>),
    WKS(WKS),
    HINFO(HINFO),
    MINFO(MINFO),
    MX(MX),

    // TODO Implement RFC 1464 for further parsing of the text
    TXT(TXT),

    SRV(SRV),
    CAA(CAA),

    /// An OPT pseudo-record that was not the message's first. Kept so a
    /// protocol-violating message survives a decode/encode round trip.
    OPT(Extension),

    /// Any TYPE without a variant above, plus all records of classes
    /// other than `IN`. The payload is preserved verbatim.
    Unknown { r#type: u16, octets: Vec<u8> },
}

/// Start of a zone of authority, see [rfc1035] section 3.3.13.
///
/// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
#[derive(Clone, Debug, PartialEq)]
pub struct SOA {
    /// The name server that was the original or primary source of data for this zone.
    pub mname: String,

    /// The mailbox of the person responsible for this zone.
    pub rname: String,

    /// Version number of the zone.
    pub serial: u32,

    pub refresh: Duration,
    pub retry: Duration,
    pub expire: Duration,

    /// Minimum TTL for any RR exported from this zone.
    pub minimum: Duration,
}

/// Well known service description, see [rfc1035] section 3.4.2.
///
/// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
#[derive(Clone, Debug, PartialEq)]
pub struct WKS {
    pub address: Ipv4Addr,

    /// IP protocol number, e.g. 6 for TCP.
    pub protocol: u8,

    /// One bit per port, lowest port in the most significant bit.
    pub bitmap: Vec<u8>,
}

/// Host information, two character-strings naming CPU and OS.
#[derive(Clone, Debug, PartialEq)]
pub struct HINFO {
    pub cpu: Vec<u8>,
    pub os: Vec<u8>,
}

/// Mailbox or mail list information (EXPERIMENTAL).
#[derive(Clone, Debug, PartialEq)]
pub struct MINFO {
    /// Mailbox responsible for the mailing list or mailbox.
    pub rmailbx: String,

    /// Mailbox to receive error messages.
    pub emailbx: String,
}

/// Mail exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct MX {
    /// The preference given to this RR among others at the same owner.
    /// Lower values are preferred.
    pub preference: u16,

    /// A host willing to act as a mail exchange for the owner name.
    pub exchange: String,
}

/// One or more text strings.
// TODO per RFC 4408 decide if we should join the strings back together.
#[derive(Clone, Debug, PartialEq)]
pub struct TXT(pub Vec<Vec<u8>>);

/// Server selection, see [rfc2782].
///
/// [rfc2782]: https://datatracker.ietf.org/doc/html/rfc2782
#[derive(Clone, Debug, PartialEq)]
pub struct SRV {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,

    /// The target host. Written uncompressed, as rfc2782 requires.
    pub name: String,
}

/// Certification Authority Authorization, see [rfc8659].
///
/// [rfc8659]: https://datatracker.ietf.org/doc/html/rfc8659
#[derive(Clone, Debug, PartialEq)]
pub struct CAA {
    /// Bit 7 is "issuer critical"; the rest are reserved.
    pub flags: u8,

    /// Lowercase ASCII property tag, e.g. "issue" or "iodef".
    pub tag: String,

    /// The property value, opaque bytes.
    pub value: Vec<u8>,
}

impl CAA {
    pub const ISSUER_CRITICAL: u8 = 0b1000_0000;

    /// Creates a CAA resource. The reserved flag bits are left zero.
    pub fn new(critical: bool, tag: &str, value: &[u8]) -> CAA {
        CAA {
            flags: if critical { CAA::ISSUER_CRITICAL } else { 0 },
            tag: tag.to_string(),
            value: value.to_vec(),
        }
    }

    pub fn issuer_critical(&self) -> bool {
        self.flags & CAA::ISSUER_CRITICAL != 0
    }
}

impl Resource {
    /// The [`Type`] this resource encodes as, or `None` for
    /// [`Resource::Unknown`].
    pub fn r#type(&self) -> Option<Type> {
        // This should be kept in sync with Type.
        match self {
            Resource::A(_) => Some(Type::A),
            Resource::AAAA(_) => Some(Type::AAAA),
            Resource::NS(_) => Some(Type::NS),
            Resource::MD(_) => Some(Type::MD),
            Resource::MF(_) => Some(Type::MF),
            Resource::CNAME(_) => Some(Type::CNAME),
            Resource::MB(_) => Some(Type::MB),
            Resource::MG(_) => Some(Type::MG),
            Resource::MR(_) => Some(Type::MR),
            Resource::PTR(_) => Some(Type::PTR),
            Resource::SOA(_) => Some(Type::SOA),
            Resource::NULL(_) => Some(Type::NULL),
            Resource::WKS(_) => Some(Type::WKS),
            Resource::HINFO(_) => Some(Type::HINFO),
            Resource::MINFO(_) => Some(Type::MINFO),
            Resource::MX(_) => Some(Type::MX),
            Resource::TXT(_) => Some(Type::TXT),
            Resource::SRV(_) => Some(Type::SRV),
            Resource::CAA(_) => Some(Type::CAA),
            Resource::OPT(_) => Some(Type::OPT),
            Resource::Unknown { .. } => None,
        }
    }

    /// The numeric TYPE written to the wire.
    pub(crate) fn type_value(&self) -> u16 {
        if let Resource::Unknown { r#type, .. } = self {
            *r#type
        } else {
            // Every arm but Unknown maps to a known Type.
            self.r#type().map_or(0, |t| t as u16)
        }
    }

    /// Parses `rd_len` bytes of record data for the numeric `r#type`.
    ///
    /// `internet` says whether the owning record's class is `IN`; data of
    /// any other class is preserved opaque rather than interpreted.
    pub(crate) fn parse(
        r#type: u16,
        internet: bool,
        cur: &mut Cursor<&[u8]>,
        rd_len: u16,
    ) -> Result<Resource, WireError> {
        if !internet {
            return parse_unknown(r#type, cur, rd_len);
        }

        let known = match FromPrimitive::from_u16(r#type) {
            Some(t) => t,
            None => return parse_unknown(r#type, cur, rd_len),
        };

        match known {
            Type::A => Ok(Resource::A(parse_a(cur, rd_len)?)),
            Type::AAAA => Ok(Resource::AAAA(parse_aaaa(cur, rd_len)?)),

            Type::NS => Ok(Resource::NS(cur.read_qname()?)),
            Type::MD => Ok(Resource::MD(cur.read_qname()?)),
            Type::MF => Ok(Resource::MF(cur.read_qname()?)),
            Type::CNAME => Ok(Resource::CNAME(cur.read_qname()?)),
            Type::MB => Ok(Resource::MB(cur.read_qname()?)),
            Type::MG => Ok(Resource::MG(cur.read_qname()?)),
            Type::MR => Ok(Resource::MR(cur.read_qname()?)),
            Type::PTR => Ok(Resource::PTR(cur.read_qname()?)),

            Type::SOA => Ok(Resource::SOA(SOA::parse(cur)?)),
            Type::NULL => Ok(Resource::NULL(read_octets(cur, rd_len)?)),
            Type::WKS => Ok(Resource::WKS(WKS::parse(cur, rd_len)?)),
            Type::HINFO => Ok(Resource::HINFO(HINFO::parse(cur)?)),
            Type::MINFO => Ok(Resource::MINFO(MINFO::parse(cur)?)),
            Type::MX => Ok(Resource::MX(MX::parse(cur)?)),
            Type::TXT => Ok(Resource::TXT(TXT::parse(cur, rd_len)?)),
            Type::SRV => Ok(Resource::SRV(SRV::parse(cur)?)),
            Type::CAA => Ok(Resource::CAA(CAA::parse(cur, rd_len)?)),

            // OPT is laid out differently and parsed before we get here;
            // the question-only types carry no data worth interpreting.
            Type::Reserved | Type::OPT | Type::ANY => parse_unknown(r#type, cur, rd_len),
        }
    }
}

fn read_octets(cur: &mut Cursor<&[u8]>, len: u16) -> Result<Vec<u8>, WireError> {
    let mut octets = vec![0; len.into()];
    cur.read_exact(&mut octets)?;
    Ok(octets)
}

fn parse_unknown(r#type: u16, cur: &mut Cursor<&[u8]>, rd_len: u16) -> Result<Resource, WireError> {
    Ok(Resource::Unknown {
        r#type,
        octets: read_octets(cur, rd_len)?,
    })
}

fn parse_a(cur: &mut Cursor<&[u8]>, rd_len: u16) -> Result<Ipv4Addr, WireError> {
    if rd_len != 4 {
        return Err(WireError::MalformedRData(format!(
            "invalid A record length ({}) expected 4",
            rd_len
        )));
    }

    let mut octets = [0; 4];
    cur.read_exact(&mut octets)?;
    Ok(Ipv4Addr::from(octets))
}

fn parse_aaaa(cur: &mut Cursor<&[u8]>, rd_len: u16) -> Result<Ipv6Addr, WireError> {
    if rd_len != 16 {
        return Err(WireError::MalformedRData(format!(
            "invalid AAAA record length ({}) expected 16",
            rd_len
        )));
    }

    let mut octets = [0; 16];
    cur.read_exact(&mut octets)?;
    Ok(Ipv6Addr::from(octets))
}

impl SOA {
    fn parse(cur: &mut Cursor<&[u8]>) -> Result<SOA, WireError> {
        let mname = cur.read_qname()?;
        let rname = cur.read_qname()?;

        Ok(SOA {
            mname,
            rname,
            serial: cur.read_u32::<BE>()?,
            refresh: Duration::from_secs(cur.read_u32::<BE>()?.into()),
            retry: Duration::from_secs(cur.read_u32::<BE>()?.into()),
            expire: Duration::from_secs(cur.read_u32::<BE>()?.into()),
            minimum: Duration::from_secs(cur.read_u32::<BE>()?.into()),
        })
    }
}

impl WKS {
    fn parse(cur: &mut Cursor<&[u8]>, rd_len: u16) -> Result<WKS, WireError> {
        if rd_len < 5 {
            return Err(WireError::MalformedRData(format!(
                "WKS record of {} bytes is too short",
                rd_len
            )));
        }

        let mut address = [0; 4];
        cur.read_exact(&mut address)?;
        let protocol = cur.read_u8()?;

        Ok(WKS {
            address: Ipv4Addr::from(address),
            protocol,
            bitmap: read_octets(cur, rd_len - 5)?,
        })
    }
}

impl HINFO {
    fn parse(cur: &mut Cursor<&[u8]>) -> Result<HINFO, WireError> {
        Ok(HINFO {
            cpu: cur.read_character_string()?,
            os: cur.read_character_string()?,
        })
    }
}

impl MINFO {
    fn parse(cur: &mut Cursor<&[u8]>) -> Result<MINFO, WireError> {
        Ok(MINFO {
            rmailbx: cur.read_qname()?,
            emailbx: cur.read_qname()?,
        })
    }
}

impl MX {
    fn parse(cur: &mut Cursor<&[u8]>) -> Result<MX, WireError> {
        Ok(MX {
            // The preference precedes the name.
            preference: cur.read_u16::<BE>()?,
            exchange: cur.read_qname()?,
        })
    }
}

impl TXT {
    fn parse(cur: &mut Cursor<&[u8]>, rd_len: u16) -> Result<TXT, WireError> {
        let mut txts = Vec::new();
        let start = cur.position();
        let end = start + u64::from(rd_len);

        while cur.position() < end {
            let txt = cur.read_character_string()?;

            if cur.position() > end {
                return Err(WireError::MalformedRData(
                    "TXT string crosses the record boundary".to_string(),
                ));
            }

            txts.push(txt);
        }

        Ok(TXT(txts))
    }
}

impl SRV {
    fn parse(cur: &mut Cursor<&[u8]>) -> Result<SRV, WireError> {
        Ok(SRV {
            priority: cur.read_u16::<BE>()?,
            weight: cur.read_u16::<BE>()?,
            port: cur.read_u16::<BE>()?,
            name: cur.read_qname()?,
        })
    }
}

impl CAA {
    fn parse(cur: &mut Cursor<&[u8]>, rd_len: u16) -> Result<CAA, WireError> {
        if rd_len < 2 {
            return Err(WireError::MalformedRData(format!(
                "CAA record of {} bytes is too short",
                rd_len
            )));
        }

        let flags = cur.read_u8()?;
        let tag_len = cur.read_u8()?;

        if u16::from(tag_len) > rd_len - 2 {
            return Err(WireError::MalformedRData(format!(
                "CAA tag of {} bytes exceeds the record's {} data bytes",
                tag_len,
                rd_len - 2
            )));
        }

        let tag = read_octets(cur, tag_len.into())?;
        let tag = match String::from_utf8(tag) {
            Ok(tag) => tag,
            Err(e) => {
                return Err(WireError::MalformedRData(format!(
                    "CAA tag is not valid ASCII: {}",
                    e
                )))
            }
        };

        let value = read_octets(cur, rd_len - 2 - u16::from(tag_len))?;

        Ok(CAA { flags, tag, value })
    }
}
