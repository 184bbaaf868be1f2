//! Encoding and decoding of whole DNS messages.

use crate::errors::WireError;
use crate::io::{clamp, DNSReadExt, DNSWriteExt, SeekExt, MAX_NAME_LEN};
use crate::resource::Resource;
use crate::resource::CAA;
use crate::types::*;
use byteorder::{ReadBytesExt, WriteBytesExt, BE};
use log::{debug, trace};
use num_traits::FromPrimitive;
use rand::Rng;
use std::collections::HashMap;
use std::convert::TryFrom;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::time::Duration;

/// The largest message offset a 14 bit compression pointer can target.
const MAX_POINTER: u64 = 0x3FFF;

/// Marker bits of a 2-byte compression pointer.
const POINTER_MASK: u16 = 0xC000;

#[derive(Copy, Clone, PartialEq)]
enum RecordSection {
    Answers,
    Authorities,
    Additionals,
}

/// A helper class to hold state while the parsing is happening.
pub(crate) struct MessageParser<'a> {
    cur: Cursor<&'a [u8]>,

    m: Message,
}

impl<'a> MessageParser<'a> {
    fn new(buf: &[u8]) -> MessageParser {
        MessageParser {
            cur: Cursor::new(buf),
            m: Message::default(),
        }
    }

    /// Consume the [`MessageParser`] and returned the resulting Message.
    fn parse(mut self) -> Result<Message, WireError> {
        self.m.header = Header::parse(&mut self.cur)?;

        let h = self.m.header;
        debug!(
            "decoding message {:#06x}: {} questions, {} answers, {} authorities, {} additionals",
            h.id, h.qd_count, h.an_count, h.ns_count, h.ar_count
        );

        self.read_questions(h.qd_count)?;
        self.read_records(h.an_count, RecordSection::Answers)?;
        self.read_records(h.ns_count, RecordSection::Authorities)?;
        self.read_records(h.ar_count, RecordSection::Additionals)?;

        if self.cur.remaining()? > 0 {
            return Err(WireError::TrailingBytes(self.cur.remaining()?));
        }

        Ok(self.m)
    }

    fn read_questions(&mut self, count: u16) -> Result<(), WireError> {
        for _ in 0..count {
            let name = self.cur.read_qname()?;
            let r#type = self.cur.read_type()?;
            let class = self.cur.read_class()?;

            self.m.questions.push(Question {
                name,
                r#type,
                class,
            });
        }

        Ok(())
    }

    fn read_records(&mut self, count: u16, section: RecordSection) -> Result<(), WireError> {
        for _ in 0..count {
            let name = self.cur.read_qname()?;
            let r#type = self.cur.read_u16::<BE>()?;

            // The OPT pseudo-record overlays the class and ttl slots, so
            // the layout must be decided before those are read.
            if r#type == Type::OPT as u16 {
                let ext = Extension::parse(&mut self.cur, &name)?;

                if section == RecordSection::Additionals && self.m.extension.is_none() {
                    // Fold the upper bits of the extended RCODE into the
                    // header's low nibble.
                    let low = self.m.header.flags.rcode.to_u16() & 0x0F;
                    let rcode = (u16::from(ext.extend_rcode) << 4) | low;
                    self.m.header.flags.rcode = Rcode::from_u16(rcode);

                    self.m.extension = Some(ext);
                } else {
                    // More than one OPT (or one outside the additional
                    // section) violates rfc6891. Keep it untouched.
                    trace!("keeping extra OPT record as-is");
                    self.push_record(
                        section,
                        Record {
                            name,
                            class: Class::Internet,
                            ttl: Duration::from_secs(0),
                            resource: Resource::OPT(ext),
                        },
                    );
                }

                continue;
            }

            let class = self.cur.read_class()?;
            let ttl = self.cur.read_u32::<BE>()?;
            let rd_len = self.cur.read_u16::<BE>()?;

            let start = self.cur.position();
            let resource =
                Resource::parse(r#type, class == Class::Internet, &mut self.cur, rd_len)?;

            // Each parser must consume its record data exactly.
            let consumed = self.cur.position() - start;
            if consumed != u64::from(rd_len) {
                return Err(WireError::MalformedRData(format!(
                    "record data is {} bytes but the parser consumed {}",
                    rd_len, consumed
                )));
            }

            trace!("read {} record for '{}'", r#type, name);

            self.push_record(
                section,
                Record {
                    name,
                    class,
                    ttl: Duration::from_secs(ttl.into()),
                    resource,
                },
            );
        }

        Ok(())
    }

    fn push_record(&mut self, section: RecordSection, record: Record) {
        let records = match section {
            RecordSection::Answers => &mut self.m.answers,
            RecordSection::Authorities => &mut self.m.authoritys,
            RecordSection::Additionals => &mut self.m.additionals,
        };

        records.push(record);
    }
}

/// A helper class to hold state while the encoding is happening.
pub(crate) struct MessageWriter {
    cur: Cursor<Vec<u8>>,

    /// Offset of every name suffix already written, keyed on the
    /// textual remainder (e.g. "org." for "nim-lang.org."). Lives for
    /// one message.
    names: HashMap<String, u64>,
}

impl MessageWriter {
    fn new() -> MessageWriter {
        MessageWriter {
            cur: Cursor::new(Vec::with_capacity(512)),
            names: HashMap::new(),
        }
    }

    fn write_message(&mut self, m: &Message) -> Result<(), WireError> {
        let rcode = m.header.flags.rcode.to_u16();

        // RCODEs above 15 need an OPT record for their upper 8 bits.
        let needs_extension = m.extension.is_some() || rcode > 0x0F;

        let mut header = m.header;
        header.qd_count = section_count(m.questions.len())?;
        header.an_count = section_count(m.answers.len())?;
        header.ns_count = section_count(m.authoritys.len())?;
        header.ar_count = section_count(m.additionals.len() + needs_extension as usize)?;

        header.write(&mut self.cur)?;

        for question in &m.questions {
            self.write_question(question)?;
        }
        for record in &m.answers {
            self.write_record(record)?;
        }
        for record in &m.authoritys {
            self.write_record(record)?;
        }
        for record in &m.additionals {
            self.write_record(record)?;
        }

        let extend_rcode = (rcode >> 4) as u8;
        if let Some(e) = &m.extension {
            let extend_rcode = if extend_rcode != 0 {
                extend_rcode
            } else {
                e.extend_rcode
            };
            e.write(&mut self.cur, extend_rcode)?;
        } else if rcode > 0x0F {
            // Created only to carry the upper RCODE bits.
            let e = Extension {
                payload_size: 512,
                ..Default::default()
            };
            e.write(&mut self.cur, extend_rcode)?;
        }

        Ok(())
    }

    fn write_question(&mut self, question: &Question) -> Result<(), WireError> {
        self.write_qname(&question.name, true)?;
        self.cur.write_u16::<BE>(question.r#type as u16)?;
        self.cur.write_u16::<BE>(question.class as u16)?;

        Ok(())
    }

    fn write_record(&mut self, record: &Record) -> Result<(), WireError> {
        if let Resource::OPT(e) = &record.resource {
            // An extra OPT kept from a decoded message. Its class and ttl
            // slots come from the extension fields, not the record's.
            return e.write(&mut self.cur, e.extend_rcode);
        }

        self.write_qname(&record.name, true)?;
        self.cur.write_u16::<BE>(record.resource.type_value())?;
        self.cur.write_u16::<BE>(record.class as u16)?;
        self.cur
            .write_u32::<BE>(clamp(record.ttl.as_secs(), 0, u32::MAX.into()) as u32)?;

        let rd_pos = self.cur.position();
        self.cur.write_u16::<BE>(0)?; // rdlength, patched below

        self.write_resource(&record.resource)?;

        patch_u16(&mut self.cur, rd_pos)
    }

    fn write_resource(&mut self, resource: &Resource) -> Result<(), WireError> {
        match resource {
            Resource::A(ip) => self.cur.write_all(&ip.octets())?,
            Resource::AAAA(ip) => self.cur.write_all(&ip.octets())?,

            Resource::NS(name)
            | Resource::MD(name)
            | Resource::MF(name)
            | Resource::CNAME(name)
            | Resource::MB(name)
            | Resource::MG(name)
            | Resource::MR(name)
            | Resource::PTR(name) => self.write_qname(name, true)?,

            Resource::SOA(soa) => {
                self.write_qname(&soa.mname, true)?;
                self.write_qname(&soa.rname, true)?;
                self.cur.write_u32::<BE>(soa.serial)?;
                self.cur.write_u32::<BE>(seconds(soa.refresh))?;
                self.cur.write_u32::<BE>(seconds(soa.retry))?;
                self.cur.write_u32::<BE>(seconds(soa.expire))?;
                self.cur.write_u32::<BE>(seconds(soa.minimum))?;
            }

            Resource::NULL(octets) => self.cur.write_all(octets)?,

            Resource::WKS(wks) => {
                self.cur.write_all(&wks.address.octets())?;
                self.cur.write_u8(wks.protocol)?;
                self.cur.write_all(&wks.bitmap)?;
            }

            Resource::HINFO(hinfo) => {
                self.cur.write_character_string(&hinfo.cpu)?;
                self.cur.write_character_string(&hinfo.os)?;
            }

            Resource::MINFO(minfo) => {
                self.write_qname(&minfo.rmailbx, true)?;
                self.write_qname(&minfo.emailbx, true)?;
            }

            Resource::MX(mx) => {
                self.cur.write_u16::<BE>(mx.preference)?;
                self.write_qname(&mx.exchange, true)?;
            }

            Resource::TXT(txt) => {
                for s in &txt.0 {
                    self.cur.write_character_string(s)?;
                }
            }

            Resource::SRV(srv) => {
                self.cur.write_u16::<BE>(srv.priority)?;
                self.cur.write_u16::<BE>(srv.weight)?;
                self.cur.write_u16::<BE>(srv.port)?;

                // rfc2782 forbids compressing the target.
                self.write_qname(&srv.name, false)?;
            }

            Resource::CAA(caa) => {
                if caa.tag.is_empty() || caa.tag.len() > 255 {
                    return Err(WireError::MalformedRData(format!(
                        "CAA tag of {} bytes is out of range",
                        caa.tag.len()
                    )));
                }

                if let Some(b) = caa
                    .tag
                    .bytes()
                    .find(|b| !b.is_ascii_lowercase() && !b.is_ascii_digit())
                {
                    return Err(WireError::MalformedRData(format!(
                        "CAA tag '{}' contains the non-lowercase byte {:#04x}",
                        caa.tag, b
                    )));
                }

                // The reserved flag bits must be zero on the wire.
                self.cur.write_u8(caa.flags & CAA::ISSUER_CRITICAL)?;
                self.cur.write_u8(caa.tag.len() as u8)?;
                self.cur.write_all(caa.tag.as_bytes())?;
                self.cur.write_all(&caa.value)?;
            }

            // Intercepted by write_record before the rdlength placeholder.
            Resource::OPT(_) => {
                return Err(WireError::MalformedRData(
                    "OPT records don't carry plain record data".to_string(),
                ))
            }

            Resource::Unknown { octets, .. } => self.cur.write_all(octets)?,
        }

        Ok(())
    }

    /// Writes a domain name, reusing a suffix written earlier in the
    /// message via a compression pointer when one exists.
    ///
    /// When `compress` is false the name is always written in full, but
    /// its suffixes are still recorded for later names to point at.
    fn write_qname(&mut self, name: &str, compress: bool) -> Result<(), WireError> {
        if name.is_empty() {
            return Err(WireError::EmptyName);
        }

        if name == "." {
            self.cur.write_u8(0)?;
            return Ok(());
        }

        // The stored form carries the trailing dot, but don't insist on it.
        let owned;
        let name = if name.ends_with('.') {
            name
        } else {
            owned = format!("{}.", name);
            &owned
        };

        if name.len() > MAX_NAME_LEN {
            return Err(WireError::NameTooLong(name.to_string()));
        }

        let mut i = 0;
        while i < name.len() {
            let remainder = &name[i..];

            if compress {
                if let Some(&offset) = self.names.get(remainder) {
                    self.cur.write_u16::<BE>(POINTER_MASK | offset as u16)?;
                    return Ok(());
                }
            }

            // First occurrence wins, so pointers always target the
            // earliest copy of a suffix.
            let pos = self.cur.position();
            if pos <= MAX_POINTER {
                self.names.entry(remainder.to_string()).or_insert(pos);
            }

            // The name ends with a dot, so there is always one to find.
            let label = match remainder.find('.') {
                Some(n) => &remainder[..n],
                None => remainder,
            };

            validate_label(name, label)?;

            self.cur.write_u8(label.len() as u8)?;
            self.cur.write_all(label.as_bytes())?;

            i += label.len() + 1;
        }

        self.cur.write_u8(0)?;

        Ok(())
    }
}

/// Checks a single label against the host name rules: 1 to 63 octets,
/// letters/digits/hyphens, starting and ending with a letter or digit.
/// A leading underscore is allowed for service labels such as "_ldap".
fn validate_label(name: &str, label: &str) -> Result<(), WireError> {
    if label.is_empty() {
        return Err(WireError::EmptyInnerLabel(name.to_string()));
    }

    if label.len() > 63 {
        return Err(WireError::LabelTooLong);
    }

    let bytes = label.as_bytes();
    let last = bytes.len() - 1;

    for (i, &b) in bytes.iter().enumerate() {
        let ok = match i {
            0 if bytes.len() == 1 => b.is_ascii_alphanumeric(),
            0 => b.is_ascii_alphanumeric() || b == b'_',
            i if i == last => b.is_ascii_alphanumeric(),
            _ => b.is_ascii_alphanumeric() || b == b'-',
        };

        if !ok {
            return Err(WireError::InvalidLabelByte {
                label: label.to_string(),
                byte: b,
            });
        }
    }

    Ok(())
}

/// Patches the u16 placeholder at `at` with the number of bytes written
/// since, leaving the cursor back at the end.
fn patch_u16(cur: &mut Cursor<Vec<u8>>, at: u64) -> Result<(), WireError> {
    let end = cur.position();
    let len = end - at - 2;

    if len > u64::from(u16::MAX) {
        return Err(WireError::MalformedRData(format!(
            "record data of {} bytes does not fit a u16 rdlength",
            len
        )));
    }

    cur.seek(SeekFrom::Start(at))?;
    cur.write_u16::<BE>(len as u16)?;
    cur.seek(SeekFrom::Start(end))?;

    Ok(())
}

fn section_count(len: usize) -> Result<u16, WireError> {
    u16::try_from(len).map_err(|_| WireError::SectionCountOverflow(len))
}

fn seconds(d: Duration) -> u32 {
    clamp(d.as_secs(), 0, u32::MAX.into()) as u32
}

/// Normalises a domain to the stored textual form with a trailing dot.
/// The empty string becomes the root domain.
pub(crate) fn normalise_name(domain: &str) -> String {
    if domain.is_empty() || domain == "." {
        return ".".to_string();
    }

    if domain.ends_with('.') {
        domain.to_string()
    } else {
        format!("{}.", domain)
    }
}

/// Defaults to a query [`Header`] with a random id and zero counts.
impl Default for Header {
    fn default() -> Self {
        Header {
            id: Message::random_id(),
            flags: Flags::default(),
            qd_count: 0,
            an_count: 0,
            ns_count: 0,
            ar_count: 0,
        }
    }
}

impl Header {
    /// A response [`Header`] answering the query with this `id`.
    pub fn response(id: u16) -> Header {
        Header {
            id,
            flags: Flags::response(),
            ..Default::default()
        }
    }

    pub(crate) fn parse(cur: &mut Cursor<&[u8]>) -> Result<Header, WireError> {
        let id = cur.read_u16::<BE>()?;

        let b = cur.read_u8()?;
        let qr = QR::from_bool(0b1000_0000 & b != 0);
        let opcode = (0b0111_1000 & b) >> 3;
        let aa = (0b0000_0100 & b) != 0;
        let tc = (0b0000_0010 & b) != 0;
        let rd = (0b0000_0001 & b) != 0;

        let opcode = match FromPrimitive::from_u8(opcode) {
            Some(t) => t,
            None => return Err(WireError::InvalidOpcode(opcode)),
        };

        let b = cur.read_u8()?;
        let ra = (0b1000_0000 & b) != 0;
        let z = (0b0111_0000 & b) >> 4;
        let rcode = Rcode::from_u16(u16::from(0b0000_1111 & b));

        Ok(Header {
            id,
            flags: Flags {
                qr,
                opcode,
                aa,
                tc,
                rd,
                ra,
                z,
                rcode,
            },
            qd_count: cur.read_u16::<BE>()?,
            an_count: cur.read_u16::<BE>()?,
            ns_count: cur.read_u16::<BE>()?,
            ar_count: cur.read_u16::<BE>()?,
        })
    }

    pub(crate) fn write(&self, cur: &mut Cursor<Vec<u8>>) -> Result<(), WireError> {
        cur.write_u16::<BE>(self.id)?;

        let mut b = 0_u8;
        b |= if self.flags.qr.to_bool() { 0b1000_0000 } else { 0 };
        b |= ((self.flags.opcode as u8) << 3) & 0b0111_1000;
        b |= if self.flags.aa { 0b0000_0100 } else { 0 };
        b |= if self.flags.tc { 0b0000_0010 } else { 0 };
        b |= if self.flags.rd { 0b0000_0001 } else { 0 };
        cur.write_u8(b)?;

        let mut b = 0_u8;
        b |= if self.flags.ra { 0b1000_0000 } else { 0 };
        b |= (self.flags.z << 4) & 0b0111_0000;
        // Only the low nibble lives here; any upper bits ride in the OPT
        // record's extended RCODE slot.
        b |= (self.flags.rcode.to_u16() as u8) & 0b0000_1111;
        cur.write_u8(b)?;

        cur.write_u16::<BE>(self.qd_count)?;
        cur.write_u16::<BE>(self.an_count)?;
        cur.write_u16::<BE>(self.ns_count)?;
        cur.write_u16::<BE>(self.ar_count)?;

        Ok(())
    }

    /// Encodes just this [`Header`] as the 12 bytes it occupies on the wire.
    pub fn to_vec(&self) -> Result<Vec<u8>, WireError> {
        let mut cur = Cursor::new(Vec::with_capacity(12));
        self.write(&mut cur)?;
        Ok(cur.into_inner())
    }
}

/// Defaults to an empty query [`Message`] with sensibles values.
impl Default for Message {
    fn default() -> Self {
        Message {
            header: Header::default(),
            questions: Vec::default(),
            answers: Vec::default(),
            authoritys: Vec::default(),
            additionals: Vec::default(),
            extension: None,
        }
    }
}

impl Message {
    /// Builds a [`Message`] from a header and its section lists. The four
    /// section counts are recomputed, and an RCODE above 15 gains a
    /// default OPT record (payload size 512) when none is present to
    /// carry its upper bits.
    pub fn new(
        header: Header,
        questions: Vec<Question>,
        answers: Vec<Record>,
        authoritys: Vec<Record>,
        additionals: Vec<Record>,
        extension: Option<Extension>,
    ) -> Result<Message, WireError> {
        let mut m = Message {
            header,
            questions,
            answers,
            authoritys,
            additionals,
            extension,
        };

        let rcode = m.header.flags.rcode.to_u16();
        if rcode > 0x0F {
            let e = m.extension.get_or_insert(Extension {
                payload_size: 512,
                ..Default::default()
            });
            e.extend_rcode = (rcode >> 4) as u8;
        }

        m.header.qd_count = section_count(m.questions.len())?;
        m.header.an_count = section_count(m.answers.len())?;
        m.header.ns_count = section_count(m.authoritys.len())?;
        m.header.ar_count =
            section_count(m.additionals.len() + m.extension.is_some() as usize)?;

        Ok(m)
    }

    /// Returns a random u16 suitable for the [`Message`] id field.
    ///
    /// This is generated with the [`rand::rngs::StdRng`] which is a suitable
    /// cryptographically secure pseudorandom number generator.
    pub fn random_id() -> u16 {
        rand::thread_rng().gen()
    }

    /// Decodes the supplied buffer and returns a [`Message`].
    pub fn from_slice(buf: &[u8]) -> Result<Message, WireError> {
        MessageParser::new(buf).parse()
    }

    /// Decodes a TCP framed message, a u16 length followed by exactly
    /// that many bytes, as defined by [rfc1035] section 4.2.2.
    ///
    /// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
    pub fn from_tcp_slice(buf: &[u8]) -> Result<Message, WireError> {
        let mut cur = Cursor::new(buf);
        let len = usize::from(cur.read_u16::<BE>()?);
        let rest = &buf[2..];

        if rest.len() < len {
            return Err(WireError::TruncatedInput);
        }
        if rest.len() > len {
            return Err(WireError::TrailingBytes((rest.len() - len) as u64));
        }

        Message::from_slice(rest)
    }

    /// Adds a question to the message.
    pub fn add_question(&mut self, domain: &str, r#type: Type, class: Class) {
        self.questions.push(Question::new(domain, r#type, class));
        self.sync_counts();
    }

    /// Adds a record to the answer section.
    pub fn add_answer(&mut self, record: Record) {
        self.answers.push(record);
        self.sync_counts();
    }

    /// Adds a record to the authority section.
    pub fn add_authority(&mut self, record: Record) {
        self.authoritys.push(record);
        self.sync_counts();
    }

    /// Adds a record to the additional section.
    pub fn add_additional(&mut self, record: Record) {
        self.additionals.push(record);
        self.sync_counts();
    }

    /// Adds a EDNS(0) extension record, as defined by [rfc6891](https://datatracker.ietf.org/doc/html/rfc6891).
    pub fn add_extension(&mut self, ext: Extension) {
        self.extension = Some(ext);
        self.sync_counts();
    }

    // Encoding recomputes the counts anyway, but keep the visible header
    // consistent with the lists between builder calls.
    fn sync_counts(&mut self) {
        self.header.qd_count = self.questions.len().min(65_535) as u16;
        self.header.an_count = self.answers.len().min(65_535) as u16;
        self.header.ns_count = self.authoritys.len().min(65_535) as u16;
        self.header.ar_count = (self.additionals.len() + self.extension.is_some() as usize)
            .min(65_535) as u16;
    }

    /// Encodes this DNS [`Message`] as a [`Vec<u8>`] ready to be sent
    /// over UDP, as defined by [rfc1035].
    ///
    /// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
    pub fn to_vec(&self) -> Result<Vec<u8>, WireError> {
        let mut writer = MessageWriter::new();
        writer.write_message(self)?;
        Ok(writer.cur.into_inner())
    }

    /// Encodes this DNS [`Message`] framed for TCP, a u16 length prefix
    /// followed by the message itself.
    ///
    /// The length prefix is not part of the message, so compression
    /// offsets stay relative to the message start.
    pub fn to_tcp_vec(&self) -> Result<Vec<u8>, WireError> {
        let msg = self.to_vec()?;

        if msg.len() > usize::from(u16::MAX) {
            return Err(WireError::MessageTooLong(msg.len()));
        }

        let mut buf = Vec::with_capacity(msg.len() + 2);
        buf.extend_from_slice(&(msg.len() as u16).to_be_bytes());
        buf.extend_from_slice(&msg);

        Ok(buf)
    }
}

impl Extension {
    /// Parses the OPT pseudo-record's fixed slots and options. The
    /// cursor sits just after the TYPE field; `name` was read before it.
    pub(crate) fn parse(cur: &mut Cursor<&[u8]>, name: &str) -> Result<Extension, WireError> {
        if name != "." {
            return Err(WireError::MalformedRData(format!(
                "expected root domain for EDNS(0) extension, got '{}'",
                name
            )));
        }

        let payload_size = cur.read_u16::<BE>()?; // the class slot
        let extend_rcode = cur.read_u8()?; // the ttl slot ...
        let version = cur.read_u8()?;
        let flags = cur.read_u16::<BE>()?;
        let dnssec_ok = flags & 0x8000 != 0;
        let z = flags & 0x7FFF;

        let rd_len = cur.read_u16::<BE>()?;
        let end = cur.position() + u64::from(rd_len);

        let mut options = Vec::new();
        while cur.position() < end {
            let code = cur.read_u16::<BE>()?;
            let len = cur.read_u16::<BE>()?;

            let mut data = vec![0; len.into()];
            cur.read_exact(&mut data)?;

            if cur.position() > end {
                return Err(WireError::MalformedRData(
                    "OPT option crosses the record boundary".to_string(),
                ));
            }

            options.push(EdnsOption { code, data });
        }

        Ok(Extension {
            payload_size,
            extend_rcode,
            version,
            dnssec_ok,
            z,
            options,
        })
    }

    /// Writes the whole OPT pseudo-record, including its root name and
    /// TYPE. `extend_rcode` is supplied by the caller since it is derived
    /// from the header's RCODE when one above 15 is being folded.
    pub(crate) fn write(
        &self,
        cur: &mut Cursor<Vec<u8>>,
        extend_rcode: u8,
    ) -> Result<(), WireError> {
        cur.write_u8(0)?; // the root domain name
        cur.write_u16::<BE>(Type::OPT as u16)?;
        cur.write_u16::<BE>(self.payload_size)?;

        cur.write_u8(extend_rcode)?;
        cur.write_u8(self.version)?;

        let mut flags = self.z & 0x7FFF;
        if self.dnssec_ok {
            flags |= 0x8000;
        }
        cur.write_u16::<BE>(flags)?;

        let rd_pos = cur.position();
        cur.write_u16::<BE>(0)?; // rdlength, patched below

        for option in &self.options {
            if option.data.len() > usize::from(u16::MAX) {
                return Err(WireError::MalformedRData(format!(
                    "OPT option data of {} bytes does not fit a u16 length",
                    option.data.len()
                )));
            }

            cur.write_u16::<BE>(option.code)?;
            cur.write_u16::<BE>(option.data.len() as u16)?;
            cur.write_all(&option.data)?;
        }

        patch_u16(cur, rd_pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn writer() -> MessageWriter {
        MessageWriter::new()
    }

    #[test]
    fn test_write_qname() {
        let mut w = writer();
        w.write_qname("www.google.com.", true).unwrap();

        assert_eq!(w.cur.into_inner(), b"\x03www\x06google\x03com\x00");
    }

    #[test]
    fn test_write_qname_root() {
        let mut w = writer();
        w.write_qname(".", true).unwrap();

        assert_eq!(w.cur.into_inner(), b"\x00");
    }

    #[test]
    fn test_write_qname_compresses_suffix() {
        let mut w = writer();
        w.write_qname("www.example.com.", true).unwrap();
        w.write_qname("mx.example.com.", true).unwrap();

        // "example.com." was first written at offset 4.
        assert_eq!(
            w.cur.into_inner(),
            b"\x03www\x07example\x03com\x00\x02mx\xC0\x04"
        );
    }

    #[test]
    fn test_write_qname_full_match() {
        let mut w = writer();
        w.write_qname("www.example.com.", true).unwrap();
        w.write_qname("www.example.com.", true).unwrap();

        assert_eq!(
            w.cur.into_inner(),
            b"\x03www\x07example\x03com\x00\xC0\x00"
        );
    }

    #[test]
    fn test_write_qname_opt_out() {
        let mut w = writer();
        w.write_qname("www.example.com.", true).unwrap();
        w.write_qname("www.example.com.", false).unwrap();

        assert_eq!(
            w.cur.into_inner(),
            b"\x03www\x07example\x03com\x00\x03www\x07example\x03com\x00"
        );
    }

    #[test]
    fn test_write_qname_missing_trailing_dot() {
        let mut w = writer();
        w.write_qname("example.com", true).unwrap();

        assert_eq!(w.cur.into_inner(), b"\x07example\x03com\x00");
    }

    #[test]
    fn test_write_qname_service_label() {
        let mut w = writer();
        w.write_qname("_ldap._tcp.example.com.", true).unwrap();

        assert_eq!(
            w.cur.into_inner(),
            b"\x04_ldap\x04_tcp\x07example\x03com\x00"
        );
    }

    #[test]
    fn test_write_qname_rejects_bad_names() {
        assert!(matches!(
            writer().write_qname("", true),
            Err(WireError::EmptyName)
        ));

        assert!(matches!(
            writer().write_qname("a..com.", true),
            Err(WireError::EmptyInnerLabel(_))
        ));

        assert!(matches!(
            writer().write_qname("exa mple.com.", true),
            Err(WireError::InvalidLabelByte { byte: b' ', .. })
        ));

        assert!(matches!(
            writer().write_qname("-example.com.", true),
            Err(WireError::InvalidLabelByte { byte: b'-', .. })
        ));

        assert!(matches!(
            writer().write_qname("example-.com.", true),
            Err(WireError::InvalidLabelByte { byte: b'-', .. })
        ));
    }

    #[test]
    fn test_write_qname_label_limits() {
        let ok = format!("{}.com.", "a".repeat(63));
        assert!(writer().write_qname(&ok, true).is_ok());

        let long = format!("{}.com.", "a".repeat(64));
        assert!(matches!(
            writer().write_qname(&long, true),
            Err(WireError::LabelTooLong)
        ));
    }

    #[test]
    fn test_write_qname_name_limits() {
        // Three 63 octet labels and one of 61, for 254 textual characters.
        let max = format!(
            "{a63}.{a63}.{a63}.{a61}.",
            a63 = "a".repeat(63),
            a61 = "a".repeat(61)
        );
        assert_eq!(max.len(), 254);
        assert!(writer().write_qname(&max, true).is_ok());

        let over = format!(
            "{a63}.{a63}.{a63}.{a62}.",
            a63 = "a".repeat(63),
            a62 = "a".repeat(62)
        );
        assert_eq!(over.len(), 255);
        assert!(matches!(
            writer().write_qname(&over, true),
            Err(WireError::NameTooLong(_))
        ));
    }

    #[test]
    fn test_write_qname_no_pointers_past_3fff() {
        let mut w = writer();
        w.cur.set_position(0x4000);
        w.write_qname("www.example.com.", true).unwrap();
        w.write_qname("www.example.com.", true).unwrap();

        // Both names written in full, nothing was memoised.
        assert_eq!(
            &w.cur.get_ref()[0x4000..],
            b"\x03www\x07example\x03com\x00\x03www\x07example\x03com\x00"
        );
    }

    #[test]
    fn test_caa_reserved_flags_masked() {
        let mut w = writer();
        w.write_resource(&Resource::CAA(CAA {
            flags: 0xFF,
            tag: "issue".to_string(),
            value: b"ca.example.net".to_vec(),
        }))
        .unwrap();

        // Only the issuer-critical bit survives encoding.
        assert_eq!(w.cur.get_ref()[0], 0x80);
    }

    #[test]
    fn test_header_round_trip() {
        let header = Header {
            id: 0xbeef,
            flags: Flags {
                qr: QR::Response,
                opcode: Opcode::Status,
                aa: true,
                tc: false,
                rd: true,
                ra: true,
                z: 0,
                rcode: Rcode::NXDomain,
            },
            qd_count: 1,
            an_count: 2,
            ns_count: 3,
            ar_count: 4,
        };

        let buf = header.to_vec().unwrap();
        assert_eq!(buf.len(), 12);

        let mut cur = Cursor::new(&buf[..]);
        assert_eq!(Header::parse(&mut cur).unwrap(), header);
    }

    #[test]
    fn test_patch_u16() {
        let mut cur = Cursor::new(Vec::new());
        cur.write_u8(0xAA).unwrap();

        let at = cur.position();
        cur.write_u16::<BE>(0).unwrap();
        cur.write_all(b"hello").unwrap();
        patch_u16(&mut cur, at).unwrap();

        assert_eq!(cur.into_inner(), b"\xAA\x00\x05hello");
    }
}
