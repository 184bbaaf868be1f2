use crate::resource::Resource;
use std::fmt;
use std::time::Duration;
use strum_macros::{Display, EnumString};

/// DNS Message that serves as the root of all DNS requests and responses.
///
/// # Examples
///
/// For constructing a message and encoding:
///
/// ```rust
/// use dnswire::Message;
/// use dnswire::types::*;
///
/// // Construct a simple query.
/// let mut m = Message::default();
/// m.add_question("bramp.net", Type::A, Class::Internet);
///
/// // Encode the query as a Vec<u8>, ready to be sent over UDP.
/// let req = m.to_vec().expect("failed to encode DNS request");
///
/// // Bytes received from a server turn back into a message.
/// let m = Message::from_slice(&req).expect("invalid message");
/// println!("{}", m);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// The fixed 12-byte header. The four section counts it carries are
    /// recomputed from the section lists whenever the message is encoded.
    pub header: Header,

    /// The questions.
    pub questions: Vec<Question>,

    /// The answer records.
    pub answers: Vec<Record>,

    /// The authoritive records.
    pub authoritys: Vec<Record>,

    /// The additional records, excluding the EDNS(0) extension.
    pub additionals: Vec<Record>,

    /// Optional EDNS(0) record. On the wire this is the first OPT
    /// pseudo-record of the additional section.
    pub extension: Option<Extension>,
}

/// The fixed header at the front of every DNS message, as defined by
/// [rfc1035] section 4.1.1.
///
/// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Header {
    /// 16-bit identifier assigned by the program that generates any kind of
    /// query. This identifier is copied into the corresponding reply and can be
    /// used by the requester to match up replies to outstanding queries.
    pub id: u16,

    /// The packed flag fields occupying bytes 2 and 3 of the header.
    pub flags: Flags,

    /// Number of entries in the question section.
    pub qd_count: u16,

    /// Number of records in the answer section.
    pub an_count: u16,

    /// Number of records in the authority section.
    pub ns_count: u16,

    /// Number of records in the additional section, including any OPT
    /// pseudo-record.
    pub ar_count: u16,
}

/// The flag and code fields packed into bytes 2 and 3 of the [`Header`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Flags {
    /// Specifies whether this message is a query (0), or a response (1).
    pub qr: QR,

    /// Specifies kind of query in this message. 0 represents a standard query.
    /// See <https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-5>
    pub opcode: Opcode,

    /// Authoritative Answer - Specifies that the responding name server is an
    /// authority for the domain name in question section.
    pub aa: bool,

    /// Truncation - specifies that this message was truncated.
    pub tc: bool,

    /// Recursion Desired - this bit directs the name server to pursue the query
    /// recursively.
    pub rd: bool,

    /// Recursion Available - this bit is set or cleared in a response, and
    /// denotes whether recursive query support is available in the name server.
    pub ra: bool,

    /// Z Reserved for future use. Three bits; zero on every message the
    /// builders produce, preserved as decoded otherwise.
    pub z: u8,

    /// Response code. Values above 15 require an EDNS(0) [`Extension`] to
    /// carry the upper bits.
    pub rcode: Rcode,
}

/// Defaults to the flags of a recursive query.
impl Default for Flags {
    fn default() -> Self {
        Flags {
            qr: QR::Query,
            opcode: Opcode::Query,
            aa: false,
            tc: false,
            rd: true,
            ra: false,
            z: 0,
            rcode: Rcode::NoError,
        }
    }
}

impl Flags {
    /// The flags of a typical response to a recursive query.
    pub fn response() -> Flags {
        Flags {
            qr: QR::Response,
            ra: true,
            ..Flags::default()
        }
    }
}

/// Question struct containing a domain name, question [`Type`] and question [`Class`].
#[derive(Clone, Debug, PartialEq)]
pub struct Question {
    /// The domain name in question, stored with a trailing dot.
    pub name: String,

    /// The question's type.
    ///
    /// All Type's are valid, including the pseudo types (e.g [`Type::ANY`]).
    pub r#type: Type,

    /// The question's class.
    pub class: Class,
}

impl Question {
    /// Creates a question, normalising the domain to end with a dot.
    pub fn new(name: &str, r#type: Type, class: Class) -> Question {
        Question {
            name: crate::dns::normalise_name(name),
            r#type,
            class,
        }
    }
}

/// Resource Record (RR) returned by DNS servers containing a answer to the question.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// A domain name, stored with a trailing dot.
    pub name: String,

    /// The resource's class.
    pub class: Class,

    /// The number of seconds that the resource record may be cached
    /// before the source of the information should again be consulted.
    /// Zero is interpreted to mean that the RR can only be used for the
    /// transaction in progress.
    pub ttl: Duration,

    /// The actual resource.
    pub resource: Resource,
}

impl Record {
    /// Creates a record, normalising the domain to end with a dot. The
    /// record's TYPE is the one implied by `resource`.
    pub fn new(name: &str, class: Class, ttl: Duration, resource: Resource) -> Record {
        Record {
            name: crate::dns::normalise_name(name),
            class,
            ttl,
            resource,
        }
    }

    /// The record's TYPE, or `None` for [`Resource::Unknown`] payloads.
    pub fn r#type(&self) -> Option<Type> {
        self.resource.r#type()
    }
}

/// EDNS(0) extension record as defined in [rfc2671] and [rfc6891].
///
/// On the wire this is a pseudo resource record of [`Type::OPT`] whose
/// class and ttl slots carry the payload size, extended RCODE, version
/// and flags instead.
///
/// [rfc2671]: https://datatracker.ietf.org/doc/html/rfc2671
/// [rfc6891]: https://datatracker.ietf.org/doc/html/rfc6891
#[derive(Clone, Debug, PartialEq)]
pub struct Extension {
    /// Requestor's UDP payload size.
    pub payload_size: u16,

    /// Upper 8 bits of the extended 12-bit RCODE. The low 4 bits stay in
    /// the header.
    pub extend_rcode: u8,

    /// Version of the extension.
    pub version: u8,

    /// DNSSEC OK bit as defined by [rfc3225].
    ///
    /// [rfc3225]: https://datatracker.ietf.org/doc/html/rfc3225
    pub dnssec_ok: bool,

    /// The remaining 15 bits of the flags word. Zero unless decoded
    /// otherwise.
    pub z: u16,

    /// EDNS(0) options, kept in wire order.
    pub options: Vec<EdnsOption>,
}

impl Default for Extension {
    fn default() -> Self {
        Extension {
            payload_size: 4096,
            extend_rcode: 0,
            version: 0,
            dnssec_ok: false,
            z: 0,
            options: Vec::default(),
        }
    }
}

/// A single `{code, data}` option inside an [`Extension`].
#[derive(Clone, Debug, PartialEq)]
pub struct EdnsOption {
    /// Option code, see <https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-11>
    pub code: u16,

    /// Opaque option data.
    pub data: Vec<u8>,
}

/// Query or Response bit.
#[derive(Copy, Clone, Debug, EnumString, PartialEq)]
pub enum QR {
    Query = 0,
    Response = 1,
}

/// Defaults to [`QR::Query`].
impl Default for QR {
    fn default() -> Self {
        QR::Query
    }
}

impl QR {
    pub fn from_bool(b: bool) -> QR {
        match b {
            false => QR::Query,
            true => QR::Response,
        }
    }

    pub fn to_bool(self) -> bool {
        match self {
            QR::Query => false,
            QR::Response => true,
        }
    }
}

/// Specifies kind of query in this message. See [rfc1035], [rfc6895] and [DNS Parameters].
///
/// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
/// [rfc6895]: https://datatracker.ietf.org/doc/html/rfc6895
/// [DNS Parameters]: https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-5
#[derive(Copy, Clone, Debug, Display, EnumString, FromPrimitive, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
#[repr(u8)] // Really only 4 bits
pub enum Opcode {
    /// Query.
    Query = 0,

    /// Inverse Query (OBSOLETE). See [rfc3425].
    ///
    /// [rfc3425]: https://datatracker.ietf.org/doc/html/rfc3425
    IQuery = 1,
    Status = 2,

    /// See [rfc1996]
    ///
    /// [rfc1996]: https://datatracker.ietf.org/doc/html/rfc1996
    Notify = 4,

    /// See [rfc2136]
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    Update = 5,

    /// DNS Stateful Operations (DSO). See [rfc8490]
    ///
    /// [rfc8490]: https://datatracker.ietf.org/doc/html/rfc8490
    DSO = 6,
    // 3 and 7-15 Remain unassigned.
}

/// Defaults to [`Opcode::Query`].
impl Default for Opcode {
    fn default() -> Self {
        Opcode::Query
    }
}

/// Response Codes.
/// See [rfc1035], [rfc6895] and [DNS Parameters].
///
/// Codes above 15 only appear in messages carrying an EDNS(0)
/// [`Extension`]; the header keeps the low 4 bits and the extension the
/// upper 8. Values this library has no name for decode into
/// [`Rcode::Reserved`] and are preserved on re-encode.
///
/// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
/// [rfc6895]: https://datatracker.ietf.org/doc/html/rfc6895
/// [DNS Parameters]: https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-6
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Rcode {
    /// No Error
    NoError,

    /// Format Error
    FormErr,

    /// Server Failure
    ServFail,

    /// Non-Existent Domain
    NXDomain,

    /// Not Implemented
    NotImp,

    /// Query Refused
    Refused,

    /// Name Exists when it should not. See [rfc2136] and [rfc6672].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    /// [rfc6672]: https://datatracker.ietf.org/doc/html/rfc6672
    YXDomain,

    /// RR Set Exists when it should not. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    YXRRSet,

    /// RR Set that should exist does not. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    NXRRSet,

    /// Note on error number 9 (NotAuth): This error number means either
    /// "Not Authoritative" [rfc2136] or "Not Authorized" [rfc2845].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    /// [rfc2845]: https://datatracker.ietf.org/doc/html/rfc2845
    NotAuth,

    /// Name not contained in zone. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    NotZone,

    /// DSO-TYPE Not Implemented. See [rfc8490].
    ///
    /// [rfc8490]: https://datatracker.ietf.org/doc/html/rfc8490
    DSOTYPENI,

    /// Bad OPT Version [rfc6891] or TSIG Signature Failure [rfc8945].
    ///
    /// [rfc6891]: https://datatracker.ietf.org/doc/html/rfc6891
    /// [rfc8945]: https://datatracker.ietf.org/doc/html/rfc8945
    BADVERS,

    /// Key not recognized. See [rfc8945].
    ///
    /// [rfc8945]: https://datatracker.ietf.org/doc/html/rfc8945
    BADKEY,

    /// Signature out of time window. See [rfc8945].
    ///
    /// [rfc8945]: https://datatracker.ietf.org/doc/html/rfc8945
    BADTIME,

    /// Bad TKEY Mode. See [rfc2930].
    ///
    /// [rfc2930]: https://datatracker.ietf.org/doc/html/rfc2930
    BADMODE,

    /// Duplicate key name. See [rfc2930].
    ///
    /// [rfc2930]: https://datatracker.ietf.org/doc/html/rfc2930
    BADNAME,

    /// Algorithm not supported. See [rfc2930].
    ///
    /// [rfc2930]: https://datatracker.ietf.org/doc/html/rfc2930
    BADALG,

    /// Bad Truncation. See [rfc8945].
    ///
    /// [rfc8945]: https://datatracker.ietf.org/doc/html/rfc8945
    BADTRUNC,

    /// Bad/missing Server Cookie. See [rfc7873].
    ///
    /// [rfc7873]: https://datatracker.ietf.org/doc/html/rfc7873
    BADCOOKIE,

    /// A code without an assigned meaning, preserved as received.
    Reserved(u16),
}

impl Rcode {
    pub fn from_u16(value: u16) -> Rcode {
        match value {
            0 => Rcode::NoError,
            1 => Rcode::FormErr,
            2 => Rcode::ServFail,
            3 => Rcode::NXDomain,
            4 => Rcode::NotImp,
            5 => Rcode::Refused,
            6 => Rcode::YXDomain,
            7 => Rcode::YXRRSet,
            8 => Rcode::NXRRSet,
            9 => Rcode::NotAuth,
            10 => Rcode::NotZone,
            11 => Rcode::DSOTYPENI,
            16 => Rcode::BADVERS,
            17 => Rcode::BADKEY,
            18 => Rcode::BADTIME,
            19 => Rcode::BADMODE,
            20 => Rcode::BADNAME,
            21 => Rcode::BADALG,
            22 => Rcode::BADTRUNC,
            23 => Rcode::BADCOOKIE,
            n => Rcode::Reserved(n),
        }
    }

    pub fn to_u16(self) -> u16 {
        match self {
            Rcode::NoError => 0,
            Rcode::FormErr => 1,
            Rcode::ServFail => 2,
            Rcode::NXDomain => 3,
            Rcode::NotImp => 4,
            Rcode::Refused => 5,
            Rcode::YXDomain => 6,
            Rcode::YXRRSet => 7,
            Rcode::NXRRSet => 8,
            Rcode::NotAuth => 9,
            Rcode::NotZone => 10,
            Rcode::DSOTYPENI => 11,
            Rcode::BADVERS => 16,
            Rcode::BADKEY => 17,
            Rcode::BADTIME => 18,
            Rcode::BADMODE => 19,
            Rcode::BADNAME => 20,
            Rcode::BADALG => 21,
            Rcode::BADTRUNC => 22,
            Rcode::BADCOOKIE => 23,
            Rcode::Reserved(n) => n,
        }
    }
}

/// Defaults to [`Rcode::NoError`].
impl Default for Rcode {
    fn default() -> Self {
        Rcode::NoError
    }
}

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rcode::Reserved(n) => write!(f, "RCODE{}", n),
            _ => write!(f, "{:?}", self),
        }
    }
}

/// Resource Record Type, for example, A, CNAME or SOA.
#[derive(Copy, Clone, Debug, Display, EnumString, FromPrimitive, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
#[repr(u16)]
pub enum Type {
    Reserved = 0,

    /// (Default) IPv4 Address.
    A = 1,
    NS = 2,

    /// Mail destination (OBSOLETE, use MX).
    MD = 3,

    /// Mail forwarder (OBSOLETE, use MX).
    MF = 4,
    CNAME = 5,
    SOA = 6,

    /// Mailbox domain name (EXPERIMENTAL).
    MB = 7,

    /// Mail group member (EXPERIMENTAL).
    MG = 8,

    /// Mail rename domain name (EXPERIMENTAL).
    MR = 9,

    /// Opaque payload (EXPERIMENTAL).
    NULL = 10,

    /// Well known service description.
    WKS = 11,

    /// Domain name pointer. See [`util::reverse()`] to create a valid domain name from a IP address.
    ///
    /// [`util::reverse()`]: crate::util::reverse()
    PTR = 12,

    /// Host information.
    HINFO = 13,

    /// Mailbox or mail list information.
    MINFO = 14,

    /// Mail exchange.
    MX = 15,

    /// Text strings.
    TXT = 16,

    /// IPv6 Address.
    AAAA = 28,

    /// Server Selection
    SRV = 33,

    /// EDNS(0) Opt type. See [rfc3225] and [rfc6891].
    ///
    /// [rfc3225]: https://datatracker.ietf.org/doc/html/rfc3225
    /// [rfc6891]: https://datatracker.ietf.org/doc/html/rfc6891
    OPT = 41,

    /// Any record type.
    /// Only valid as a Question Type.
    ANY = 255,

    /// Certification Authority Authorization. See [rfc8659].
    ///
    /// [rfc8659]: https://datatracker.ietf.org/doc/html/rfc8659
    CAA = 257,
}

/// Defaults to [`Type::ANY`].
impl Default for Type {
    fn default() -> Self {
        Type::ANY
    }
}

/// Resource Record Class, for example Internet.
#[derive(Copy, Clone, Debug, Display, EnumString, FromPrimitive, PartialEq)]
#[repr(u16)]
pub enum Class {
    /// Reserved per [RFC6895]
    ///
    /// [rfc6895]: https://datatracker.ietf.org/doc/html/rfc6895
    Reserved = 0,

    /// (Default) The Internet (IN), see [rfc1035]. The only class this
    /// library decodes record data for; records of the other classes keep
    /// their payload opaque.
    ///
    /// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
    #[strum(serialize = "IN")]
    Internet = 1,

    /// CSNET (CS), obsolete (used only for examples in some obsolete RFCs).
    #[strum(serialize = "CS")]
    CsNet = 2,

    /// Chaosnet (CH), obsolete LAN protocol created at MIT in the mid-1970s.
    #[strum(serialize = "CH")]
    Chaos = 3,

    /// Hesiod (HS), an information service developed by MIT's Project Athena.
    #[strum(serialize = "HS")]
    Hesiod = 4,

    /// No class specified, see [rfc2136]
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    None = 254,

    /// * (ANY) See [rfc1035]
    ///
    /// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
    #[strum(serialize = "*")]
    Any = 255,
    //     5-253     Unassigned
    //   256-65279   Unassigned
    // 65280-65534   Reserved for Private Use    [RFC6895]
    // 65535         Reserved    [RFC6895]
}

/// Defaults to [`Class::Internet`].
impl Default for Class {
    fn default() -> Self {
        Class::Internet
    }
}
