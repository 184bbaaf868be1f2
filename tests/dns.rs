//! End-to-end tests of the wire codec, with stored byte-for-byte
//! fixtures for a real query and response for nim-lang.org.

use dnswire::resource::*;
use dnswire::types::*;
use dnswire::WireError;
use pretty_assertions::assert_eq;
use std::time::Duration;

/// The 12 byte header of a recursive query with id 1 and one question.
const QUERY_HEADER: &str = "000101000001000000000000";

/// An A/IN question for nim-lang.org (18 bytes).
const QUESTION: &str = "086e696d2d6c616e67036f72670000010001";

/// A response to the query: two A records, both compressing the owner
/// name with a pointer to offset 12 (62 bytes in total).
const RESPONSE: &str = "000181800001000200000000\
                        086e696d2d6c616e67036f72670000010001\
                        c00c000100010000012c0004ac4384f2\
                        c00c000100010000012c00046815052a";

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fixture(s: &str) -> Vec<u8> {
    hex::decode(s).expect("invalid test fixture")
}

fn query() -> Message {
    let mut m = Message::default();
    m.header.id = 1;
    m.add_question("nim-lang.org", Type::A, Class::Internet);
    m
}

fn response() -> Message {
    Message::new(
        Header::response(1),
        vec![Question::new("nim-lang.org", Type::A, Class::Internet)],
        vec![
            Record::new(
                "nim-lang.org",
                Class::Internet,
                Duration::from_secs(300),
                Resource::A("172.67.132.242".parse().unwrap()),
            ),
            Record::new(
                "nim-lang.org",
                Class::Internet,
                Duration::from_secs(300),
                Resource::A("104.21.5.42".parse().unwrap()),
            ),
        ],
        Vec::new(),
        Vec::new(),
        None,
    )
    .unwrap()
}

#[test]
fn test_query_header() {
    init();

    let header = Header {
        id: 1,
        flags: Flags::default(),
        qd_count: 1,
        an_count: 0,
        ns_count: 0,
        ar_count: 0,
    };

    assert_eq!(header.to_vec().unwrap(), fixture(QUERY_HEADER));
}

#[test]
fn test_query_message() {
    init();

    let buf = query().to_vec().unwrap();

    assert_eq!(buf.len(), 30);
    assert_eq!(buf, fixture(&format!("{}{}", QUERY_HEADER, QUESTION)));

    // The question section alone sits right after the header.
    assert_eq!(buf[12..].to_vec(), fixture(QUESTION));
}

#[test]
fn test_tcp_query_message() {
    init();

    let buf = query().to_tcp_vec().unwrap();

    assert_eq!(
        buf,
        fixture(&format!("001e{}{}", QUERY_HEADER, QUESTION))
    );
}

#[test]
fn test_response_compresses_answer_names() {
    init();

    assert_eq!(response().to_vec().unwrap(), fixture(RESPONSE));
}

#[test]
fn test_response_round_trip() {
    init();

    let buf = fixture(RESPONSE);
    let m = Message::from_slice(&buf).unwrap();

    assert_eq!(m.questions[0].name, "nim-lang.org.");
    assert_eq!(m.header.qd_count, 1);
    assert_eq!(m.header.an_count, 2);
    assert_eq!(
        m.answers[0].resource,
        Resource::A("172.67.132.242".parse().unwrap())
    );
    assert_eq!(
        m.answers[1].resource,
        Resource::A("104.21.5.42".parse().unwrap())
    );
    assert_eq!(m.answers[0].ttl, Duration::from_secs(300));

    assert_eq!(m, response());

    // Re-encoding exercises compression again, giving the same 62 bytes.
    assert_eq!(m.to_vec().unwrap(), buf);
}

#[test]
fn test_tcp_round_trip() {
    init();

    let buf = response().to_tcp_vec().unwrap();
    assert_eq!(&buf[0..2], &[0x00, 0x3e]);

    assert_eq!(Message::from_tcp_slice(&buf).unwrap(), response());
}

#[test]
fn test_tcp_bad_framing() {
    init();

    let mut buf = response().to_tcp_vec().unwrap();

    buf.push(0);
    assert!(matches!(
        Message::from_tcp_slice(&buf),
        Err(WireError::TrailingBytes(1))
    ));

    buf.truncate(10);
    assert!(matches!(
        Message::from_tcp_slice(&buf),
        Err(WireError::TruncatedInput)
    ));
}

#[test]
fn test_truncated_message() {
    init();

    let buf = fixture(RESPONSE);

    // Chopping anywhere inside the message fails cleanly.
    assert!(matches!(
        Message::from_slice(&buf[..10]),
        Err(WireError::TruncatedInput)
    ));
    assert!(matches!(
        Message::from_slice(&buf[..40]),
        Err(WireError::TruncatedInput)
    ));
}

#[test]
fn test_trailing_bytes() {
    init();

    let mut buf = fixture(RESPONSE);
    buf.extend_from_slice(&[1, 2, 3]);

    assert!(matches!(
        Message::from_slice(&buf),
        Err(WireError::TrailingBytes(3))
    ));
}

#[test]
fn test_round_trip_every_rdata_type() {
    init();

    let zone = |name: &str, resource| {
        Record::new(name, Class::Internet, Duration::from_secs(3600), resource)
    };

    let m = Message::new(
        Header::response(42),
        vec![Question::new("example.com", Type::ANY, Class::Internet)],
        vec![
            zone("example.com", Resource::A("192.0.2.1".parse().unwrap())),
            zone("example.com", Resource::AAAA("2001:db8::1".parse().unwrap())),
            zone("example.com", Resource::NS("ns1.example.com.".to_string())),
            zone("example.com", Resource::MD("md.example.com.".to_string())),
            zone("example.com", Resource::MF("mf.example.com.".to_string())),
            zone("www.example.com", Resource::CNAME("example.com.".to_string())),
            zone("example.com", Resource::MB("mb.example.com.".to_string())),
            zone("example.com", Resource::MG("mg.example.com.".to_string())),
            zone("example.com", Resource::MR("mr.example.com.".to_string())),
            zone(
                "1.2.0.192.in-addr.arpa",
                Resource::PTR("example.com.".to_string()),
            ),
            zone(
                "example.com",
                Resource::SOA(SOA {
                    mname: "ns1.example.com.".to_string(),
                    rname: "hostmaster.example.com.".to_string(),
                    serial: 2022010900,
                    refresh: Duration::from_secs(7200),
                    retry: Duration::from_secs(900),
                    expire: Duration::from_secs(604800),
                    minimum: Duration::from_secs(86400),
                }),
            ),
            zone("example.com", Resource::NULL(vec![0xde, 0xad, 0xbe, 0xef])),
            zone(
                "example.com",
                Resource::WKS(WKS {
                    address: "192.0.2.1".parse().unwrap(),
                    protocol: 6,
                    bitmap: vec![0b0000_0000, 0b0000_0001],
                }),
            ),
            zone(
                "example.com",
                Resource::HINFO(HINFO {
                    cpu: b"VAX-11/780".to_vec(),
                    os: b"UNIX".to_vec(),
                }),
            ),
            zone(
                "example.com",
                Resource::MINFO(MINFO {
                    rmailbx: "admin.example.com.".to_string(),
                    emailbx: "errors.example.com.".to_string(),
                }),
            ),
            zone(
                "example.com",
                Resource::MX(MX {
                    preference: 10,
                    exchange: "mail.example.com.".to_string(),
                }),
            ),
            zone(
                "example.com",
                Resource::TXT(TXT(vec![b"v=spf1 -all".to_vec(), b"hello".to_vec()])),
            ),
            zone(
                "_ldap._tcp.example.com",
                Resource::SRV(SRV {
                    priority: 5,
                    weight: 0,
                    port: 389,
                    name: "ldap.example.com.".to_string(),
                }),
            ),
            zone(
                "example.com",
                Resource::CAA(CAA::new(false, "issue", b"letsencrypt.org")),
            ),
            zone(
                "example.com",
                Resource::Unknown {
                    r#type: 4660,
                    octets: vec![1, 2, 3, 4],
                },
            ),
        ],
        Vec::new(),
        Vec::new(),
        None,
    )
    .unwrap();

    let buf = m.to_vec().unwrap();
    let decoded = Message::from_slice(&buf).unwrap();

    assert_eq!(decoded, m);

    // And the re-encode is stable.
    assert_eq!(decoded.to_vec().unwrap(), buf);
}

#[test]
fn test_compression_writes_suffix_once() {
    init();

    let m = Message::new(
        Header::response(7),
        vec![Question::new("www.example.com", Type::MX, Class::Internet)],
        vec![Record::new(
            "www.example.com",
            Class::Internet,
            Duration::from_secs(300),
            Resource::MX(MX {
                preference: 10,
                exchange: "mail.example.com.".to_string(),
            }),
        )],
        Vec::new(),
        Vec::new(),
        None,
    )
    .unwrap();

    let buf = m.to_vec().unwrap();

    // "example" appears in three names but is written exactly once; the
    // other occurrences are 14 bit pointers.
    let example = b"\x07example";
    let count = buf
        .windows(example.len())
        .filter(|w| w == example)
        .count();
    assert_eq!(count, 1);

    assert_eq!(Message::from_slice(&buf).unwrap(), m);
}

#[test]
fn test_srv_target_is_not_compressed() {
    init();

    let m = Message::new(
        Header::response(7),
        vec![Question::new(
            "_ldap._tcp.example.com",
            Type::SRV,
            Class::Internet,
        )],
        vec![Record::new(
            "_ldap._tcp.example.com",
            Class::Internet,
            Duration::from_secs(300),
            Resource::SRV(SRV {
                priority: 5,
                weight: 0,
                port: 389,
                name: "example.com.".to_string(),
            }),
        )],
        Vec::new(),
        Vec::new(),
        None,
    )
    .unwrap();

    let buf = m.to_vec().unwrap();

    // "example.com" was already written in the question, but the SRV
    // target must still be spelled out in full.
    let full = b"\x07example\x03com\x00";
    let count = buf.windows(full.len()).filter(|w| w == full).count();
    assert_eq!(count, 2);

    assert_eq!(Message::from_slice(&buf).unwrap(), m);
}

#[test]
fn test_extended_rcode_folds_into_opt() {
    init();

    let mut header = Header::response(9);
    header.flags.rcode = Rcode::BADVERS;

    let m = Message::new(header, Vec::new(), Vec::new(), Vec::new(), Vec::new(), None).unwrap();

    // The builder created a default OPT to carry the upper bits.
    let e = m.extension.as_ref().unwrap();
    assert_eq!(e.payload_size, 512);
    assert_eq!(e.extend_rcode, 1);
    assert_eq!(m.header.ar_count, 1);

    let buf = m.to_vec().unwrap();

    // Only the low nibble stays in the header.
    assert_eq!(buf[3] & 0x0F, 0);

    let decoded = Message::from_slice(&buf).unwrap();
    assert_eq!(decoded.header.flags.rcode, Rcode::BADVERS);
    assert_eq!(decoded, m);
}

#[test]
fn test_unassigned_rcode_is_preserved() {
    init();

    let mut header = Header::response(9);
    header.flags.rcode = Rcode::Reserved(4095);

    let m = Message::new(header, Vec::new(), Vec::new(), Vec::new(), Vec::new(), None).unwrap();
    let decoded = Message::from_slice(&m.to_vec().unwrap()).unwrap();

    assert_eq!(decoded.header.flags.rcode, Rcode::Reserved(4095));
}

#[test]
fn test_edns_options_round_trip() {
    init();

    let mut m = Message::default();
    m.header.id = 99;
    m.add_question("example.com", Type::A, Class::Internet);
    m.add_extension(Extension {
        payload_size: 4096,
        dnssec_ok: true,
        options: vec![EdnsOption {
            code: 10, // COOKIE
            data: vec![1, 2, 3, 4, 5, 6, 7, 8],
        }],
        ..Default::default()
    });

    assert_eq!(m.header.ar_count, 1);

    let decoded = Message::from_slice(&m.to_vec().unwrap()).unwrap();
    assert_eq!(decoded, m);
}

#[test]
fn test_multiple_opt_records_are_kept() {
    init();

    // Two OPT records in the additional section violate rfc6891. The
    // first becomes the extension, the second is kept as a plain record.
    let buf = fixture(&format!(
        "000a8180000000000000 0002 {opt1} {opt2}",
        opt1 = "0000290400000000000000",
        opt2 = "0000290200010080000000"
    ).replace(' ', ""));

    let m = Message::from_slice(&buf).unwrap();

    let e = m.extension.as_ref().unwrap();
    assert_eq!(e.payload_size, 1024);
    assert_eq!(e.extend_rcode, 0);

    assert_eq!(m.additionals.len(), 1);
    match &m.additionals[0].resource {
        Resource::OPT(extra) => {
            assert_eq!(extra.payload_size, 512);
            assert_eq!(extra.extend_rcode, 1);
            assert!(extra.dnssec_ok);
        }
        other => panic!("expected an OPT record, got {:?}", other),
    }
}

#[test]
fn test_unknown_type_re_encodes_verbatim() {
    init();

    // One record of the unassigned type 4660 with 4 opaque bytes.
    let buf = fixture("000181800000000100000000 00 1234 0001 00000e10 0004 deadbeef".replace(' ', "").as_str());

    let m = Message::from_slice(&buf).unwrap();
    assert_eq!(
        m.answers[0].resource,
        Resource::Unknown {
            r#type: 4660,
            octets: vec![0xde, 0xad, 0xbe, 0xef],
        }
    );

    assert_eq!(m.to_vec().unwrap(), buf);
}

#[test]
fn test_non_internet_class_stays_opaque() {
    init();

    // A TXT record in the CH class: the payload must not be interpreted.
    let buf = fixture("000181800000000100000000 076368616f7330300000100003000002580006 0568656c6c6f".replace(' ', "").as_str());

    let m = Message::from_slice(&buf).unwrap();
    assert_eq!(m.answers[0].class, Class::Chaos);
    assert_eq!(
        m.answers[0].resource,
        Resource::Unknown {
            r#type: Type::TXT as u16,
            octets: b"\x05hello".to_vec(),
        }
    );

    assert_eq!(m.to_vec().unwrap(), buf);
}

#[test]
fn test_pointer_must_jump_backwards() {
    init();

    // A question name that is a pointer to itself.
    let buf = fixture("000101000001000000000000 c00c 00010001".replace(' ', "").as_str());

    assert!(matches!(
        Message::from_slice(&buf),
        Err(WireError::InvalidOffset(12))
    ));
}

#[test]
fn test_section_count_overflow() {
    init();

    let questions = vec![Question::new("a.example.com", Type::A, Class::Internet); 65_536];

    assert!(matches!(
        Message::new(
            Header::default(),
            questions,
            Vec::new(),
            Vec::new(),
            Vec::new(),
            None
        ),
        Err(WireError::SectionCountOverflow(65_536))
    ));
}

#[test]
fn test_question_name_normalisation() {
    init();

    assert_eq!(Question::new("", Type::A, Class::Internet).name, ".");
    assert_eq!(
        Question::new("nim-lang.org", Type::A, Class::Internet).name,
        "nim-lang.org."
    );
    assert_eq!(
        Question::new("nim-lang.org.", Type::A, Class::Internet).name,
        "nim-lang.org."
    );
}

#[test]
fn test_display_smoke() {
    init();

    let s = format!("{}", Message::from_slice(&fixture(RESPONSE)).unwrap());

    assert!(s.contains(";; ->>HEADER<<- opcode: Query, status: NoError, id: 1"));
    assert!(s.contains("; ANSWER SECTION:"));
    assert!(s.contains("172.67.132.242"));
    assert!(s.contains("nim-lang.org."));
}
