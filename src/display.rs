//! Implements the Display trait for the various types, so they output
//! in `dig` style.
// Refer to https://github.com/tigeli/bind-utils/blob/master/bin/dig/dig.c for reference.

use crate::resource::Resource;
use crate::types::{Extension, Message, Question, Record};
use std::fmt;
use std::fmt::Display;

/// Displays this message in a format resembling `dig` output.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_header(f)?;

        // ;; OPT PSEUDOSECTION:
        // ; EDNS: version: 0, flags:; udp: 512
        if let Some(e) = &self.extension {
            writeln!(f, ";; OPT PSEUDOSECTION:")?;
            e.fmt(f)?;
        }

        // Always display the question section, but optionally
        // display the other sections.
        writeln!(f, ";; QUESTION SECTION:")?;
        for question in &self.questions {
            question.fmt(f)?;
        }
        writeln!(f)?;

        if !self.answers.is_empty() {
            writeln!(f, "; ANSWER SECTION:")?;
            for answer in &self.answers {
                answer.fmt(f)?;
            }
            writeln!(f)?;
        }

        if !self.authoritys.is_empty() {
            writeln!(f, "; AUTHORITY SECTION:")?;
            for answer in &self.authoritys {
                answer.fmt(f)?;
            }
            writeln!(f)?;
        }

        if !self.additionals.is_empty() {
            writeln!(f, "; ADDITIONAL SECTION:")?;
            for answer in &self.additionals {
                answer.fmt(f)?;
            }
            writeln!(f)?;
        }

        writeln!(f)
    }
}

impl Message {
    fn fmt_header(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            ";; ->>HEADER<<- opcode: {opcode}, status: {rcode}, id: {id}",
            opcode = self.header.flags.opcode,
            rcode = self.header.flags.rcode,
            id = self.header.id,
        )?;

        let mut flags = String::new();

        if self.header.flags.qr.to_bool() {
            flags.push_str(" qr")
        }
        if self.header.flags.aa {
            flags.push_str(" aa")
        }
        if self.header.flags.tc {
            flags.push_str(" tc")
        }
        if self.header.flags.rd {
            flags.push_str(" rd")
        }
        if self.header.flags.ra {
            flags.push_str(" ra")
        }

        let ar_count = self.additionals.len() + self.extension.is_some() as usize;

        writeln!(f, ";; flags:{flags}; QUERY: {qd_count}, ANSWER: {an_count}, AUTHORITY: {ns_count}, ADDITIONAL: {ar_count}",
            flags = flags,
            qd_count = self.questions.len(),
            an_count = self.answers.len(),
            ns_count = self.authoritys.len(),
            ar_count = ar_count,
        )?;

        writeln!(f)
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "; EDNS: version: {version}, flags:{flags}; udp: {payload_size}",
            version = self.version,
            flags = if self.dnssec_ok { " do" } else { "" },
            payload_size = self.payload_size,
        )
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "; {name:<18}      {class:4} {type:6}\n",
            name = self.name,
            class = self.class,
            r#type = self.r#type,
        )
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{name:<20} {ttl:>4} {class:4} {type:6} {resource}",
            name = self.name,
            ttl = self.ttl.as_secs(),
            class = self.class,
            r#type = type_str(&self.resource),
            resource = self.resource,
        )
    }
}

/// The TYPE column, with unknown types in the rfc3597 "TYPE1234" notation.
fn type_str(resource: &Resource) -> String {
    match resource.r#type() {
        Some(t) => t.to_string(),
        None => format!("TYPE{}", resource.type_value()),
    }
}

/// Opaque payloads display in the rfc3597 generic syntax, e.g. "\# 4 0A000001".
fn generic(octets: &[u8], f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "\\# {} ", octets.len())?;
    for b in octets {
        write!(f, "{:02X}", b)?;
    }
    Ok(())
}

fn printable(txt: &[u8]) -> &str {
    match std::str::from_utf8(txt) {
        // TODO Escape the " character (and maybe others)
        Ok(txt) => txt,
        Err(_e) => "invalid",
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::A(ip) => ip.fmt(f),
            Resource::AAAA(ip) => ip.fmt(f),

            Resource::NS(name) => name.fmt(f),
            Resource::MD(name) => name.fmt(f),
            Resource::MF(name) => name.fmt(f),
            Resource::CNAME(name) => name.fmt(f),
            Resource::MB(name) => name.fmt(f),
            Resource::MG(name) => name.fmt(f),
            Resource::MR(name) => name.fmt(f),
            Resource::PTR(name) => name.fmt(f),

            Resource::SOA(soa) => {
                // "ns1.google.com. dns-admin.google.com. 376337657 900 900 1800 60"
                write!(
                    f,
                    "{mname} {rname} {serial} {refresh} {retry} {expire} {minimum}",
                    mname = soa.mname,
                    rname = soa.rname,
                    serial = soa.serial,
                    refresh = soa.refresh.as_secs(),
                    retry = soa.retry.as_secs(),
                    expire = soa.expire.as_secs(),
                    minimum = soa.minimum.as_secs(),
                )
            }

            Resource::NULL(octets) => generic(octets, f),

            Resource::WKS(wks) => {
                write!(f, "{} {} ", wks.address, wks.protocol)?;
                for b in &wks.bitmap {
                    write!(f, "{:02X}", b)?;
                }
                Ok(())
            }

            Resource::HINFO(hinfo) => write!(
                f,
                "\"{cpu}\" \"{os}\"",
                cpu = printable(&hinfo.cpu),
                os = printable(&hinfo.os),
            ),

            Resource::MINFO(minfo) => write!(
                f,
                "{rmailbx} {emailbx}",
                rmailbx = minfo.rmailbx,
                emailbx = minfo.emailbx,
            ),

            Resource::MX(mx) => {
                // "10 aspmx.l.google.com."
                write!(
                    f,
                    "{preference} {exchange}",
                    preference = mx.preference,
                    exchange = mx.exchange,
                )
            }

            Resource::TXT(txt) => {
                let output = txt
                    .0
                    .iter()
                    .map(|txt| printable(txt))
                    .collect::<Vec<&str>>()
                    .join(" ");

                write!(f, "{}", output)
            }

            Resource::SRV(srv) => {
                // "5 0 389 ldap.google.com."
                write!(
                    f,
                    "{priority} {weight} {port} {name}",
                    priority = srv.priority,
                    weight = srv.weight,
                    port = srv.port,
                    name = srv.name,
                )
            }

            Resource::CAA(caa) => {
                // `0 issue "letsencrypt.org"`
                write!(
                    f,
                    "{flags} {tag} \"{value}\"",
                    flags = caa.flags,
                    tag = caa.tag,
                    value = printable(&caa.value),
                )
            }

            Resource::OPT(e) => write!(f, "OPT udp: {}", e.payload_size),

            Resource::Unknown { octets, .. } => generic(octets, f),
        }
    }
}
