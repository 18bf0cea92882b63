//! Conversion between display prefixes and URL path tokens.
//!
//! `10.0.0.0/24` travels as `10_0_0_0_24`. A token with four parts is a bare
//! address, five or more is a CIDR block whose last part is the mask length.

const SEPARATOR: char = '_';

pub fn encode(prefix: &str) -> String {
    prefix.replace(['.', '/'], "_")
}

pub fn decode(token: &str) -> String {
    let mut parts: Vec<&str> = token.split(SEPARATOR).collect();
    if parts.len() >= 5 {
        let len = parts.pop().unwrap_or_default();
        format!("{}/{}", parts.join("."), len)
    } else {
        token.replace(SEPARATOR, ".")
    }
}
