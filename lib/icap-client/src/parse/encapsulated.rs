/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use atoi::FromRadix10Checked;

use super::EncapsulatedParseError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EncapsulatedKey {
    ReqHdr,
    ResHdr,
    ReqBody,
    ResBody,
    OptBody,
    NullBody,
}

impl EncapsulatedKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncapsulatedKey::ReqHdr => "req-hdr",
            EncapsulatedKey::ResHdr => "res-hdr",
            EncapsulatedKey::ReqBody => "req-body",
            EncapsulatedKey::ResBody => "res-body",
            EncapsulatedKey::OptBody => "opt-body",
            EncapsulatedKey::NullBody => "null-body",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let key = match name.to_ascii_lowercase().as_str() {
            "req-hdr" => EncapsulatedKey::ReqHdr,
            "res-hdr" => EncapsulatedKey::ResHdr,
            "req-body" => EncapsulatedKey::ReqBody,
            "res-body" => EncapsulatedKey::ResBody,
            "opt-body" => EncapsulatedKey::OptBody,
            "null-body" => EncapsulatedKey::NullBody,
            _ => return None,
        };
        Some(key)
    }

    /// Body class keys, `null-body` included, may only close the list.
    pub fn is_body_class(&self) -> bool {
        !matches!(self, EncapsulatedKey::ReqHdr | EncapsulatedKey::ResHdr)
    }

    /// Whether a chunked body follows the header segments.
    pub fn has_body(&self) -> bool {
        matches!(
            self,
            EncapsulatedKey::ReqBody | EncapsulatedKey::ResBody | EncapsulatedKey::OptBody
        )
    }
}

impl fmt::Display for EncapsulatedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EncapsulatedEntry {
    pub key: EncapsulatedKey,
    pub offset: usize,
}

/// The ordered entry list carried in the `Encapsulated` header.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Encapsulated {
    entries: Vec<EncapsulatedEntry>,
}

/// A header segment resolved from two successive offsets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct HeaderSegment {
    pub(crate) key: EncapsulatedKey,
    pub(crate) len: usize,
}

impl Encapsulated {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Encapsulated {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, key: EncapsulatedKey, offset: usize) {
        self.entries.push(EncapsulatedEntry { key, offset });
    }

    pub fn entries(&self) -> &[EncapsulatedEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn parse(value: &str) -> Result<Self, EncapsulatedParseError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(EncapsulatedParseError::Empty);
        }

        let mut encapsulated = Encapsulated::with_capacity(4);
        let mut prev: Option<EncapsulatedEntry> = None;
        for item in value.split(',') {
            let item = item.trim();
            let (name, offset) = item
                .split_once('=')
                .ok_or_else(|| EncapsulatedParseError::NoDelimiter(item.to_string()))?;
            let key = EncapsulatedKey::from_name(name.trim())
                .ok_or_else(|| EncapsulatedParseError::UnknownKey(name.to_string()))?;
            let offset_str = offset.trim();
            let offset = match usize::from_radix_10_checked(offset_str.as_bytes()) {
                (Some(offset), len) if len > 0 && len == offset_str.len() => offset,
                _ => return Err(EncapsulatedParseError::InvalidOffset(item.to_string())),
            };

            if let Some(prev) = prev {
                if prev.key.is_body_class() {
                    return Err(EncapsulatedParseError::BodyNotLast(prev.key.as_str()));
                }
                if offset < prev.offset {
                    return Err(EncapsulatedParseError::OffsetNotIncreasing(key.as_str()));
                }
            }
            if encapsulated.entries.iter().any(|e| e.key == key) {
                return Err(EncapsulatedParseError::DuplicateKey(key.as_str()));
            }

            let entry = EncapsulatedEntry { key, offset };
            encapsulated.entries.push(entry);
            prev = Some(entry);
        }

        match prev {
            Some(last) if last.key.is_body_class() => Ok(encapsulated),
            _ => Err(EncapsulatedParseError::MissingBodyEntry),
        }
    }

    /// Length of the data before the first entry, normally 0.
    pub(crate) fn leading_len(&self) -> usize {
        self.entries.first().map(|e| e.offset).unwrap_or(0)
    }

    pub(crate) fn header_segments(&self) -> impl Iterator<Item = HeaderSegment> + '_ {
        self.entries.windows(2).filter_map(|pair| {
            let (this, next) = (pair[0], pair[1]);
            if this.key.is_body_class() {
                None
            } else {
                Some(HeaderSegment {
                    key: this.key,
                    len: next.offset - this.offset,
                })
            }
        })
    }

    pub fn body_key(&self) -> Option<EncapsulatedKey> {
        self.entries
            .last()
            .map(|e| e.key)
            .filter(|key| key.is_body_class())
    }
}

impl fmt::Display for Encapsulated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = itoa::Buffer::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(entry.key.as_str())?;
            f.write_str("=")?;
            f.write_str(buf.format(entry.offset))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reqmod() {
        let e = Encapsulated::parse("req-hdr=0, req-body=412").unwrap();
        assert_eq!(e.entries().len(), 2);
        assert_eq!(e.leading_len(), 0);
        assert_eq!(e.body_key(), Some(EncapsulatedKey::ReqBody));
        let segments: Vec<_> = e.header_segments().collect();
        assert_eq!(
            segments,
            vec![HeaderSegment {
                key: EncapsulatedKey::ReqHdr,
                len: 412
            }]
        );
        assert_eq!(e.to_string(), "req-hdr=0, req-body=412");
    }

    #[test]
    fn respmod() {
        let e = Encapsulated::parse("req-hdr=0, res-hdr=137, res-body=296").unwrap();
        let segments: Vec<_> = e.header_segments().collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].len, 137);
        assert_eq!(segments[1].key, EncapsulatedKey::ResHdr);
        assert_eq!(segments[1].len, 159);
        assert!(e.body_key().unwrap().has_body());
    }

    #[test]
    fn null_body_only() {
        let e = Encapsulated::parse("null-body=0").unwrap();
        assert_eq!(e.header_segments().count(), 0);
        assert_eq!(e.body_key(), Some(EncapsulatedKey::NullBody));
        assert!(!EncapsulatedKey::NullBody.has_body());
    }

    #[test]
    fn leading_junk() {
        let e = Encapsulated::parse("req-hdr=5, null-body=20").unwrap();
        assert_eq!(e.leading_len(), 5);
        assert_eq!(e.header_segments().next().unwrap().len, 15);
    }

    #[test]
    fn body_not_last() {
        assert_eq!(
            Encapsulated::parse("req-body=0, res-hdr=10"),
            Err(EncapsulatedParseError::BodyNotLast("req-body"))
        );
        assert_eq!(
            Encapsulated::parse("null-body=0, null-body=0"),
            Err(EncapsulatedParseError::BodyNotLast("null-body"))
        );
    }

    #[test]
    fn malformed() {
        assert_eq!(
            Encapsulated::parse("foo-hdr=0, null-body=2"),
            Err(EncapsulatedParseError::UnknownKey("foo-hdr".to_string()))
        );
        assert!(matches!(
            Encapsulated::parse("req-hdr, null-body=2"),
            Err(EncapsulatedParseError::NoDelimiter(_))
        ));
        assert!(matches!(
            Encapsulated::parse("req-hdr=x, null-body=2"),
            Err(EncapsulatedParseError::InvalidOffset(_))
        ));
        assert_eq!(
            Encapsulated::parse("req-hdr=0, res-hdr=0, req-hdr=3, null-body=4"),
            Err(EncapsulatedParseError::DuplicateKey("req-hdr"))
        );
        assert_eq!(
            Encapsulated::parse("req-hdr=10, null-body=4"),
            Err(EncapsulatedParseError::OffsetNotIncreasing("null-body"))
        );
        assert_eq!(
            Encapsulated::parse("req-hdr=0"),
            Err(EncapsulatedParseError::MissingBodyEntry)
        );
        assert_eq!(Encapsulated::parse(" "), Err(EncapsulatedParseError::Empty));
    }

    #[test]
    fn offset_overflow() {
        assert!(matches!(
            Encapsulated::parse("res-hdr=0, null-body=99999999999999999999999"),
            Err(EncapsulatedParseError::InvalidOffset(_))
        ));
        assert!(matches!(
            Encapsulated::parse("res-hdr=0, null-body=18446744073709551616"),
            Err(EncapsulatedParseError::InvalidOffset(_))
        ));
        let e = Encapsulated::parse("res-hdr=0, null-body=18446744073709551615").unwrap();
        assert_eq!(e.entries()[1].offset, usize::MAX);
    }
}
