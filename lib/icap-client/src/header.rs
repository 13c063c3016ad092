/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use bytes::BufMut;

/// Ordered ICAP header multimap.
///
/// Names are matched case-insensitively but written back with the case they
/// were first inserted with. Names keep their insertion order, and so do the
/// values of each name, duplicates included.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IcapHeaderMap {
    entries: Vec<(String, Vec<String>)>,
}

impl IcapHeaderMap {
    pub fn new() -> Self {
        IcapHeaderMap::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct header names.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    pub fn append<N, V>(&mut self, name: N, value: V)
    where
        N: Into<String>,
        V: Into<String>,
    {
        let name = name.into();
        match self.position(&name) {
            Some(p) => self.entries[p].1.push(value.into()),
            None => self.entries.push((name, vec![value.into()])),
        }
    }

    /// Replace all values of `name`, returning the old ones.
    pub fn insert<N, V>(&mut self, name: N, value: V) -> Option<Vec<String>>
    where
        N: Into<String>,
        V: Into<String>,
    {
        let name = name.into();
        match self.position(&name) {
            Some(p) => Some(std::mem::replace(
                &mut self.entries[p].1,
                vec![value.into()],
            )),
            None => {
                self.entries.push((name, vec![value.into()]));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        let p = self.position(name)?;
        Some(self.entries.remove(p).1)
    }

    #[inline]
    pub fn contains_key(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// The first value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|p| self.entries[p].1.first())
            .map(|v| v.as_str())
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        match self.position(name) {
            Some(p) => &self.entries[p].1,
            None => &[],
        }
    }

    /// Iterate over every (name, value) pair, one item per value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(name, values)| {
            values.iter().map(move |v| (name.as_str(), v.as_str()))
        })
    }

    pub fn for_each<F>(&self, mut call: F)
    where
        F: FnMut(&str, &str),
    {
        self.iter().for_each(|(name, value)| call(name, value));
    }

    /// Write one `Name: Value` line per value, leaving out header `skip`.
    pub(crate) fn write_to_buf(&self, buf: &mut Vec<u8>, skip: &str) {
        self.for_each(|name, value| {
            if name.eq_ignore_ascii_case(skip) {
                return;
            }
            buf.put_slice(name.as_bytes());
            buf.put_slice(b": ");
            buf.put_slice(value.as_bytes());
            buf.put_slice(b"\r\n");
        });
    }
}
