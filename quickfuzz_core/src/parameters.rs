/// Key/value pairs that are substituted into every payload right before it is sent, e.g. to put
/// the target address into the `Host` header of an HTTP request.
///
/// The table remembers the insertion order. Substitution is sequential: the first pair is
/// replaced in the whole buffer, then the second pair in the result of the first, and so on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterTable {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
}

impl ParameterTable {
    /// Creates an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key/value pair. An existing key gets the new value but keeps its position.
    /// Returns the number of entries in the table.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> usize {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
        self.entries.len()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    /// Applies every pair to `data`, one pair after the other.
    #[must_use]
    pub fn apply(&self, data: &[u8]) -> Vec<u8> {
        self.iter()
            .fold(data.to_vec(), |acc, (key, value)| replace_all(&acc, key, value))
    }
}

/// Replaces every non-overlapping occurrence of `needle`, scanning left to right. An empty needle
/// matches before every byte and at the end.
#[must_use]
pub fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len());

    if needle.is_empty() {
        for byte in haystack {
            out.extend_from_slice(replacement);
            out.push(*byte);
        }
        out.extend_from_slice(replacement);
        return out;
    }

    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(needle) {
            out.extend_from_slice(replacement);
            i += needle.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}
