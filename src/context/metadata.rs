/// Suffix marking a metadata key as carrying binary values.
pub const BINARY_KEY_SUFFIX: &str = "-bin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    Ascii(String),
    Binary(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub key: String,
    pub value: MetadataValue,
}

/// Ordered list of header or trailer entries.
///
/// Keys are stored lowercase. Duplicate keys are allowed and keep their
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<MetadataEntry>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.push(MetadataEntry {
            key: key.into().to_ascii_lowercase(),
            value: MetadataValue::Ascii(value.into()),
        });
        self
    }

    /// Adds a binary entry. The key gets the `-bin` suffix if it lacks one.
    pub fn add_bytes(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> &mut Self {
        let mut key = key.into().to_ascii_lowercase();
        if !key.ends_with(BINARY_KEY_SUFFIX) {
            key.push_str(BINARY_KEY_SUFFIX);
        }
        self.entries.push(MetadataEntry {
            key,
            value: MetadataValue::Binary(value.into()),
        });
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(key, value);
        self
    }

    /// First ASCII value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_ascii_lowercase();
        self.entries
            .iter()
            .find_map(|entry| match &entry.value {
                MetadataValue::Ascii(value) if entry.key == key => Some(value.as_str()),
                _ => None,
            })
    }

    pub fn get_bytes(&self, key: &str) -> Option<&[u8]> {
        let key = key.to_ascii_lowercase();
        self.entries
            .iter()
            .find_map(|entry| match &entry.value {
                MetadataValue::Binary(value) if entry.key == key => Some(value.as_slice()),
                _ => None,
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetadataEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
