//! Pack index document (`index.pidx`).
//!
//! The index lists every published pack as a `pdsc` element grouped under
//! `pindex`, and optionally the per-vendor index files as `pidx` elements
//! grouped under `vindex`.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Deserializer};

use crate::{PackError, Result};

const ROOT_ELEMENT: &str = "index";

/// Root of a pack index document
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Index {
    #[serde(rename = "@schemaVersion", default)]
    pub schema_version: String,

    /// Name of the index provider
    #[serde(default)]
    pub vendor: String,

    /// Where the index is published
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub timestamp: String,

    #[serde(rename = "pindex", default)]
    pub package_groups: Vec<PackageGroup>,

    #[serde(rename = "vindex", default)]
    pub vendor_groups: Vec<VendorGroup>,
}

/// A `pindex` element
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageGroup {
    #[serde(rename = "pdsc", default)]
    pub entries: Vec<PackageEntry>,
}

/// A `pdsc` element: one published pack release
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageEntry {
    /// Base URL the pack file lives under
    #[serde(rename = "@url", default)]
    pub url: String,

    #[serde(rename = "@vendor", default)]
    pub vendor: String,

    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "@version", default)]
    pub version: String,

    #[serde(rename = "@date", default)]
    pub date: Option<String>,

    /// Deprecation date; any non-empty value marks the pack as deprecated
    #[serde(rename = "@deprecated", default)]
    pub deprecated: Option<String>,

    #[serde(rename = "@replacement", default)]
    pub replacement: Option<String>,

    /// Archive size in bytes; an empty attribute counts as absent
    #[serde(rename = "@size", default, deserialize_with = "size_attribute")]
    pub size: Option<u64>,
}

/// A `vindex` element
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VendorGroup {
    #[serde(rename = "pidx", default)]
    pub entries: Vec<VendorEntry>,
}

/// A `pidx` element: the index file of a single vendor
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VendorEntry {
    #[serde(rename = "@url", default)]
    pub url: String,

    #[serde(rename = "@vendor", default)]
    pub vendor: String,

    #[serde(rename = "@date", default)]
    pub date: Option<String>,
}

impl Index {
    /// Parse an index document.
    ///
    /// Unknown attributes and elements are ignored, but the document must be
    /// well formed and its root element must be `<index>`.
    pub fn from_xml(xml: &str) -> Result<Self> {
        match root_element_name(xml)? {
            Some(name) if name == ROOT_ELEMENT => {}
            Some(name) => {
                return Err(PackError::Parse(format!(
                    "unexpected root element <{}>, expected <{}>",
                    name, ROOT_ELEMENT
                )))
            }
            None => return Err(PackError::Parse("document has no root element".to_string())),
        }

        Ok(quick_xml::de::from_str(xml)?)
    }

    /// All package entries, in document order
    pub fn packages(&self) -> impl Iterator<Item = &PackageEntry> {
        self.package_groups.iter().flat_map(|group| group.entries.iter())
    }

    /// All vendor index entries, in document order
    pub fn vendor_indexes(&self) -> impl Iterator<Item = &VendorEntry> {
        self.vendor_groups.iter().flat_map(|group| group.entries.iter())
    }
}

impl PackageEntry {
    pub fn new(
        url: impl Into<String>,
        vendor: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            vendor: vendor.into(),
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn with_deprecated(mut self, date: impl Into<String>) -> Self {
        self.deprecated = Some(date.into());
        self
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated.as_deref().is_some_and(|d| !d.is_empty())
    }

    /// Case-insensitive comparison against a vendor name
    pub fn matches_vendor(&self, vendor: &str) -> bool {
        self.vendor.to_lowercase() == vendor.to_lowercase()
    }

    /// `{vendor}.{name}.{version}.pack`
    pub fn archive_file_name(&self) -> String {
        format!("{}.{}.{}.pack", self.vendor, self.name, self.version)
    }

    /// Download URL: the base URL followed by the archive file name
    pub fn archive_url(&self) -> String {
        format!("{}{}", self.url, self.archive_file_name())
    }
}

/// Local name of the first element in the document, if any
fn root_element_name(xml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                return Ok(Some(name));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn size_attribute<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| serde::de::Error::custom(format!("invalid pack size '{}'", raw)))
}
