//! XML documents flattened to dotted paths.
//!
//! `<A><B>1</B><C x="y">2</C><C>3</C></A>` yields `A.B = 1`, `A.C_1 = 2`,
//! `A.C_1.x = y` and `A.C_2 = 3`: repeated siblings are numbered from 1 and
//! attributes hang below their element.
use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;
use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::RegexBuilder;
use tracing::{info, warn};

use crate::error::Result;
use crate::io::supplier::MetadataSupplier;
use crate::types::SupplierFormat;

#[derive(Debug, Default)]
struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn from_start(e: &BytesStart<'_>) -> Result<Self> {
        let mut node = Node {
            name: String::from_utf8_lossy(e.local_name().as_ref()).to_string(),
            ..Node::default()
        };
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
            let value = attr.unescape_value()?.to_string();
            node.attributes.push((key, value));
        }
        Ok(node)
    }

    fn flatten(&self, path: &str, out: &mut BTreeMap<String, String>) {
        out.insert(path.to_string(), self.text.trim().to_string());
        for (k, v) in &self.attributes {
            out.insert(format!("{path}.{k}"), v.clone());
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for child in &self.children {
            *counts.entry(child.name.as_str()).or_default() += 1;
        }
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for child in &self.children {
            let name = child.name.as_str();
            let child_path = if counts[name] > 1 {
                let index = seen.entry(name).or_default();
                *index += 1;
                format!("{path}.{name}_{index}")
            } else {
                format!("{path}.{name}")
            };
            child.flatten(&child_path, out);
        }
    }
}

fn read_tree<R: BufRead>(mut reader: Reader<R>) -> Result<Option<Node>> {
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut stack: Vec<Node> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => stack.push(Node::from_start(e)?),
            Event::Empty(ref e) => {
                let node = Node::from_start(e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Event::End(_) => {
                if let Some(node) = stack.pop() {
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => root = Some(node),
                    }
                }
            }
            Event::Text(e) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(root)
}

/// Supplier over one XML document (DIMAP, Radarsat-2 `product.xml`, SAFE annotations)
#[derive(Debug, Clone)]
pub struct XmlMetadataSupplier {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
    nb_bands: usize,
}

impl XmlMetadataSupplier {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Reading XML metadata {:?}", path);
        let root = read_tree(Reader::from_file(path)?)?;
        let mut supplier = Self::from_root(root);
        supplier.path = Some(path.to_path_buf());
        Ok(supplier)
    }

    pub fn from_xml_str(text: &str) -> Result<Self> {
        let root = read_tree(Reader::from_reader(text.as_bytes()))?;
        Ok(Self::from_root(root))
    }

    fn from_root(root: Option<Node>) -> Self {
        let mut values = BTreeMap::new();
        match root {
            Some(node) => {
                let name = node.name.clone();
                node.flatten(&name, &mut values);
            }
            None => warn!("XML document has no root element"),
        }
        Self {
            path: None,
            values,
            nb_bands: 0,
        }
    }

    /// Band count of the image the document describes, when known by the caller
    pub fn with_nb_bands(mut self, nb_bands: usize) -> Self {
        self.nb_bands = nb_bands;
        self
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

impl MetadataSupplier for XmlMetadataSupplier {
    fn metadata_value(&self, path: &str, _band: Option<usize>) -> Option<String> {
        self.values.get(path).cloned()
    }

    /// Sibling files of the document
    fn resource_file(&self, pattern: &str) -> Option<PathBuf> {
        let dir = self.path.as_deref()?.parent()?;
        find_resource(dir, pattern)
    }

    fn nb_bands(&self) -> usize {
        self.nb_bands
    }

    fn format(&self) -> SupplierFormat {
        SupplierFormat::Xml
    }
}

/// First file in `dir` (sorted by name) whose name matches `pattern`, case-insensitively
pub(crate) fn find_resource(dir: &Path, pattern: &str) -> Option<PathBuf> {
    let re = match RegexBuilder::new(&format!("^(?:{pattern})$"))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re,
        Err(e) => {
            warn!("Invalid resource pattern {}: {}", pattern, e);
            return None;
        }
    };
    let mut matches = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| re.is_match(n))
        })
        .collect::<Vec<_>>();
    matches.sort();
    matches.into_iter().next()
}
