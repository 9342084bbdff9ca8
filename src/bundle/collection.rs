//! Table of contents of a source data stream collection
//!
//! The collection is parsed once when a bundle is opened. Only what resolution
//! needs is kept: data streams with their component-refs, the refs' catalogs,
//! and for every embedded component the byte range of its payload plus the
//! namespace declarations it inherits from the collection.

use std::collections::BTreeMap;
use std::ops::Range;

use quick_xml::escape::escape;
use roxmltree::{Document, Node};

use super::ComponentRole;
use crate::source::SOURCE_DATASTREAM_NS;

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// A `data-stream` and the component-refs of each of its containers
#[derive(Debug, Clone)]
pub(crate) struct Datastream {
    pub(crate) id: String,
    /// `(role, component-ref id)` in document order
    pub(crate) refs: Vec<(ComponentRole, String)>,
}

/// A catalog `uri` entry of a component-ref
#[derive(Debug, Clone)]
pub(crate) struct CatalogEntry {
    pub(crate) name: String,
    pub(crate) uri: String,
}

#[derive(Debug, Clone)]
pub(crate) struct ComponentRef {
    pub(crate) id: String,
    pub(crate) href: String,
    pub(crate) catalog: Vec<CatalogEntry>,
}

impl ComponentRef {
    /// Id of the embedded component this ref points at, for `#` hrefs
    pub(crate) fn local_target(&self) -> Option<&str> {
        self.href.strip_prefix('#')
    }
}

/// An embedded `component` or `extended-component`
#[derive(Debug, Clone)]
pub(crate) struct Component {
    pub(crate) id: String,
    payload: Range<usize>,
    /// In-scope `(prefix, uri)` declarations missing from the payload's start tag
    inherited: Vec<(Option<String>, String)>,
}

impl Component {
    /// The payload re-serialized as a standalone document
    ///
    /// `text` must be the collection text this component was parsed from.
    pub(crate) fn standalone(&self, text: &str) -> Vec<u8> {
        let payload = &text[self.payload.clone()];
        let name_end = payload[1..]
            .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
            .map_or(payload.len(), |i| i + 1);

        let mut out = String::with_capacity(payload.len() + 128);
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(&payload[..name_end]);
        for (prefix, uri) in &self.inherited {
            match prefix {
                Some(prefix) => out.push_str(&format!(" xmlns:{prefix}=\"{}\"", escape(uri))),
                None => out.push_str(&format!(" xmlns=\"{}\"", escape(uri))),
            }
        }
        out.push_str(&payload[name_end..]);
        out.push('\n');
        out.into_bytes()
    }
}

/// Parsed table of contents of a collection
#[derive(Debug, Clone)]
pub(crate) struct Collection {
    pub(crate) id: String,
    pub(crate) streams: Vec<Datastream>,
    pub(crate) refs: BTreeMap<String, ComponentRef>,
    pub(crate) components: BTreeMap<String, Component>,
}

impl Collection {
    /// Parse the collection; the error is a human readable reason
    pub(crate) fn parse(text: &str) -> Result<Self, String> {
        let doc = Document::parse(text).map_err(|e| e.to_string())?;
        let root = doc.root_element();
        let in_ds_ns = root
            .tag_name()
            .namespace()
            .is_some_and(|ns| SOURCE_DATASTREAM_NS.contains(&ns));
        if root.tag_name().name() != "data-stream-collection" || !in_ds_ns {
            return Err(format!(
                "unexpected root element <{}>",
                root.tag_name().name()
            ));
        }

        let mut collection = Collection {
            id: root.attribute("id").unwrap_or_default().to_string(),
            streams: Vec::new(),
            refs: BTreeMap::new(),
            components: BTreeMap::new(),
        };

        for node in root.children().filter(Node::is_element) {
            match node.tag_name().name() {
                "data-stream" => {
                    let stream = collection.parse_datastream(&doc, node)?;
                    collection.streams.push(stream);
                }
                "component" | "extended-component" => {
                    let component = parse_component(&doc, text, node)?;
                    if collection.components.contains_key(&component.id) {
                        return Err(format!("duplicate component id '{}'", component.id));
                    }
                    collection.components.insert(component.id.clone(), component);
                }
                _ => {}
            }
        }

        if collection.streams.is_empty() {
            return Err("collection contains no data-stream".to_string());
        }
        Ok(collection)
    }

    fn parse_datastream(&mut self, doc: &Document, stream: Node) -> Result<Datastream, String> {
        let id = required(doc, stream, "id")?;
        let mut refs = Vec::new();

        for container in stream.children().filter(Node::is_element) {
            let Some(role) = ComponentRole::from_container(container.tag_name().name()) else {
                continue;
            };
            for node in container
                .children()
                .filter(|n| n.is_element() && n.tag_name().name() == "component-ref")
            {
                let cref = parse_component_ref(doc, node)?;
                if self.refs.contains_key(&cref.id) {
                    return Err(format!("duplicate component-ref id '{}'", cref.id));
                }
                refs.push((role, cref.id.clone()));
                self.refs.insert(cref.id.clone(), cref);
            }
        }

        Ok(Datastream { id, refs })
    }
}

fn line_of(doc: &Document, node: Node) -> u32 {
    doc.text_pos_at(node.range().start).row
}

fn required(doc: &Document, node: Node, attribute: &str) -> Result<String, String> {
    node.attribute(attribute).map(str::to_string).ok_or_else(|| {
        format!(
            "<{}> at line {} has no '{attribute}' attribute",
            node.tag_name().name(),
            line_of(doc, node)
        )
    })
}

fn parse_component_ref(doc: &Document, node: Node) -> Result<ComponentRef, String> {
    let id = required(doc, node, "id")?;
    let href = node
        .attribute((XLINK_NS, "href"))
        .map(str::to_string)
        .ok_or_else(|| format!("component-ref '{id}' has no xlink:href"))?;

    let catalog = node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "catalog")
        .flat_map(|catalog| catalog.children())
        .filter(|n| n.is_element() && n.tag_name().name() == "uri")
        .map(|entry| {
            Ok(CatalogEntry {
                name: required(doc, entry, "name")?,
                uri: required(doc, entry, "uri")?,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    Ok(ComponentRef { id, href, catalog })
}

fn parse_component(doc: &Document, text: &str, node: Node) -> Result<Component, String> {
    let id = required(doc, node, "id")?;
    let payload = node
        .children()
        .find(Node::is_element)
        .ok_or_else(|| format!("component '{id}' has no content"))?;

    let range = payload.range();
    let start_tag = start_tag(&text[range.clone()]);
    let inherited = payload
        .namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .filter(|ns| {
            let declaration = match ns.name() {
                Some(prefix) => format!("xmlns:{prefix}="),
                None => "xmlns=".to_string(),
            };
            !start_tag.contains(&declaration)
        })
        .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
        .collect();

    Ok(Component {
        id,
        payload: range,
        inherited,
    })
}

/// The start tag at the beginning of `element`, up to its closing `>`
fn start_tag(element: &str) -> &str {
    let mut quote = None;
    for (i, c) in element.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, '>') => return &element[..=i],
            _ => {}
        }
    }
    element
}
