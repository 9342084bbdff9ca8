//! Checks for SCAP source data stream collections

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use roxmltree::Node;

use super::engine::{Checker, child, elements};
use crate::source::SOURCE_DATASTREAM_NS;

pub(crate) const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
pub(crate) const CATALOG_NS: &str = "urn:oasis:names:tc:entity:xmlns:xml:catalog";

/// Containers of a `data-stream`, in schema order
pub(crate) const CONTAINERS: [&str; 4] = ["dictionaries", "checklists", "checks", "extended-components"];

#[allow(clippy::expect_used)]
fn scap_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^scap_[^_\s]+_(datastream|cref|comp|ecomp|collection)_\S+$")
            .expect("static SCAP id pattern")
    })
}

/// Whether `id` is a SCAP 1.2+ id of the given type (`cref`, `comp`, ...)
pub(crate) fn is_scap_id(id: &str, kind: &str) -> bool {
    scap_id_pattern()
        .captures(id)
        .and_then(|c| c.get(1))
        .is_some_and(|m| m.as_str() == kind)
}

fn in_ds_namespace(node: Node) -> bool {
    node.tag_name()
        .namespace()
        .is_some_and(|ns| SOURCE_DATASTREAM_NS.contains(&ns))
}

pub(super) fn check_structure(checker: &mut Checker) {
    let root = checker.root();
    if root.tag_name().name() != "data-stream-collection" || !in_ds_namespace(root) {
        checker.error(
            root,
            "root element must be <data-stream-collection> in a source data stream namespace",
        );
        return;
    }
    checker.required_attr(root, "id");
    checker.required_attr(root, "schematron-version");

    let mut streams = 0;
    let mut components = 0;
    let mut seen_component = false;
    for node in elements(root) {
        match node.tag_name().name() {
            "data-stream" => {
                if seen_component {
                    checker.error(node, "<data-stream> must precede all components");
                }
                streams += 1;
                check_datastream(checker, node);
            }
            "component" | "extended-component" => {
                seen_component = true;
                components += 1;
                check_component(checker, node);
            }
            "Signature" => {}
            other => checker.error(
                node,
                format!("unexpected element <{other}> in <data-stream-collection>"),
            ),
        }
    }

    if streams == 0 {
        checker.error(root, "collection must contain at least one <data-stream>");
    }
    if components == 0 {
        checker.error(root, "collection must contain at least one component");
    }
}

fn check_datastream(checker: &mut Checker, stream: Node) {
    for attribute in ["id", "scap-version", "use-case", "timestamp"] {
        checker.required_attr(stream, attribute);
    }

    let mut last = None;
    for container in elements(stream) {
        let name = container.tag_name().name();
        let Some(index) = CONTAINERS.iter().position(|c| *c == name) else {
            checker.error(container, format!("unexpected element <{name}> in <data-stream>"));
            continue;
        };
        if last.is_some_and(|l| index <= l) {
            checker.error(container, format!("container <{name}> is out of order or repeated"));
        }
        last = Some(index);

        let mut refs = 0;
        for cref in elements(container) {
            if cref.tag_name().name() != "component-ref" {
                checker.error(
                    cref,
                    format!("unexpected element <{}> in <{name}>", cref.tag_name().name()),
                );
                continue;
            }
            refs += 1;
            checker.required_attr(cref, "id");
            if cref.attribute((XLINK_NS, "href")).is_none() {
                checker.error(cref, "element <component-ref> is missing required attribute 'xlink:href'");
            }
            if let Some(catalog) = child(cref, "catalog") {
                for entry in elements(catalog) {
                    if entry.tag_name().name() == "uri" {
                        checker.required_attr(entry, "name");
                        checker.required_attr(entry, "uri");
                    }
                }
            }
        }
        if refs == 0 {
            checker.error(container, format!("container <{name}> must hold at least one <component-ref>"));
        }
    }

    if child(stream, "checks").is_none() && child(stream, "checklists").is_none() {
        checker.warning(stream, "data stream has neither <checklists> nor <checks>");
    }
}

fn check_component(checker: &mut Checker, component: Node) {
    checker.required_attr(component, "id");
    checker.required_attr(component, "timestamp");
    let payload = elements(component).count();
    if payload != 1 {
        checker.error(
            component,
            format!("component must contain exactly one element, found {payload}"),
        );
    }
}

pub(super) fn check_rules(checker: &mut Checker) {
    let root = checker.root();
    if root.tag_name().name() != "data-stream-collection" {
        return;
    }

    let mut ids: BTreeMap<&str, Node> = BTreeMap::new();
    for node in root.descendants().filter(Node::is_element) {
        let kind = match node.tag_name().name() {
            "data-stream-collection" => "collection",
            "data-stream" => "datastream",
            "component-ref" => "cref",
            "component" => "comp",
            "extended-component" => "ecomp",
            _ => continue,
        };
        let Some(id) = node.attribute("id") else {
            continue;
        };
        if ids.insert(id, node).is_some() {
            checker.error(node, format!("duplicate id '{id}'"));
        }
        if !is_scap_id(id, kind) {
            checker.error(
                node,
                format!("'{id}' does not match the SCAP id pattern for {kind}"),
            );
        }
    }

    for cref in root
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "component-ref")
    {
        if let Some(href) = cref.attribute((XLINK_NS, "href")) {
            if let Some(target) = href.strip_prefix('#') {
                let resolved = ids.get(target).is_some_and(|n| {
                    matches!(n.tag_name().name(), "component" | "extended-component")
                });
                if !resolved {
                    checker.error(
                        cref,
                        format!("component-ref href '{href}' does not resolve to a component"),
                    );
                }
            }
        }

        let Some(catalog) = child(cref, "catalog") else {
            continue;
        };
        for entry in elements(catalog).filter(|e| e.tag_name().name() == "uri") {
            let Some(uri) = entry.attribute("uri") else {
                continue;
            };
            let target = uri.strip_prefix('#').unwrap_or(uri);
            let resolved = ids
                .get(target)
                .is_some_and(|n| n.tag_name().name() == "component-ref");
            if !resolved {
                checker.error(
                    entry,
                    format!("catalog uri '{uri}' does not resolve to a component-ref"),
                );
            }
        }
    }
}
