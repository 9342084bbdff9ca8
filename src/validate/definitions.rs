//! Checks for OVAL Definitions documents
//!
//! `check_structure` covers what the OVAL 5 schemas enforce: element order,
//! required elements and attributes, enumerations and id syntax.
//! `check_rules` covers the schematron layer: id uniqueness, reference
//! resolution and agreement between tests and the objects/states they use.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use roxmltree::Node;

use super::engine::{Checker, child, elements};
use crate::source::OVAL_DEFINITIONS_NS;

/// Top-level children of `oval_definitions`, in schema order
const TOP_LEVEL_ORDER: [&str; 7] = [
    "generator",
    "definitions",
    "tests",
    "objects",
    "states",
    "variables",
    "Signature",
];

pub(crate) const DEFINITION_CLASSES: [&str; 5] = [
    "compliance",
    "inventory",
    "miscellaneous",
    "patch",
    "vulnerability",
];

pub(crate) const OPERATORS: [&str; 4] = ["AND", "OR", "ONE", "XOR"];

pub(crate) const CHECKS: [&str; 5] = [
    "all",
    "at least one",
    "none exist",
    "none satisfy",
    "only one",
];

pub(crate) const EXISTENCE: [&str; 5] = [
    "all_exist",
    "any_exist",
    "at_least_one_exists",
    "none_exist",
    "only_one_exists",
];

pub(crate) const DATATYPES: [&str; 13] = [
    "binary",
    "boolean",
    "debian_evr_string",
    "evr_string",
    "fileset_revision",
    "float",
    "int",
    "ios_version",
    "ipv4_address",
    "ipv6_address",
    "record",
    "string",
    "version",
];

const REFERENCE_ATTRIBUTES: [&str; 5] = [
    "test_ref",
    "definition_ref",
    "object_ref",
    "state_ref",
    "var_ref",
];

pub(crate) const VARIABLE_KINDS: [&str; 3] =
    ["constant_variable", "external_variable", "local_variable"];

/// The kinds of OVAL ids, keyed by the type segment of the id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IdKind {
    Definition,
    Test,
    Object,
    State,
    Variable,
}

impl IdKind {
    pub(crate) fn segment(self) -> &'static str {
        match self {
            IdKind::Definition => "def",
            IdKind::Test => "tst",
            IdKind::Object => "obj",
            IdKind::State => "ste",
            IdKind::Variable => "var",
        }
    }

    fn container(self) -> &'static str {
        match self {
            IdKind::Definition => "definitions",
            IdKind::Test => "tests",
            IdKind::Object => "objects",
            IdKind::State => "states",
            IdKind::Variable => "variables",
        }
    }
}

#[allow(clippy::expect_used)]
fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^oval:[A-Za-z0-9_\-\.]+:(def|tst|obj|ste|var):[1-9][0-9]*$")
            .expect("static OVAL id pattern")
    })
}

/// Whether `id` is a well-formed OVAL id of the given kind
pub(crate) fn is_valid_id(id: &str, kind: IdKind) -> bool {
    id_pattern()
        .captures(id)
        .and_then(|c| c.get(1))
        .is_some_and(|m| m.as_str() == kind.segment())
}

fn is_bool(value: &str) -> bool {
    matches!(value, "true" | "false" | "1" | "0")
}

pub(super) fn check_structure(checker: &mut Checker) {
    let root = checker.root();
    if root.tag_name().name() != "oval_definitions"
        || root.tag_name().namespace() != Some(OVAL_DEFINITIONS_NS)
    {
        checker.error(
            root,
            format!(
                "root element must be <oval_definitions> in namespace {OVAL_DEFINITIONS_NS}"
            ),
        );
        return;
    }

    check_top_level_order(checker, root);

    match child(root, "generator") {
        Some(generator) => check_generator(checker, generator),
        None => checker.error(root, "missing required element <generator>"),
    }

    if let Some(definitions) = child(root, "definitions") {
        for node in elements(definitions) {
            if node.tag_name().name() == "definition" {
                check_definition(checker, node);
            } else {
                checker.error(
                    node,
                    format!("unexpected element <{}> in <definitions>", node.tag_name().name()),
                );
            }
        }
    }

    for kind in [IdKind::Test, IdKind::Object, IdKind::State] {
        if let Some(container) = child(root, kind.container()) {
            for node in elements(container) {
                check_identified(checker, node, kind);
                if kind == IdKind::Test {
                    check_test(checker, node);
                }
            }
        }
    }

    if let Some(variables) = child(root, "variables") {
        for node in elements(variables) {
            check_variable(checker, node);
        }
    }
}

fn check_top_level_order(checker: &mut Checker, root: Node) {
    let mut last = None;
    for node in elements(root) {
        let name = node.tag_name().name();
        match TOP_LEVEL_ORDER.iter().position(|n| *n == name) {
            Some(index) => {
                if last.is_some_and(|l| index <= l) {
                    checker.error(node, format!("element <{name}> is out of order or repeated"));
                }
                last = Some(index);
            }
            None => checker.error(
                node,
                format!("unexpected element <{name}> in <oval_definitions>"),
            ),
        }
    }
}

fn check_generator(checker: &mut Checker, generator: Node) {
    for required in ["schema_version", "timestamp"] {
        match child(generator, required) {
            Some(node) if node.text().is_some_and(|t| !t.trim().is_empty()) => {}
            Some(node) => checker.error(node, format!("element <{required}> must not be empty")),
            None => checker.error(
                generator,
                format!("element <generator> is missing required element <{required}>"),
            ),
        }
    }
}

fn check_identified(checker: &mut Checker, node: Node, kind: IdKind) {
    let name = node.tag_name().name();
    if let Some(id) = checker.required_attr(node, "id") {
        if !is_valid_id(id, kind) {
            checker.error(
                node,
                format!("'{id}' is not a valid OVAL {} id", kind.segment()),
            );
        }
    }
    if let Some(version) = checker.required_attr(node, "version") {
        if version.parse::<u32>().is_err() {
            checker.error(
                node,
                format!("<{name}> version '{version}' is not a non-negative integer"),
            );
        }
    }
    if let Some(deprecated) = node.attribute("deprecated") {
        if !is_bool(deprecated) {
            checker.error(node, format!("invalid deprecated flag '{deprecated}'"));
        }
    }
}

fn check_enum(checker: &mut Checker, node: Node, attribute: &str, allowed: &[&str]) {
    if let Some(value) = node.attribute(attribute) {
        if !allowed.contains(&value) {
            checker.error(
                node,
                format!(
                    "invalid value '{value}' for attribute '{attribute}' (expected one of: {})",
                    allowed.join(", ")
                ),
            );
        }
    }
}

fn check_definition(checker: &mut Checker, node: Node) {
    check_identified(checker, node, IdKind::Definition);
    if checker.required_attr(node, "class").is_some() {
        check_enum(checker, node, "class", &DEFINITION_CLASSES);
    }

    match child(node, "metadata") {
        Some(metadata) => {
            for required in ["title", "description"] {
                if child(metadata, required).is_none() {
                    checker.error(
                        metadata,
                        format!("element <metadata> is missing required element <{required}>"),
                    );
                }
            }
        }
        None => checker.error(node, "element <definition> is missing required element <metadata>"),
    }

    if let Some(criteria) = child(node, "criteria") {
        check_criteria(checker, criteria);
    }
}

fn check_criteria(checker: &mut Checker, root: Node) {
    let mut pending = vec![root];
    while let Some(criteria) = pending.pop() {
        check_enum(checker, criteria, "operator", &OPERATORS);
        check_negate(checker, criteria);

        let mut count = 0;
        for node in elements(criteria) {
            count += 1;
            match node.tag_name().name() {
                "criteria" => pending.push(node),
                "criterion" => {
                    check_negate(checker, node);
                    if let Some(test_ref) = checker.required_attr(node, "test_ref") {
                        if !is_valid_id(test_ref, IdKind::Test) {
                            checker.error(node, format!("'{test_ref}' is not a valid OVAL tst id"));
                        }
                    }
                }
                "extend_definition" => {
                    check_negate(checker, node);
                    if let Some(def_ref) = checker.required_attr(node, "definition_ref") {
                        if !is_valid_id(def_ref, IdKind::Definition) {
                            checker.error(node, format!("'{def_ref}' is not a valid OVAL def id"));
                        }
                    }
                }
                other => checker.error(node, format!("unexpected element <{other}> in <criteria>")),
            }
        }
        if count == 0 {
            checker.error(criteria, "element <criteria> must contain at least one child");
        }
    }
}

fn check_negate(checker: &mut Checker, node: Node) {
    if let Some(negate) = node.attribute("negate") {
        if !is_bool(negate) {
            checker.error(node, format!("invalid negate flag '{negate}'"));
        }
    }
}

fn check_test(checker: &mut Checker, node: Node) {
    if checker.required_attr(node, "check").is_some() {
        check_enum(checker, node, "check", &CHECKS);
    }
    check_enum(checker, node, "check_existence", &EXISTENCE);
    check_enum(checker, node, "state_operator", &OPERATORS);

    for reference in elements(node) {
        match reference.tag_name().name() {
            "object" => {
                if let Some(object_ref) = checker.required_attr(reference, "object_ref") {
                    if !is_valid_id(object_ref, IdKind::Object) {
                        checker.error(
                            reference,
                            format!("'{object_ref}' is not a valid OVAL obj id"),
                        );
                    }
                }
            }
            "state" => {
                if let Some(state_ref) = checker.required_attr(reference, "state_ref") {
                    if !is_valid_id(state_ref, IdKind::State) {
                        checker.error(
                            reference,
                            format!("'{state_ref}' is not a valid OVAL ste id"),
                        );
                    }
                }
            }
            _ => {}
        }
    }
}

fn check_variable(checker: &mut Checker, node: Node) {
    let name = node.tag_name().name();
    if !VARIABLE_KINDS.contains(&name) {
        checker.error(node, format!("unexpected element <{name}> in <variables>"));
        return;
    }
    check_identified(checker, node, IdKind::Variable);
    checker.required_attr(node, "comment");
    if checker.required_attr(node, "datatype").is_some() {
        check_enum(checker, node, "datatype", &DATATYPES);
    }
}

/// Elements of one id kind, keyed by id
fn collect_ids<'a, 'input>(
    checker: &mut Checker,
    root: Node<'a, 'input>,
    kind: IdKind,
) -> BTreeMap<&'a str, Node<'a, 'input>> {
    let mut ids = BTreeMap::new();
    let Some(container) = child(root, kind.container()) else {
        return ids;
    };
    for node in elements(container) {
        let Some(id) = node.attribute("id") else {
            continue;
        };
        if ids.insert(id, node).is_some() {
            checker.error(node, format!("duplicate id '{id}'"));
        }
    }
    ids
}

pub(super) fn check_rules(checker: &mut Checker) {
    let root = checker.root();
    if root.tag_name().name() != "oval_definitions" {
        return;
    }

    let definitions = collect_ids(checker, root, IdKind::Definition);
    let tests = collect_ids(checker, root, IdKind::Test);
    let objects = collect_ids(checker, root, IdKind::Object);
    let states = collect_ids(checker, root, IdKind::State);
    let variables: BTreeSet<&str> = collect_ids(checker, root, IdKind::Variable)
        .into_keys()
        .collect();

    for (id, definition) in &definitions {
        let deprecated = definition
            .attribute("deprecated")
            .is_some_and(|d| d == "true" || d == "1");
        if deprecated {
            checker.warning(*definition, format!("definition '{id}' is deprecated"));
        } else if child(*definition, "criteria").is_none() {
            checker.error(
                *definition,
                format!("definition '{id}' must contain criteria unless it is deprecated"),
            );
        }
    }

    let resolves = |attribute: &str, target: &str| match attribute {
        "test_ref" => tests.contains_key(target),
        "definition_ref" => definitions.contains_key(target),
        "object_ref" => objects.contains_key(target),
        "state_ref" => states.contains_key(target),
        _ => variables.contains(target),
    };
    for node in root.descendants().filter(Node::is_element) {
        for attribute in REFERENCE_ATTRIBUTES {
            if let Some(target) = node.attribute(attribute) {
                if !resolves(attribute, target) {
                    checker.error(node, format!("'{attribute}' refers to undefined '{target}'"));
                }
            }
        }
    }

    for test in tests.values() {
        check_test_agreement(checker, *test, &objects, &states);
    }
}

/// A `<family>_test` must use `<family>_object` and `<family>_state` elements
fn check_test_agreement(
    checker: &mut Checker,
    test: Node,
    objects: &BTreeMap<&str, Node>,
    states: &BTreeMap<&str, Node>,
) {
    let test_name = test.tag_name().name();
    let Some(stem) = test_name.strip_suffix("_test") else {
        return;
    };

    for reference in elements(test) {
        let (target, suffix) = match reference.tag_name().name() {
            "object" => (
                reference.attribute("object_ref").and_then(|r| objects.get(r)),
                "_object",
            ),
            "state" => (
                reference.attribute("state_ref").and_then(|r| states.get(r)),
                "_state",
            ),
            _ => continue,
        };
        let Some(target) = target else {
            continue;
        };
        let expected = format!("{stem}{suffix}");
        let found = target.tag_name();
        if found.name() != expected || found.namespace() != test.tag_name().namespace() {
            checker.error(
                reference,
                format!(
                    "<{test_name}> must reference a <{expected}> but '{}' is a <{}>",
                    target.attribute("id").unwrap_or_default(),
                    found.name()
                ),
            );
        }
    }
}
