//! Builds a [`DefinitionModel`] from document text

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use roxmltree::{Children, Document, Node};

use super::{
    Check, CriteriaNode, Definition, DefinitionClass, DefinitionModel, Existence, Generator, Item,
    Operator, Reference, Test, Variable, VariableKind,
};
use crate::error::ImportError;
use crate::source::DocumentKind;

type Result<T> = std::result::Result<T, ImportError>;

/// Deepest `<criteria>` nesting accepted in a definition
const MAX_CRITERIA_DEPTH: usize = 256;

/// A `<criteria>` element, its unread children and the nodes built so far
type OpenCriteria<'d, 'input> = (Node<'d, 'input>, Children<'d, 'input>, Vec<CriteriaNode>);

pub(super) fn build(text: &str, kind: DocumentKind, origin: &str) -> Result<DefinitionModel> {
    if kind != DocumentKind::DefinitionsDocument {
        return Err(ImportError::WrongKind { found: kind });
    }
    let doc = Document::parse(text)?;
    Reader { doc: &doc }.model(origin)
}

fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    elements(node).find(|n| n.tag_name().name() == name)
}

fn text_of(node: Node, name: &str) -> Option<String> {
    child(node, name).map(|n| n.text().unwrap_or_default().trim().to_string())
}

fn family(node: Node) -> Option<String> {
    node.tag_name()
        .namespace()
        .and_then(|ns| ns.rsplit_once('#'))
        .map(|(_, family)| family.to_string())
}

struct Reader<'d, 'input> {
    doc: &'d Document<'input>,
}

impl<'d, 'input> Reader<'d, 'input> {
    fn line(&self, node: Node) -> u32 {
        self.doc.text_pos_at(node.range().start).row
    }

    fn attr<'a>(&self, node: Node<'a, '_>, name: &str) -> Result<&'a str> {
        node.attribute(name)
            .ok_or_else(|| ImportError::MissingAttribute {
                element: node.tag_name().name().to_string(),
                attribute: name.to_string(),
                line: self.line(node),
            })
    }

    fn parse<T: FromStr>(&self, node: Node, attribute: &str, value: &str) -> Result<T> {
        value.parse().map_err(|_| ImportError::InvalidValue {
            attribute: attribute.to_string(),
            value: value.to_string(),
            line: self.line(node),
        })
    }

    fn required<T: FromStr>(&self, node: Node, attribute: &str) -> Result<T> {
        let value = self.attr(node, attribute)?;
        self.parse(node, attribute, value)
    }

    fn optional<T: FromStr>(&self, node: Node, attribute: &str, default: T) -> Result<T> {
        match node.attribute(attribute) {
            Some(value) => self.parse(node, attribute, value),
            None => Ok(default),
        }
    }

    fn flag(&self, node: Node, attribute: &str) -> Result<bool> {
        match node.attribute(attribute) {
            None | Some("false" | "0") => Ok(false),
            Some("true" | "1") => Ok(true),
            Some(other) => Err(ImportError::InvalidValue {
                attribute: attribute.to_string(),
                value: other.to_string(),
                line: self.line(node),
            }),
        }
    }

    fn child_required<'a, 'i>(&self, node: Node<'a, 'i>, name: &str) -> Result<Node<'a, 'i>> {
        child(node, name).ok_or_else(|| ImportError::MissingElement {
            element: node.tag_name().name().to_string(),
            child: name.to_string(),
            line: self.line(node),
        })
    }

    fn required_text(&self, node: Node, name: &str) -> Result<String> {
        let element = self.child_required(node, name)?;
        Ok(element.text().unwrap_or_default().trim().to_string())
    }

    fn container<T>(
        &self,
        root: Node<'d, 'input>,
        name: &str,
        item: impl Fn(&Self, Node<'d, 'input>) -> Result<T>,
    ) -> Result<Vec<T>> {
        child(root, name)
            .into_iter()
            .flat_map(elements)
            .map(|node| item(self, node))
            .collect()
    }

    fn model(&self, origin: &str) -> Result<DefinitionModel> {
        let root = self.doc.root_element();
        let generator = self.generator(self.child_required(root, "generator")?)?;

        let mut model = DefinitionModel {
            origin: origin.to_string(),
            generator,
            definitions: self.container(root, "definitions", Self::definition)?,
            tests: self.container(root, "tests", Self::test)?,
            objects: self.container(root, "objects", Self::item)?,
            states: self.container(root, "states", Self::item)?,
            variables: self.container(root, "variables", Self::variable)?,
            index: HashMap::new(),
        };
        index(&mut model)?;
        check_references(&model, root)?;
        check_extension_cycles(&model)?;
        Ok(model)
    }

    fn generator(&self, node: Node) -> Result<Generator> {
        Ok(Generator {
            product_name: text_of(node, "product_name"),
            product_version: text_of(node, "product_version"),
            schema_version: self.required_text(node, "schema_version")?,
            timestamp: self.required_text(node, "timestamp")?,
        })
    }

    fn definition(&self, node: Node<'d, 'input>) -> Result<Definition> {
        let metadata = self.child_required(node, "metadata")?;
        let references = elements(metadata)
            .filter(|n| n.tag_name().name() == "reference")
            .map(|r| {
                Ok(Reference {
                    source: self.attr(r, "source")?.to_string(),
                    ref_id: self.attr(r, "ref_id")?.to_string(),
                    ref_url: r.attribute("ref_url").map(str::to_string),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Definition {
            id: self.attr(node, "id")?.to_string(),
            version: self.required(node, "version")?,
            class: self.required::<DefinitionClass>(node, "class")?,
            deprecated: self.flag(node, "deprecated")?,
            title: self.required_text(metadata, "title")?,
            description: text_of(metadata, "description").unwrap_or_default(),
            references,
            criteria: child(node, "criteria")
                .map(|c| self.criteria(c))
                .transpose()?,
        })
    }

    /// Builds the criteria tree without recursion; `parents` holds the
    /// enclosing `<criteria>` still being filled
    fn criteria(&self, root: Node<'d, 'input>) -> Result<CriteriaNode> {
        let mut parents: Vec<OpenCriteria<'d, 'input>> = Vec::new();
        let mut current: OpenCriteria<'d, 'input> = (root, root.children(), Vec::new());

        loop {
            match current.1.find(Node::is_element) {
                Some(next) if next.tag_name().name() == "criteria" => {
                    if parents.len() + 1 >= MAX_CRITERIA_DEPTH {
                        return Err(ImportError::NestingTooDeep {
                            line: self.line(next),
                            limit: MAX_CRITERIA_DEPTH,
                        });
                    }
                    let nested = (next, next.children(), Vec::new());
                    parents.push(std::mem::replace(&mut current, nested));
                }
                Some(leaf) => current.2.push(self.criteria_leaf(leaf)?),
                None => {
                    let finished = CriteriaNode::Criteria {
                        operator: self.optional(current.0, "operator", Operator::And)?,
                        negate: self.flag(current.0, "negate")?,
                        children: std::mem::take(&mut current.2),
                    };
                    match parents.pop() {
                        Some(parent) => {
                            current = parent;
                            current.2.push(finished);
                        }
                        None => return Ok(finished),
                    }
                }
            }
        }
    }

    fn criteria_leaf(&self, node: Node) -> Result<CriteriaNode> {
        match node.tag_name().name() {
            "criterion" => Ok(CriteriaNode::Criterion {
                test_ref: self.attr(node, "test_ref")?.to_string(),
                negate: self.flag(node, "negate")?,
                comment: node.attribute("comment").map(str::to_string),
            }),
            "extend_definition" => Ok(CriteriaNode::ExtendDefinition {
                definition_ref: self.attr(node, "definition_ref")?.to_string(),
                negate: self.flag(node, "negate")?,
                comment: node.attribute("comment").map(str::to_string),
            }),
            other => Err(ImportError::InvalidValue {
                attribute: "element".to_string(),
                value: other.to_string(),
                line: self.line(node),
            }),
        }
    }

    fn test(&self, node: Node<'d, 'input>) -> Result<Test> {
        let object_ref = child(node, "object")
            .map(|o| self.attr(o, "object_ref").map(str::to_string))
            .transpose()?;
        let state_refs = elements(node)
            .filter(|n| n.tag_name().name() == "state")
            .map(|s| self.attr(s, "state_ref").map(str::to_string))
            .collect::<Result<Vec<_>>>()?;

        Ok(Test {
            id: self.attr(node, "id")?.to_string(),
            version: self.required(node, "version")?,
            family: family(node),
            kind: node.tag_name().name().to_string(),
            check: self.required::<Check>(node, "check")?,
            check_existence: self.optional(node, "check_existence", Existence::AtLeastOneExists)?,
            state_operator: self.optional(node, "state_operator", Operator::And)?,
            comment: node.attribute("comment").map(str::to_string),
            object_ref,
            state_refs,
        })
    }

    fn item(&self, node: Node<'d, 'input>) -> Result<Item> {
        Ok(Item {
            id: self.attr(node, "id")?.to_string(),
            version: self.required(node, "version")?,
            family: family(node),
            kind: node.tag_name().name().to_string(),
            comment: node.attribute("comment").map(str::to_string),
        })
    }

    fn variable(&self, node: Node<'d, 'input>) -> Result<Variable> {
        let kind: VariableKind = self.parse(node, "element", node.tag_name().name())?;
        let values = match kind {
            VariableKind::Constant => elements(node)
                .filter(|n| n.tag_name().name() == "value")
                .map(|n| n.text().unwrap_or_default().to_string())
                .collect(),
            VariableKind::External | VariableKind::Local => Vec::new(),
        };

        Ok(Variable {
            id: self.attr(node, "id")?.to_string(),
            version: self.required(node, "version")?,
            kind,
            datatype: self.attr(node, "datatype")?.to_string(),
            comment: node.attribute("comment").map(str::to_string),
            values,
        })
    }
}

fn index(model: &mut DefinitionModel) -> Result<()> {
    let ids = model
        .definitions
        .iter()
        .map(|d| &d.id)
        .enumerate()
        .chain(model.tests.iter().map(|t| &t.id).enumerate())
        .chain(model.objects.iter().map(|o| &o.id).enumerate())
        .chain(model.states.iter().map(|s| &s.id).enumerate())
        .chain(model.variables.iter().map(|v| &v.id).enumerate());

    let mut index = HashMap::new();
    for (position, id) in ids {
        if index.insert(id.clone(), position).is_some() {
            return Err(ImportError::DuplicateId { id: id.clone() });
        }
    }
    model.index = index;
    Ok(())
}

/// Every `*_ref` attribute must name an element of the matching kind
fn check_references(model: &DefinitionModel, root: Node) -> Result<()> {
    for node in root.descendants().filter(Node::is_element) {
        for attribute in [
            "test_ref",
            "definition_ref",
            "object_ref",
            "state_ref",
            "var_ref",
        ] {
            let Some(target) = node.attribute(attribute) else {
                continue;
            };
            let resolved = match attribute {
                "test_ref" => model.test(target).is_some(),
                "definition_ref" => model.definition(target).is_some(),
                "object_ref" => model.object(target).is_some(),
                "state_ref" => model.state(target).is_some(),
                _ => model.variable(target).is_some(),
            };
            if !resolved {
                let from = node
                    .ancestors()
                    .find_map(|a| a.attribute("id"))
                    .unwrap_or(node.tag_name().name());
                return Err(ImportError::DanglingReference {
                    from: from.to_string(),
                    to: target.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn extensions(root: &CriteriaNode) -> Vec<&str> {
    let mut refs = Vec::new();
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        match node {
            CriteriaNode::Criteria { children, .. } => pending.extend(children.iter().rev()),
            CriteriaNode::ExtendDefinition { definition_ref, .. } => refs.push(definition_ref.as_str()),
            CriteriaNode::Criterion { .. } => {}
        }
    }
    refs
}

/// `extend_definition` chains must not loop back on themselves
///
/// Depth-first walk with an explicit path; each path entry keeps the index of
/// the next edge to follow.
fn check_extension_cycles(model: &DefinitionModel) -> Result<()> {
    let graph: HashMap<&str, Vec<&str>> = model
        .definitions
        .iter()
        .map(|d| (d.id.as_str(), d.criteria.as_ref().map(extensions).unwrap_or_default()))
        .collect();

    let mut done: HashSet<&str> = HashSet::new();
    for definition in &model.definitions {
        let start = definition.id.as_str();
        if done.contains(start) {
            continue;
        }
        let mut path: Vec<(&str, usize)> = vec![(start, 0)];
        let mut on_path: HashSet<&str> = HashSet::from([start]);

        while let Some((id, next)) = path.last_mut() {
            let edges = graph.get(*id).map(Vec::as_slice).unwrap_or_default();
            match edges.get(*next).copied() {
                Some(target) => {
                    *next += 1;
                    if on_path.contains(target) {
                        let mut chain: Vec<&str> = path.iter().map(|(id, _)| *id).collect();
                        chain.push(target);
                        return Err(ImportError::CircularReference {
                            chain: chain.join(" -> "),
                        });
                    }
                    if !done.contains(target) {
                        on_path.insert(target);
                        path.push((target, 0));
                    }
                }
                None => {
                    let finished = *id;
                    path.pop();
                    on_path.remove(finished);
                    done.insert(finished);
                }
            }
        }
    }
    Ok(())
}
