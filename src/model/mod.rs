//! In-memory OVAL definition model
//!
//! A [`DefinitionModel`] is built once from a resolved definitions source
//! (see [`DefinitionModel::import`]) and is read-only afterwards. Collections
//! keep document order; lookups by id go through a single id index.

mod import;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{OvalError, Result};
use crate::source::Source;

/// Information about the tool that produced the document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Generator {
    pub product_name: Option<String>,
    pub product_version: Option<String>,
    pub schema_version: String,
    pub timestamp: String,
}

/// Parses the keyword spelling of an OVAL enumeration
macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $keyword:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $keyword),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> std::result::Result<Self, ()> {
                match s {
                    $($keyword => Ok($name::$variant),)+
                    _ => Err(()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

keyword_enum!(
    /// Class of a definition
    DefinitionClass {
        Compliance => "compliance",
        Inventory => "inventory",
        Miscellaneous => "miscellaneous",
        Patch => "patch",
        Vulnerability => "vulnerability",
    }
);

keyword_enum!(
    /// Logical operator combining criteria or states
    Operator {
        And => "AND",
        Or => "OR",
        One => "ONE",
        Xor => "XOR",
    }
);

keyword_enum!(
    /// How many collected items must satisfy a test's states
    Check {
        All => "all",
        AtLeastOne => "at least one",
        NoneExist => "none exist",
        NoneSatisfy => "none satisfy",
        OnlyOne => "only one",
    }
);

keyword_enum!(
    /// How many items a test's object must collect
    Existence {
        AllExist => "all_exist",
        AnyExist => "any_exist",
        AtLeastOneExists => "at_least_one_exists",
        NoneExist => "none_exist",
        OnlyOneExists => "only_one_exists",
    }
);

keyword_enum!(
    /// Variable flavour, from the element name
    VariableKind {
        Constant => "constant_variable",
        External => "external_variable",
        Local => "local_variable",
    }
);

/// Node of a definition's criteria tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CriteriaNode {
    Criteria {
        operator: Operator,
        negate: bool,
        children: Vec<CriteriaNode>,
    },
    Criterion {
        test_ref: String,
        negate: bool,
        comment: Option<String>,
    },
    ExtendDefinition {
        definition_ref: String,
        negate: bool,
        comment: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub source: String,
    pub ref_id: String,
    pub ref_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    pub id: String,
    pub version: u32,
    pub class: DefinitionClass,
    pub deprecated: bool,
    pub title: String,
    pub description: String,
    pub references: Vec<Reference>,
    pub criteria: Option<CriteriaNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Test {
    pub id: String,
    pub version: u32,
    /// Platform family, the fragment of the element's namespace (`independent`, `unix`, ...)
    pub family: Option<String>,
    /// Element name, e.g. `textfilecontent54_test`
    pub kind: String,
    pub check: Check,
    pub check_existence: Existence,
    pub state_operator: Operator,
    pub comment: Option<String>,
    pub object_ref: Option<String>,
    pub state_refs: Vec<String>,
}

/// An object or a state; both are identified by family and element name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: String,
    pub version: u32,
    pub family: Option<String>,
    pub kind: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    pub id: String,
    pub version: u32,
    pub kind: VariableKind,
    pub datatype: String,
    pub comment: Option<String>,
    /// Values of a constant variable; empty for the other kinds
    pub values: Vec<String>,
}

/// Element counts of a model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModelCounts {
    pub definitions: usize,
    pub tests: usize,
    pub objects: usize,
    pub states: usize,
    pub variables: usize,
}

/// Parsed OVAL Definitions document
#[derive(Debug, Clone, Serialize)]
pub struct DefinitionModel {
    origin: String,
    generator: Generator,
    definitions: Vec<Definition>,
    tests: Vec<Test>,
    objects: Vec<Item>,
    states: Vec<Item>,
    variables: Vec<Variable>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl DefinitionModel {
    /// Build a model from a definitions source
    ///
    /// # Errors
    ///
    /// - `OvalError::UnreadableInput` if the content cannot be read
    /// - `OvalError::ModelImportFailed` if the document cannot be turned into
    ///   a model; the cause says why
    pub fn import(source: &Source) -> Result<Self> {
        let origin = source.readable_origin();
        let kind = source.kind();
        let text = source.text()?;
        let model = import::build(text, kind, &origin)
            .map_err(|cause| OvalError::ModelImportFailed {
                origin: origin.clone(),
                cause,
            })?;
        tracing::info!(%origin, counts = ?model.counts(), "imported definition model");
        Ok(model)
    }

    /// Readable origin of the source the model was built from
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    pub fn tests(&self) -> &[Test] {
        &self.tests
    }

    pub fn objects(&self) -> &[Item] {
        &self.objects
    }

    pub fn states(&self) -> &[Item] {
        &self.states
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn definition(&self, id: &str) -> Option<&Definition> {
        self.lookup(id, &self.definitions, |d| &d.id)
    }

    pub fn test(&self, id: &str) -> Option<&Test> {
        self.lookup(id, &self.tests, |t| &t.id)
    }

    pub fn object(&self, id: &str) -> Option<&Item> {
        self.lookup(id, &self.objects, |o| &o.id)
    }

    pub fn state(&self, id: &str) -> Option<&Item> {
        self.lookup(id, &self.states, |s| &s.id)
    }

    pub fn variable(&self, id: &str) -> Option<&Variable> {
        self.lookup(id, &self.variables, |v| &v.id)
    }

    // Ids are unique across kinds, so one index serves all collections; the
    // id comparison rejects a hit in a different collection.
    fn lookup<'a, T>(&self, id: &str, items: &'a [T], id_of: impl Fn(&T) -> &String) -> Option<&'a T> {
        self.index
            .get(id)
            .and_then(|&i| items.get(i))
            .filter(|item| id_of(*item) == id)
    }

    /// Tests a definition depends on, following `extend_definition` refs
    ///
    /// Each test appears once, in the order it is first reached.
    pub fn tests_for_definition(&self, id: &str) -> Vec<&Test> {
        let mut tests = Vec::new();
        let mut seen_tests = HashSet::new();
        let mut seen_definitions = HashSet::new();
        self.collect_tests(id, &mut seen_definitions, &mut seen_tests, &mut tests);
        tests
    }

    fn collect_tests<'a>(
        &'a self,
        id: &str,
        seen_definitions: &mut HashSet<String>,
        seen_tests: &mut HashSet<&'a str>,
        out: &mut Vec<&'a Test>,
    ) {
        if !seen_definitions.insert(id.to_string()) {
            return;
        }
        let Some(criteria) = self.definition(id).and_then(|d| d.criteria.as_ref()) else {
            return;
        };

        let mut stack = vec![criteria];
        while let Some(node) = stack.pop() {
            match node {
                CriteriaNode::Criteria { children, .. } => stack.extend(children.iter().rev()),
                CriteriaNode::Criterion { test_ref, .. } => {
                    if let Some(test) = self.test(test_ref) {
                        if seen_tests.insert(test.id.as_str()) {
                            out.push(test);
                        }
                    }
                }
                CriteriaNode::ExtendDefinition { definition_ref, .. } => {
                    self.collect_tests(definition_ref, seen_definitions, seen_tests, out);
                }
            }
        }
    }

    pub fn counts(&self) -> ModelCounts {
        ModelCounts {
            definitions: self.definitions.len(),
            tests: self.tests.len(),
            objects: self.objects.len(),
            states: self.states.len(),
            variables: self.variables.len(),
        }
    }
}
