//! Test fixtures shared by unit tests
//!
//! Builders for small but complete OVAL Definitions documents and source data
//! stream collections, plus temp directory helpers.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{DatastreamSpec, datastream_collection, definitions_document};
//!
//! let oval = definitions_document("oval:org.example:def:1");
//! let ds = datastream_collection(&DatastreamSpec::two_checks());
//! ```

use std::path::PathBuf;

use tempfile::TempDir;

pub const TIMESTAMP: &str = "2024-01-01T00:00:00";

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Write `content` to `name` inside `temp` and return the full path.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_fixture(temp: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = temp.path().join(name);
    std::fs::write(&path, content).expect("Failed to write fixture");
    path
}

struct DefinitionsFixture<'a> {
    def_id: &'a str,
    class: Option<&'a str>,
    test_ref: &'a str,
    schema_version: Option<&'a str>,
}

impl DefinitionsFixture<'_> {
    fn render(&self) -> String {
        let class = self
            .class
            .map(|c| format!(r#" class="{c}""#))
            .unwrap_or_default();
        let schema_version = self
            .schema_version
            .map(|v| format!("<oval:schema_version>{v}</oval:schema_version>"))
            .unwrap_or_default();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<oval_definitions xmlns="http://oval.mitre.org/XMLSchema/oval-definitions-5"
    xmlns:oval="http://oval.mitre.org/XMLSchema/oval-common-5"
    xmlns:ind="http://oval.mitre.org/XMLSchema/oval-definitions-5#independent">
  <generator>
    <oval:product_name>fixture generator</oval:product_name>
    <oval:product_version>1.0</oval:product_version>
    {schema_version}
    <oval:timestamp>{TIMESTAMP}</oval:timestamp>
  </generator>
  <definitions>
    <definition id="{def_id}" version="1"{class}>
      <metadata>
        <title>Ensure the example setting is enabled</title>
        <description>The example setting must be set to yes.</description>
        <reference source="CCE" ref_id="CCE-00000-0"/>
      </metadata>
      <criteria operator="AND">
        <criterion test_ref="{test_ref}" comment="example setting is enabled"/>
      </criteria>
    </definition>
  </definitions>
  <tests>
    <ind:textfilecontent54_test id="oval:org.example:tst:1" version="1" check="all"
        check_existence="at_least_one_exists" comment="example setting is enabled">
      <ind:object object_ref="oval:org.example:obj:1"/>
      <ind:state state_ref="oval:org.example:ste:1"/>
    </ind:textfilecontent54_test>
  </tests>
  <objects>
    <ind:textfilecontent54_object id="oval:org.example:obj:1" version="1">
      <ind:filepath>/etc/example.conf</ind:filepath>
      <ind:pattern operation="pattern match">^setting\s+(\S+)$</ind:pattern>
      <ind:instance datatype="int">1</ind:instance>
    </ind:textfilecontent54_object>
  </objects>
  <states>
    <ind:textfilecontent54_state id="oval:org.example:ste:1" version="1">
      <ind:subexpression var_ref="oval:org.example:var:1" var_check="all"/>
    </ind:textfilecontent54_state>
  </states>
  <variables>
    <constant_variable id="oval:org.example:var:1" version="1" datatype="string"
        comment="expected setting value">
      <value>yes</value>
    </constant_variable>
  </variables>
</oval_definitions>
"#,
            def_id = self.def_id,
            test_ref = self.test_ref,
        )
    }
}

/// A valid OVAL Definitions document with one definition, test, object,
/// state and variable.
pub fn definitions_document(def_id: &str) -> String {
    DefinitionsFixture {
        def_id,
        class: Some("compliance"),
        test_ref: "oval:org.example:tst:1",
        schema_version: Some("5.11.2"),
    }
    .render()
}

/// A definitions document that fails structural validation: the definition
/// has no class and the generator no schema version.
pub fn invalid_definitions_document() -> String {
    DefinitionsFixture {
        def_id: "oval:org.example:def:1",
        class: None,
        test_ref: "oval:org.example:tst:1",
        schema_version: None,
    }
    .render()
}

/// A structurally valid document whose criterion references a missing test.
pub fn dangling_definitions_document() -> String {
    DefinitionsFixture {
        def_id: "oval:org.example:def:1",
        class: Some("compliance"),
        test_ref: "oval:org.example:tst:99",
        schema_version: Some("5.11.2"),
    }
    .render()
}

/// A `component-ref` inside a data stream container
#[derive(Debug, Clone)]
pub struct RefSpec {
    pub id: String,
    pub href: String,
    /// `(name, uri)` entries of the ref's catalog
    pub catalog: Vec<(String, String)>,
}

/// One `data-stream` of a collection
#[derive(Debug, Clone)]
pub struct StreamSpec {
    pub id: String,
    pub checklists: Vec<RefSpec>,
    pub checks: Vec<RefSpec>,
}

/// An embedded `component`; `body` is its single child element
#[derive(Debug, Clone)]
pub struct ComponentSpec {
    pub id: String,
    pub body: String,
}

/// Shape of a data stream collection to render
#[derive(Debug, Clone)]
pub struct DatastreamSpec {
    pub streams: Vec<StreamSpec>,
    pub components: Vec<ComponentSpec>,
}

pub fn stream_id(n: usize) -> String {
    format!("scap_org.example_datastream_{n}")
}

pub fn cref_id(n: usize) -> String {
    format!("scap_org.example_cref_oval{n}.xml")
}

pub fn component_id(n: usize) -> String {
    format!("scap_org.example_comp_oval{n}.xml")
}

/// Component-ref pointing at the embedded OVAL component `n`
pub fn oval_ref(n: usize) -> RefSpec {
    RefSpec {
        id: cref_id(n),
        href: format!("#{}", component_id(n)),
        catalog: Vec::new(),
    }
}

/// Embedded OVAL component `n`, defining `oval:org.example:def:<n>`
pub fn oval_component(n: usize) -> ComponentSpec {
    let document = definitions_document(&format!("oval:org.example:def:{n}"));
    ComponentSpec {
        id: component_id(n),
        body: strip_prolog(&document).to_string(),
    }
}

fn strip_prolog(document: &str) -> &str {
    match document.find("?>") {
        Some(end) if document.starts_with("<?xml") => document[end + 2..].trim_start(),
        _ => document,
    }
}

impl DatastreamSpec {
    /// One stream with one OVAL component in `checks`
    pub fn single_checks() -> Self {
        Self {
            streams: vec![StreamSpec {
                id: stream_id(1),
                checklists: Vec::new(),
                checks: vec![oval_ref(1)],
            }],
            components: vec![oval_component(1)],
        }
    }

    /// One stream with two OVAL components in `checks`
    pub fn two_checks() -> Self {
        Self {
            streams: vec![StreamSpec {
                id: stream_id(1),
                checklists: Vec::new(),
                checks: vec![oval_ref(1), oval_ref(2)],
            }],
            components: vec![oval_component(1), oval_component(2)],
        }
    }

    /// Two streams with one OVAL component each
    pub fn two_streams() -> Self {
        Self {
            streams: vec![
                StreamSpec {
                    id: stream_id(1),
                    checklists: Vec::new(),
                    checks: vec![oval_ref(1)],
                },
                StreamSpec {
                    id: stream_id(2),
                    checklists: Vec::new(),
                    checks: vec![oval_ref(2)],
                },
            ],
            components: vec![oval_component(1), oval_component(2)],
        }
    }

    /// One stream whose checklist depends on OVAL component 1 through its catalog
    pub fn with_checklist() -> Self {
        let checklist = RefSpec {
            id: "scap_org.example_cref_xccdf.xml".to_string(),
            href: "#scap_org.example_comp_xccdf.xml".to_string(),
            catalog: vec![("oval1.xml".to_string(), format!("#{}", cref_id(1)))],
        };
        Self {
            streams: vec![StreamSpec {
                id: stream_id(1),
                checklists: vec![checklist],
                checks: vec![oval_ref(1)],
            }],
            components: vec![
                ComponentSpec {
                    id: "scap_org.example_comp_xccdf.xml".to_string(),
                    body: r#"<Benchmark xmlns="http://checklists.nist.gov/xccdf/1.2" id="xccdf_org.example_benchmark_test"/>"#
                        .to_string(),
                },
                oval_component(1),
            ],
        }
    }
}

fn render_refs(out: &mut String, container: &str, refs: &[RefSpec]) {
    if refs.is_empty() {
        return;
    }
    out.push_str(&format!("    <ds:{container}>\n"));
    for r in refs {
        if r.catalog.is_empty() {
            out.push_str(&format!(
                "      <ds:component-ref id=\"{}\" xlink:href=\"{}\"/>\n",
                r.id, r.href
            ));
            continue;
        }
        out.push_str(&format!(
            "      <ds:component-ref id=\"{}\" xlink:href=\"{}\">\n        <cat:catalog>\n",
            r.id, r.href
        ));
        for (name, uri) in &r.catalog {
            out.push_str(&format!(
                "          <cat:uri name=\"{name}\" uri=\"{uri}\"/>\n"
            ));
        }
        out.push_str("        </cat:catalog>\n      </ds:component-ref>\n");
    }
    out.push_str(&format!("    </ds:{container}>\n"));
}

/// Render a source data stream collection (SCAP 1.2)
pub fn datastream_collection(spec: &DatastreamSpec) -> String {
    let mut out = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ds:data-stream-collection xmlns:ds="http://scap.nist.gov/schema/scap/source/1.2"
    xmlns:xlink="http://www.w3.org/1999/xlink"
    xmlns:cat="urn:oasis:names:tc:entity:xmlns:xml:catalog"
    id="scap_org.example_collection_from_xccdf_test" schematron-version="1.2">
"#,
    );
    for stream in &spec.streams {
        out.push_str(&format!(
            "  <ds:data-stream id=\"{}\" scap-version=\"1.2\" use-case=\"OTHER\" timestamp=\"{TIMESTAMP}\">\n",
            stream.id
        ));
        render_refs(&mut out, "checklists", &stream.checklists);
        render_refs(&mut out, "checks", &stream.checks);
        out.push_str("  </ds:data-stream>\n");
    }
    for component in &spec.components {
        out.push_str(&format!(
            "  <ds:component id=\"{}\" timestamp=\"{TIMESTAMP}\">\n{}\n  </ds:component>\n",
            component.id, component.body
        ));
    }
    out.push_str("</ds:data-stream-collection>\n");
    out
}
