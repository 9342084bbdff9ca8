//! Formatters for a loaded session
//!
//! A [`SessionSummary`] is computed once from a session and rendered by any
//! [`SummaryFormatter`], plain text for terminals or JSON for scripts.

use console::Style;
use serde::Serialize;

use crate::error::Result;
use crate::model::{DefinitionClass, Generator, ModelCounts};
use crate::session::Session;
use crate::source::{DocumentKind, Provenance};

/// Component a data stream session resolved the definitions from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentSummary {
    pub component_ref: String,
    pub component_id: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionLine {
    pub id: String,
    pub class: DefinitionClass,
    pub title: String,
    pub deprecated: bool,
}

/// Everything the info command reports about a loaded session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub input: String,
    pub kind: DocumentKind,
    pub digest: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datastream: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentSummary>,
    pub validated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directives: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    pub generator: Generator,
    pub counts: ModelCounts,
    pub definitions: Vec<DefinitionLine>,
}

impl SessionSummary {
    /// Summarize a session; `None` until definitions were loaded
    pub fn from_session(session: &Session) -> Result<Option<Self>> {
        let Some(model) = session.model() else {
            return Ok(None);
        };
        let main = session.main_source();

        let component = session
            .definitions_source()
            .and_then(|source| match source.provenance() {
                Provenance::Extracted {
                    component_ref,
                    component_id,
                    href,
                    ..
                } => Some(ComponentSummary {
                    component_ref: component_ref.clone(),
                    component_id: component_id.clone(),
                    href: href.clone(),
                }),
                _ => None,
            });

        Ok(Some(Self {
            input: main.readable_origin(),
            kind: main.kind(),
            digest: main.digest()?,
            datastream: session
                .bundle_session()
                .and_then(|b| b.selected_datastream())
                .map(str::to_string),
            component,
            validated: session.validation_enabled(),
            variables: session.variables_source().map(|s| s.readable_origin()),
            directives: session.directives_source().map(|s| s.readable_origin()),
            results: session.results_export().map(str::to_string),
            report: session.report_export().map(str::to_string),
            generator: model.generator().clone(),
            counts: model.counts(),
            definitions: model
                .definitions()
                .iter()
                .map(|d| DefinitionLine {
                    id: d.id.clone(),
                    class: d.class,
                    title: d.title.clone(),
                    deprecated: d.deprecated,
                })
                .collect(),
        }))
    }
}

/// Formatter trait for rendering a session summary
pub trait SummaryFormatter {
    fn format(&self, summary: &SessionSummary) -> Result<String>;
}

/// Human readable summary
pub struct SimpleFormatter;

impl SimpleFormatter {
    fn field(out: &mut String, label: &str, value: impl std::fmt::Display) {
        out.push_str(&format!("  {} {}\n", Style::new().bold().apply_to(label), value));
    }
}

impl SummaryFormatter for SimpleFormatter {
    fn format(&self, summary: &SessionSummary) -> Result<String> {
        let mut out = String::new();
        out.push_str(&format!(
            "{}\n",
            Style::new().bold().yellow().apply_to(&summary.input)
        ));
        Self::field(&mut out, "Document:", summary.kind);
        Self::field(&mut out, "Digest:", &summary.digest);
        if let Some(ref stream) = summary.datastream {
            Self::field(&mut out, "Data stream:", stream);
        }
        if let Some(ref component) = summary.component {
            Self::field(
                &mut out,
                "Component:",
                format!("{} ({})", component.component_id, component.component_ref),
            );
        }

        let generator = &summary.generator;
        let product = match (&generator.product_name, &generator.product_version) {
            (Some(name), Some(version)) => format!("{name} {version}"),
            (Some(name), None) => name.clone(),
            _ => Style::new().dim().apply_to("unknown").to_string(),
        };
        Self::field(&mut out, "Generator:", product);
        Self::field(&mut out, "Schema version:", &generator.schema_version);
        Self::field(&mut out, "Timestamp:", &generator.timestamp);
        Self::field(
            &mut out,
            "Validated:",
            if summary.validated { "yes" } else { "no" },
        );
        for (label, value) in [
            ("Variables:", &summary.variables),
            ("Directives:", &summary.directives),
            ("Results:", &summary.results),
            ("Report:", &summary.report),
        ] {
            if let Some(value) = value {
                Self::field(&mut out, label, value);
            }
        }

        let counts = summary.counts;
        Self::field(
            &mut out,
            "Contents:",
            format!(
                "{} definitions, {} tests, {} objects, {} states, {} variables",
                counts.definitions, counts.tests, counts.objects, counts.states, counts.variables
            ),
        );

        if !summary.definitions.is_empty() {
            out.push_str(&format!("  {}\n", Style::new().bold().apply_to("Definitions:")));
            for definition in &summary.definitions {
                let id = Style::new().cyan().apply_to(&definition.id);
                let class = Style::new().dim().apply_to(format!("[{}]", definition.class));
                let deprecated = if definition.deprecated {
                    format!(" {}", Style::new().red().apply_to("(deprecated)"))
                } else {
                    String::new()
                };
                out.push_str(&format!(
                    "    - {id} {class} {}{deprecated}\n",
                    definition.title
                ));
            }
        }

        Ok(out)
    }
}

/// JSON formatter for programmatic output
pub struct JsonFormatter;

impl SummaryFormatter for JsonFormatter {
    fn format(&self, summary: &SessionSummary) -> Result<String> {
        Ok(serde_json::to_string_pretty(summary)?)
    }
}
