//! The session: one input file resolved into a definition model
//!
//! A [`Session`] owns the user's input, the configuration a caller sets on
//! it, and the pipeline state produced by [`Session::load_definitions`]:
//!
//! ```text
//! main_source ──classify──> DefinitionsDocument ─────────────────┐
//!      │                                                         ↓
//!      └──────────────────> Bundle ──open/select/register──> definitions_source
//!                                                                ↓
//!                                                         DefinitionModel
//! ```
//!
//! Every owned handle is released when its field is replaced or cleared, and
//! all of them when the session is dropped.

use std::fmt;
use std::path::Path;
use std::rc::Rc;

use crate::bundle::{BundleSession, ComponentRole, SelectionPolicy, open_bundle};
use crate::error::{self, Result};
use crate::model::DefinitionModel;
use crate::source::{DocumentKind, Source, SourceHandle};
use crate::validate::{
    self, BuiltinEngine, DiagnosticSink, NullSink, ValidationEngine, ValidationLevel,
};

/// Name the OVAL component of a data stream is registered under
pub const DEFINITIONS_HREF: &str = "oval.xml";

/// Where results and reports should be written
///
/// The session only carries these for downstream collaborators; it never
/// interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTargets {
    pub results: Option<String>,
    pub report: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn non_empty_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

pub struct Session {
    main_source: SourceHandle,
    bundle_session: Option<BundleSession>,
    definitions_source: Option<SourceHandle>,
    variables_source: Option<SourceHandle>,
    directives_source: Option<SourceHandle>,
    bundle_id: Option<String>,
    component_id: Option<String>,
    export: ExportTargets,
    sink: Option<Box<dyn DiagnosticSink>>,
    validation: bool,
    full_validation: bool,
    selection: SelectionPolicy,
    engine: Box<dyn ValidationEngine>,
    model: Option<DefinitionModel>,
}

impl Session {
    /// Create a session for the file at `path`
    ///
    /// # Errors
    ///
    /// - `OvalError::UnreadableInput` if the file cannot be read
    /// - `OvalError::UnsupportedDocumentKind` if it is neither an OVAL
    ///   Definitions document nor a source data stream collection
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let source = Source::from_file(path.as_ref());
        source.bytes()?;
        Self::from_source(source)
    }

    /// Create a session on top of an existing source
    ///
    /// # Errors
    ///
    /// Returns `OvalError::UnsupportedDocumentKind` if the source is neither
    /// an OVAL Definitions document nor a source data stream collection.
    pub fn from_source(source: SourceHandle) -> Result<Self> {
        let kind = source.kind();
        if !kind.is_session_input() {
            return Err(error::source::unsupported_kind(
                source.readable_origin(),
                kind,
            ));
        }
        tracing::debug!(origin = %source.readable_origin(), %kind, "session created");

        Ok(Self {
            main_source: source,
            bundle_session: None,
            definitions_source: None,
            variables_source: None,
            directives_source: None,
            bundle_id: None,
            component_id: None,
            export: ExportTargets::default(),
            sink: None,
            validation: false,
            full_validation: false,
            selection: SelectionPolicy::default(),
            engine: Box::new(BuiltinEngine),
            model: None,
        })
    }

    /// Set or clear the external variables file; nothing is read yet
    ///
    /// `None` or an empty path clears it.
    pub fn set_variables(&mut self, path: Option<&Path>) {
        self.variables_source = non_empty_path(path).map(Source::from_file);
    }

    /// Set or clear the directives file; nothing is read yet
    ///
    /// `None` or an empty path clears it.
    pub fn set_directives(&mut self, path: Option<&Path>) {
        self.directives_source = non_empty_path(path).map(Source::from_file);
    }

    /// Data stream to resolve; `None` or `""` restores the default choice
    pub fn set_bundle_id(&mut self, id: Option<&str>) {
        self.bundle_id = non_empty(id);
    }

    /// Component (or component-ref) id to resolve; `None` or `""` restores
    /// the default choice
    pub fn set_component_id(&mut self, id: Option<&str>) {
        self.component_id = non_empty(id);
    }

    pub fn set_results_export(&mut self, target: Option<&str>) {
        self.export.results = non_empty(target);
    }

    pub fn set_report_export(&mut self, target: Option<&str>) {
        self.export.report = non_empty(target);
    }

    /// Sink that receives validation records; it is only called during
    /// [`load_definitions`](Self::load_definitions)
    pub fn set_diagnostic_sink(&mut self, sink: Option<Box<dyn DiagnosticSink>>) {
        self.sink = sink;
    }

    /// Turn validation on or off; `full` adds business rule checks
    pub fn set_validation(&mut self, validate: bool, full: bool) {
        self.validation = validate;
        self.full_validation = full;
    }

    pub fn set_selection_policy(&mut self, policy: SelectionPolicy) {
        self.selection = policy;
    }

    pub fn set_validation_engine(&mut self, engine: Box<dyn ValidationEngine>) {
        self.engine = engine;
    }

    /// Resolve the input into a definition model
    ///
    /// A data stream collection is opened, a data stream selected and its
    /// `checks` component extracted; a definitions document is used as is.
    /// With validation enabled the input and the resolved definitions are
    /// both validated before the model is built.
    ///
    /// Session state only changes when every step succeeds: the previous
    /// model, definitions source and bundle session are then replaced
    /// together. On failure they are left as they were.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing step; see [`OvalError`](crate::error::OvalError).
    pub fn load_definitions(&mut self) -> Result<()> {
        let main = Rc::clone(&self.main_source);
        let kind = main.kind();
        if !kind.is_session_input() {
            return Err(error::source::unsupported_kind(main.readable_origin(), kind));
        }

        if self.validation {
            self.run_validation(&main, kind)?;
        }

        let (bundle, definitions) = match kind {
            DocumentKind::Bundle => {
                let mut bundle = open_bundle(Rc::clone(&main))?;
                bundle.set_selection_policy(self.selection);
                bundle.select_datastream(self.bundle_id.as_deref())?;
                bundle.register_component_with_dependencies(
                    ComponentRole::Checks,
                    self.component_id.as_deref(),
                    DEFINITIONS_HREF,
                )?;
                let definitions = bundle.get_component_by_href(DEFINITIONS_HREF)?;
                (Some(bundle), definitions)
            }
            DocumentKind::DefinitionsDocument => (None, main),
            DocumentKind::Unknown => {
                return Err(error::source::unsupported_kind(main.readable_origin(), kind));
            }
        };

        if self.validation {
            self.run_validation(&definitions, DocumentKind::DefinitionsDocument)?;
        }

        let model = DefinitionModel::import(&definitions)?;

        self.bundle_session = bundle;
        self.definitions_source = Some(definitions);
        self.model = Some(model);
        Ok(())
    }

    fn run_validation(&mut self, source: &Source, expected: DocumentKind) -> Result<()> {
        let level = ValidationLevel::from_full(self.full_validation);
        let mut fallback = NullSink;
        let sink: &mut dyn DiagnosticSink = match self.sink.as_deref_mut() {
            Some(sink) => sink,
            None => &mut fallback,
        };
        validate::validate(source, expected, level, self.engine.as_ref(), sink)
    }

    pub fn main_source(&self) -> &SourceHandle {
        &self.main_source
    }

    pub fn bundle_session(&self) -> Option<&BundleSession> {
        self.bundle_session.as_ref()
    }

    pub fn definitions_source(&self) -> Option<&SourceHandle> {
        self.definitions_source.as_ref()
    }

    pub fn variables_source(&self) -> Option<&SourceHandle> {
        self.variables_source.as_ref()
    }

    pub fn directives_source(&self) -> Option<&SourceHandle> {
        self.directives_source.as_ref()
    }

    pub fn bundle_id(&self) -> Option<&str> {
        self.bundle_id.as_deref()
    }

    pub fn component_id(&self) -> Option<&str> {
        self.component_id.as_deref()
    }

    pub fn results_export(&self) -> Option<&str> {
        self.export.results.as_deref()
    }

    pub fn report_export(&self) -> Option<&str> {
        self.export.report.as_deref()
    }

    pub fn validation_enabled(&self) -> bool {
        self.validation
    }

    pub fn full_validation_enabled(&self) -> bool {
        self.full_validation
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        self.selection
    }

    /// The model built by the last successful load
    pub fn model(&self) -> Option<&DefinitionModel> {
        self.model.as_ref()
    }

    /// Release the session and everything it owns
    pub fn destroy(self) {
        tracing::debug!(origin = %self.main_source.readable_origin(), "session destroyed");
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("main_source", &self.main_source)
            .field("definitions_source", &self.definitions_source)
            .field("variables_source", &self.variables_source)
            .field("directives_source", &self.directives_source)
            .field("bundle_id", &self.bundle_id)
            .field("component_id", &self.component_id)
            .field("export", &self.export)
            .field("validation", &self.validation)
            .field("full_validation", &self.full_validation)
            .field("selection", &self.selection)
            .field("has_sink", &self.sink.is_some())
            .field("has_model", &self.model.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OvalError;
    use crate::test_fixtures::{
        DatastreamSpec, component_id, create_temp_dir, datastream_collection,
        definitions_document, write_fixture,
    };

    #[test]
    fn test_new_unreadable() {
        let err = Session::new("/nonexistent/oval.xml").unwrap_err();
        assert!(matches!(err, OvalError::UnreadableInput { .. }));
    }

    #[test]
    fn test_defaults_are_off() {
        let source = Source::from_bytes("oval.xml", definitions_document("oval:a:def:1"));
        let session = Session::from_source(source).unwrap();
        assert!(!session.validation_enabled());
        assert!(!session.full_validation_enabled());
        assert_eq!(session.selection_policy(), SelectionPolicy::Strict);
        assert!(session.model().is_none());
        assert!(session.definitions_source().is_none());
    }

    #[test]
    fn test_string_setters_clear_on_empty() {
        let source = Source::from_bytes("oval.xml", definitions_document("oval:a:def:1"));
        let mut session = Session::from_source(source).unwrap();
        session.set_bundle_id(Some("scap_a_datastream_1"));
        session.set_component_id(Some("scap_a_cref_1"));
        session.set_results_export(Some("results.xml"));
        session.set_report_export(Some("report.html"));
        assert_eq!(session.bundle_id(), Some("scap_a_datastream_1"));
        assert_eq!(session.results_export(), Some("results.xml"));

        session.set_bundle_id(Some(""));
        session.set_component_id(None);
        session.set_results_export(None);
        session.set_report_export(Some(""));
        assert!(session.bundle_id().is_none());
        assert!(session.component_id().is_none());
        assert!(session.results_export().is_none());
        assert!(session.report_export().is_none());
    }

    #[test]
    fn test_definitions_source_is_main_source() {
        let source = Source::from_bytes("oval.xml", definitions_document("oval:a:def:1"));
        let mut session = Session::from_source(source).unwrap();
        session.load_definitions().unwrap();
        assert!(Rc::ptr_eq(
            session.definitions_source().unwrap(),
            session.main_source()
        ));
        assert!(session.bundle_session().is_none());
    }

    #[test]
    fn test_bundle_from_file() {
        let temp = create_temp_dir();
        let path = write_fixture(
            &temp,
            "ds.xml",
            &datastream_collection(&DatastreamSpec::single_checks()),
        );
        let mut session = Session::new(&path).unwrap();
        session.set_validation(true, true);
        session.load_definitions().unwrap();

        let bundle = session.bundle_session().unwrap();
        assert_eq!(bundle.registered_hrefs().collect::<Vec<_>>(), vec![DEFINITIONS_HREF]);
        let origin = session.definitions_source().unwrap().readable_origin();
        assert_eq!(origin, format!("{}/{}", path.display(), component_id(1)));
    }
}
