//! Source data stream resolution
//!
//! This module handles:
//! - Opening a data stream collection and reading its table of contents
//! - Selecting one data stream, explicitly or by the [`SelectionPolicy`]
//! - Registering a component of a given role together with every component
//!   its catalog declares as a dependency, transitively
//! - Handing out registered components as standalone [`Source`]s
//!
//! ## Resolution Process
//!
//! ```text
//! open_bundle(source)
//!     ↓
//! select_datastream(bundle_id)
//!     ↓
//! register_component_with_dependencies(role, component_id, href)
//!     ↓  (walks component-ref catalogs, each ref visited once)
//! get_component_by_href(href)
//! ```

mod collection;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use collection::{Collection, ComponentRef};

use crate::error::{self, Result};
use crate::source::{DocumentKind, Provenance, Source, SourceHandle};

/// Container of a data stream a component-ref is listed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentRole {
    Dictionaries,
    Checklists,
    Checks,
    ExtendedComponents,
}

impl ComponentRole {
    /// Local name of the container element
    pub fn container(self) -> &'static str {
        match self {
            ComponentRole::Dictionaries => "dictionaries",
            ComponentRole::Checklists => "checklists",
            ComponentRole::Checks => "checks",
            ComponentRole::ExtendedComponents => "extended-components",
        }
    }

    pub fn from_container(name: &str) -> Option<Self> {
        match name {
            "dictionaries" => Some(ComponentRole::Dictionaries),
            "checklists" => Some(ComponentRole::Checklists),
            "checks" => Some(ComponentRole::Checks),
            "extended-components" => Some(ComponentRole::ExtendedComponents),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.container())
    }
}

/// How a default is picked when no id was requested and several candidates exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Refuse to guess: fail with an ambiguity error
    #[default]
    Strict,
    /// Take the first candidate in document order
    First,
}

/// Open a data stream collection
///
/// # Errors
///
/// - `OvalError::TypeMismatch` if `source` is not a data stream collection
/// - `OvalError::UnreadableInput` if its content cannot be read
/// - `OvalError::BundleParseError` if the collection is structurally corrupt
pub fn open_bundle(source: SourceHandle) -> Result<BundleSession> {
    BundleSession::open(source)
}

/// Resolution state of one opened data stream collection
///
/// Owns every component registered so far; they are released together with
/// the session.
#[derive(Debug)]
pub struct BundleSession {
    source: SourceHandle,
    collection: Collection,
    selected: Option<usize>,
    policy: SelectionPolicy,
    registry: BTreeMap<String, SourceHandle>,
}

impl BundleSession {
    /// See [`open_bundle`]
    ///
    /// # Errors
    ///
    /// See [`open_bundle`].
    pub fn open(source: SourceHandle) -> Result<Self> {
        let origin = source.readable_origin();
        let kind = source.kind();
        if kind != DocumentKind::Bundle {
            return Err(error::validation::type_mismatch(
                origin,
                DocumentKind::Bundle,
                kind,
            ));
        }

        let text = source.text()?;
        let collection =
            Collection::parse(text).map_err(|reason| error::bundle::parse_failed(&origin, reason))?;
        tracing::debug!(
            %origin,
            collection = %collection.id,
            datastreams = collection.streams.len(),
            components = collection.components.len(),
            "opened data stream collection"
        );

        Ok(Self {
            source,
            collection,
            selected: None,
            policy: SelectionPolicy::default(),
            registry: BTreeMap::new(),
        })
    }

    pub fn set_selection_policy(&mut self, policy: SelectionPolicy) {
        self.policy = policy;
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// The collection source this session was opened from
    pub fn source(&self) -> &SourceHandle {
        &self.source
    }

    pub fn collection_id(&self) -> &str {
        &self.collection.id
    }

    /// Ids of all data streams, in document order
    pub fn datastream_ids(&self) -> Vec<&str> {
        self.collection.streams.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn selected_datastream(&self) -> Option<&str> {
        self.selected
            .map(|index| self.collection.streams[index].id.as_str())
    }

    /// Select the data stream components are registered from
    ///
    /// Without a `bundle_id` the only data stream is selected; with several,
    /// the selection policy decides.
    ///
    /// # Errors
    ///
    /// - `OvalError::DatastreamNotFound` if `bundle_id` names no data stream
    /// - `OvalError::AmbiguousDatastream` if no id was given, several data
    ///   streams exist and the policy is [`SelectionPolicy::Strict`]
    pub fn select_datastream(&mut self, bundle_id: Option<&str>) -> Result<()> {
        let streams = &self.collection.streams;
        let index = match bundle_id {
            Some(id) => streams
                .iter()
                .position(|s| s.id == id)
                .ok_or_else(|| error::bundle::datastream_not_found(id))?,
            None if streams.len() == 1 || self.policy == SelectionPolicy::First => 0,
            None => return Err(error::bundle::ambiguous_datastream(&self.datastream_ids())),
        };

        tracing::debug!(datastream = %streams[index].id, "selected data stream");
        self.selected = Some(index);
        Ok(())
    }

    /// Register the component of `role` under `href`, plus its dependencies
    ///
    /// `component_id` narrows the candidates to the component-ref with that
    /// id or the one pointing at the component with that id. Dependencies are
    /// registered under their catalog names. Nothing is registered unless the
    /// whole dependency closure resolves.
    ///
    /// # Errors
    ///
    /// - `OvalError::InternalResolutionError` if no data stream is selected
    /// - `OvalError::ComponentNotFound` if no candidate matches, or a
    ///   dependency cannot be resolved
    /// - `OvalError::AmbiguousComponent` if several candidates match and the
    ///   policy is [`SelectionPolicy::Strict`]
    /// - `OvalError::BundleParseError` for remote component hrefs, or when a
    ///   name would refer to two different component-refs
    /// - `OvalError::UnreadableInput` if a local component file cannot be read
    pub fn register_component_with_dependencies(
        &mut self,
        role: ComponentRole,
        component_id: Option<&str>,
        href: &str,
    ) -> Result<()> {
        let Some(index) = self.selected else {
            return Err(error::bundle::internal_resolution(href));
        };
        let stream = &self.collection.streams[index];
        let candidates: Vec<&ComponentRef> = stream
            .refs
            .iter()
            .filter(|(r, _)| *r == role)
            .filter_map(|(_, id)| self.collection.refs.get(id))
            .collect();

        let chosen = match component_id {
            Some(id) => candidates
                .iter()
                .copied()
                .find(|c| c.id == id || c.local_target() == Some(id))
                .ok_or_else(|| error::bundle::component_not_found(role.to_string(), id))?,
            None => match candidates.as_slice() {
                [] => {
                    return Err(error::bundle::component_not_found(
                        role.to_string(),
                        "(any)",
                    ));
                }
                [only] => *only,
                [first, ..] if self.policy == SelectionPolicy::First => *first,
                all => {
                    let ids: Vec<&str> = all.iter().map(|c| c.id.as_str()).collect();
                    return Err(error::bundle::ambiguous_component(role.to_string(), &ids));
                }
            },
        };
        tracing::debug!(%role, component_ref = %chosen.id, href, "registering component");

        let mut extracted: HashMap<&str, SourceHandle> = HashMap::new();
        let mut claimed: HashMap<String, &str> = HashMap::new();
        let mut pending: Vec<(String, SourceHandle)> = Vec::new();
        let mut stack: Vec<(String, &ComponentRef)> = vec![(href.to_string(), chosen)];

        while let Some((name, cref)) = stack.pop() {
            self.claim(&mut claimed, &name, &cref.id)?;
            if let Some(handle) = extracted.get(cref.id.as_str()) {
                pending.push((name, Rc::clone(handle)));
                continue;
            }

            let handle = self.extract(role, cref)?;
            extracted.insert(&cref.id, Rc::clone(&handle));
            pending.push((name, handle));

            for entry in cref.catalog.iter().rev() {
                let target = entry.uri.strip_prefix('#').unwrap_or(&entry.uri);
                let dependency = self.collection.refs.get(target).ok_or_else(|| {
                    error::bundle::component_not_found(role.to_string(), &entry.uri)
                })?;
                tracing::trace!(from = %cref.id, to = %dependency.id, name = %entry.name, "dependency");
                stack.push((entry.name.clone(), dependency));
            }
        }

        for (name, handle) in pending {
            tracing::debug!(%name, origin = %handle.readable_origin(), "registered");
            self.registry.insert(name, handle);
        }
        Ok(())
    }

    /// Reserve `name` for the component-ref `cref_id`
    ///
    /// A name may be reached several times, but always for the same
    /// component-ref, including names registered by earlier calls.
    fn claim<'c>(
        &self,
        claimed: &mut HashMap<String, &'c str>,
        name: &str,
        cref_id: &'c str,
    ) -> Result<()> {
        let previous = match claimed.get(name) {
            Some(owner) => Some(*owner),
            None => self.registry.get(name).and_then(|handle| match handle.provenance() {
                Provenance::Extracted { component_ref, .. } => Some(component_ref.as_str()),
                _ => None,
            }),
        };
        if let Some(owner) = previous.filter(|owner| *owner != cref_id) {
            return Err(error::bundle::parse_failed(
                self.source.readable_origin(),
                format!("'{name}' refers to both '{owner}' and '{cref_id}'"),
            ));
        }
        claimed.insert(name.to_string(), cref_id);
        Ok(())
    }

    /// Registered component for `href`
    ///
    /// # Errors
    ///
    /// Returns `OvalError::InternalResolutionError` if nothing was registered
    /// under `href`.
    pub fn get_component_by_href(&self, href: &str) -> Result<SourceHandle> {
        self.registry
            .get(href)
            .cloned()
            .ok_or_else(|| error::bundle::internal_resolution(href))
    }

    /// Names every registered component can be fetched by
    pub fn registered_hrefs(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    fn extract(&self, role: ComponentRole, cref: &ComponentRef) -> Result<SourceHandle> {
        let bundle = self.source.readable_origin();
        let provenance = |component_id: &str| Provenance::Extracted {
            bundle: bundle.clone(),
            component_ref: cref.id.clone(),
            component_id: component_id.to_string(),
            href: cref.href.clone(),
        };

        if let Some(target) = cref.local_target() {
            let component = self
                .collection
                .components
                .get(target)
                .ok_or_else(|| error::bundle::component_not_found(role.to_string(), target))?;
            let bytes = component.standalone(self.source.text()?);
            return Ok(Rc::new(Source::with_content(provenance(&component.id), bytes)));
        }

        if cref.href.contains("://") {
            return Err(error::bundle::parse_failed(
                &bundle,
                format!("remote component '{}' is not supported", cref.href),
            ));
        }

        let base = self
            .source
            .path()
            .and_then(Path::parent)
            .ok_or_else(|| {
                error::bundle::parse_failed(
                    &bundle,
                    format!(
                        "component '{}' is a local file but the collection has no directory",
                        cref.href
                    ),
                )
            })?;
        let path = base.join(&cref.href);
        let bytes = std::fs::read(&path)
            .map_err(|e| error::source::unreadable(path.display().to_string(), e.to_string()))?;
        Ok(Rc::new(Source::with_content(provenance(&cref.href), bytes)))
    }
}
