//! Declarative scenario definitions.
//!
//! A scenario is a YAML document describing a whole organization model:
//! class hierarchy, instances, relations and cardinality restrictions. It
//! is host and test tooling on top of the core, not an ontology format.
//!
//! Example YAML:
//! ```yaml
//! scenario:
//!   prefix: "urn:demo#"
//!   subclasses:
//!     - { class: "Sherpa", parent: "Robot" }
//!   instances:
//!     - { name: "sherpa-0", class: "Actor", model: "Sherpa" }
//!   relations:
//!     - { subject: "Sherpa", property: "has", object: "camera-0" }
//!   restrictions:
//!     - { on: "Sherpa", requires: "Camera", kind: "exact", cardinality: 2 }
//! ```
//!
//! Bare names resolve against the scenario prefix; names of the built-in
//! vocabulary (`Actor`, `has`, `modeledBy`, ...) resolve against the
//! vocabulary base, and anything containing a scheme or namespace
//! separator is taken verbatim.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::graph::KnowledgeGraph;
use crate::iri::Iri;
use crate::organization::OrganizationModel;
use crate::restriction::{Cardinality, Restriction};
use crate::vocabulary;

/// Default prefix for scenario-local names.
const DEFAULT_PREFIX: &str = "urn:scenario#";

/// Errors raised while loading or validating a scenario document.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Scenario definition validation failed.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// A parsed scenario document.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Prefix for bare names.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Direct subclass declarations.
    #[serde(default)]
    pub subclasses: Vec<SubclassSpec>,

    /// Instance declarations with optional models.
    #[serde(default)]
    pub instances: Vec<InstanceSpec>,

    /// Arbitrary relation edges.
    #[serde(default)]
    pub relations: Vec<RelationSpec>,

    /// Cardinality restrictions declared on classes.
    #[serde(default)]
    pub restrictions: Vec<RestrictionSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubclassSpec {
    pub class: String,
    pub parent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstanceSpec {
    pub name: String,
    pub class: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationSpec {
    pub subject: String,
    pub property: String,
    pub object: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestrictionSpec {
    /// Class the restriction is declared on.
    pub on: String,
    /// Qualification type that is required.
    pub requires: String,
    /// One of `min`, `max`, `exact`.
    pub kind: String,
    pub cardinality: u32,
}

/// Wrapper for YAML deserialization (the document nests under `scenario:`).
#[derive(Debug, Deserialize)]
struct ScenarioWrapper {
    scenario: Scenario,
}

impl Scenario {
    /// Parse a scenario from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ScenarioError> {
        let wrapper: ScenarioWrapper = serde_yaml::from_str(yaml)?;
        Ok(wrapper.scenario)
    }

    /// Parse a scenario from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Resolve a scenario name to a full identifier.
    fn resolve(&self, name: &str) -> Iri {
        if name.contains(':') || name.contains('#') {
            return Iri::new(name);
        }
        if is_vocabulary_name(name) {
            return vocabulary::resolve(name);
        }
        let prefix = self.prefix.as_deref().unwrap_or(DEFAULT_PREFIX);
        Iri::resolve(prefix, name)
    }

    /// Materialize the scenario into an organization model.
    pub fn build(&self) -> Result<OrganizationModel, ScenarioError> {
        let mut om = OrganizationModel::new();

        for spec in &self.subclasses {
            let class = self.resolve(&spec.class);
            let parent = self.resolve(&spec.parent);
            om.graph_mut().subclass_of(&class, &parent);
        }

        for spec in &self.instances {
            let instance = self.resolve(&spec.name);
            let class = self.resolve(&spec.class);
            match &spec.model {
                Some(model) => {
                    let model = self.resolve(model);
                    om.create_instance(&instance, &class, &model);
                }
                None => om.graph_mut().instance_of(&instance, &class),
            }
        }

        for spec in &self.relations {
            let subject = self.resolve(&spec.subject);
            let property = self.resolve(&spec.property);
            let object = self.resolve(&spec.object);
            om.graph_mut().relate(&subject, &property, &object);
        }

        for spec in &self.restrictions {
            let class = self.resolve(&spec.on);
            let qualification = self.resolve(&spec.requires);
            let cardinality = match spec.kind.as_str() {
                "min" => Cardinality::Min(spec.cardinality),
                "max" => Cardinality::Max(spec.cardinality),
                "exact" => Cardinality::Exact(spec.cardinality),
                other => {
                    return Err(ScenarioError::Validation(format!(
                        "unknown restriction kind '{}' on '{}'",
                        other, spec.on
                    )))
                }
            };
            om.restrictions_mut()
                .declare(&class, Restriction::new(qualification, cardinality));
        }

        Ok(om)
    }
}

fn is_vocabulary_name(name: &str) -> bool {
    matches!(
        name,
        "Actor"
            | "ActorModel"
            | "CompositeActor"
            | "Interface"
            | "Service"
            | "ServiceModel"
            | "dependsOn"
            | "has"
            | "provides"
            | "uses"
            | "compatibleWith"
            | "modeledBy"
    )
}
