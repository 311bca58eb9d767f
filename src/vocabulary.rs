//! The fixed vocabulary of the organization model.
//!
//! Entity classes and relation properties used by the engines. Everything
//! here resolves against a single base prefix; hosts that bring their own
//! ontology namespace can still interoperate because the engines only ever
//! compare identifiers for equality.

use once_cell::sync::Lazy;

use crate::iri::Iri;

/// Base prefix for the built-in vocabulary.
pub const BASE: &str = "urn:organization-model#";

/// Resolve a name against the built-in base prefix.
pub fn resolve(name: &str) -> Iri {
    Iri::resolve(BASE, name)
}

// Entity classes

pub static ACTOR: Lazy<Iri> = Lazy::new(|| resolve("Actor"));
pub static ACTOR_MODEL: Lazy<Iri> = Lazy::new(|| resolve("ActorModel"));
pub static COMPOSITE_ACTOR: Lazy<Iri> = Lazy::new(|| resolve("CompositeActor"));
pub static INTERFACE: Lazy<Iri> = Lazy::new(|| resolve("Interface"));
pub static SERVICE: Lazy<Iri> = Lazy::new(|| resolve("Service"));
pub static SERVICE_MODEL: Lazy<Iri> = Lazy::new(|| resolve("ServiceModel"));

// Relation properties

pub static DEPENDS_ON: Lazy<Iri> = Lazy::new(|| resolve("dependsOn"));
pub static HAS: Lazy<Iri> = Lazy::new(|| resolve("has"));
pub static PROVIDES: Lazy<Iri> = Lazy::new(|| resolve("provides"));
pub static USES: Lazy<Iri> = Lazy::new(|| resolve("uses"));
pub static COMPATIBLE_WITH: Lazy<Iri> = Lazy::new(|| resolve("compatibleWith"));
pub static MODELED_BY: Lazy<Iri> = Lazy::new(|| resolve("modeledBy"));
