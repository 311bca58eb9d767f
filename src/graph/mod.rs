//! Capability graph facade.
//!
//! The engines in this crate never own graph storage; they consume the
//! [`KnowledgeGraph`] trait, which carries exactly the instance, class and
//! relation operations the algorithms need. [`MemoryGraph`] is the
//! in-memory reference implementation used by tests and embedding hosts;
//! a host backed by a real triple store implements the same trait.
//!
//! The graph is monotone: facts are only ever added, never removed.

mod memory;

pub use memory::MemoryGraph;

use crate::error::GraphError;
use crate::iri::Iri;

/// The subclass oracle consumed by the resource-matching solver.
///
/// Kept separate from [`KnowledgeGraph`] so the solver can be driven by a
/// bare class hierarchy in isolation.
pub trait TypeHierarchy {
    /// True if `sub` equals `sup` or is a (transitive) subclass of it.
    fn is_subtype_of(&self, sub: &Iri, sup: &Iri) -> bool;
}

/// Typed-triple store operations required by the engines.
pub trait KnowledgeGraph: TypeHierarchy {
    /// Assert that `instance` is an instance of `class`.
    fn instance_of(&mut self, instance: &Iri, class: &Iri);

    /// Assert that `sub` is a direct subclass of `sup`.
    fn subclass_of(&mut self, sub: &Iri, sup: &Iri);

    /// Assert that `instance` and `other` name the same individual.
    fn equivalent(&mut self, instance: &Iri, other: &Iri);

    /// Assert the edge `subject --property--> object`.
    ///
    /// Returns `true` if the edge was newly added, `false` if it was
    /// already present. The inference engine's fixed point relies on this
    /// distinction.
    fn relate(&mut self, subject: &Iri, property: &Iri, object: &Iri) -> bool;

    /// Membership test, resolved through the subclass hierarchy.
    fn is_instance_of(&self, instance: &Iri, class: &Iri) -> bool;

    /// Transitive subclass test (proper: a class is not its own subclass).
    fn is_subclass_of(&self, sub: &Iri, sup: &Iri) -> bool;

    /// Edge test.
    fn is_related_to(&self, subject: &Iri, property: &Iri, object: &Iri) -> bool;

    /// All instances of `class`; with `direct_only` only those declared on
    /// the class itself, otherwise including subclass instances.
    fn all_instances_of(&self, class: &Iri, direct_only: bool) -> Vec<Iri>;

    /// All objects `o` such that `subject --property--> o`, in insertion
    /// order.
    fn all_related_instances(&self, subject: &Iri, property: &Iri) -> Vec<Iri>;

    /// The single object related to `subject` via `property`.
    ///
    /// Fails with [`GraphError::NotFound`] if no such edge exists; when
    /// multiple exist, the first inserted wins.
    fn related_instance(&self, subject: &Iri, property: &Iri) -> Result<Iri, GraphError>;

    /// Collapse alias duplicates, keeping one canonical identifier per
    /// equivalence class and preserving first-occurrence order.
    fn unique_list(&self, list: Vec<Iri>) -> Vec<Iri>;
}
