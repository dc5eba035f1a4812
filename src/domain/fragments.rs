//! Fragment identifiers and the static table that binds them to page targets.
//!
//! A fragment is one operator-edited text file (for example
//! `ask-problem-definition.txt`). Each fragment is hydrated into the page
//! element whose `id` matches its target. The set of fragments is fixed when
//! the catalog is built and enumerated in insertion order, which is the order
//! every poll pass visits them in.

use std::{collections::HashMap, fmt};

use super::error::DomainError;

/// Built-in fragment table: file name and the id of the element it fills.
pub const STANDARD_FRAGMENTS: [(&str, &str); 18] = [
    ("ask-problem-definition.txt", "problem-definition-content"),
    ("ask-stakeholder-analysis.txt", "stakeholder-analysis-content"),
    ("ask-success-criteria.txt", "success-criteria-content"),
    ("evidence-scientific-methods.txt", "scientific-methods-content"),
    ("evidence-scientific-sources.txt", "scientific-sources-content"),
    ("evidence-scientific-appraisal.txt", "scientific-appraisal-content"),
    ("evidence-practitioner-methods.txt", "practitioner-methods-content"),
    ("evidence-practitioner-sources.txt", "practitioner-sources-content"),
    ("evidence-practitioner-appraisal.txt", "practitioner-appraisal-content"),
    ("evidence-organizational-methods.txt", "organizational-methods-content"),
    ("evidence-organizational-sources.txt", "organizational-sources-content"),
    ("evidence-organizational-appraisal.txt", "organizational-appraisal-content"),
    ("evidence-stakeholder-methods.txt", "stakeholder-methods-content"),
    ("evidence-stakeholder-sources.txt", "stakeholder-sources-content"),
    ("evidence-stakeholder-appraisal.txt", "stakeholder-appraisal-content"),
    ("synthesis-integration.txt", "evidence-synthesis-content"),
    ("application-implementation.txt", "implementation-content"),
    ("assessment-monitoring.txt", "assessment-content"),
];

/// Opaque key naming one content source, usually a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentId(String);

impl FragmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FragmentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The `id` attribute of the page element a fragment is bound into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed, ordered set of fragments plus their target mapping.
///
/// A fragment may be enumerated without a target; such fragments are visited
/// every pass but can never be bound.
#[derive(Debug, Clone)]
pub struct FragmentCatalog {
    order: Vec<FragmentId>,
    targets: HashMap<FragmentId, TargetId>,
}

impl FragmentCatalog {
    /// Catalog with no fragments; fill it with [`Self::with_mapped`] and
    /// [`Self::with_unmapped`].
    pub fn empty() -> Self {
        Self {
            order: Vec::new(),
            targets: HashMap::new(),
        }
    }

    /// Build a catalog from `(fragment, target)` pairs, preserving their order.
    pub fn from_pairs<I, F, T>(pairs: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (F, T)>,
        F: Into<String>,
        T: Into<String>,
    {
        pairs
            .into_iter()
            .try_fold(Self::empty(), |catalog, (fragment, target)| {
                catalog.with_mapped(fragment, target)
            })
    }

    /// Enumerate a fragment bound into the element with id `target`.
    pub fn with_mapped(
        mut self,
        fragment: impl Into<String>,
        target: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let target = target.into();
        if target.trim().is_empty() {
            return Err(DomainError::validation("fragment target must not be empty"));
        }
        let fragment = self.push(fragment.into())?;
        self.targets.insert(fragment, TargetId::new(target));
        Ok(self)
    }

    /// The built-in 18-entry table.
    pub fn standard() -> Self {
        let order = STANDARD_FRAGMENTS
            .iter()
            .map(|(fragment, _)| FragmentId::from(*fragment))
            .collect();
        let targets = STANDARD_FRAGMENTS
            .iter()
            .map(|(fragment, target)| (FragmentId::from(*fragment), TargetId::new(*target)))
            .collect();
        Self { order, targets }
    }

    /// Enumerate an extra fragment that has no page target.
    pub fn with_unmapped(mut self, fragment: impl Into<String>) -> Result<Self, DomainError> {
        self.push(fragment.into())?;
        Ok(self)
    }

    fn push(&mut self, fragment: String) -> Result<FragmentId, DomainError> {
        if fragment.trim().is_empty() {
            return Err(DomainError::validation("fragment id must not be empty"));
        }
        let id = FragmentId::new(fragment);
        if self.order.contains(&id) {
            return Err(DomainError::invariant(format!(
                "fragment `{id}` is listed more than once"
            )));
        }
        self.order.push(id.clone());
        Ok(id)
    }

    /// Fragments in enumeration order.
    pub fn fragments(&self) -> &[FragmentId] {
        &self.order
    }

    pub fn target(&self, fragment: &FragmentId) -> Option<&TargetId> {
        self.targets.get(fragment)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for FragmentCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
