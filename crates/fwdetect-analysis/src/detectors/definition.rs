//! Frozen detector definitions.

use std::sync::Arc;

use super::builder::DetectorBuilder;
use super::traits::DetectorInfo;
use crate::checks::{Check, CheckRegistry};

/// A named, non-empty group of checks that must all pass together.
#[derive(Clone)]
pub struct CheckGroup {
    pub(crate) name: String,
    pub(crate) checks: Vec<Arc<dyn Check>>,
}

impl CheckGroup {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn checks(&self) -> &[Arc<dyn Check>] {
        &self.checks
    }
}

/// One required entry: a plain group, or a set of alternative groups of
/// which at least one must pass in full.
#[derive(Clone)]
pub enum RequiredEntry {
    Group(CheckGroup),
    AnyOf {
        name: String,
        alternatives: Vec<CheckGroup>,
    },
}

impl RequiredEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Group(group) => group.name(),
            Self::AnyOf { name, .. } => name,
        }
    }

    pub fn check_count(&self) -> usize {
        match self {
            Self::Group(group) => group.checks.len(),
            Self::AnyOf { alternatives, .. } => alternatives.iter().map(|g| g.checks.len()).sum(),
        }
    }
}

/// A check in execution order, with its placement in the detector.
#[derive(Clone, Copy)]
pub struct PlannedCheck<'a> {
    pub check: &'a dyn Check,
    pub group_name: &'a str,
    pub any_of: Option<&'a str>,
    pub required: bool,
}

/// Immutable detector: identity, required entries, optional groups.
///
/// Only [`DetectorBuilder::build`] creates one, and it guarantees at least one
/// required check, no empty groups, and unique group names.
#[derive(Clone)]
pub struct DetectorDefinition {
    pub(crate) info: DetectorInfo,
    pub(crate) required: Vec<RequiredEntry>,
    pub(crate) optional: Vec<CheckGroup>,
}

impl DetectorDefinition {
    pub fn builder(info: DetectorInfo, checks: &CheckRegistry) -> DetectorBuilder<'_> {
        DetectorBuilder::new(info, checks)
    }

    pub fn info(&self) -> &DetectorInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn required(&self) -> &[RequiredEntry] {
        &self.required
    }

    pub fn optional(&self) -> &[CheckGroup] {
        &self.optional
    }

    pub fn required_check_count(&self) -> usize {
        self.required.iter().map(RequiredEntry::check_count).sum()
    }

    pub fn total_check_count(&self) -> usize {
        self.required_check_count()
            + self.optional.iter().map(|g| g.checks.len()).sum::<usize>()
    }

    /// Required checks in declaration order (alternatives in order), then
    /// optional checks.
    pub fn planned_checks(&self) -> Vec<PlannedCheck<'_>> {
        let mut planned = Vec::with_capacity(self.total_check_count());
        for entry in &self.required {
            match entry {
                RequiredEntry::Group(group) => push_group(&mut planned, group, None, true),
                RequiredEntry::AnyOf { name, alternatives } => {
                    for group in alternatives {
                        push_group(&mut planned, group, Some(name.as_str()), true);
                    }
                }
            }
        }
        for group in &self.optional {
            push_group(&mut planned, group, None, false);
        }
        planned
    }
}

fn push_group<'a>(
    planned: &mut Vec<PlannedCheck<'a>>,
    group: &'a CheckGroup,
    any_of: Option<&'a str>,
    required: bool,
) {
    planned.extend(group.checks.iter().map(|check| PlannedCheck {
        check: check.as_ref(),
        group_name: &group.name,
        any_of,
        required,
    }));
}

impl std::fmt::Debug for DetectorDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorDefinition")
            .field("name", &self.info.name)
            .field("framework_id", &self.info.framework_id)
            .field(
                "required",
                &self.required.iter().map(RequiredEntry::name).collect::<Vec<_>>(),
            )
            .field(
                "optional",
                &self.optional.iter().map(CheckGroup::name).collect::<Vec<_>>(),
            )
            .finish()
    }
}
