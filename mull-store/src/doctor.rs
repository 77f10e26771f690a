//! Integrity auditing
//!
//! One pass over every matter file and the docket that reports drift
//! between files and can repair it. Checks run in a fixed order:
//! orphaned docket entries, dangling references, asymmetric links, then
//! terminal matters still docketed (against a freshly loaded docket).

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::matter::{Matter, RelationType};
use crate::repository::MatterStore;
use crate::search::MatterFilter;

/// Name of an integrity check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Check {
    OrphanedDocket,
    DanglingRelates,
    DanglingBlocks,
    DanglingNeeds,
    DanglingParent,
    AsymmetricBlocks,
    AsymmetricNeeds,
    AsymmetricRelates,
    DocketTerminal,
}

impl Check {
    pub fn as_str(&self) -> &'static str {
        match self {
            Check::OrphanedDocket => "orphaned-docket",
            Check::DanglingRelates => "dangling-relates",
            Check::DanglingBlocks => "dangling-blocks",
            Check::DanglingNeeds => "dangling-needs",
            Check::DanglingParent => "dangling-parent",
            Check::AsymmetricBlocks => "asymmetric-blocks",
            Check::AsymmetricNeeds => "asymmetric-needs",
            Check::AsymmetricRelates => "asymmetric-relates",
            Check::DocketTerminal => "docket-terminal",
        }
    }

    fn dangling(rel: RelationType) -> Self {
        match rel {
            RelationType::Relates => Check::DanglingRelates,
            RelationType::Blocks => Check::DanglingBlocks,
            RelationType::Needs => Check::DanglingNeeds,
            RelationType::Parent => Check::DanglingParent,
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub check: Check,
    pub id: String,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub detail: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fixed: bool,
}

impl Issue {
    fn new(check: Check, id: &str, reference: Option<&str>, detail: String) -> Self {
        Self {
            check,
            id: id.to_string(),
            reference: reference.map(str::to_string),
            detail,
            fixed: false,
        }
    }
}

/// Findings of one audit pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub issues: Vec<Issue>,
    pub count: usize,
    /// Repaired issues; present only for a fixing pass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed: Option<usize>,
}

impl AuditReport {
    fn finish(issues: Vec<Issue>, fix: bool) -> Self {
        let fixed = fix.then(|| issues.iter().filter(|i| i.fixed).count());
        Self {
            count: issues.len(),
            issues,
            fixed,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl MatterStore {
    /// Run every integrity check. With `fix`, each finding is repaired as
    /// it is found; a repair that fails is logged and left unfixed.
    pub fn audit(&self, fix: bool) -> Result<AuditReport> {
        let ids = self.ids()?;
        let mut matters = self.list(&MatterFilter::default())?;
        let docket = self.docket();
        let mut issues = Vec::new();

        for entry in docket.load()? {
            if ids.contains(&entry.id) {
                continue;
            }
            let mut issue = Issue::new(
                Check::OrphanedDocket,
                &entry.id,
                None,
                "docket references nonexistent matter".to_string(),
            );
            if fix {
                issue.fixed = repaired(docket.remove(&entry.id), &entry.id);
            }
            issues.push(issue);
        }

        for matter in &mut matters {
            issues.extend(self.check_dangling(matter, &ids, fix));
        }

        for matter in &matters {
            issues.extend(self.check_asymmetric(matter, &ids, fix));
        }

        for entry in docket.load()? {
            let Ok(matter) = self.get(&entry.id) else {
                continue;
            };
            if !matter.is_terminal() {
                continue;
            }
            let mut issue = Issue::new(
                Check::DocketTerminal,
                &entry.id,
                None,
                format!("{} matter {} is still in docket", matter.status, entry.id),
            );
            if fix {
                issue.fixed = repaired(docket.remove(&entry.id), &entry.id);
            }
            issues.push(issue);
        }

        let report = AuditReport::finish(issues, fix);
        log::info!(
            "audit found {} issues ({} fixed)",
            report.count,
            report.fixed.unwrap_or(0)
        );
        Ok(report)
    }

    /// Report references to missing matters; with `fix`, strip them and
    /// persist the matter once
    fn check_dangling(&self, matter: &mut Matter, ids: &HashSet<String>, fix: bool) -> Vec<Issue> {
        let dangling: Vec<(RelationType, String)> = matter
            .references()
            .filter(|(_, target)| !ids.contains(*target))
            .map(|(rel, target)| (rel, target.to_string()))
            .collect();
        if dangling.is_empty() {
            return Vec::new();
        }

        let mut issues: Vec<Issue> = dangling
            .iter()
            .map(|(rel, target)| {
                let detail = match rel {
                    RelationType::Relates => format!("{} relates to nonexistent {}", matter.id, target),
                    RelationType::Blocks => format!("{} blocks nonexistent {}", matter.id, target),
                    RelationType::Needs => format!("{} needs nonexistent {}", matter.id, target),
                    RelationType::Parent => format!("{} has nonexistent parent {}", matter.id, target),
                };
                Issue::new(Check::dangling(*rel), &matter.id, Some(target.as_str()), detail)
            })
            .collect();

        if fix {
            for (_, target) in &dangling {
                matter.strip_references(target);
            }
            matter.touch();
            if repaired(self.write(matter), &matter.id) {
                for issue in &mut issues {
                    issue.fixed = true;
                }
            }
        }
        issues
    }

    /// Report `blocks`/`needs`/`relates` references the target does not
    /// reciprocate; with `fix`, relink them
    fn check_asymmetric(&self, matter: &Matter, ids: &HashSet<String>, fix: bool) -> Vec<Issue> {
        let mut issues = Vec::new();
        let id = matter.id.as_str();

        for (rel, target) in matter.references() {
            if rel == RelationType::Parent || !ids.contains(target) {
                continue;
            }
            let Ok(other) = self.get(target) else {
                continue;
            };

            let (check, detail, reciprocal) = match rel {
                RelationType::Blocks => (
                    Check::AsymmetricBlocks,
                    format!("{id} blocks {target} but {target} doesn't need {id}"),
                    &other.needs,
                ),
                RelationType::Needs => (
                    Check::AsymmetricNeeds,
                    format!("{id} needs {target} but {target} doesn't block {id}"),
                    &other.blocks,
                ),
                _ => (
                    Check::AsymmetricRelates,
                    format!("{id} relates to {target} but not vice versa"),
                    &other.relates,
                ),
            };
            if reciprocal.iter().any(|r| r == id) {
                continue;
            }

            let mut issue = Issue::new(check, id, Some(target), detail);
            if fix {
                let result = match rel {
                    RelationType::Needs => self.link(target, RelationType::Blocks, id),
                    _ => self.link(id, rel, target),
                };
                issue.fixed = repaired(result, id);
            }
            issues.push(issue);
        }
        issues
    }
}

fn repaired(result: Result<()>, id: &str) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("could not repair {}: {}", id, e);
            false
        }
    }
}
