//! Pre-flight checks for files a build depends on.
//!
//! All requirements are evaluated before anything is reported, so one run
//! shows every missing item.

use serde::Serialize;
use std::path::Path;

use crate::console;
use crate::defaults::{Requirement, RequirementKind};
use crate::error::{Error, MissingRequirementDetails, Result};
use crate::paths;

const NAME_WIDTH: usize = 20;
const SEPARATOR_WIDTH: usize = 100;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MissingRequirement {
    pub name: String,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequirementReport {
    pub satisfied: bool,
    pub checked: usize,
    pub missing: Vec<MissingRequirement>,
}

impl RequirementReport {
    pub fn push_missing(&mut self, missing: MissingRequirement) {
        self.checked += 1;
        self.missing.push(missing);
        self.satisfied = false;
    }

    pub fn into_error(self) -> Error {
        Error::requirements_missing(
            self.missing
                .into_iter()
                .map(|m| MissingRequirementDetails {
                    name: m.name,
                    path: m.path,
                    message: m.message,
                })
                .collect(),
        )
    }
}

fn is_present(path: &Path, kind: RequirementKind) -> bool {
    match kind {
        RequirementKind::File => path.is_file(),
        RequirementKind::Directory => path.is_dir(),
    }
}

/// Evaluate every requirement against the project root.
pub fn check(root: &Path, requirements: &[Requirement]) -> RequirementReport {
    let missing: Vec<MissingRequirement> = requirements
        .iter()
        .filter(|r| !is_present(&paths::join(root, &r.path), r.kind))
        .map(|r| MissingRequirement {
            name: r.name.clone(),
            path: r.path.clone(),
            message: r.message.clone(),
        })
        .collect();

    RequirementReport {
        satisfied: missing.is_empty(),
        checked: requirements.len(),
        missing,
    }
}

/// Missing-requirements table: header, separator, one row per missing item.
pub fn render_table(report: &RequirementReport) -> String {
    let mut lines = Vec::with_capacity(report.missing.len() + 2);
    lines.push(format!("{:<width$} | Message", "Requirement", width = NAME_WIDTH));
    lines.push("-".repeat(SEPARATOR_WIDTH));
    for missing in &report.missing {
        lines.push(format!(
            "{:<width$} | {}",
            missing.name,
            missing.message,
            width = NAME_WIDTH
        ));
    }
    lines.join("\n")
}

/// Print the table and convert an unsatisfied report into `requirements.missing`.
pub fn ensure(report: RequirementReport) -> Result<RequirementReport> {
    if report.satisfied {
        return Ok(report);
    }

    console::error("Missing requirements:\n");
    console::block(&render_table(&report));
    Err(report.into_error())
}
