//! Deterministic plan building.
//!
//! A plan is an ordered, deduplicated subset of a catalog, annotated
//! with apply options. Building one never fails: an empty selection
//! yields an empty plan, and it is the caller's job to treat that as an
//! error when undesired.

use crate::builder::Catalog;
use crate::danger::DangerSet;
use serde::Serialize;
use std::collections::HashSet;
use std::str::FromStr;
use thiserror::Error;
use worldsync_remote::ArchiveRef;

/// How statements are applied to the target database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMode {
    /// Execute dump statements as written.
    Apply,
    /// Rewrite `INSERT INTO` to `REPLACE INTO` for an upsert-style load.
    Replace,
}

/// An apply mode string that is neither `apply` nor `replace`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported apply mode: {0:?}")]
pub struct UnsupportedModeError(pub String);

impl FromStr for ApplyMode {
    type Err = UnsupportedModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apply" => Ok(Self::Apply),
            "replace" => Ok(Self::Replace),
            other => Err(UnsupportedModeError(other.to_string())),
        }
    }
}

/// Options a plan is applied with, echoed back on the built plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanOptions {
    /// Allow steps for tables in the danger set.
    pub include_dangerous: bool,
    /// Statement rewrite mode.
    pub mode: ApplyMode,
    /// Prepend a `TRUNCATE` for each table before its dump runs.
    pub truncate_first: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            include_dangerous: false,
            mode: ApplyMode::Apply,
            truncate_first: false,
        }
    }
}

/// What the operator asked for: explicit tables and/or whole groups.
///
/// A catalog row is chosen if its group is selected OR its table name
/// (case-insensitive) is selected. This is a union, not an
/// intersection.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Explicit table names, matched case-insensitively.
    pub tables: Vec<String>,
    /// Group names, matched exactly.
    pub groups: Vec<String>,
}

impl Selection {
    /// Selects explicit tables.
    pub fn tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tables: tables.into_iter().map(Into::into).collect(),
            groups: Vec::new(),
        }
    }

    /// Selects whole groups.
    pub fn groups<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tables: Vec::new(),
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    /// Adds groups to an existing selection.
    pub fn and_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }
}

/// A catalog row reduced to exactly what the executor needs. No SQL
/// body; that is fetched just in time during execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanStep {
    /// Logical table name.
    pub table: String,
    /// Logical group.
    pub group: String,
    /// Human-readable label for logs.
    pub display_label: String,
    /// Where to fetch the SQL body from.
    pub archive: ArchiveRef,
    /// Exact entry name inside the archive.
    pub entry_name: String,
}

/// An ordered, deduplicated sequence of update steps plus the effective
/// options.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    /// Steps in execution order.
    pub steps: Vec<PlanStep>,
    /// The effective options used to build the plan.
    pub options: PlanOptions,
    /// Dangerous tables dropped from the selection, for caller-side
    /// reporting. Empty when `include_dangerous` is set.
    pub excluded_dangerous: Vec<String>,
}

impl Plan {
    /// Returns true if the plan has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Resolves a selection against a catalog into a plan.
///
/// Chosen rows are walked in catalog order (sorted by table name);
/// duplicates by table keep the first occurrence; danger-set tables are
/// dropped and reported unless `include_dangerous` is set.
pub fn build_plan(
    catalog: &Catalog,
    selection: &Selection,
    danger: &DangerSet,
    options: PlanOptions,
) -> Plan {
    let tables_lower: HashSet<String> = selection
        .tables
        .iter()
        .map(|t| t.to_lowercase())
        .collect();
    let groups: HashSet<&str> = selection.groups.iter().map(String::as_str).collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut steps = Vec::new();
    let mut excluded = Vec::new();

    for row in &catalog.rows {
        let chosen =
            groups.contains(row.group.as_str()) || tables_lower.contains(&row.table.to_lowercase());
        if !chosen {
            continue;
        }

        if !options.include_dangerous && danger.contains(&row.table) {
            if !excluded.iter().any(|t| t == &row.table) {
                excluded.push(row.table.clone());
            }
            continue;
        }

        if !seen.insert(row.table.as_str()) {
            continue;
        }
        steps.push(PlanStep {
            table: row.table.clone(),
            group: row.group.clone(),
            display_label: row.display_label.clone(),
            archive: row.archive.clone(),
            entry_name: row.entry_name.clone(),
        });
    }

    Plan {
        steps,
        options,
        excluded_dangerous: excluded,
    }
}
