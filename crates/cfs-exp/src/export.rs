use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use cfs_core::errors::{CfsError, ErrorInfo};
use cfs_core::serde::to_canonical_json_bytes;
use chrono::Utc;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};

use crate::evaluate::EvalStats;
use crate::grid::SweepResults;
use crate::table::{NestedTable, SweepTable};

/// One row of a family: the inner sweep at an optional outer value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer: Option<f64>,
    pub values: Vec<f64>,
    pub scores: Vec<f64>,
}

/// Best point of a family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer: Option<f64>,
    pub value: f64,
    pub score: f64,
}

/// Serialized view of one sweep family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilySummary {
    pub name: String,
    pub axis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer_axis: Option<String>,
    pub rows: Vec<RowSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best: Option<BestPoint>,
}

impl FamilySummary {
    fn single(name: &str, table: &SweepTable) -> Self {
        Self {
            name: name.to_string(),
            axis: table.axis.clone(),
            outer_axis: None,
            rows: vec![RowSummary {
                outer: None,
                values: table.values.clone(),
                scores: table.scores.clone(),
            }],
            best: table.best().map(|best| BestPoint {
                outer: None,
                value: best.value,
                score: best.score,
            }),
        }
    }

    fn nested(name: &str, nested: &NestedTable) -> Self {
        Self {
            name: name.to_string(),
            axis: nested.inner_axis.clone(),
            outer_axis: Some(nested.outer_axis.clone()),
            rows: nested
                .rows
                .iter()
                .map(|row| RowSummary {
                    outer: Some(row.outer),
                    values: row.table.values.clone(),
                    scores: row.table.scores.clone(),
                })
                .collect(),
            best: nested.best().map(|best| BestPoint {
                outer: Some(best.outer),
                value: best.value,
                score: best.score,
            }),
        }
    }
}

/// Provenance of a sweep summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryProvenance {
    pub created_at: String,
    pub base_stamp: String,
    pub cache: EvalStats,
    pub tool_version: String,
}

/// Persistable summary of a sweep; empty families are left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub protocol: String,
    pub baseline: f64,
    pub families: Vec<FamilySummary>,
    pub provenance: SummaryProvenance,
}

impl SweepSummary {
    pub fn build(
        protocol: impl Into<String>,
        base_stamp: impl Into<String>,
        results: &SweepResults,
        cache: EvalStats,
    ) -> Self {
        let mut families = Vec::new();
        if !results.ewc.is_empty() {
            families.push(FamilySummary::single("ewc", &results.ewc));
        }
        if !results.online_ewc.is_empty() {
            families.push(FamilySummary::nested("online_ewc", &results.online_ewc));
        }
        if !results.si.is_empty() {
            families.push(FamilySummary::single("si", &results.si));
        }
        if !results.bir.is_empty() {
            families.push(FamilySummary::single("bir", &results.bir_without_si()));
            families.push(FamilySummary::nested("bir_si", &results.bir));
        }
        if let Some(ablations) = &results.ablations {
            let names = ["bir_no_rtf", "bir_no_con", "bir_no_dis", "gr_gat"];
            for (name, (_, table)) in names.iter().zip(ablations.labelled()) {
                if !table.is_empty() {
                    families.push(FamilySummary::single(name, table));
                }
            }
        }
        Self {
            protocol: protocol.into(),
            baseline: results.baseline,
            families,
            provenance: SummaryProvenance {
                created_at: Utc::now().to_rfc3339(),
                base_stamp: base_stamp.into(),
                cache,
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    pub fn family(&self, name: &str) -> Option<&FamilySummary> {
        self.families.iter().find(|family| family.name == name)
    }
}

fn export_io(code: &str, path: &Path, err: impl ToString) -> CfsError {
    CfsError::Serde(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

fn ensure_parent(path: &Path) -> Result<(), CfsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| export_io("export-dir", path, err))?;
    }
    Ok(())
}

/// Writes the summary as canonical JSON.
pub fn write_summary_json(path: &Path, summary: &SweepSummary) -> Result<(), CfsError> {
    ensure_parent(path)?;
    let bytes = to_canonical_json_bytes(summary)?;
    fs::write(path, bytes).map_err(|err| export_io("summary-write", path, err))
}

/// Writes one `family,outer,value,score` record per collected point.
pub fn write_summary_csv(path: &Path, summary: &SweepSummary) -> Result<(), CfsError> {
    ensure_parent(path)?;
    let file = File::create(path).map_err(|err| export_io("csv-open", path, err))?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));
    writer
        .write_record(["family", "outer", "value", "score"])
        .map_err(|err| export_io("csv-write-header", path, err))?;
    for family in &summary.families {
        for row in &family.rows {
            let outer = row.outer.map(|v| v.to_string()).unwrap_or_default();
            for (value, score) in row.values.iter().zip(&row.scores) {
                let value = value.to_string();
                let score = score.to_string();
                writer
                    .write_record([
                        family.name.as_str(),
                        outer.as_str(),
                        value.as_str(),
                        score.as_str(),
                    ])
                    .map_err(|err| export_io("csv-write-row", path, err))?;
            }
        }
    }
    writer
        .flush()
        .map_err(|err| export_io("csv-flush", path, err))?;
    Ok(())
}
