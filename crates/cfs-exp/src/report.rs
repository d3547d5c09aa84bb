use std::fmt::Write as _;

use crate::grid::SweepResults;
use crate::table::{NestedTable, SweepTable};

/// Formats a list the way the tables print it: `[0, 0.001, 10]`.
pub fn format_list(values: &[f64]) -> String {
    let items: Vec<String> = values.iter().map(|value| value.to_string()).collect();
    format!("[{}]", items.join(", "))
}

/// Human readable tables with the argmax line of every non-empty family.
pub fn render_report(results: &SweepResults) -> String {
    let mut out = String::from("\n");

    if !results.ewc.is_empty() {
        render_single(
            &mut out,
            "ELASTIC WEIGHT CONSOLIDATION (EWC)",
            "param-list (lambda)",
            "--->  lambda",
            &results.ewc,
        );
    }
    if !results.online_ewc.is_empty() {
        render_nested(
            &mut out,
            "ONLINE EWC",
            "param-list (lambda)",
            &results.online_ewc,
        );
    }
    if !results.si.is_empty() {
        render_single(
            &mut out,
            "SYNAPTIC INTELLIGENCE (SI)",
            "param list (si_c)",
            "---> si_c",
            &results.si,
        );
    }
    if !results.bir.is_empty() {
        render_single(
            &mut out,
            "BRAIN-INSPIRED REPLAY (BI-R)",
            "param-list (dg_prop)",
            "--->  dg_prop",
            &results.bir_without_si(),
        );
        render_nested(&mut out, "BI-R & SI", "param-list (si_c)", &results.bir);
    }
    if let Some(ablations) = &results.ablations {
        let titles = [
            "BI-R minus REPLAY-THROUGH-FEEDBACK",
            "BI-R minus CONDITIONAL REPLAY",
            "BI-R minus DISTILLATION",
            "GR plus GATING BASED ON INTERNAL CONTEXT",
        ];
        for (title, (_, table)) in titles.iter().zip(ablations.labelled()) {
            if !table.is_empty() {
                render_single(&mut out, title, "param-list (dg_prop)", "--->  dg_prop", table);
            }
        }
    }
    out.push('\n');
    out
}

/// Prints [`render_report`] to standard output.
pub fn print_report(results: &SweepResults) {
    print!("{}", render_report(results));
}

/// `best_prefix` carries the arrow and axis name, e.g. `--->  lambda`; the SI
/// table prints its arrow with a single space.
fn render_single(
    out: &mut String,
    title: &str,
    list_label: &str,
    best_prefix: &str,
    table: &SweepTable,
) {
    let _ = writeln!(out, "\n\n{title}");
    let _ = writeln!(out, " {list_label}: {}", format_list(&table.values));
    let _ = writeln!(out, "  {}", format_list(&table.scores));
    if let Some(best) = table.best() {
        let _ = writeln!(out, "{best_prefix} = {}     --    {}", best.value, best.score);
    }
}

fn render_nested(out: &mut String, title: &str, list_label: &str, nested: &NestedTable) {
    let _ = writeln!(out, "\n\n{title}");
    let inner_values = nested
        .rows
        .first()
        .map(|row| row.table.values.clone())
        .unwrap_or_default();
    let _ = writeln!(out, " {list_label}: {}", format_list(&inner_values));
    for row in &nested.rows {
        let _ = writeln!(
            out,
            "  ({}={}):   {}",
            nested.outer_axis,
            row.outer,
            format_list(&row.table.scores)
        );
    }
    if let Some(best) = nested.best() {
        let _ = writeln!(
            out,
            "--->  {} = {}  -  {} = {}     --    {}",
            nested.outer_axis, best.outer, nested.inner_axis, best.value, best.score
        );
    }
}
