use serde::{Deserialize, Serialize};

/// Index of the largest score, first occurrence on ties.
///
/// NaN scores never win; `None` for an empty slice or all-NaN input.
pub fn argmax(scores: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some(current) if *score <= scores[current] => {}
            _ => best = Some(idx),
        }
    }
    best
}

/// Best point of a one-axis sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Best {
    pub value: f64,
    pub score: f64,
}

/// Best point of a two-axis sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NestedBest {
    pub outer: f64,
    pub value: f64,
    pub score: f64,
}

/// Ordered `(axis value, score)` pairs of a one-axis sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepTable {
    pub axis: String,
    pub values: Vec<f64>,
    pub scores: Vec<f64>,
}

impl SweepTable {
    pub fn new(axis: impl Into<String>) -> Self {
        Self {
            axis: axis.into(),
            values: Vec::new(),
            scores: Vec::new(),
        }
    }

    pub fn push(&mut self, value: f64, score: f64) {
        self.values.push(value);
        self.scores.push(score);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Score recorded for `value`, compared exactly.
    pub fn get(&self, value: f64) -> Option<f64> {
        self.values
            .iter()
            .position(|candidate| *candidate == value)
            .map(|idx| self.scores[idx])
    }

    pub fn best(&self) -> Option<Best> {
        argmax(&self.scores).map(|idx| Best {
            value: self.values[idx],
            score: self.scores[idx],
        })
    }
}

/// One row of a two-axis sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedRow {
    pub outer: f64,
    pub table: SweepTable,
}

/// Two-axis sweep: one inner table per outer axis value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedTable {
    pub outer_axis: String,
    pub inner_axis: String,
    pub rows: Vec<NestedRow>,
}

impl NestedTable {
    pub fn new(outer_axis: impl Into<String>, inner_axis: impl Into<String>) -> Self {
        Self {
            outer_axis: outer_axis.into(),
            inner_axis: inner_axis.into(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, outer: f64, table: SweepTable) {
        self.rows.push(NestedRow { outer, table });
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, outer: f64) -> Option<&SweepTable> {
        self.rows
            .iter()
            .find(|row| row.outer == outer)
            .map(|row| &row.table)
    }

    /// Slice across rows at a fixed inner value, indexed by the outer axis.
    pub fn column(&self, inner: f64) -> SweepTable {
        let mut column = SweepTable::new(self.outer_axis.clone());
        for row in &self.rows {
            if let Some(score) = row.table.get(inner) {
                column.push(row.outer, score);
            }
        }
        column
    }

    /// First strict maximum across rows, scanning rows in order.
    pub fn best(&self) -> Option<NestedBest> {
        let mut best: Option<NestedBest> = None;
        for row in &self.rows {
            let Some(row_best) = row.table.best() else {
                continue;
            };
            if best.map_or(true, |current| row_best.score > current.score) {
                best = Some(NestedBest {
                    outer: row.outer,
                    value: row_best.value,
                    score: row_best.score,
                });
            }
        }
        best
    }

    pub fn scores(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows
            .iter()
            .flat_map(|row| row.table.scores.iter().copied())
    }
}
