// src/data_input/log_data.rs

use std::fmt;

use crate::error::{ValidationError, ValidationResult};
use crate::types::Vec3;

/// A column of the measurement log. Columns always appear in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogColumn {
    Target,
    Simulation,
    DepthCamera,
    Polhemus,
}

impl LogColumn {
    pub const ALL: [LogColumn; 4] = [
        LogColumn::Target,
        LogColumn::Simulation,
        LogColumn::DepthCamera,
        LogColumn::Polhemus,
    ];

    /// Header text written in the column-header row.
    pub fn header(&self) -> &'static str {
        match self {
            LogColumn::Target => "Target",
            LogColumn::Simulation => "Simulation",
            LogColumn::DepthCamera => "DepthCamera",
            LogColumn::Polhemus => "Polhemus",
        }
    }

    /// Short label used in reports and plot titles.
    pub fn label(&self) -> &'static str {
        match self {
            LogColumn::Target => "Target",
            LogColumn::Simulation => "Simulation",
            LogColumn::DepthCamera => "Camera",
            LogColumn::Polhemus => "Polhemus",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            LogColumn::Target => 0,
            LogColumn::Simulation => 1,
            LogColumn::DepthCamera => 2,
            LogColumn::Polhemus => 3,
        }
    }
}

impl fmt::Display for LogColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Column layout of a log: Target and Simulation, optionally followed by
/// DepthCamera, then Polhemus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLayout {
    column_count: usize,
}

impl LogLayout {
    pub const MIN_COLUMNS: usize = 2;
    pub const MAX_COLUMNS: usize = LogColumn::ALL.len();

    /// Target and Simulation only.
    pub fn basic() -> Self {
        Self { column_count: 2 }
    }

    pub fn with_depth_camera() -> Self {
        Self { column_count: 3 }
    }

    /// Target, Simulation, DepthCamera and Polhemus.
    pub fn full() -> Self {
        Self { column_count: 4 }
    }

    pub fn from_column_count(column_count: usize) -> ValidationResult<Self> {
        if !(Self::MIN_COLUMNS..=Self::MAX_COLUMNS).contains(&column_count) {
            return Err(ValidationError::invalid(format!(
                "a log has {} to {} columns, got {column_count}",
                Self::MIN_COLUMNS,
                Self::MAX_COLUMNS
            )));
        }
        Ok(Self { column_count })
    }

    pub fn columns(&self) -> &'static [LogColumn] {
        &LogColumn::ALL[..self.column_count]
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Columns after Target and Simulation.
    pub fn auxiliary_columns(&self) -> &'static [LogColumn] {
        &LogColumn::ALL[2..self.column_count]
    }

    pub fn contains(&self, column: LogColumn) -> bool {
        column.index() < self.column_count
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.columns().iter().map(LogColumn::header).collect()
    }
}

/// One transition event: the target, where the effector actually ended up, and
/// the auxiliary sensor readings in layout order.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub target: Vec3,
    pub simulation: Vec3,
    pub auxiliary: Vec<Vec3>,
}

impl LogRow {
    pub fn fields(&self) -> impl Iterator<Item = &Vec3> {
        std::iter::once(&self.target)
            .chain(std::iter::once(&self.simulation))
            .chain(self.auxiliary.iter())
    }

    pub fn field_count(&self) -> usize {
        2 + self.auxiliary.len()
    }
}

/// Positions loaded from a measurement log, stored column by column.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionTable {
    layout: LogLayout,
    columns: Vec<Vec<Vec3>>,
}

impl PositionTable {
    pub fn new(layout: LogLayout) -> Self {
        Self {
            layout,
            columns: vec![Vec::new(); layout.column_count()],
        }
    }

    /// Appends a row; `fields` must match the layout width.
    pub fn push_row(&mut self, fields: Vec<Vec3>) -> ValidationResult<()> {
        if fields.len() != self.layout.column_count() {
            return Err(ValidationError::invalid(format!(
                "row has {} fields, layout has {}",
                fields.len(),
                self.layout.column_count()
            )));
        }
        for (column, value) in self.columns.iter_mut().zip(fields) {
            column.push(value);
        }
        Ok(())
    }

    pub fn layout(&self) -> LogLayout {
        self.layout
    }

    pub fn column(&self, column: LogColumn) -> Option<&[Vec3]> {
        self.columns.get(column.index()).map(Vec::as_slice)
    }

    pub fn targets(&self) -> &[Vec3] {
        &self.columns[LogColumn::Target.index()]
    }

    pub fn simulations(&self) -> &[Vec3] {
        &self.columns[LogColumn::Simulation.index()]
    }

    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_columns() {
        assert_eq!(LogLayout::basic().headers(), vec!["Target", "Simulation"]);
        assert_eq!(
            LogLayout::full().auxiliary_columns(),
            &[LogColumn::DepthCamera, LogColumn::Polhemus]
        );
        assert!(LogLayout::with_depth_camera().contains(LogColumn::DepthCamera));
        assert!(!LogLayout::with_depth_camera().contains(LogColumn::Polhemus));
        assert!(LogLayout::from_column_count(1).is_err());
        assert!(LogLayout::from_column_count(5).is_err());
    }

    #[test]
    fn test_table_columns() {
        let mut table = PositionTable::new(LogLayout::basic());
        table.push_row(vec![[1.0, 2.0, 3.0], [1.5, 2.0, 3.0]]).unwrap();
        assert!(table.push_row(vec![[0.0; 3]]).is_err());
        assert_eq!(table.len(), 1);
        assert_eq!(table.simulations(), &[[1.5, 2.0, 3.0]]);
        assert!(table.column(LogColumn::Polhemus).is_none());
    }
}
