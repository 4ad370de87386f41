//! Plain-text tables for the console.

use std::fmt::Display;

/// Marker rendered for an absent value.
pub const NO_VALUE: &str = "(null)";

/// A titled report: headers plus rows of optional cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub title: String,
    pub description: String,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Option<String>>>,
    /// Printed instead of the grid when there are no rows.
    pub empty_message: String,
}

impl Table {
    pub fn new(title: impl Into<String>, headers: &[&'static str]) -> Self {
        let title = title.into();
        Self {
            empty_message: format!("No rows found for {}.", title.to_lowercase()),
            title,
            description: String::new(),
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn when_empty(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    pub fn push(&mut self, row: Vec<Option<String>>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell text, with absent values shown as [`NO_VALUE`].
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)?
            .get(column)
            .map(|c| c.as_deref().unwrap_or(NO_VALUE))
    }

    /// Column widths fitted to the widest header or cell.
    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|c| c.as_deref().unwrap_or(NO_VALUE).chars().count())
                    .fold(header.chars().count(), usize::max)
            })
            .collect()
    }

    /// Title, description, then the grid:
    ///
    /// ```text
    /// | Plan ID | Plan Type |
    /// +---------+-----------+
    /// | 1       | Monthly   |
    /// ```
    pub fn render(&self) -> String {
        let mut out = format!("\n=== {} ===\n\n", self.title);
        if !self.description.is_empty() {
            out.push_str(&self.description);
            out.push('\n');
        }
        if self.rows.is_empty() {
            out.push_str(&self.empty_message);
            out.push('\n');
            return out;
        }

        let widths = self.widths();
        out.push_str(&grid_line(&self.headers, &widths));
        out.push('+');
        for width in &widths {
            out.push_str(&"-".repeat(width + 2));
            out.push('+');
        }
        out.push('\n');
        for row in &self.rows {
            let cells: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or(NO_VALUE)).collect();
            out.push_str(&grid_line(&cells, &widths));
        }
        out
    }
}

fn grid_line(cells: &[&str], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(width - cell.chars().count()));
        line.push_str(" |");
    }
    line.push('\n');
    line
}

/// Present value as a cell.
pub fn cell(value: impl Display) -> Option<String> {
    Some(value.to_string())
}

/// Optional value as a cell.
pub fn opt<T: Display>(value: Option<T>) -> Option<String> {
    value.map(|v| v.to_string())
}

/// Amount with a dollar sign and two decimals.
pub fn money(amount: rust_decimal::Decimal) -> String {
    format!("${:.2}", amount)
}
