//! Terminal tables for `gopkg list`.
//!
//! ```rust
//! let mut table = gopkg::ui::Table::new(&["Package", "Commit"]);
//! table.add_row(vec!["yaml".to_string(), "49c95bd".to_string()]);
//! table.print();
//! ```

use colored::*;

/// Columns are never squeezed below this width when the terminal is narrow.
const MIN_COL_WIDTH: usize = 8;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows with the wrong number of cells are dropped.
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    /// Column widths fitted into `max_width` terminal columns.
    fn column_widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|h| console::measure_text_width(h))
            .collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(console::measure_text_width(&flatten(cell)));
            }
        }

        // "  │ a │ b │" → indent + one border + three per column.
        let overhead = 3 + 3 * widths.len();
        let budget = max_width.saturating_sub(overhead);
        while widths.iter().sum::<usize>() > budget {
            let Some(widest) = widths
                .iter_mut()
                .filter(|w| **w > MIN_COL_WIDTH)
                .max_by_key(|w| **w)
            else {
                break;
            };
            *widest -= 1;
        }
        widths
    }

    pub fn render(&self, max_width: usize) -> Vec<String> {
        if self.headers.is_empty() {
            return Vec::new();
        }
        let widths = self.column_widths(max_width);
        let rule = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}", left, segments.join(mid), right)
        };
        let line = |cells: &[String], bold: bool| {
            let mut out = String::from("  │");
            for (cell, &w) in cells.iter().zip(&widths) {
                let text = console::truncate_str(&flatten(cell), w, "...").to_string();
                let pad = w.saturating_sub(console::measure_text_width(&text));
                let text = if bold { text.bold().to_string() } else { text };
                out.push_str(&format!(" {}{} │", text, " ".repeat(pad)));
            }
            out
        };

        let mut out = vec![rule("┌", "┬", "┐"), line(&self.headers, true), rule("├", "┼", "┤")];
        out.extend(self.rows.iter().map(|r| line(r, false)));
        out.push(rule("└", "┴", "┘"));
        out
    }

    pub fn print(&self) {
        let (_, cols) = console::Term::stdout().size();
        for line in self.render(cols as usize) {
            println!("{}", line);
        }
    }
}

fn flatten(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            _ => c,
        })
        .collect()
}
