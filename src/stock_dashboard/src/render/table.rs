/// A plain-text table with aligned columns.
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
    right_aligned: Vec<bool>,
}

impl Table {
    /// Create a new table with the given headers
    pub fn new(headers: &[&str]) -> Self {
        let col_widths = headers.iter().map(|h| h.chars().count()).collect();
        let headers = headers.iter().map(|h| h.to_string()).collect();
        Table {
            headers,
            rows: Vec::new(),
            col_widths,
            right_aligned: Vec::new(),
        }
    }

    /// Right-align the given columns (numbers read better that way).
    pub fn right_align(mut self, columns: &[usize]) -> Self {
        self.right_aligned = (0..self.headers.len()).map(|i| columns.contains(&i)).collect();
        self
    }

    /// Add a row to the table. Cells beyond the header count are ignored.
    pub fn add_row(&mut self, row: &[&str]) {
        let row_strings: Vec<String> = row
            .iter()
            .take(self.headers.len())
            .map(|s| s.to_string())
            .collect();

        for (i, col) in row_strings.iter().enumerate() {
            self.col_widths[i] = self.col_widths[i].max(col.chars().count());
        }

        self.rows.push(row_strings);
    }

    pub fn render(&self) -> String {
        let mut output = String::new();
        output.push_str(&self.render_row(&self.headers));
        output.push('\n');
        output.push_str(&self.render_separator());
        output.push('\n');
        for row in &self.rows {
            output.push_str(&self.render_row(row));
            output.push('\n');
        }
        output
    }

    fn render_row(&self, row: &[String]) -> String {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let width = self.col_widths[i];
                if self.right_aligned.get(i).copied().unwrap_or(false) {
                    format!("{col:>width$}")
                } else {
                    format!("{col:<width$}")
                }
            })
            .collect();
        cells.join(" | ").trim_end().to_string()
    }

    fn render_separator(&self) -> String {
        self.col_widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("-+-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_table() {
        let mut table = Table::new(&["Date", "Close"]).right_align(&[1]);
        table.add_row(&["2024-01-02", "185.64"]);
        table.add_row(&["2024-01-03", "9.10"]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Date       |  Close");
        assert_eq!(lines[1], "-----------+-------");
        assert_eq!(lines[2], "2024-01-02 | 185.64");
        assert_eq!(lines[3], "2024-01-03 |   9.10");
    }

    #[test]
    fn extra_cells_are_dropped() {
        let mut table = Table::new(&["A"]);
        table.add_row(&["x", "surplus"]);
        assert!(!table.render().contains("surplus"));
    }
}
