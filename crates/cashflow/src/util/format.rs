use cashflow_core::money::minor_to_decimal_string;

/// Insert thousands separators into a run of ASCII digits.
fn group_thousands(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Format a minor-unit amount with thousands separators (`-1,234.56`).
pub fn format_money(minor: i64, decimals: u8) -> String {
    let text = minor_to_decimal_string(minor, decimals);
    let (sign, body) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    match body.split_once('.') {
        Some((whole, fraction)) => format!("{sign}{}.{fraction}", group_thousands(whole)),
        None => format!("{sign}{}", group_thousands(body)),
    }
}

/// Amount followed by the currency code (`1,200.00 HKD`).
pub fn format_money_with_code(minor: i64, decimals: u8, currency: &str) -> String {
    format!("{} {currency}", format_money(minor, decimals))
}

/// Format a minor-unit amount in compact form (e.g. 2.1M, 450K, 50)
pub fn format_compact_money(minor: i64, decimals: u8) -> String {
    let value = minor as f64 / 10f64.powi(decimals as i32);
    let abs_value = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };

    if abs_value >= 1_000_000.0 {
        format!("{}{:.1}M", sign, abs_value / 1_000_000.0)
    } else if abs_value >= 1_000.0 {
        format!("{}{:.0}K", sign, abs_value / 1_000.0)
    } else {
        format!("{}{:.0}", sign, abs_value)
    }
}

/// Format a percentage given in percent units (`4.5 → "4.50%"`)
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Plain-text table with per-column alignment
#[derive(Debug, Clone)]
pub struct TextTable {
    headers: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    /// First column left-aligned, the rest right-aligned.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let align = (0..headers.len())
            .map(|i| if i == 0 { Align::Left } else { Align::Right })
            .collect();
        Self {
            headers,
            align,
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn align(mut self, column: usize, align: Align) -> Self {
        if let Some(slot) = self.align.get_mut(column) {
            *slot = align;
        }
        self
    }

    /// Append a row; missing cells render empty, extra cells are dropped.
    pub fn push<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|c| {
                self.rows
                    .iter()
                    .map(|row| row[c].chars().count())
                    .chain(std::iter::once(self.headers[c].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        self.render_row(&mut out, &self.headers, &widths);
        let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        out.push_str(rule.join("  ").as_str());
        out.push('\n');
        for row in &self.rows {
            self.render_row(&mut out, row, &widths);
        }
        out
    }

    fn render_row(&self, out: &mut String, cells: &[String], widths: &[usize]) {
        let rendered: Vec<String> = cells
            .iter()
            .zip(widths)
            .zip(&self.align)
            .map(|((cell, &width), align)| match align {
                Align::Left => format!("{cell:<width$}"),
                Align::Right => format!("{cell:>width$}"),
            })
            .collect();
        out.push_str(rendered.join("  ").trim_end());
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0, 2), "0.00");
        assert_eq!(format_money(120_000, 2), "1,200.00");
        assert_eq!(format_money(-123_456_789, 2), "-1,234,567.89");
        assert_eq!(format_money(999, 2), "9.99");
        assert_eq!(format_money(1_500_000, 0), "1,500,000");
        assert_eq!(format_money(-100, 0), "-100");
    }

    #[test]
    fn test_format_money_with_code() {
        assert_eq!(format_money_with_code(144_000_000, 2, "HKD"), "1,440,000.00 HKD");
    }

    #[test]
    fn test_format_compact_money() {
        assert_eq!(format_compact_money(210_000_000, 2), "2.1M");
        assert_eq!(format_compact_money(-45_000_000, 2), "-450K");
        assert_eq!(format_compact_money(5_000, 2), "50");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(4.5), "4.50%");
    }

    #[test]
    fn test_table_alignment() {
        let mut table = TextTable::new(["Period", "Net"]);
        table.push(["2024-01", "1,200.00"]);
        table.push(["2024-02", "-5.00"]);
        assert_eq!(
            table.render(),
            "Period        Net\n\
             -------  --------\n\
             2024-01  1,200.00\n\
             2024-02     -5.00\n"
        );
    }

    #[test]
    fn test_table_pads_short_rows() {
        let mut table = TextTable::new(["Name", "A", "B"]).align(2, Align::Left);
        table.push(["x"]);
        assert_eq!(table.len(), 1);
        assert!(table.render().ends_with("x\n"));
    }
}
