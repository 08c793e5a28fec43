//! Console rendering for `verify-db`.

use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::{Attribute, Color as CtColor, Stylize};
use unicode_width::UnicodeWidthStr;

use crate::schema::{DatabaseSchema, TableDef};
use crate::verifier::{TableStatus, VerificationReport};

// ═══════════════════════════════════════════════════════════════════════════════
// Clap Styles
// ═══════════════════════════════════════════════════════════════════════════════

pub fn get_styles() -> Styles {
    let heading = Style::new()
        .bold()
        .underline()
        .fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
    Styles::styled()
        .usage(heading)
        .header(heading)
        .literal(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .invalid(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
        .error(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
        .valid(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Palette
// ═══════════════════════════════════════════════════════════════════════════════

pub mod colors {
    use crossterm::style::Color;

    pub const CYAN: Color = Color::Rgb { r: 0, g: 255, b: 255 };
    pub const PURPLE: Color = Color::Rgb { r: 180, g: 100, b: 255 };
    pub const GREEN: Color = Color::Rgb { r: 0, g: 255, b: 136 };
    pub const ORANGE: Color = Color::Rgb { r: 255, g: 165, b: 0 };
    pub const RED: Color = Color::Rgb { r: 255, g: 85, b: 85 };
    pub const DIM: Color = Color::Rgb { r: 128, g: 128, b: 128 };
    pub const WHITE: Color = Color::Rgb { r: 255, g: 255, b: 255 };
}

pub mod box_chars {
    pub const SINGLE_HORIZONTAL: &str = "─";
    pub const SINGLE_VERTICAL: &str = "│";

    pub const ROUND_TOP_LEFT: &str = "╭";
    pub const ROUND_TOP_RIGHT: &str = "╮";
    pub const ROUND_BOTTOM_LEFT: &str = "╰";
    pub const ROUND_BOTTOM_RIGHT: &str = "╯";

    pub const T_LEFT: &str = "├";
    pub const T_RIGHT: &str = "┤";
    pub const T_TOP: &str = "┬";
    pub const T_BOTTOM: &str = "┴";
    pub const CROSS: &str = "┼";

    pub const BULLET: &str = "●";
    pub const BULLET_EMPTY: &str = "○";
    pub const DIAMOND: &str = "◆";
    pub const ARROW_RIGHT: &str = "▶";
    pub const CHECK: &str = "✓";
    pub const CROSS_MARK: &str = "✗";
}

// ═══════════════════════════════════════════════════════════════════════════════
// Status Lines
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_success(message: &str) {
    println!(
        " {} {}",
        box_chars::CHECK.with(colors::GREEN).bold(),
        message.with(colors::GREEN)
    );
}

pub fn print_error(message: &str) {
    println!(
        " {} {}",
        box_chars::CROSS_MARK.with(colors::RED).bold(),
        message.with(colors::RED)
    );
}

pub fn print_warning(message: &str) {
    println!(
        " {} {}",
        "⚠".with(colors::ORANGE).bold(),
        message.with(colors::ORANGE)
    );
}

pub fn print_key_value(key: &str, value: &str) {
    println!(
        "  {} {} {}",
        box_chars::BULLET.with(colors::PURPLE),
        format!("{}:", key).with(colors::DIM),
        value.with(colors::WHITE)
    );
}

pub fn print_empty_list(message: &str) {
    println!(
        "  {} {}",
        box_chars::BULLET_EMPTY.with(colors::DIM),
        message.with(colors::DIM).attribute(Attribute::Italic)
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Section Headers
// ═══════════════════════════════════════════════════════════════════════════════

const SECTION_WIDTH: usize = 60;

pub fn print_section_header(title: &str) {
    let title_len = title.width();
    let padding = SECTION_WIDTH.saturating_sub(title_len + 4) / 2;
    let rest = SECTION_WIDTH.saturating_sub(title_len + 4 + padding);

    println!();
    println!(
        "{}{} {} {}{}",
        box_chars::ROUND_TOP_LEFT.with(colors::CYAN),
        box_chars::SINGLE_HORIZONTAL.repeat(padding).with(colors::CYAN),
        title.with(colors::CYAN).bold().attribute(Attribute::Italic),
        box_chars::SINGLE_HORIZONTAL.repeat(rest).with(colors::CYAN),
        box_chars::ROUND_TOP_RIGHT.with(colors::CYAN)
    );
}

pub fn print_section_footer() {
    println!(
        "{}{}{}",
        box_chars::ROUND_BOTTOM_LEFT.with(colors::CYAN),
        box_chars::SINGLE_HORIZONTAL
            .repeat(SECTION_WIDTH)
            .with(colors::CYAN),
        box_chars::ROUND_BOTTOM_RIGHT.with(colors::CYAN)
    );
    println!();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Table Display
// ═══════════════════════════════════════════════════════════════════════════════

/// Boxed table sized to its widest cells (by display width).
pub struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
    colored: bool,
}

impl TableBuilder {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| h.as_ref().to_string()).collect();
        let col_widths = headers.iter().map(|h| h.width()).collect();
        TableBuilder {
            headers,
            rows: Vec::new(),
            col_widths,
            colored: true,
        }
    }

    /// Render without ANSI escapes.
    pub fn plain(mut self) -> Self {
        self.colored = false;
        self
    }

    /// Extra cells beyond the header count are dropped.
    pub fn add_row<S: AsRef<str>>(&mut self, row: &[S]) {
        let row: Vec<String> = row
            .iter()
            .take(self.headers.len())
            .map(|c| c.as_ref().to_string())
            .collect();
        for (i, cell) in row.iter().enumerate() {
            self.col_widths[i] = self.col_widths[i].max(cell.width());
        }
        self.rows.push(row);
    }

    fn paint(&self, text: &str, color: CtColor, bold: bool) -> String {
        match (self.colored, bold) {
            (false, _) => text.to_string(),
            (true, false) => text.with(color).to_string(),
            (true, true) => text.with(color).bold().to_string(),
        }
    }

    fn border(&self, left: &str, junction: &str, right: &str) -> String {
        let segments: Vec<String> = self
            .col_widths
            .iter()
            .map(|w| box_chars::SINGLE_HORIZONTAL.repeat(w + 2))
            .collect();
        self.paint(
            &format!("{}{}{}", left, segments.join(junction), right),
            colors::CYAN,
            false,
        )
    }

    fn line(&self, cells: &[String], color: CtColor, bold: bool) -> String {
        let bar = self.paint(box_chars::SINGLE_VERTICAL, colors::CYAN, false);
        let mut out = bar.clone();
        for (i, width) in self.col_widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let padding = width.saturating_sub(cell.width());
            out.push_str(&format!(
                " {}{} {}",
                self.paint(cell, color, bold),
                " ".repeat(padding),
                bar
            ));
        }
        out
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.rows.len() + 4);
        lines.push(self.border(
            box_chars::ROUND_TOP_LEFT,
            box_chars::T_TOP,
            box_chars::ROUND_TOP_RIGHT,
        ));
        lines.push(self.line(&self.headers, colors::CYAN, true));
        lines.push(self.border(box_chars::T_LEFT, box_chars::CROSS, box_chars::T_RIGHT));
        for row in &self.rows {
            lines.push(self.line(row, colors::WHITE, false));
        }
        lines.push(self.border(
            box_chars::ROUND_BOTTOM_LEFT,
            box_chars::T_BOTTOM,
            box_chars::ROUND_BOTTOM_RIGHT,
        ));
        lines
    }

    pub fn print(&self) {
        for line in self.render() {
            println!("{}", line);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Verification Report
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_report(report: &VerificationReport) {
    print_section_header(&format!("Catalog: {}.{}", report.schema, report.catalog.table));
    let rows = report.catalog.text_rows();
    if rows.is_empty() {
        print_empty_list("no rows");
    } else {
        let mut table = TableBuilder::new(&report.catalog.columns);
        for row in &rows {
            table.add_row(row);
        }
        table.print();
    }
    print_section_footer();

    print_section_header("Table accessibility");
    for outcome in &report.outcomes {
        match &outcome.status {
            TableStatus::Reachable => println!(
                "  {} {} {}",
                box_chars::CHECK.with(colors::GREEN).bold(),
                outcome.table.with(colors::WHITE),
                format!("({})", outcome.probe_column).with(colors::DIM)
            ),
            TableStatus::Unreachable(e) => println!(
                "  {} {} {}",
                box_chars::CROSS_MARK.with(colors::RED).bold(),
                outcome.table.with(colors::RED).bold(),
                e.as_str().with(colors::DIM)
            ),
        }
    }
    print_section_footer();

    if report.is_success() {
        print_success(&report.summary());
    } else {
        print_warning(&report.summary());
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Schema Description
// ═══════════════════════════════════════════════════════════════════════════════

fn column_rows(table: &TableDef) -> Vec<[String; 4]> {
    table
        .columns
        .iter()
        .map(|c| {
            let mut flags = Vec::new();
            if c.is_primary_key {
                flags.push("pk");
            }
            if c.non_null {
                flags.push("not null");
            }
            if c.is_unique {
                flags.push("unique");
            }
            let reference = table
                .relationship_on(c.name)
                .map(|r| format!("{}({})", r.referenced_relation, r.referenced_columns.join(", ")))
                .unwrap_or_default();
            [
                c.name.to_string(),
                c.column_type.sql_name().to_string(),
                flags.join(", "),
                reference,
            ]
        })
        .collect()
}

pub fn print_schema_description(schema: &DatabaseSchema) {
    print_section_header(&format!("Schema: {}", schema.name));
    print_key_value("tables", &schema.tables.len().to_string());
    print_key_value("enum domains", &schema.enums.len().to_string());
    print_key_value("relationships", &schema.relationships().count().to_string());
    print_section_footer();

    for table in schema.tables {
        let title = if table.is_catalog() {
            format!("{} (catalog)", table.name)
        } else {
            table.name.to_string()
        };
        println!(
            "  {} {}",
            box_chars::DIAMOND.with(colors::PURPLE),
            title.with(colors::CYAN).bold()
        );
        let mut builder = TableBuilder::new(&["column", "type", "constraints", "references"]);
        for row in column_rows(table) {
            builder.add_row(&row);
        }
        builder.print();
        println!();
    }

    print_section_header("Enum domains");
    for domain in schema.enums {
        print_key_value(domain.name, &domain.values.join(" | "));
    }
    print_section_footer();

    print_section_header("Relationships");
    for declared in schema.relationships() {
        let r = declared.relationship;
        let cardinality = if r.is_one_to_one { "1:1" } else { "n:1" };
        println!(
            "  {}  {}.{} {} {}.{} {}",
            box_chars::ARROW_RIGHT.with(colors::CYAN),
            declared.table,
            r.columns.join(","),
            format!("[{}]", cardinality).with(colors::DIM),
            r.referenced_relation,
            r.referenced_columns.join(","),
            format!("on delete {}", r.on_delete.sql().to_lowercase()).with(colors::DIM)
        );
    }
    print_section_footer();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PUBLIC_SCHEMA;

    #[test]
    fn test_plain_table_render() {
        let mut table = TableBuilder::new(&["slug", "name"]).plain();
        table.add_row(&["gold", "Gold Leaf"]);
        table.add_row(&["rustic", "Rustic"]);
        assert_eq!(
            table.render(),
            vec![
                "╭────────┬───────────╮",
                "│ slug   │ name      │",
                "├────────┼───────────┤",
                "│ gold   │ Gold Leaf │",
                "│ rustic │ Rustic    │",
                "╰────────┴───────────╯",
            ]
        );
    }

    #[test]
    fn test_wide_characters_are_padded_by_display_width() {
        let mut table = TableBuilder::new(&["name"]).plain();
        table.add_row(&["花"]);
        let lines = table.render();
        assert_eq!(lines[3], "│ 花   │");
        assert_eq!(lines[0].width(), lines[3].width());
    }

    #[test]
    fn test_column_rows_show_references() {
        let events = PUBLIC_SCHEMA.table("events").unwrap();
        let rows = column_rows(events);
        let theme = rows.iter().find(|r| r[0] == "theme_id").unwrap();
        assert_eq!(theme[3], "themes(id)");
        let id = rows.iter().find(|r| r[0] == "id").unwrap();
        assert_eq!(id[2], "pk, not null");
    }
}
