//! Table output formatting for CLI commands
//!
//! Task outputs and test scores rendered with comfy-table.

use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::env;

use super::truncate;
use crate::domain::models::{CrewOutput, TestReport};

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// One row per task: id, agent, artifact and the start of the answer
    pub fn format_outputs(&self, outputs: &CrewOutput) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            header("#"),
            header("Task"),
            header("Agent"),
            header("Artifact"),
            header("Preview"),
        ]);

        for (index, output) in outputs.iter().enumerate() {
            let preview = truncate(&output.raw.replace('\n', " "), 50);
            table.add_row(vec![
                Cell::new(index + 1),
                self.colored(Cell::new(&output.task_id), Color::Cyan),
                Cell::new(&output.agent),
                Cell::new(&output.output_file),
                Cell::new(preview),
            ]);
        }

        table.to_string()
    }

    /// Task x iteration score grid with a per-task average column
    pub fn format_scores(&self, report: &TestReport) -> String {
        let mut table = self.create_base_table();

        let mut headers = vec![header("Task")];
        for iteration in 1..=report.iterations {
            headers.push(header(&format!("Run {iteration}")));
        }
        headers.push(header("Avg"));
        table.set_header(headers);

        for task_id in &report.task_order {
            let mut row = vec![Cell::new(task_id)];
            if let Some(scores) = report.scores.get(task_id) {
                for score in scores {
                    row.push(self.score_cell(f64::from(*score), format!("{score}")));
                }
            }
            row.push(match report.average(task_id) {
                Some(avg) => self.score_cell(avg, format!("{avg:.1}")),
                None => Cell::new("-"),
            });
            table.add_row(row);
        }

        if let Some(overall) = report.overall_average() {
            let mut row = vec![Cell::new("Overall").add_attribute(Attribute::Bold)];
            for _ in 0..report.iterations {
                row.push(Cell::new(""));
            }
            row.push(self.score_cell(overall, format!("{overall:.1}")).add_attribute(Attribute::Bold));
            table.add_row(row);
        }

        table.to_string()
    }

    fn score_cell(&self, score: f64, text: String) -> Cell {
        let color = if score >= 8.0 {
            Color::Green
        } else if score >= 5.0 {
            Color::Yellow
        } else {
            Color::Red
        };
        self.colored(Cell::new(text).set_alignment(CellAlignment::Right), color)
    }

    fn colored(&self, cell: Cell, color: Color) -> Cell {
        if self.use_colors {
            cell.fg(color)
        } else {
            cell
        }
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = self.max_width {
            table.set_width(width);
        }
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

/// Check if terminal supports colors
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}
