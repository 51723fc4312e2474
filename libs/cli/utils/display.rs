use colored::*;
use prettytable::{format, row, Cell, Row, Table};
use std::fmt::Display;
use taskboard_core::{Priority, Task};

pub enum LogType {
    Success,
    Info,
}

/// A message followed by labelled detail lines:
///
/// ```text
/// ✔ Task added!
///   ├─ Id:       01HV...
///   ╰─ Title:    Buy milk
/// ```
pub struct LogBuilder<'a> {
    log_type: LogType,
    message: String,
    details: Vec<(&'a str, Box<dyn Display>)>,
}

impl<'a> LogBuilder<'a> {
    pub fn new(log_type: LogType, message: impl Display) -> Self {
        Self {
            log_type,
            message: message.to_string(),
            details: Vec::new(),
        }
    }

    pub fn with_branch(mut self, label: &'a str, value: impl Display + 'static) -> Self {
        self.details.push((label, Box::new(value)));
        self
    }

    pub fn print(self) {
        let (symbol, color) = match self.log_type {
            LogType::Success => ("✔", "green"),
            LogType::Info => ("ℹ", "blue"),
        };

        println!(
            "{} {}",
            symbol.color(color).bold(),
            self.message.color(color).bold()
        );

        let count = self.details.len();
        for (i, (label, value)) in self.details.iter().enumerate() {
            let prefix = if i == count - 1 { "  ╰─" } else { "  ├─" };
            let padded_label = format!("{label}:");
            println!("{} {:<9} {}", prefix.dimmed(), padded_label.bold(), value);
        }
    }
}

fn priority_style(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "",
        Priority::Medium => "Fy",
        Priority::High => "bFr",
    }
}

pub fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("{}", "No tasks yet!".dimmed());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.set_titles(row![b => "Id", "Title", "Priority", "Done", "Description"]);

    for task in tasks {
        table.add_row(Row::new(vec![
            Cell::new(&task.id),
            Cell::new(&task.title),
            Cell::new(&task.priority.to_string()).style_spec(priority_style(task.priority)),
            Cell::new(if task.completed { "✔" } else { "" }).style_spec("Fg"),
            Cell::new(&task.description),
        ]));
    }

    table.printstd();
}
