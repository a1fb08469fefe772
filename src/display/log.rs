//! Audit log display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::audit::LogEntry;

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "When (UTC)")]
    when: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Details")]
    details: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&LogEntry> for LogRow {
    fn from(entry: &LogEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            when: entry.created_at.format("%Y-%m-%d %H:%M").to_string(),
            action: entry.action.to_string(),
            details: entry.details.clone(),
            status: if entry.is_undone {
                "undone".to_string()
            } else {
                String::new()
            },
        }
    }
}

/// Format log entries as a table, newest first
pub fn format_log_table(entries: &[LogEntry]) -> String {
    if entries.is_empty() {
        return "The log is empty.".to_string();
    }

    let rows: Vec<LogRow> = entries.iter().map(LogRow::from).collect();
    Table::new(rows).with(Style::sharp()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{Action, RelatedEntity};
    use crate::models::ClientId;

    #[test]
    fn test_empty_log() {
        assert_eq!(format_log_table(&[]), "The log is empty.");
    }

    #[test]
    fn test_table_marks_undone_entries() {
        let mut entry = LogEntry::create(
            Action::ClientAdded,
            "Client 'Ayşe' added",
            RelatedEntity::client(ClientId::new()),
            None,
        );
        entry.is_undone = true;

        let output = format_log_table(&[entry]);
        assert!(output.contains("Client Added"));
        assert!(output.contains("undone"));
    }
}
