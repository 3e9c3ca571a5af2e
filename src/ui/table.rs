use tabled::{Table, Tabled, settings::Style};

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Render label/value pairs as a rounded table.
pub fn stats_table(stats: &[(&str, &str)]) -> String {
    if stats.is_empty() {
        return String::new();
    }

    let rows: Vec<StatRow> = stats
        .iter()
        .map(|(metric, value)| StatRow {
            metric: metric.to_string(),
            value: value.to_string(),
        })
        .collect();

    Table::new(&rows).with(Style::rounded()).to_string()
}
