use stats_core::domain::{CategoryBreakdown, CategoryLabel, CellValue, CrossTabResult, Table};
use stats_core::utils::count_column_label;

/// Text of a missing cell; always rendered in italics
pub const MISSING_LABEL: &str = "Non spécifié";
pub const COMPARISON_TITLE: &str = "Comparaison des courtiers par type_mail";
pub const COMPARISON_COUNT_COLUMN: &str = "Nombre_envois";

/// Markdown rendering of a cell.
///
/// `Missing` is the only value that comes out emphasized (`*Non spécifié*`).
/// Emphasis markers in present text are escaped, so a cell holding the text
/// "Non spécifié" never reads like a missing one.
pub fn cell_markdown(value: &CellValue) -> String {
    match value {
        CellValue::Present(text) => text
            .replace('\\', "\\\\")
            .replace('*', "\\*")
            .replace('_', "\\_"),
        CellValue::Missing => format!("*{}*", MISSING_LABEL),
    }
}

/// Keeps text on one line and inside its Markdown table column
fn escape(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn table_row<S: AsRef<str>>(cells: impl IntoIterator<Item = S>) -> String {
    let cells: Vec<String> = cells.into_iter().map(|c| escape(c.as_ref())).collect();
    format!("| {} |\n", cells.join(" | "))
}

fn header(columns: &[&str]) -> String {
    let mut out = table_row(columns.iter().copied());
    out.push_str(&table_row(columns.iter().map(|_| "---")));
    out
}

fn warning(message: &str) -> String {
    format!("> **Attention :** {}\n\n", message)
}

pub fn format_table(title: &str, table: &Table) -> String {
    let mut out = format!("## {}\n\n", title);
    if table.columns().is_empty() {
        out.push_str(&warning("Aucune colonne dans l'onglet."));
        return out;
    }

    out.push_str(&format!("*{} ligne(s)*\n\n", table.len()));
    let columns: Vec<&str> = table.columns().iter().map(String::as_str).collect();
    out.push_str(&header(&columns));
    for record in table.records() {
        out.push_str(&table_row(record.values().iter().map(cell_markdown)));
    }
    out.push('\n');
    out
}

/// Table restricted to the rows where `column` equals `value`
pub fn format_filtered_table(column: &str, value: &CellValue, table: &Table) -> String {
    let title = format!("Données filtrées par {} = {}", column, cell_markdown(value));
    format_table(&title, table)
}

pub fn format_values(column: &str, values: &[CellValue]) -> String {
    let mut out = format!("## Valeurs de la colonne '{}'\n\n", column);
    if values.is_empty() {
        out.push_str(&warning("Aucune valeur disponible."));
        return out;
    }
    for value in values {
        let item = escape(&cell_markdown(value));
        if value.is_missing() {
            out.push_str(&format!("- {} (`--missing`)\n", item));
        } else {
            out.push_str(&format!("- {}\n", item));
        }
    }
    out.push('\n');
    out
}

/// One section per category; categories without records get a warning
pub fn format_breakdowns(
    group_header: &str,
    breakdowns: &[(CategoryLabel, CategoryBreakdown)],
) -> String {
    let mut out = String::new();
    for (category, breakdown) in breakdowns {
        match breakdown {
            CategoryBreakdown::NoData => {
                out.push_str(&warning(&format!("Aucune donnée pour '{}'.", category)));
            }
            CategoryBreakdown::Counts(counts) => {
                let count_header = count_column_label(category);
                out.push_str(&format!("## Analyse pour '{}'\n\n", category));
                out.push_str(&header(&[group_header, count_header.as_str()]));
                for group in counts {
                    let count = group.count.to_string();
                    out.push_str(&table_row([cell_markdown(&group.key), count]));
                }
                out.push('\n');
            }
        }
    }
    out
}

pub fn format_comparison(
    group_column: &str,
    category_column: &str,
    comparison: &CrossTabResult,
) -> String {
    if comparison.is_empty() {
        return warning("Aucune donnée disponible pour la comparaison.");
    }

    let mut out = format!("## {}\n\n", COMPARISON_TITLE);
    out.push_str(&header(&[group_column, category_column, COMPARISON_COUNT_COLUMN]));
    for entry in comparison {
        let count = entry.count.to_string();
        out.push_str(&table_row([
            cell_markdown(&entry.group),
            cell_markdown(&entry.category),
            count,
        ]));
    }
    out.push('\n');
    out
}
