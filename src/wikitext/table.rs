//! Wikitext table plumbing shared by the markup extractors.

use std::sync::LazyLock;

use regex::Regex;

static RE_TABLE_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\|.*").unwrap());

/// Remove `{|` opener lines and `|}` terminators, leaving row content.
pub fn strip_table_markup(text: &str) -> String {
    RE_TABLE_OPEN.replace_all(text, "").replace("|}", "")
}

/// Rows are whatever sits between `|-` separators.
pub fn split_rows(text: &str) -> Vec<&str> {
    text.split("|-").collect()
}

/// Cell payloads of one row. Cells open with `|` at the start of a line;
/// the prepended newline makes the first line split like the rest.
pub fn row_cells(row: &str) -> Vec<String> {
    format!("\n{row}")
        .split("\n|")
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trimmed `|`-prefixed lines of a row, markers kept.
pub fn row_lines(row: &str) -> Vec<&str> {
    row.lines()
        .map(str::trim)
        .filter(|line| line.starts_with('|'))
        .collect()
}

/// Strip leading pipes and surrounding whitespace from one cell line.
pub fn cell_value(line: &str) -> &str {
    line.trim_start_matches('|').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFEATED_TABLE: &str = "{| class=\"article-table\"\n\
        |-\n\
        ! Investigator !! Health !! Sanity\n\
        |-\n\
        | [[Mateo]]\n\
        | You wake in a cold sweat.\n\
        | The visions will not stop.\n\
        |}";

    #[test]
    fn strips_open_and_close_markers() {
        let stripped = strip_table_markup(DEFEATED_TABLE);
        assert!(!stripped.contains("{|"));
        assert!(!stripped.contains("|}"));
        assert!(stripped.contains("[[Mateo]]"));
    }

    #[test]
    fn rows_split_on_separator() {
        let stripped = strip_table_markup(DEFEATED_TABLE);
        let rows = split_rows(&stripped);
        assert_eq!(rows.len(), 3, "Expected 3 row chunks, got: {:?}", rows);
    }

    #[test]
    fn cells_split_on_line_pipes() {
        let cells = row_cells("\n| [[Mateo]]\n| You wake in a cold sweat.\n| The visions will not stop.\n");
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[1], "You wake in a cold sweat.");
        assert_eq!(cells[2], "The visions will not stop.");
    }

    #[test]
    fn first_cell_needs_no_leading_newline() {
        let cells = row_cells("| 12\n| Core\n| Spend 1 Clue to gain 1 Spell.");
        assert_eq!(cells[0], "12");
    }

    #[test]
    fn row_lines_keep_only_pipe_lines() {
        let lines = row_lines("! scope=\"col\" | ID\n| 7\n| Forsaken Lore\ntrailing prose\n| done");
        assert_eq!(lines, vec!["| 7", "| Forsaken Lore", "| done"]);
    }

    #[test]
    fn cell_value_strips_pipes() {
        assert_eq!(cell_value("| 12"), "12");
        assert_eq!(cell_value("||bold cell "), "bold cell");
        assert_eq!(cell_value("|"), "");
    }
}
