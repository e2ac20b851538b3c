/// Render an aligned plain-text table.
///
/// Numeric cells are right-aligned. With `color`, audit outcomes are
/// highlighted (green SUCCESS, red FAILURE).
#[must_use]
pub fn render(headers: &[&str], rows: &[Vec<String>], color: bool) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .max(header.chars().count())
        })
        .collect();

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| pad(header, *width, false))
        .collect::<Vec<_>>()
        .join("  ");
    let divider = "-".repeat(header_line.chars().count());

    let mut lines = vec![header_line.trim_end().to_string(), divider];
    for row in rows {
        let line = widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let cell = row.get(index).map_or("-", String::as_str);
                let padded = pad(cell, *width, looks_numeric(cell));
                if color { highlight(cell, padded) } else { padded }
            })
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

fn pad(value: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(value.chars().count()));
    if right_align {
        format!("{fill}{value}")
    } else {
        format!("{value}{fill}")
    }
}

fn looks_numeric(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '-' | '.' | '%'))
        && value.chars().any(|ch| ch.is_ascii_digit())
}

fn highlight(cell: &str, padded: String) -> String {
    let code = match cell {
        "SUCCESS" | "recorded_success" => "32",
        "FAILURE" | "recorded_failure" => "31",
        _ => return padded,
    };
    format!("\u{1b}[{code}m{padded}\u{1b}[0m")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn aligns_columns() {
        let rows = vec![
            vec!["SYNC_USER".to_string(), "12".to_string()],
            vec!["DELETE_ORG".to_string(), "3".to_string()],
        ];
        let rendered = render(&["operation", "total"], &rows, false);
        assert_eq!(
            rendered,
            "operation   total\n-----------------\nSYNC_USER      12\nDELETE_ORG      3"
        );
    }

    #[test]
    fn colors_outcomes_only() {
        let rows = vec![vec!["SUCCESS".to_string()], vec!["alice".to_string()]];
        let rendered = render(&["result"], &rows, true);
        assert!(rendered.contains("\u{1b}[32mSUCCESS"));
        assert!(rendered.ends_with("alice"));
    }
}
