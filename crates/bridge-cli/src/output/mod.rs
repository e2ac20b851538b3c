use std::io::IsTerminal;

use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat, color: bool) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => Ok(render_table(serde_json::to_value(value)?, color)),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format, std::io::stdout().is_terminal())?;
    println!("{rendered}");
    Ok(())
}

fn render_table(value: Value, color: bool) -> String {
    match value {
        Value::Array(items) if items.is_empty() => String::from("(no rows)"),
        Value::Array(items) if items.iter().all(Value::is_object) => {
            // serde_json maps are sorted, so columns come out in key order.
            let mut headers: Vec<String> = Vec::new();
            for item in &items {
                if let Some(map) = item.as_object() {
                    for key in map.keys() {
                        if !headers.contains(key) {
                            headers.push(key.clone());
                        }
                    }
                }
            }
            let rows = items
                .iter()
                .filter_map(Value::as_object)
                .map(|map| {
                    headers
                        .iter()
                        .map(|h| map.get(h).map_or_else(|| String::from("-"), value_to_cell))
                        .collect()
                })
                .collect::<Vec<Vec<String>>>();
            let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
            table::render(&header_refs, &rows, color)
        }
        Value::Array(items) => {
            let rows = items.iter().map(|v| vec![value_to_cell(v)]).collect::<Vec<_>>();
            table::render(&["value"], &rows, color)
        }
        Value::Object(map) => {
            let rows = map
                .into_iter()
                .map(|(key, value)| vec![key, value_to_cell(&value)])
                .collect::<Vec<_>>();
            table::render(&["key", "value"], &rows, color)
        }
        scalar => value_to_cell(&scalar),
    }
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::String(v) => v.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Row {
        metric: &'static str,
        value: &'static str,
    }

    #[test]
    fn json_is_pretty() {
        let rendered = render(
            &Row {
                metric: "mapped_users",
                value: "5",
            },
            OutputFormat::Json,
            false,
        )
        .unwrap();
        assert!(rendered.contains("\n  \"metric\": \"mapped_users\""));
    }

    #[test]
    fn raw_is_single_line() {
        let rendered = render(&vec![1, 2, 3], OutputFormat::Raw, false).unwrap();
        assert_eq!(rendered, "[1,2,3]");
    }

    #[test]
    fn table_keeps_field_order() {
        let rows = vec![
            Row {
                metric: "source_users",
                value: "5",
            },
            Row {
                metric: "success_rate",
                value: "100.0%",
            },
        ];
        let rendered = render(&rows, OutputFormat::Table, false).unwrap();
        let mut lines = rendered.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("metric"));
        assert!(header.trim_end().ends_with("value"));
        assert_eq!(rendered.lines().count(), 4);
    }

    #[test]
    fn empty_array_table() {
        let rendered = render(&Vec::<Row>::new(), OutputFormat::Table, false).unwrap();
        assert_eq!(rendered, "(no rows)");
    }
}
