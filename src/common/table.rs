const PARAMETER: &str = "Parameter";
const VALUE: &str = "Value";

/// Renders `(parameter, value)` rows as a two column text table.
///
/// Values spanning several lines continue on the following lines with an
/// empty parameter column.
pub fn render_table<P: AsRef<str>, V: AsRef<str>>(rows: &[(P, V)]) -> String {
    let width = rows
        .iter()
        .map(|(p, _)| p.as_ref().chars().count())
        .chain(std::iter::once(PARAMETER.len()))
        .max()
        .unwrap_or_default();

    let value_width = rows
        .iter()
        .flat_map(|(_, v)| v.as_ref().lines())
        .map(|line| line.chars().count())
        .chain(std::iter::once(VALUE.len()))
        .max()
        .unwrap_or_default();

    let mut out = String::new();

    out.push_str(&format!("{PARAMETER:<width$} | {VALUE}\n"));
    out.push_str(&format!(
        "{}-+-{}\n",
        "-".repeat(width),
        "-".repeat(value_width)
    ));

    for (parameter, value) in rows {
        let mut lines = value.as_ref().lines();

        let first = lines.next().unwrap_or_default();
        out.push_str(&format!("{:<width$} | {first}\n", parameter.as_ref()));

        for line in lines {
            out.push_str(&format!("{:<width$} | {line}\n", ""));
        }
    }

    out
}
