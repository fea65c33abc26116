use revsimplex_solver::Problem;

/// Render `problem` in the LP text format read by [`crate::Parser`].
///
/// Only non-zero coefficients are written; positive ones get an explicit
/// `+`. Floats use Rust's shortest round-trip formatting, so reading the
/// output back reproduces `A`, `b` and the costs exactly. Every variable gets
/// a bound line, which keeps trailing all-zero columns on a reload.
pub fn write_problem(problem: &Problem) -> String {
    let mut out = String::from("\\Generated by revsimplex\n\nMinimize\n obj:");
    out.push_str(&format_terms(problem.costs().iter().copied()));
    out.push_str("\nSubject To\n");

    for (i, row) in problem.a().row_iter().enumerate() {
        out.push_str(&format!(
            " c{}:{} <= {}\n",
            i + 1,
            format_terms(row.iter().copied()),
            problem.b()[i]
        ));
    }

    out.push_str("Bounds\n");
    for k in 1..=problem.num_vars() {
        out.push_str(&format!(" x{} >= 0\n", k));
    }
    out.push_str("\nEnd\n");
    out
}

fn format_terms(coefficients: impl Iterator<Item = f64>) -> String {
    coefficients
        .enumerate()
        .filter(|&(_, c)| c != 0.0)
        .map(|(j, c)| format!(" {} x{}", format_coefficient(c), j + 1))
        .collect()
}

fn format_coefficient(c: f64) -> String {
    if c > 0.0 { format!("+{}", c) } else { c.to_string() }
}
