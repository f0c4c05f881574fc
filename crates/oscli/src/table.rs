use oscli_core::config::ContextInfo;

const MISSING: &str = "(missing)";

pub struct TableFormatter {
    current_width: usize,
    name_width: usize,
    cluster_width: usize,
    user_width: usize,
    server_width: usize,
}

impl TableFormatter {
    pub fn new(rows: &[ContextInfo<'_>]) -> Self {
        let widest = |cell: fn(&ContextInfo<'_>) -> String, header: &str, max: usize| {
            rows.iter()
                .map(|r| cell(r).chars().count())
                .max()
                .unwrap_or(0)
                .clamp(header.len(), max)
        };

        Self {
            current_width: 1,
            name_width: widest(|r| r.name.clone(), "Context", 40),
            cluster_width: widest(cluster_cell, "Cluster", 40),
            user_width: widest(user_cell, "User", 30),
            server_width: widest(server_cell, "Server", 50),
        }
    }

    pub fn print_table(&self, rows: &[ContextInfo<'_>]) {
        println!("{}", self.border('┌', '┬', '┐'));
        println!("{}", self.row(["", "Context", "Cluster", "User", "Server"]));
        println!("{}", self.border('├', '┼', '┤'));
        for info in rows {
            let current = if info.is_current { "*" } else { "" };
            println!(
                "{}",
                self.row([
                    current,
                    &info.name,
                    &cluster_cell(info),
                    &user_cell(info),
                    &server_cell(info),
                ])
            );
        }
        println!("{}", self.border('└', '┴', '┘'));
    }

    fn widths(&self) -> [usize; 5] {
        [
            self.current_width,
            self.name_width,
            self.cluster_width,
            self.user_width,
            self.server_width,
        ]
    }

    fn row(&self, cells: [&str; 5]) -> String {
        let cells: Vec<String> = cells
            .iter()
            .zip(self.widths())
            .map(|(cell, width)| truncate(cell, width))
            .collect();
        format!("│ {} │", cells.join(" │ "))
    }

    fn border(&self, left: char, middle: char, right: char) -> String {
        let segments: Vec<String> = self.widths().iter().map(|w| "─".repeat(w + 2)).collect();
        let middle = middle.to_string();
        format!("{}{}{}", left, segments.join(middle.as_str()), right)
    }
}

fn cluster_cell(info: &ContextInfo<'_>) -> String {
    reference_cell(info.cluster_ref(), info.cluster.is_some())
}

fn user_cell(info: &ContextInfo<'_>) -> String {
    reference_cell(info.user_ref(), info.user.is_some())
}

fn server_cell(info: &ContextInfo<'_>) -> String {
    info.cluster
        .map(|c| c.params.server.clone())
        .unwrap_or_default()
}

fn reference_cell(name: Option<&str>, found: bool) -> String {
    match (name, found) {
        (Some(name), true) => name.to_string(),
        (Some(name), false) => format!("{} {}", name, MISSING),
        (None, _) => MISSING.to_string(),
    }
}

/// Truncate a string to a maximum display width, adding "..." if truncated.
///
/// Uses character count (not byte count) to safely handle UTF-8 strings.
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        format!("{:<width$}", s, width = max_len)
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_len)
    }
}
