//! Output formatting for CLI

use crate::td::PolicyEntry;

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print statistics table
pub fn print_stats_table(stats: &[(&str, String)]) {
    for (key, value) in stats {
        print_kv(key, value);
    }
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Render the learned value table and greedy policy
pub fn format_policy(policy: &[PolicyEntry]) -> String {
    let mut out = format!(
        "{:<8} {:>8}  {:<10} {}\n",
        "battery", "V(s)", "greedy", "Q(s,a) [attempts]"
    );
    for entry in policy {
        let actions = entry
            .actions
            .iter()
            .map(|(action, value, attempts)| format!("{action}={value:.3} [{attempts}]"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(&format!(
            "{:<8} {:>8.3}  {:<10} {}\n",
            entry.level.to_string(),
            entry.state_value,
            entry.greedy_action.to_string(),
            actions
        ));
    }
    out
}

/// Print the learned value table and greedy policy
pub fn print_policy(policy: &[PolicyEntry]) {
    print!("{}", format_policy(policy));
}
