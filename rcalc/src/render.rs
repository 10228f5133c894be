//! Text rendering shared by the subcommands and the REPL

use rcalc_interpreter::{OperatorMap, Registry, RpnStack, StackItem};

/// Stack levels, deepest first, numbered from the top as `1:`
pub fn stack(stack: &RpnStack, show_types: bool, limit: usize) -> Vec<String> {
    let items = stack.items();
    let hidden = items.len().saturating_sub(limit);

    let mut lines = Vec::new();
    if hidden > 0 {
        lines.push(format!("   ... {hidden} more"));
    }
    for (position, item) in items.iter().enumerate().skip(hidden) {
        lines.push(level(items.len() - position, item, show_types));
    }
    lines
}

fn level(depth: usize, item: &StackItem, show_types: bool) -> String {
    let mut line = if item.input == item.output {
        format!("{depth:>3}: {}", item.output)
    } else {
        format!("{depth:>3}: {} = {}", item.input, item.output)
    };
    if show_types {
        line.push_str(&format!("  : {}", item.value_type()));
    }
    line
}

/// Operators grouped by category
pub fn operators(map: &OperatorMap) -> String {
    let mut lines = Vec::new();
    for category in map.categories() {
        if category.operators.is_empty() {
            continue;
        }
        lines.push(category.name.clone().unwrap_or_else(|| "Other".to_string()));
        for name in &category.operators {
            if let Some(registry) = map.operator(name) {
                lines.push(format!(
                    "  {:<10} {}  {}",
                    registry.name(),
                    arity(registry.arity()),
                    registry.description().unwrap_or_default()
                ));
            }
        }
    }
    lines.join("\n")
}

fn arity(arity: usize) -> String {
    match arity {
        1 => "1 arg ".to_string(),
        n => format!("{n} args"),
    }
}

/// Every callable signature of one operator with its dispatch index
pub fn table(registry: &Registry) -> String {
    let mut lines = vec![format!(
        "{}: {}",
        registry.name(),
        registry.description().unwrap_or_default()
    )];

    match registry.table() {
        Ok(table) => {
            for entry in table.iter() {
                let signature = if entry.signature.types().is_empty() {
                    "()".to_string()
                } else {
                    entry.signature.to_string()
                };
                let mut line = format!(
                    "  {:>3}  {:<20} #{}",
                    entry.index, signature, entry.permutation.declaration
                );
                if !entry.permutation.is_identity() {
                    line.push(' ');
                    line.push_str(&entry.permutation.provenance_label());
                }
                lines.push(line);
            }
        }
        Err(error) => lines.push(format!("  {error}")),
    }

    let examples: Vec<String> = registry
        .examples()
        .map(|arguments| format!("  {} {}", arguments.join(" "), registry.name()))
        .collect();
    if !examples.is_empty() {
        lines.push("Examples:".to_string());
        lines.extend(examples);
    }

    lines.join("\n")
}

pub fn stats(map: &OperatorMap) -> String {
    format!("{} ({:?} lookup)", map.stats(), map.strategy())
}
