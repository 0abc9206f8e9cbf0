//! Registry introspection.
//!
//! `frostgate types` lists every registered resource type.
//! `frostgate types <name>` describes one, as text or (`--json`) as the
//! registry's JSON summary.

use anyhow::Result;
use frostgate_core::FrostgateConfig;
use frostgate_policy::{AttributeSpec, Constraint, ResourceSpec};

use super::offline_server;

pub fn run(config: &FrostgateConfig, name: Option<&str>, json: bool) -> Result<()> {
    let server = offline_server(config)?;
    let registry = server.tools().registry();

    match name {
        None => {
            println!("\nResource types ({}):", registry.len());
            for spec in registry.iter() {
                println!(
                    "   • {} ({}, {})",
                    spec.name,
                    spec.keyword,
                    spec.scope.as_str()
                );
                if let Some(description) = &spec.description {
                    println!("     {}", description);
                }
            }
        }
        Some(name) if json => {
            let summary = registry.lookup(name)?.summary();
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Some(name) => describe(registry.lookup(name)?),
    }
    Ok(())
}

fn describe(spec: &ResourceSpec) {
    println!("\n{} ({})", spec.name, spec.keyword);
    if let Some(description) = &spec.description {
        println!("   {}", description);
    }
    println!("   scope: {}", spec.scope.as_str());
    println!("   manager: {}", spec.manager.as_str());
    println!("   listed with: SHOW {}", spec.plural);
    println!("   cascade: {}", if spec.supports_cascade { "supported" } else { "no" });
    if !spec.protected_names.is_empty() {
        println!("   protected: {}", spec.protected_names.join(", "));
    }

    println!("\n   Attributes:");
    for ancestor in spec.ancestors() {
        println!("   - {}* (identifier, parent)", ancestor);
    }
    for attr in &spec.attributes {
        println!("   - {}", attribute_line(attr));
        if let Some(description) = &attr.description {
            println!("       {}", description);
        }
    }

    if !spec.rules.is_empty() {
        println!("\n   Rules:");
        for rule in &spec.rules {
            println!("   - {}", serde_json::to_string(rule).unwrap_or_default());
        }
    }
}

fn attribute_line(attr: &AttributeSpec) -> String {
    let mut line = attr.name.clone();
    if attr.required && attr.default.is_none() {
        line.push('*');
    }
    line.push_str(&format!(" ({})", attr.kind.as_str()));
    if let Some(default) = &attr.default {
        line.push_str(&format!(" default {}", default.to_json()));
    }
    let constraints: Vec<String> = attr.constraints.iter().map(constraint_text).collect();
    if !constraints.is_empty() {
        line.push_str(&format!(" [{}]", constraints.join("; ")));
    }
    line
}

fn constraint_text(constraint: &Constraint) -> String {
    match constraint {
        Constraint::OneOf(values) => format!("one of {}", values.join(" | ")),
        Constraint::Range { min, max } => match (min, max) {
            (Some(min), Some(max)) => format!("{}..={}", min, max),
            (Some(min), None) => format!(">= {}", min),
            (None, Some(max)) => format!("<= {}", max),
            (None, None) => "any integer".to_string(),
        },
        Constraint::Pattern { source, .. } => format!("matches {}", source),
        Constraint::MaxLength(max) => format!("at most {} chars", max),
        Constraint::MinItems(min) => format!("at least {} items", min),
    }
}
