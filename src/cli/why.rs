use colored::Colorize;
use json_lint::docs::{RuleDoc, all_rule_docs, get_rule_doc};
use json_lint::linter::RULE_CATEGORIES;
use std::process::ExitCode;

pub fn run_why(rule: Option<String>, list: bool) -> ExitCode {
    if list {
        eprintln!("{}", "Available rules:".bold());
        eprintln!();

        for category in RULE_CATEGORIES {
            let rules: Vec<_> = all_rule_docs()
                .iter()
                .filter(|doc| doc.category == *category)
                .collect();
            if rules.is_empty() {
                continue;
            }
            eprintln!("  {} {}", "▸".cyan(), category.bold());
            for doc in rules {
                let suffix = if doc.fixable { " (fixable)" } else { "" };
                eprintln!(
                    "    {} - {}{}",
                    doc.name.yellow(),
                    doc.description,
                    suffix.dimmed()
                );
            }
            eprintln!();
        }

        eprintln!(
            "Use {} to see detailed documentation.",
            "json-lint why <rule-name>".cyan()
        );
        return ExitCode::SUCCESS;
    }

    let rule_name = match rule {
        Some(name) => name,
        None => {
            eprintln!("Usage: json-lint why <rule-name>");
            eprintln!("       json-lint why --list");
            eprintln!();
            eprintln!("Use {} to see all available rules.", "--list".cyan());
            return ExitCode::from(1);
        }
    };

    match get_rule_doc(&rule_name) {
        Some(doc) => {
            print_rule_doc(doc);
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("{} Unknown rule: {}", "Error:".red().bold(), rule_name);
            eprintln!();
            eprintln!(
                "Use {} to see all available rules.",
                "json-lint why --list".cyan()
            );
            ExitCode::from(1)
        }
    }
}

fn print_rule_doc(doc: &RuleDoc) {
    eprintln!();
    eprintln!("{} {}", "Rule:".bold(), doc.qualified_name().yellow());
    eprintln!("{} {}", "Category:".bold(), doc.category);
    eprintln!("{} {}", "Severity:".bold(), doc.severity);
    if doc.fixable {
        eprintln!("{} yes", "Fixable:".bold());
    }
    eprintln!();
    eprintln!("{}", "Why:".bold());
    for line in doc.why.lines() {
        eprintln!("  {}", line);
    }
    if !doc.options.is_empty() {
        eprintln!();
        eprintln!("{}", "Options:".bold());
        for line in doc.options.lines() {
            eprintln!("  {}", line);
        }
    }
    eprintln!();
    eprintln!("{}", "Bad Example:".bold().red());
    eprintln!("{}", "─".repeat(60).dimmed());
    for line in doc.bad_example.lines() {
        eprintln!("  {}", line);
    }
    eprintln!("{}", "─".repeat(60).dimmed());
    eprintln!();
    eprintln!("{}", "Good Example:".bold().green());
    eprintln!("{}", "─".repeat(60).dimmed());
    for line in doc.good_example.lines() {
        eprintln!("  {}", line);
    }
    eprintln!("{}", "─".repeat(60).dimmed());

    if !doc.references.is_empty() {
        eprintln!();
        eprintln!("{}", "References:".bold());
        for reference in doc.references {
            eprintln!("  • {}", reference.cyan());
        }
    }
    eprintln!();
}
