// File: src/view.rs
//! Terminal presentation. Everything here is plain println output; no logic.
use crate::controller::ListOutcome;
use chrono::NaiveDate;

pub fn print_tracked_lists(lists: &[String]) {
    if lists.is_empty() {
        println!("No task lists are tracked yet. Add one with: suivi --add <name>");
        return;
    }
    println!("Tracked task lists:");
    let mut sorted: Vec<&String> = lists.iter().collect();
    sorted.sort();
    for (idx, title) in sorted.iter().enumerate() {
        println!("  {:>3}. {}", idx + 1, title);
    }
}

pub fn print_already_tracked(name: &str) {
    println!("List '{}' is already being tracked. Nothing to do.", name);
}

pub fn print_added(name: &str) {
    println!("Added list: {}", name);
}

pub fn print_missing_lists(missing: &[String]) {
    for name in missing {
        eprintln!(
            "Warning: tracked list '{}' was not found at the provider. \
             Check the list title; matching is case-sensitive.",
            name
        );
    }
}

/// Print one run's enriched results, oldest completion first, open tasks
/// last.
pub fn print_outcomes(outcomes: &[ListOutcome]) {
    if outcomes.is_empty() {
        println!("No tasks found for any tracked list.");
        return;
    }

    for outcome in outcomes {
        println!();
        println!("== {} ==", outcome.list);
        if outcome.items.is_empty() {
            println!("  (no tasks)");
            continue;
        }

        let mut items: Vec<_> = outcome.items.iter().collect();
        items.sort_by_key(|item| item.completed.unwrap_or(NaiveDate::MAX));

        for item in items {
            match &item.classification {
                Some(c) => println!(
                    "  [{}] {} :: {} ({})",
                    item.completed_label(),
                    item.title,
                    c.category,
                    c.difficulty
                ),
                None => println!("  [{}] {}", item.completed_label(), item.title),
            }
        }
    }
}
