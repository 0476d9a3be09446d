// File: ./src/cli.rs
//! Shared command-line interface logic, like printing help.

pub fn print_help(binary_name: &str) {
    println!(
        "Suivi v{} - Completion history for your task lists, with LLM category/difficulty labels",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [--root <path>]              Reconcile all tracked lists", binary_name);
    println!("    {} --add <name>                 Start tracking a task list", binary_name);
    println!("    {} --list                       Show the tracked task lists", binary_name);
    println!("    {} --help", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -a, --add <name>      Track the task list with this title (case-sensitive).");
    println!("    -l, --list            Print the task lists currently tracked.");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    -h, --help            Show this help message.");
    println!("    --version             Show the version.");
    println!();
    println!("DEFAULT RUN:");
    println!("    Without flags, suivi fetches every tracked list from the task provider,");
    println!("    labels each completed task via the configured classification provider,");
    println!("    merges the results into the local completion history (deduplicated per");
    println!("    day), prunes tasks that were un-completed within the trailing window,");
    println!("    and prints the enriched lists.");
    println!();
    println!("CONFIGURATION:");
    println!("    config.toml in the config directory. Keys: provider (gemini|openai),");
    println!("    gemini_api_key / openai_api_key, tasks_token, prune_window_days,");
    println!("    classify_concurrency, categories, mirror_url.");
    println!();
    println!("MORE INFO:");
    println!("    Repository: https://codeberg.org/trougnouf/suivi");
    println!("    License:    GPL-3.0");
}
