//! List rules command implementation.

use pom_lint_rules::all_checkers;

/// Runs the list-rules command.
pub fn run() {
    println!("Available checkers:\n");
    println!("{:<8} {:<22} {:<9} {:<5} Description", "Code", "Name", "Scope", "Fix");
    println!("{}", "-".repeat(90));

    for checker in all_checkers() {
        let fix = if checker.as_fixer().is_some() { "yes" } else { "no" };
        println!(
            "{:<8} {:<22} {:<9} {:<5} {}",
            checker.code(),
            checker.name(),
            checker.scope().to_string(),
            fix,
            checker.description()
        );
    }

    println!("\nUse --checkers to run a subset, e.g.:");
    println!("  pom-lint check --checkers duplicate-dependency,unused-property");
    println!("  pom-lint fix --checkers PL001,PL002");
}
