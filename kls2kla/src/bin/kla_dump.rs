use anyhow::{Context, Result};
use clap::Parser;
use keylayer_core::kla::KlaLoader;
use keylayer_core::{validate_with, StateRef, Transition, ValidationOptions};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Dump the contents of a KLA file", long_about = None)]
struct Args {
    /// KLA file to dump
    input: PathBuf,

    /// Also print every key and transition
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let data = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let doc = KlaLoader::load(&data).context("Failed to load KLA file")?;

    println!("Name: {}", doc.name);
    println!("Id: {}", doc.id);
    println!(
        "Counts: {} key maps, {} actions, {} terminators",
        doc.keymaps.len(),
        doc.actions.len(),
        doc.terminators.len()
    );

    if args.verbose {
        for keymap in &doc.keymaps {
            println!("\n=== KEY MAP {} ===", keymap.index);
            for key in &keymap.keys {
                match (&key.output, &key.action) {
                    (Some(output), None) => println!("  {:3} => {:?}", key.code, output),
                    (None, Some(action)) => println!("  {:3} => action({:?})", key.code, action),
                    (output, action) => println!("  {:3} => output={:?} action={:?}", key.code, output, action),
                }
            }
        }

        println!("\n=== ACTIONS ===");
        for action in &doc.actions {
            let reserved = if action.reserved { " (reserved)" } else { "" };
            println!("  {:?}{}", action.id, reserved);
            for when in &action.transitions {
                let state = match when.state {
                    StateRef::Baseline => "none".to_string(),
                    StateRef::State(s) => s.to_string(),
                };
                match &when.transition {
                    Transition::Emit(text) => println!("    {} -> emit {:?}", state, text),
                    Transition::Advance(target) => println!("    {} -> next {}", state, target),
                }
            }
        }

        println!("\n=== TERMINATORS ===");
        for terminator in &doc.terminators {
            println!("  {} -> {:?}", terminator.state, terminator.output);
        }
    }

    let report = validate_with(&doc, &ValidationOptions { report_unused_actions: true });
    println!(
        "\nValidation: {} fatal, {} warning(s)",
        report.fatal_count(),
        report.warnings().count()
    );
    for violation in &report.violations {
        println!("  [{:?}] {}", violation.severity(), violation);
    }

    Ok(())
}
