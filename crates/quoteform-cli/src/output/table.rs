use quoteform_core::error::Warning;
use quoteform_core::grouping::{item_price, summarize_options, MachineGrouping};
use quoteform_core::hierarchy::FieldLayout;
use quoteform_core::model::LineItem;
use quoteform_core::reconcile::ChangeSet;
use rust_decimal::Decimal;

pub fn print_items(items: &[LineItem], warnings: &[Warning]) {
    if items.is_empty() {
        println!("No selected line items found.");
    } else {
        let max_desc = items
            .iter()
            .map(|i| i.headline().chars().count())
            .max()
            .unwrap_or(11)
            .max(11);

        println!("  {:<width$}  {:>8}  Selection", "Description", "Qty", width = max_desc);
        for item in items {
            println!(
                "  {:<width$}  {:>8}  {}",
                item.headline(),
                item.quantity_text.as_deref().unwrap_or("-"),
                item.selection_text.as_deref().unwrap_or("-"),
                width = max_desc
            );
            for line in item.description.lines().skip(1) {
                println!("    {}", line.trim());
            }
        }
        println!("\n  {} item(s)", items.len());
    }

    print_warnings(warnings);
}

pub fn print_machines(grouping: &MachineGrouping, threshold: Decimal) {
    println!("Main machine threshold: {threshold}\n");

    for (i, machine) in grouping.machines.iter().enumerate() {
        println!("=== Machine {}: {} ===\n", i + 1, machine.machine_name);
        println!(
            "  Main item: {} ({})",
            machine.main_item.headline(),
            item_price(&machine.main_item)
        );
        if machine.add_ons.is_empty() {
            println!("  No add-ons");
        } else {
            println!("  Add-ons:");
            for addon in &machine.add_ons {
                println!("    {} ({})", addon.headline(), item_price(addon));
            }
        }
        println!();
        for line in summarize_options(machine).lines() {
            println!("  | {line}");
        }
        println!();
    }

    if !grouping.common_items.is_empty() {
        println!("=== Common items ===\n");
        for item in &grouping.common_items {
            println!("  {} ({})", item.headline(), item_price(item));
        }
        println!();
    }
}

pub fn print_layout(layout: &FieldLayout) {
    for section in &layout.sections {
        println!("=== {} ===", section.name);
        for subsection in &section.subsections {
            let indent = match &subsection.name {
                Some(name) => {
                    println!("  --- {name} ---");
                    "    "
                }
                None => "  ",
            };
            for field in &subsection.fields {
                let kind = if field.is_boolean { "[x]" } else { "   " };
                let flag = if field.suspicious { "  (?)" } else { "" };
                println!("{indent}{kind} {} = {}{flag}", field.label, field.value);
            }
        }
        println!();
    }

    print_warnings(&layout.warnings);
}

pub fn print_changes(changes: &ChangeSet) {
    if changes.is_empty() {
        println!("No changes.");
        return;
    }

    let max_key = changes.keys().map(|k| k.len()).max().unwrap_or(5);
    for (key, change) in changes {
        println!(
            "  {:<width$}  '{}' -> '{}'",
            key,
            change.original_value,
            change.new_value,
            width = max_key
        );
    }
    println!("\n  {} field(s) changed", changes.len());
}

fn print_warnings(warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }
    eprintln!();
    for w in warnings {
        eprintln!("  warning: {w}");
    }
}
