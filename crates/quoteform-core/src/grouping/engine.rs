use super::outcome::{ItemRole, MachineGroup, MachineGrouping, FALLBACK_MACHINE_NAME};
use super::patterns::{has_non_machine_prefix, matches_common_keyword, matches_machine_keyword};
use crate::model::LineItem;
use crate::parsing::values::parse_price;
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Numeric price of an item: the attached price, else the first number in
/// its selection text, else zero.
pub fn item_price(item: &LineItem) -> Decimal {
    item.price_numeric
        .or_else(|| item.selection_text.as_deref().and_then(parse_price))
        .unwrap_or(Decimal::ZERO)
}

/// Decide the role of a single item.
///
/// A main machine is priced at or above `threshold` or matches a machine
/// keyword, unless its description starts with a non-machine prefix.
/// Common items are only considered for items that are not main machines.
pub fn classify_item(item: &LineItem, threshold: Decimal) -> ItemRole {
    let desc = item.description.as_str();
    if desc.is_empty() {
        return ItemRole::AddOn;
    }

    if !has_non_machine_prefix(desc) && (item_price(item) >= threshold || matches_machine_keyword(desc)) {
        return ItemRole::MainMachine;
    }

    if matches_common_keyword(desc) {
        return ItemRole::CommonItem;
    }

    ItemRole::AddOn
}

/// Partition line items into machines and common items.
///
/// Each main machine opens a group that collects the following add-ons until
/// the next main machine. Add-ons seen before any machine go to the common
/// bucket. When no item is a main machine, everything becomes one
/// "Complete System" group led by the first item.
pub fn group_machines(items: Vec<LineItem>, threshold: Decimal) -> MachineGrouping {
    let mut grouping = MachineGrouping::default();
    let mut current: Option<MachineGroup> = None;

    for mut item in items {
        item.price_numeric = Some(item_price(&item));
        let role = classify_item(&item, threshold);
        debug!(item = item.headline(), ?role, "classified line item");

        match role {
            ItemRole::MainMachine => {
                if let Some(done) = current.take() {
                    grouping.machines.push(done);
                }
                current = Some(MachineGroup {
                    machine_name: item.headline().to_string(),
                    main_item: item,
                    add_ons: Vec::new(),
                });
            }
            ItemRole::CommonItem => grouping.common_items.push(item),
            ItemRole::AddOn => match current.as_mut() {
                Some(machine) => machine.add_ons.push(item),
                None => grouping.common_items.push(item),
            },
        }
    }

    if let Some(done) = current {
        grouping.machines.push(done);
    }

    // No machine opened, so every item sits in the common bucket in input order.
    if grouping.machines.is_empty() && !grouping.common_items.is_empty() {
        let mut everything = std::mem::take(&mut grouping.common_items);
        let main_item = everything.remove(0);
        grouping.machines.push(MachineGroup {
            machine_name: FALLBACK_MACHINE_NAME.to_string(),
            main_item,
            add_ons: everything,
        });
    }

    info!(
        machines = grouping.machines.len(),
        common_items = grouping.common_items.len(),
        "grouped line items"
    );
    grouping
}

/// Text for the options summary field of one machine's form.
pub fn summarize_options(machine: &MachineGroup) -> String {
    let lines: Vec<String> = machine
        .add_ons
        .iter()
        .filter(|a| !a.headline().is_empty())
        .enumerate()
        .map(|(i, addon)| format!("- Add-on {}: {}", i + 1, addon.headline()))
        .collect();

    if lines.is_empty() {
        "No options or specifications selected for this machine.".to_string()
    } else {
        format!("Selected Options and Specifications:\n{}", lines.join("\n"))
    }
}
