// claimstar/src/commands/plan.rs
//
// USE CASE: Show the execution layers.

use comfy_table::{Table, presets::UTF8_FULL};
use claimstar_core::application::registry;
use claimstar_core::domain::graph::GraphSolver;

pub fn execute(select: Vec<String>) -> anyhow::Result<()> {
    let steps = registry();
    let layers = GraphSolver::plan_selection(&steps, &select)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Layer", "Table", "Stage", "Depends on"]);
    for (i, layer) in layers.iter().enumerate() {
        for name in layer {
            let Some(step) = steps.iter().find(|s| s.name == name.as_str()) else {
                continue;
            };
            table.add_row(vec![
                (i + 1).to_string(),
                step.name.to_string(),
                step.stage.to_string(),
                step.dependencies.join(", "),
            ]);
        }
    }
    println!("{table}");
    Ok(())
}
