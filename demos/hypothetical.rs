//! Hypothetical example: previewing a skill point before spending it
//!
//! This example demonstrates:
//! - Building a small stat graph for one character
//! - Incremental updates after a mutation
//! - Answering "what if" questions on a hypothetical copy

use statgraph::*;

fn main() -> Result<(), GraphError> {
    env_logger::init();

    let mut graph = StatGraph::new();

    // Names follow the prefix + entity id + field convention
    let points = NodeName::compose("char_", "mira", "_woodcutting_points");
    let talent = NodeName::compose("char_", "mira", "_woodcutting_talent");
    let skill = NodeName::compose("char_", "mira", "_woodcutting");
    let income = NodeName::from_str("res_wood_income");
    let unlock = NodeName::from_str("perk_lumberjack");

    println!("=== Setting up the graph ===");
    graph.create_independent(points.clone(), 4.0)?;
    graph.create_independent(talent.clone(), 1.5)?;
    graph.create_independent("perk_lumberjack_threshold", 7.0)?;
    graph.create_parameter(skill.clone())?;
    graph.create_formula(income.clone(), Formula::linear(0.5, 1.0))?;
    graph.create_gate(unlock.clone(), 0.0, true)?;

    graph.connect(&points, &skill, LinkKind::Add)?;
    graph.connect(&talent, &skill, LinkKind::Multiply)?;
    graph.connect(&skill, &income, LinkKind::Formula)?;
    graph.connect("perk_lumberjack_threshold", &unlock, LinkKind::GateThreshold)?;
    graph.connect(&skill, &unlock, LinkKind::GateValue)?;

    println!("{}: {:.2}", skill, graph.require_value(&skill)?);
    println!("{}: {:.2}", income, graph.require_value(&income)?);
    println!("{}: {:.2}", unlock, graph.require_value(&unlock)?);

    println!("\n=== What if one more point is spent? ===");
    let (next_skill, next_income, next_unlock) = graph.what_if(|g| -> Result<_, GraphError> {
        g.modify_independent(&points, 1.0)?;
        Ok((
            g.require_value(&skill)?,
            g.require_value(&income)?,
            g.require_value(&unlock)?,
        ))
    })?;
    println!("{}: {:.2}", skill, next_skill);
    println!("{}: {:.2}", income, next_income);
    println!("{}: {:.2}", unlock, next_unlock);

    println!("\n=== Canonical graph is untouched ===");
    println!("{}: {:.2}", skill, graph.require_value(&skill)?);

    println!("\n=== Building bonus: +2 to {} ===", skill);
    graph.modify_parameter_additive(&skill, 2.0)?;
    println!("{}: {:.2}", skill, graph.require_value(&skill)?);
    println!("{}: {:.2}", income, graph.require_value(&income)?);

    println!("\n=== Snapshot ===");
    match graph.snapshot().to_json_pretty() {
        Ok(json) => println!("{}", json),
        Err(err) => println!("snapshot failed: {}", err),
    }

    Ok(())
}
