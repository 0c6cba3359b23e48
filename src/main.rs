//! Glowstick CLI
//!
//! Inspects the effect: lists its parameters and blend modes, and assembles
//! it on an in-memory graph to print or validate the resulting chain.

use anyhow::{anyhow, bail, Context, Result};
use glowstick::effect::pool::blend_config;
use glowstick::prelude::*;
use log::debug;
use std::path::PathBuf;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let program = program_name(&args);

    let Some(command) = args.get(1) else {
        print_usage(program);
        return;
    };

    let result = match command.as_str() {
        "params" => {
            list_params();
            Ok(())
        }
        "modes" => {
            list_modes();
            Ok(())
        }
        "graph" => GraphOptions::parse(&args[2..]).and_then(|options| show_graph(&options)),
        "validate" => GraphOptions::parse(&args[2..]).and_then(|options| validate(&options)),
        "help" | "--help" | "-h" => {
            print_usage(program);
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            print_usage(program);
            std::process::exit(2);
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

/// Name to show in usage text; argv may be empty.
fn program_name(args: &[String]) -> &str {
    args.first().map_or("glowstick", String::as_str)
}

fn print_usage(program: &str) {
    println!("Glowstick v{}", glowstick::VERSION);
    println!();
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  params             List the effect's parameters");
    println!("  modes              List the blend modes");
    println!("  graph [options]    Assemble the effect and print its chain");
    println!("  validate [options] Assemble the effect and validate its topology");
    println!("  help               Show this help message");
    println!();
    println!("Graph options:");
    println!("  --config <file>     Load a TOML configuration");
    println!("  --set <name=value>  Set a parameter (repeatable, applied in order)");
    println!("  --json              Print a JSON snapshot instead of the chain");
}

fn list_params() {
    println!("Parameters:");
    for param in MetaParams::definitions() {
        println!(
            "  • {} [{}] = {}",
            param.name, param.param_type, param.default_value
        );
        if !param.description.is_empty() {
            println!("    {}", param.description);
        }
        for constraint in &param.constraints {
            println!("    {}", constraint.description());
        }
    }
}

fn list_modes() {
    println!("Blend modes:");
    for mode in BlendMode::ALL {
        let (layer_mode, blend_space) = blend_config(mode);
        let default = if mode == BlendMode::default() { " (default)" } else { "" };
        println!(
            "  {} {:<13} {:<13} layer mode {:>2}, blend space {}{}",
            mode.index(),
            mode.name(),
            mode.display_name(),
            layer_mode,
            blend_space,
            default
        );
    }
}

struct GraphOptions {
    config: GlowstickConfig,
    writes: Vec<(String, Value)>,
    json: bool,
}

impl GraphOptions {
    fn parse(args: &[String]) -> Result<Self> {
        let mut config_path: Option<PathBuf> = None;
        let mut writes = Vec::new();
        let mut json = false;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--config" => {
                    i += 1;
                    let path = args.get(i).ok_or_else(|| anyhow!("--config needs a file"))?;
                    config_path = Some(PathBuf::from(path));
                }
                "--set" => {
                    i += 1;
                    let assignment = args.get(i).ok_or_else(|| anyhow!("--set needs name=value"))?;
                    writes.push(parse_assignment(assignment)?);
                }
                "--json" => json = true,
                other => bail!("Unknown option: {other}"),
            }
            i += 1;
        }

        let config = match &config_path {
            Some(path) => GlowstickConfig::from_path(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => GlowstickConfig::default(),
        };

        Ok(Self {
            config,
            writes,
            json,
        })
    }

    fn build(&self) -> Result<Glowstick> {
        init_logging(&self.config.logging.level);

        let graph = ProcessingGraph::new().with_name("Glow Stick");
        let mut effect = Glowstick::attach_with(graph, self.config.params.clone())?;

        for (name, value) in &self.writes {
            debug!("Setting {name} = {value}");
            effect
                .set_parameter(name, value.clone())
                .with_context(|| format!("setting {name}"))?;
        }

        Ok(effect)
    }
}

fn parse_assignment(assignment: &str) -> Result<(String, Value)> {
    let (name, raw) = assignment
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected name=value, got '{assignment}'"))?;

    let raw = raw.trim();
    let value = if let Ok(i) = raw.parse::<i64>() {
        Value::Integer(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        Value::Float(f)
    } else {
        Value::String(raw.to_string())
    };

    Ok((name.trim().to_string(), value))
}

fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // Keeps the logger already installed, if any
    let _ = env_logger::Builder::from_env(env).try_init();
}

fn show_graph(options: &GraphOptions) -> Result<()> {
    let effect = options.build()?;

    if options.json {
        println!("{}", effect.snapshot().to_json()?);
        return Ok(());
    }

    let graph = effect.runtime();
    let params = effect.params();
    println!("Blend mode: {} ({})", params.blend_mode, params.blend_mode.display_name());
    println!(
        "Bloom: {}, soft glow: {}",
        active_label(effect.bypass().bloom_active),
        active_label(effect.bypass().soft_glow_active)
    );
    println!();
    println!("Chain:");
    for id in effect.chain().nodes() {
        let node = graph.get_node(*id)?;
        let aux = graph
            .source_of(*id, "aux")
            .map(|source| graph.get_node(source).map(|n| n.display_name()))
            .transpose()?;
        match aux {
            Some(source) => println!("  → {} [{}] ← aux: {}", node.display_name(), id, source),
            None => println!("  → {} [{}]", node.display_name(), id),
        }
    }

    Ok(())
}

fn validate(options: &GraphOptions) -> Result<()> {
    let effect = options.build()?;
    let report = effect.validate();

    println!("{}", report.summary());
    for error in &report.errors {
        println!("  ✗ {}", error);
    }
    for warning in &report.warnings {
        println!("  ⚠ {}", warning.message);
    }

    if report.success {
        Ok(())
    } else {
        bail!("{} validation error(s)", report.errors.len())
    }
}

fn active_label(active: bool) -> &'static str {
    if active {
        "active"
    } else {
        "bypassed"
    }
}
