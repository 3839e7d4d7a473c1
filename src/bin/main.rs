use clap::{Parser, Subcommand};
use anyhow::{bail, Context, Result};
use vtrewrite::config::{Config, ViolationPolicy};
use vtrewrite::sim::{apply_stack_op, format_stack, opcode_from_name, parse_into_stack, OperandStack};
use vtrewrite::types::{
    make_dst_descriptor, make_method_descriptor, make_src_descriptor, parse_field, Carrier,
    MethodDescriptorCache, ValueTypeRegistry,
};

#[derive(Parser)]
#[command(name = "vtr")]
#[command(about = "Inspect value-type slot layouts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a field descriptor and show both layouts
    Desc {
        /// Field descriptor, e.g. `[Ldemo/Money;`
        #[arg(value_name = "DESC")]
        desc: String,

        /// Register a value type; append `:narrow` for an int carrier
        #[arg(long = "value-type", value_name = "NAME[:narrow]")]
        value_types: Vec<String>,
    },

    /// Parse a method descriptor and show argument widths
    Method {
        #[arg(value_name = "DESC")]
        desc: String,

        #[arg(long = "value-type", value_name = "NAME[:narrow]")]
        value_types: Vec<String>,
    },

    /// Replay stack operations on a stack given in notation
    Stack {
        /// Bottom-first entries, e.g. "3 2X 1"
        #[arg(value_name = "NOTATION")]
        notation: String,

        /// pop, pop2, dup, dup_x1, dup_x2, dup2, dup2_x1, dup2_x2, swap, trydupx:N
        #[arg(value_name = "OP")]
        ops: Vec<String>,

        /// Keep going after a violation and list it at the end
        #[arg(short, long)]
        record: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    env_logger::Builder::new()
        .filter_level(config.log_level)
        .init();

    match &cli.command {
        Commands::Desc { desc, value_types } => show_field(desc, value_types),
        Commands::Method { desc, value_types } => show_method(desc, value_types, &config),
        Commands::Stack { notation, ops, record } => {
            let config = if *record {
                config.with_violation_policy(ViolationPolicy::Record)
            } else {
                config
            };
            replay_stack(notation, ops, &config)
        }
    }
}

fn registry_from(args: &[String]) -> Result<ValueTypeRegistry> {
    let mut registry = ValueTypeRegistry::new();
    for arg in args {
        let (name, carrier) = match arg.split_once(':') {
            Some((name, "narrow")) => (name, Carrier::Narrow),
            Some((name, "wide")) => (name, Carrier::Wide),
            Some((_, other)) => bail!("unknown carrier '{}' in '{}'", other, arg),
            None => (arg.as_str(), Carrier::Wide),
        };
        registry
            .register(name, carrier)
            .with_context(|| format!("registering value type '{}'", name))?;
    }
    Ok(registry)
}

fn show_field(desc: &str, value_types: &[String]) -> Result<()> {
    let registry = registry_from(value_types)?;
    let ty = parse_field(desc, &registry).with_context(|| format!("parsing '{}'", desc))?;
    println!("type:      {}", ty);
    println!("src:       {} ({} words)", make_src_descriptor(ty), ty.src_width());
    println!("dst:       {} ({} words)", make_dst_descriptor(ty), ty.dst_width());
    Ok(())
}

fn show_method(desc: &str, value_types: &[String], config: &Config) -> Result<()> {
    let registry = registry_from(value_types)?;
    let mut cache = MethodDescriptorCache::new(config);
    let sig = cache.parse(desc, &registry).with_context(|| format!("parsing '{}'", desc))?;

    println!("returns:   {}", sig.ret);
    for (i, arg) in sig.args.iter().enumerate() {
        println!("arg {:<5} {} (src {}, dst {})", i, arg, arg.src_width(), arg.dst_width());
    }
    println!("src words: {}", sig.arg_src_words());
    println!("dst words: {}", sig.arg_dst_words());
    println!("rewritten: {}", make_method_descriptor(sig.ret, &sig.args));
    let stats = cache.finish();
    log::info!("cache: {} hits, {} misses", stats.hits, stats.misses);
    Ok(())
}

fn replay_stack(notation: &str, ops: &[String], config: &Config) -> Result<()> {
    let mut stack = OperandStack::new("cli", config);
    parse_into_stack(notation, &mut stack)?;
    println!("start:     {}", format_stack(&stack));

    for (pc, op) in ops.iter().enumerate() {
        stack.set_offset(pc as u32);
        if let Some(skip) = op.strip_prefix("trydupx:") {
            let skip: usize = skip.parse().with_context(|| format!("bad skip count in '{}'", op))?;
            let done = stack.try_dup_x(skip)?;
            println!("{:<10} {}{}", op, format_stack(&stack), if done { "" } else { "  (refused)" });
            continue;
        }
        let Some(opcode) = opcode_from_name(op) else {
            bail!("unknown operation '{}'", op);
        };
        apply_stack_op(&mut stack, opcode)?;
        println!("{:<10} {}", op, format_stack(&stack));
    }

    println!("depth:     src {}, dst {}", stack.top32_src(), stack.top32_dst());
    let report = stack.finish();
    for violation in &report.violations {
        println!("violation: {}", violation);
    }
    println!("max depth: src {}, dst {}", report.max_src_depth, report.max_dst_depth);
    Ok(())
}
