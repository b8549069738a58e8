//! Digital petri dish: evolves byte-code organisms and inspects them.
//!
//! Runs the evolutionary engine against one of four fitness objectives,
//! then verifies the champion, prints its genome in the base-4 text
//! encoding and writes it to an artifact file.
//!
//! # Usage
//! ```text
//! petri [MODE] [OPTIONS]
//! petri <COMMAND> [ARGS]
//! ```
//!
//! # Modes
//! - `string` (default): Evolve a program that prints the target string
//! - `math`: Evolve a program that doubles R0
//! - `survival`: Evolve a program that prints the target despite corruption
//! - `consciousness`: Evolve a program that computes XOR
//!
//! # Commands
//! - `decode <dna>`: Decode a genome string or artifact file and trace it
//! - `export <name>`: Export a preset warrior (bomber, runner, replicator)
//! - `transpile <file>`: Emit a standalone Rust program for an artifact
//! - `arena [<file> <file>]`: Battle two artifacts, bomber vs runner by default

use petri::arena::Arena;
use petri::codec;
use petri::engine::evolution::Engine;
use petri::engine::fitness::FitnessMode;
use petri::virtual_machine::cell::Cell;
use petri::virtual_machine::isa::OpCode;
use petri::virtual_machine::{disasm, transpile};
use petri::{error, info};
use std::env;
use std::fs;
use std::process;

const DEFAULT_POPULATION: usize = 1000;
const DEFAULT_DNA_LENGTH: usize = 32;
const SURVIVAL_DNA_LENGTH: usize = 128;
const DEFAULT_GENERATIONS: u32 = 5000;
const DEFAULT_TARGET: &str = "Hi";
const DEFAULT_ARTIFACT: &str = "artifact.dna";
const ARENA_CYCLES: u32 = 5000;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h") {
        print_usage(&args[0]);
        process::exit(0);
    }

    match args.get(1).map(String::as_str) {
        Some("decode") => run_decode(&args),
        Some("export") => run_export(&args),
        Some("transpile") => run_transpile(&args),
        Some("arena") => run_arena(&args),
        _ => run_evolution(&args),
    }
}

/// Evolves a population, verifies the champion and writes the artifact.
fn run_evolution(args: &[String]) {
    let mut mode = FitnessMode::String;
    let mut target = DEFAULT_TARGET.to_string();
    let mut population = DEFAULT_POPULATION;
    let mut dna_length: Option<usize> = None;
    let mut generations = DEFAULT_GENERATIONS;
    let mut seed: Option<u64> = None;
    let mut artifact = DEFAULT_ARTIFACT.to_string();

    let mut i = 1;
    if let Some(arg) = args.get(1) {
        if !arg.starts_with("--") {
            mode = match FitnessMode::from_arg(arg) {
                Some(mode) => mode,
                None => {
                    eprintln!("Unknown mode: {}\n", arg);
                    print_usage(&args[0]);
                    process::exit(1);
                }
            };
            i = 2;
        }
    }

    while i < args.len() {
        match args[i].as_str() {
            "--target" => {
                target = required_value(args, &mut i, "--target").to_string();
            }
            "--population" => {
                population = parse_value(args, &mut i, "--population");
            }
            "--dna" => {
                dna_length = Some(parse_value(args, &mut i, "--dna"));
            }
            "--generations" => {
                generations = parse_value(args, &mut i, "--generations");
            }
            "--seed" => {
                seed = Some(parse_value(args, &mut i, "--seed"));
            }
            "--output" => {
                artifact = required_value(args, &mut i, "--output").to_string();
            }
            other => {
                eprintln!("Unexpected argument: {}\n", other);
                print_usage(&args[0]);
                process::exit(1);
            }
        }
    }

    // Survival needs slack in the genome so corruption can miss the
    // working code; the other modes get a tight default.
    let dna_length = dna_length.unwrap_or(match mode {
        FitnessMode::Survival => SURVIVAL_DNA_LENGTH,
        _ => DEFAULT_DNA_LENGTH,
    });

    if population == 0 {
        eprintln!("--population must be at least 1");
        process::exit(1);
    }
    if dna_length == 0 {
        eprintln!("--dna must be at least 1");
        process::exit(1);
    }

    info!(
        "evolving {population} organisms of {dna_length} bytes for up to {generations} generations ({mode:?})"
    );

    let mut engine = Engine::new(population, dna_length, mode, seed);
    engine.set_target(&target);
    engine.evolve(generations);

    let best = engine.best();
    info!("champion fitness: {}", best.fitness);

    verify(mode, &target, &best.dna);

    let dna = codec::encode(&best.dna);
    println!("\nGenome:\n{dna}");
    if let Err(e) = fs::write(&artifact, &dna) {
        error!("failed to write {artifact}: {e}");
        process::exit(1);
    }
    info!("artifact written to {artifact}");
}

/// Replays the champion outside the engine so the user can see what the
/// fitness number actually bought.
fn verify(mode: FitnessMode, target: &str, dna: &[u8]) {
    match mode {
        FitnessMode::Math => {
            println!("\nVerification (doubling):");
            let mut cell = Cell::new();
            for input in 1..=5u8 {
                cell.reset();
                let _ = cell.load_program(dna);
                cell.set_register(0, input);
                cell.run();
                println!("  f({input}) = {}", cell.register(0));
            }
        }
        FitnessMode::Consciousness => {
            println!("\nVerification (XOR truth table):");
            let mut cell = Cell::new();
            for (a, b) in [(0u8, 0u8), (0, 1), (1, 0), (1, 1)] {
                cell.reset();
                let _ = cell.load_program(dna);
                cell.set_register(0, a);
                cell.set_register(1, b);
                cell.run();
                println!(
                    "  {a} xor {b} = {} ({} cycles)",
                    cell.register(0),
                    cell.cycle_count()
                );
            }
        }
        _ => {
            let mut cell = Cell::new();
            let _ = cell.load_program(dna);
            cell.run();
            println!("\nVerification (target {target:?}):");
            println!("  output: {:?}", cell.output_string());
        }
    }
}

/// Decodes a genome given as a literal string or an artifact path, then
/// prints the raw bytes and a per-byte trace.
fn run_decode(args: &[String]) {
    let input = match args.get(2) {
        Some(input) => input,
        None => {
            eprintln!("decode requires a genome string or artifact file\n");
            print_usage(&args[0]);
            process::exit(1);
        }
    };
    let dna = fs::read_to_string(input).unwrap_or_else(|_| input.clone());
    let bytecode = codec::decode(dna.trim());

    println!("Decoded {} bytes:", bytecode.len());
    for chunk in bytecode.chunks(16) {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02X}")).collect();
        println!("  {}", hex.join(" "));
    }
    println!("\nTrace:\n{}", disasm::trace(&bytecode));
}

/// Prints a handwritten warrior genome and writes it to an artifact file.
fn run_export(args: &[String]) {
    let name = args.get(2).map(String::as_str).unwrap_or("");
    let bytecode = match preset(name) {
        Some(bytecode) => bytecode,
        None => {
            eprintln!("Unknown preset: {:?} (try bomber, runner, replicator)", name);
            process::exit(1);
        }
    };

    let dna = codec::encode(&bytecode);
    let artifact = format!("{name}.dna");
    println!("{dna}");
    if let Err(e) = fs::write(&artifact, &dna) {
        error!("failed to write {artifact}: {e}");
        process::exit(1);
    }
    info!("artifact written to {artifact}");
}

/// Handwritten warriors for the arena.
fn preset(name: &str) -> Option<Vec<u8>> {
    const LDI: u8 = OpCode::Ldi as u8;
    const ST: u8 = OpCode::St as u8;
    const LD: u8 = OpCode::Ld as u8;
    const INC: u8 = OpCode::Inc as u8;
    const JMP: u8 = OpCode::Jmp as u8;

    match name {
        // Marches a pointer through memory, stomping every address.
        "bomber" => Some(vec![
            LDI, 0, 0, //
            LDI, 1, 20, //
            ST, 1, 0, //
            INC, 1, //
            JMP, 6,
        ]),
        // Does nothing but is hard to hit: a one-instruction loop.
        "runner" => Some(vec![JMP, 0]),
        // Copies its own image forward byte by byte.
        "replicator" => Some(vec![
            LDI, 0, 0, //
            LDI, 1, 64, //
            LD, 3, 0, //
            ST, 1, 3, //
            INC, 0, //
            INC, 1, //
            JMP, 6,
        ]),
        _ => None,
    }
}

/// Decodes an artifact and prints an equivalent standalone Rust program.
fn run_transpile(args: &[String]) {
    let path = match args.get(2) {
        Some(path) => path,
        None => {
            eprintln!("transpile requires an artifact file\n");
            print_usage(&args[0]);
            process::exit(1);
        }
    };
    let dna = match fs::read_to_string(path) {
        Ok(dna) => dna,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path, e);
            process::exit(1);
        }
    };
    let bytecode = codec::decode(dna.trim());
    println!("{}", transpile::to_rust_source(&bytecode));
}

/// Loads two artifacts into the shared-memory arena and runs the battle.
/// Without arguments the canned bomber fights the canned runner.
fn run_arena(args: &[String]) {
    let warriors = match (args.get(2), args.get(3)) {
        (Some(path1), Some(path2)) => {
            let mut warriors = Vec::with_capacity(2);
            for path in [path1, path2] {
                match fs::read_to_string(path) {
                    Ok(dna) => warriors.push(codec::decode(dna.trim())),
                    Err(e) => {
                        eprintln!("Failed to read {}: {}", path, e);
                        process::exit(1);
                    }
                }
            }
            warriors
        }
        (None, None) => {
            info!("no artifacts given, running bomber vs runner");
            vec![
                preset("bomber").unwrap_or_default(),
                preset("runner").unwrap_or_default(),
            ]
        }
        _ => {
            eprintln!("arena takes zero or two artifact files\n");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let mut arena = Arena::new();
    arena.load_warriors(&warriors[0], &warriors[1]);
    arena.run_battle(ARENA_CYCLES);
}

const USAGE: &str = "\
Digital Petri Dish

USAGE:
    {program} [MODE] [OPTIONS]
    {program} <COMMAND> [ARGS]

MODES:
    string           Evolve a program that prints the target (default)
    math             Evolve a program that doubles R0
    survival         Evolve a program that survives memory corruption
    consciousness    Evolve a program that computes XOR

OPTIONS:
    --target <s>         Target string for string/survival modes (default: Hi)
    --population <n>     Population size (default: 1000)
    --dna <n>            Genome length in bytes (default: 32, survival: 128)
    --generations <n>    Generation budget (default: 5000)
    --seed <n>           Seed the random generator for a reproducible run
    --output <file>      Artifact path (default: artifact.dna)
    -h, --help           Print this help message

COMMANDS:
    decode <dna>         Decode a genome string or artifact file and trace it
    export <name>        Export a preset warrior: bomber, runner, replicator
    transpile <file>     Emit a standalone Rust program for an artifact
    arena [<f1> <f2>]    Battle two artifacts (default: bomber vs runner)

EXAMPLES:
    # Evolve a greeter
    {program} string --target Hi

    # Reproducible XOR run
    {program} consciousness --seed 42

    # Battle two exported warriors
    {program} export bomber
    {program} export replicator
    {program} arena bomber.dna replicator.dna
";

/// Prints usage information to stderr.
fn print_usage(program: &str) {
    eprintln!("{}", USAGE.replace("{program}", program));
}

/// Returns the value following a flag, or exits with a diagnostic.
fn required_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> &'a str {
    *i += 1;
    if *i >= args.len() {
        eprintln!("{} requires an argument", flag);
        process::exit(1);
    }
    let value = &args[*i];
    *i += 1;
    value
}

/// Parses the value following a flag as a number, or exits with a diagnostic.
fn parse_value<T: std::str::FromStr>(args: &[String], i: &mut usize, flag: &str) -> T {
    let value = required_value(args, i, flag);
    match value.parse() {
        Ok(parsed) => parsed,
        Err(_) => {
            eprintln!("Invalid value for {}: {}", flag, value);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_battle_presets_exist() {
        // The no-argument arena falls back to these two warriors.
        assert!(preset("bomber").is_some());
        assert!(preset("runner").is_some());
        assert!(preset("replicator").is_some());
        assert!(preset("nuke").is_none());
    }

    #[test]
    fn presets_load_into_the_arena() {
        let mut arena = Arena::new();
        let bomber = preset("bomber").unwrap();
        let runner = preset("runner").unwrap();
        arena.load_warriors(&bomber, &runner);
        assert_eq!(arena.pointers(), (0, 0));
    }
}
