use std::env;
use std::process;

use sql_pattern_nfa::{compile, Dialect, Matcher};

fn print_usage() {
    eprintln!(
        "\
Usage: sql_pattern_nfa <COMMAND>

Commands:
  match <like|similar> <pattern> <input>...   Match inputs against a pattern
  dump  <like|similar> <pattern>              Print the compiled automaton

Options:
  -h, --help   Print this help message

Set RUST_LOG=debug for compilation diagnostics."
    );
}

fn parse_dialect(arg: &str) -> Option<Dialect> {
    match arg {
        "like" => Some(Dialect::Like),
        "similar" => Some(Dialect::SimilarTo),
        _ => None,
    }
}

enum Command {
    Match {
        dialect: Dialect,
        pattern: String,
        inputs: Vec<String>,
    },
    Dump {
        dialect: Dialect,
        pattern: String,
    },
}

fn parse_args(mut args: Vec<String>) -> Result<Command, String> {
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        process::exit(0);
    }
    if args.is_empty() {
        return Err("missing command".to_string());
    }
    let command = args.remove(0);
    match command.as_str() {
        "match" => {
            if args.len() < 3 {
                return Err("match requires a dialect, a pattern and at least one input".into());
            }
            let dialect = parse_dialect(&args[0])
                .ok_or_else(|| format!("unknown dialect: {}", args[0]))?;
            let pattern = args[1].clone();
            let inputs = args[2..].to_vec();
            Ok(Command::Match {
                dialect,
                pattern,
                inputs,
            })
        }
        "dump" => {
            if args.len() != 2 {
                return Err("dump requires a dialect and a pattern".into());
            }
            let dialect = parse_dialect(&args[0])
                .ok_or_else(|| format!("unknown dialect: {}", args[0]))?;
            Ok(Command::Dump {
                dialect,
                pattern: args[1].clone(),
            })
        }
        other => Err(format!("unknown command: {other}")),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = parse_args(args).unwrap_or_else(|e| {
        eprintln!("error: {e}\n");
        print_usage();
        process::exit(2);
    });

    match command {
        Command::Match {
            dialect,
            pattern,
            inputs,
        } => {
            let matcher = Matcher::compile(dialect, &pattern).unwrap_or_else(|e| {
                eprintln!("error: failed to compile pattern: {e}");
                process::exit(1);
            });
            for input in inputs {
                let verdict = if matcher.is_match(&input) {
                    "match"
                } else {
                    "no match"
                };
                println!("{input}: {verdict}");
            }
        }
        Command::Dump { dialect, pattern } => {
            let automaton = compile(dialect, &pattern).unwrap_or_else(|e| {
                eprintln!("error: failed to compile pattern: {e}");
                process::exit(1);
            });
            println!("start state: {}", automaton.start());
            println!("accepting state: {}", automaton.end());
            println!("state count: {}", automaton.nfa().state_count());
            println!("{:#?}", automaton.nfa());
        }
    }
}
