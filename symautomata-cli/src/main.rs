mod automata;
mod binary_op;
mod buchi;
mod equivalence;
mod intersection;
mod transducer;
mod union;

use automata::Format;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "symautomata", about = "Symbolic automata, transducers and sdBA from the command line")]
struct Cli {
    /// Increases log verbosity; repeat for more (-v info, -vv debug, -vvv trace). Overridden by
    /// RUST_LOG if set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Powerset-determinizes a file, partitioning overlapping symbolic guards.
    Determinize {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t)]
        format: Format,
    },
    /// Determinizes, completes and Hopcroft-minimizes a file.
    Minimize {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t)]
        format: Format,
    },
    /// Determinizes, completes and complements a file.
    Complement {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t)]
        format: Format,
    },
    /// Determinizes both inputs and unions them via product construction.
    Union {
        first: PathBuf,
        second: PathBuf,
        #[arg(long, value_enum, default_value_t)]
        format: Format,
        #[arg(long)]
        minimize: bool,
    },
    /// Determinizes both inputs and intersects them via product construction.
    Intersection {
        first: PathBuf,
        second: PathBuf,
        #[arg(long, value_enum, default_value_t)]
        format: Format,
        #[arg(long)]
        minimize: bool,
    },
    /// Checks L(first) subseteq L(second) over the given comma-separated alphabet.
    Inclusion {
        first: PathBuf,
        second: PathBuf,
        #[arg(long)]
        alphabet: String,
        #[arg(long, value_enum, default_value_t)]
        strategy: equivalence::Strategy,
    },
    /// Checks L(first) == L(second) over the given comma-separated alphabet.
    Equivalent {
        first: PathBuf,
        second: PathBuf,
        #[arg(long)]
        alphabet: String,
    },
    /// Checks whether a file accepts every word over the given comma-separated alphabet.
    Universal {
        file: PathBuf,
        #[arg(long)]
        alphabet: String,
    },
    /// Complements a semi-deterministic Büchi automaton via the NCSB construction.
    NcsbComplement {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t)]
        variant: buchi::NcsbVariant,
        /// Comma-separated symbols to resolve the on-the-fly variant's emptiness witness;
        /// ignored by the other variants.
        #[arg(long, default_value = "")]
        alphabet: String,
    },
    /// Builds the generalized Büchi product of two files.
    BuchiIntersect {
        first: PathBuf,
        second: PathBuf,
        #[arg(long)]
        degeneralize: bool,
    },
    /// Composes two transducers (INT files) into one relating the first's input to the second's
    /// output.
    Compose { first: PathBuf, second: PathBuf },
    /// Maps an INFA automaton's language through a transducer's relation.
    Apply {
        transducer: PathBuf,
        input: PathBuf,
    },
    /// Checks whether some run of a transducer relates `--input` to `--output`.
    CheckTranslation {
        transducer: PathBuf,
        #[arg(long)]
        input: String,
        #[arg(long)]
        output: String,
    },
    /// Finds some output word a transducer relates `--input` to, drawing output symbols from
    /// `--alphabet`.
    TranslateWord {
        transducer: PathBuf,
        #[arg(long)]
        input: String,
        #[arg(long)]
        alphabet: String,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// A subcommand's outcome, distinguished from a hard error so exit codes can follow the
/// documented contract: 0 on success, 1 when a requested decision (inclusion, equivalence,
/// universality, a transducer check) does not hold, 2 on input/parse/precondition failure.
enum Outcome {
    Holds(String),
    DoesNotHold(String),
}

fn run(command: &Command) -> Result<Outcome, String> {
    use Outcome::Holds;
    match command {
        Command::Determinize { file, format } => automata::load_file(file, *format)
            .map(binary_op::determinize)
            .map(|a| Holds(a.render()))
            .map_err(|e| e.to_string()),
        Command::Minimize { file, format } => automata::load_file(file, *format)
            .map(binary_op::minimize)
            .map(|a| Holds(a.render()))
            .map_err(|e| e.to_string()),
        Command::Complement { file, format } => automata::load_file(file, *format)
            .map(binary_op::complement)
            .map(|a| Holds(a.render()))
            .map_err(|e| e.to_string()),
        Command::Union {
            first,
            second,
            format,
            minimize,
        } => union::union(first, second, *format, *minimize)
            .map(Holds)
            .map_err(|e| e.to_string()),
        Command::Intersection {
            first,
            second,
            format,
            minimize,
        } => intersection::intersection(first, second, *format, *minimize)
            .map(Holds)
            .map_err(|e| e.to_string()),
        Command::Inclusion {
            first,
            second,
            alphabet,
            strategy,
        } => equivalence::inclusion_check(first, second, alphabet, *strategy)
            .map(|(holds, message)| {
                if holds {
                    Holds(message)
                } else {
                    Outcome::DoesNotHold(message)
                }
            })
            .map_err(|e| e.to_string()),
        Command::Equivalent {
            first,
            second,
            alphabet,
        } => equivalence::equivalence_check(first, second, alphabet)
            .map(|holds| decision(holds, if holds { "equivalent" } else { "not equivalent" }))
            .map_err(|e| e.to_string()),
        Command::Universal { file, alphabet } => equivalence::universal_check(file, alphabet)
            .map(|(holds, message)| {
                if holds {
                    Holds(message)
                } else {
                    Outcome::DoesNotHold(message)
                }
            })
            .map_err(|e| e.to_string()),
        Command::NcsbComplement {
            file,
            variant,
            alphabet,
        } => buchi::ncsb_complement(file, *variant, alphabet)
            .map(Holds)
            .map_err(|e| e.to_string()),
        Command::BuchiIntersect {
            first,
            second,
            degeneralize,
        } => buchi::buchi_intersect(first, second, *degeneralize)
            .map(Holds)
            .map_err(|e| e.to_string()),
        Command::Compose { first, second } => {
            transducer::compose(first, second).map(Holds).map_err(|e| e.to_string())
        }
        Command::Apply { transducer: t, input } => {
            transducer::apply(t, input).map(Holds).map_err(|e| e.to_string())
        }
        Command::CheckTranslation {
            transducer: t,
            input,
            output,
        } => transducer::check_translation(t, input, output)
            .map(|holds| decision(holds, if holds { "translation holds" } else { "no such translation" }))
            .map_err(|e| e.to_string()),
        Command::TranslateWord {
            transducer: t,
            input,
            alphabet,
        } => transducer::translate_word(t, input, alphabet)
            .map(|result| match result {
                Some(word) => Holds(word),
                None => Outcome::DoesNotHold("no translation".to_string()),
            })
            .map_err(|e| e.to_string()),
    }
}

fn decision(holds: bool, message: &str) -> Outcome {
    if holds {
        Outcome::Holds(message.to_string())
    } else {
        Outcome::DoesNotHold(message.to_string())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli.command) {
        Ok(Outcome::Holds(output)) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Ok(Outcome::DoesNotHold(output)) => {
            println!("{output}");
            ExitCode::from(1)
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::from(2)
        }
    }
}
