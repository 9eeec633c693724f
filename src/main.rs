use clap::{ArgAction, Parser, ValueEnum};
use pinata::{Navigator, Node, Selector};
use serde_json::Value;
use std::io::Read;
use std::process::ExitCode;
use tracing::{debug, Level};

/// Extract one typed value from a JSON document.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON document (string), or `-` to read it from stdin.
    json: String,
    /// Keys and indices to follow, e.g. `people[0].name`
    selector: String,
    /// How to read the selected value
    #[arg(long = "as", value_enum, default_value_t = Extract::Node)]
    extract: Extract,
    /// Print navigation errors as JSON reports
    #[arg(long)]
    json_errors: bool,
    /// Log verbosity on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Extract {
    Node,
    String,
    Float,
    Bool,
    Nil,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_document(arg: &str) -> Result<Value, String> {
    let text = if arg == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Cannot read stdin: {e}"))?;
        buf
    } else {
        arg.to_string()
    };
    serde_json::from_str(&text).map_err(|e| format!("Invalid JSON: {e}"))
}

fn main() -> ExitCode {
    // Parse CLI arguments.
    let args = Args::parse();
    init_logging(args.verbose);

    let data = match read_document(&args.json) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };
    let selector: Selector = match args.selector.parse() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Invalid selector: {e}");
            return ExitCode::from(2);
        }
    };
    debug!(selector = %selector, extract = ?args.extract, "navigating");

    let mut nav = Navigator::new();
    let node = selector.walk(&mut nav, &Node::new(&data));
    let out = match args.extract {
        Extract::Node => node.raw_value().clone(),
        Extract::String => Value::from(nav.as_string(&node)),
        Extract::Float => Value::from(nav.as_float(&node)),
        Extract::Bool => Value::from(nav.as_bool(&node)),
        Extract::Nil => {
            nav.assert_nil(&node);
            Value::Null
        }
    };

    if let Some(err) = nav.clear_error() {
        if args.json_errors {
            match serde_json::to_string_pretty(&err.report()) {
                Ok(s) => eprintln!("{s}"),
                Err(_) => eprintln!("{err}"),
            }
        } else {
            eprintln!("{err}");
        }
        return ExitCode::from(1);
    }

    // Output result.
    match out {
        Value::String(s) => println!("{s}"),
        other => match serde_json::to_string_pretty(&other) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Cannot render result: {e}");
                return ExitCode::from(2);
            }
        },
    }
    ExitCode::SUCCESS
}
