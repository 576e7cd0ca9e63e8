//! measr - exact unit arithmetic on the command line
//!
//! Usage:
//!   measr "92-5/8in * 9"            # Single expression
//!   echo "1ft + 6in to cm" | measr  # Pipe mode
//!   measr -f recipe.txt             # File mode
//!   measr -i                        # Interactive REPL
//!   measr --server                  # JSON-RPC 2.0 on stdin/stdout

mod server;

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use measr_core::{Engine, Evaluation, FormatOptions, MeasureError, Outcome};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "measr", version)]
#[command(about = "Exact arithmetic and conversion for measured quantities", long_about = None)]
struct Args {
    /// Expression to evaluate
    expression: Option<String>,

    /// Read expressions from file
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Interactive REPL mode
    #[arg(short, long)]
    interactive: bool,

    /// Serve JSON-RPC 2.0 requests on stdin/stdout
    #[arg(long, conflicts_with_all = ["expression", "file", "interactive"])]
    server: bool,

    /// Print quantity results as JSON objects
    #[arg(long)]
    json: bool,

    /// Show only the result (no input echo)
    #[arg(short, long)]
    quiet: bool,

    /// Show the running total of all quantity results
    #[arg(short, long)]
    total: bool,

    /// Fixed number of decimal places
    #[arg(long, value_name = "PLACES")]
    precision: Option<u32>,

    /// Show customary values as decimals instead of fractions
    #[arg(long)]
    decimal: bool,

    /// Use " and ' for inches and feet
    #[arg(long)]
    symbols: bool,

    /// Put a space between number and unit
    #[arg(long)]
    space: bool,
}

impl Args {
    fn format_options(&self) -> FormatOptions {
        FormatOptions {
            precision: self.precision,
            fractions: !self.decimal,
            symbols: self.symbols,
            space: self.space,
        }
    }
}

/// How results are written to stdout
struct Printer {
    options: FormatOptions,
    quiet: bool,
    json: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let printer = Printer {
        options: args.format_options(),
        quiet: args.quiet,
        json: args.json,
    };

    let mut engine = Engine::new();

    if args.server {
        tracing::info!("serving JSON-RPC on stdin");
        return server::run_server(&mut engine).context("server I/O failed");
    }

    let mut failed = false;
    if let Some(expr) = &args.expression {
        failed = !printer.eval_and_print(&mut engine, expr)?;
    } else if let Some(path) = &args.file {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
        for line in content.lines() {
            printer.eval_and_print(&mut engine, line)?;
        }
    } else if args.interactive {
        run_repl(&mut engine, &printer)?;
    } else if !io::stdin().is_terminal() {
        for line in io::stdin().lock().lines() {
            printer.eval_and_print(&mut engine, &line?)?;
        }
    } else {
        eprintln!("Usage: measr <expression>");
        eprintln!("       measr -f <file>");
        eprintln!("       measr -i");
        eprintln!("       measr --server");
        eprintln!("       echo \"1ft + 6in\" | measr");
        std::process::exit(1);
    }

    if args.total {
        printer.print_total(&engine)?;
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

impl Printer {
    /// Evaluate one line and print it; returns whether it succeeded
    fn eval_and_print(&self, engine: &mut Engine, input: &str) -> Result<bool> {
        if input.trim().is_empty() {
            if !self.quiet && !self.json {
                println!();
            }
            return Ok(true);
        }

        let result = engine.eval(input);
        if self.json {
            println!("{}", serde_json::to_string(&self.json_result(input, &result))?);
            return Ok(result.is_ok());
        }

        let (sign, text) = match &result {
            Ok(eval) if eval.loss.is_some() => ("≈", eval.outcome.render(&self.options)),
            Ok(eval) => ("=", eval.outcome.render(&self.options)),
            Err(err) => ("=", format!("error: {err}")),
        };

        if self.quiet {
            println!("{text}");
        } else {
            let padding = 40usize.saturating_sub(input.chars().count());
            println!("{input}{:>padding$} {sign} {text}", "");
            if let Ok(Evaluation { loss: Some(loss), .. }) = &result {
                println!("{:>40}   ({loss})", "");
            }
        }
        Ok(result.is_ok())
    }

    fn json_result(&self, input: &str, result: &Result<Evaluation, MeasureError>) -> serde_json::Value {
        match result {
            Ok(eval) => {
                let value = match eval.outcome {
                    Outcome::Quantity(q) => serde_json::json!(q.to_dict()),
                    Outcome::Ratio(r) => serde_json::json!(r.to_f64()),
                    Outcome::Scalar(d) => serde_json::json!(d),
                    Outcome::Bool(b) => serde_json::json!(b),
                };
                serde_json::json!({
                    "input": input,
                    "result": value,
                    "display": eval.outcome.render(&self.options),
                    "loss": eval.loss.map(|loss| loss.to_string()),
                })
            }
            Err(err) => serde_json::json!({"input": input, "error": err.to_string()}),
        }
    }

    fn print_total(&self, engine: &Engine) -> Result<()> {
        let total = engine.total();
        if self.json {
            let value = match &total {
                Ok(Some(q)) => serde_json::json!({"total": q.to_dict(), "display": q.format(&self.options)}),
                Ok(None) => serde_json::json!({"total": null}),
                Err(err) => serde_json::json!({"error": err.to_string()}),
            };
            println!("{}", serde_json::to_string(&value)?);
            return Ok(());
        }

        println!("─────────────");
        match total {
            Ok(Some(q)) => println!("Total: {}", q.format(&self.options)),
            Ok(None) => println!("Total: nothing to add"),
            Err(err) => println!("Total: error: {err}"),
        }
        Ok(())
    }
}

fn run_repl(engine: &mut Engine, printer: &Printer) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("measr - exact unit arithmetic");
    println!("Type expressions to evaluate. Press Ctrl+D to exit.\n");

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.to_lowercase().as_str() {
            "quit" | "exit" => break,
            "clear" => {
                engine.clear();
                println!("Cleared.");
                continue;
            }
            "total" | "sum" => {
                printer.print_total(engine)?;
                continue;
            }
            "units" => {
                print_units();
                continue;
            }
            "help" => {
                print_help();
                continue;
            }
            _ => {}
        }

        printer.eval_and_print(engine, line)?;
    }

    Ok(())
}

fn print_units() {
    for unit in measr_core::Unit::all() {
        let def = unit.def();
        println!("  {:<6} {:<12} {:<3} {}", def.suffix, def.family, def.system, def.names.join(", "));
    }
}

fn print_help() {
    println!(
        r#"
Commands:
  help     Show this help
  units    List every unit suffix
  clear    Clear the history
  total    Show the sum of all quantity results
  quit     Exit the REPL

Examples:
  92-5/8in * 9         Exact customary arithmetic
  1/3cup + 1/3cup      Common fractions stay exact
  1ft + 6in to cm      Convert the result
  100g -> oz           Cross-system conversion (rounding is reported)
  0C == 32F            Compare across scales
  1GiB / 1MiB          Same-family ratio
"#
    );
}
