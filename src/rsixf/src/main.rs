use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use rsixf::output::{CsvSink, InfoSink, JsonSink};
use rsixf::{IxfOptions, IxfParser};

const USAGE: &str = "usage: rsixf [info|convert] [in=<path|->] [out=<path|->] \
[outfmt=csv|json] [lobFolder=<path>] [fromRow=<n>] [maxRows=<n>] [trace=y|n]";

#[derive(Clone, Copy, PartialEq)]
enum Command {
    Info,
    Convert,
}

#[derive(Clone, Copy, PartialEq)]
enum OutputFormat {
    Csv,
    Json,
}

struct Args {
    command: Command,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    format: OutputFormat,
    options: IxfOptions,
    trace: bool,
}

fn parse_args(argv: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut args = Args {
        command: Command::Info,
        input: None,
        output: None,
        format: OutputFormat::Csv,
        options: IxfOptions::default(),
        trace: false,
    };

    for arg in argv {
        if let Some((key, value)) = arg.split_once('=') {
            match key {
                "in" => args.input = (value != "-").then(|| PathBuf::from(value)),
                "out" => args.output = (value != "-").then(|| PathBuf::from(value)),
                "outfmt" => {
                    args.format = match value {
                        "csv" => OutputFormat::Csv,
                        "json" => OutputFormat::Json,
                        other => return Err(format!("unknown output format {:?}", other)),
                    }
                }
                "lobFolder" => args.options.lob_folder = Some(PathBuf::from(value)),
                "fromRow" => {
                    args.options.from_row = value
                        .parse()
                        .map_err(|_| format!("fromRow wants a number, got {:?}", value))?
                }
                "maxRows" => {
                    args.options.max_rows = Some(
                        value
                            .parse()
                            .map_err(|_| format!("maxRows wants a number, got {:?}", value))?,
                    )
                }
                "trace" => args.trace = value == "y",
                other => return Err(format!("unknown option {:?}", other)),
            }
        } else {
            match arg.as_str() {
                "info" => args.command = Command::Info,
                "convert" => args.command = Command::Convert,
                other => return Err(format!("unknown command {:?}", other)),
            }
        }
    }
    Ok(args)
}

fn open_input(args: &Args) -> io::Result<(IxfParser, Box<dyn Read>)> {
    match &args.input {
        Some(path) => {
            let (parser, reader) = IxfParser::open(path, args.options.clone())
                .map_err(|e| io::Error::other(e.to_string()))?;
            Ok((parser, Box::new(reader)))
        }
        None => {
            let mut options = args.options.clone();
            options.lob_folder.get_or_insert_with(|| PathBuf::from("."));
            Ok((IxfParser::new(options), Box::new(io::stdin().lock())))
        }
    }
}

fn open_output(args: &Args) -> io::Result<Box<dyn Write>> {
    match &args.output {
        Some(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args(std::env::args().skip(1)).map_err(|e| format!("{}\n{}", e, USAGE))?;

    env_logger::builder()
        .format_timestamp(None)
        .filter_level(if args.trace {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    let (mut parser, mut input) = open_input(&args)?;
    let mut output = open_output(&args)?;

    match args.command {
        Command::Info => {
            let mut sink = InfoSink::new(&mut output);
            parser.process(&mut input, &mut sink)?;

            writeln!(output, "application records: {}", parser.application_records().len())?;
            for record in parser.application_records() {
                match record.subtype {
                    Some(subtype) => writeln!(output, "  DB2 subtype {}", subtype)?,
                    None => writeln!(output, "  {}", record.application_id)?,
                }
            }
            if parser.unknown_records() > 0 {
                writeln!(output, "unknown records skipped: {}", parser.unknown_records())?;
            }
            output.flush()?;
        }
        Command::Convert => match args.format {
            OutputFormat::Csv => {
                let mut sink = CsvSink::new(output);
                parser.process(&mut input, &mut sink)?;
            }
            OutputFormat::Json => {
                let mut sink = JsonSink::new(output);
                parser.process(&mut input, &mut sink)?;
            }
        },
    }

    log::debug!("emitted {} rows", parser.rows_emitted());
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("rsixf: {}", e);
            ExitCode::FAILURE
        }
    }
}
