use dreamchaser::{
    assembler::{assemble_with_logger, AssemblyErrors},
    bytecode::{self, Program},
    emulator::{Emulator, ExecutionError},
    loader::LoadError,
    memory::{FixedMemory, MemoryError, DEFAULT_MEMORY_SIZE},
};

use clap::{App, Arg, ArgMatches};
use slog::{o, Discard, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

enum Error {
    Arguments(String),
    Assembly(AssemblyErrors),
    Parse(String),
    Load(LoadError<MemoryError>),
    Execution(ExecutionError<MemoryError>),
    IO(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::IO(e)
    }
}

impl From<AssemblyErrors> for Error {
    fn from(e: AssemblyErrors) -> Error {
        Error::Assembly(e)
    }
}

impl From<LoadError<MemoryError>> for Error {
    fn from(e: LoadError<MemoryError>) -> Error {
        Error::Load(e)
    }
}

impl From<ExecutionError<MemoryError>> for Error {
    fn from(e: ExecutionError<MemoryError>) -> Error {
        Error::Execution(e)
    }
}

struct Options<'a> {
    source: &'a str,
    base: usize,
    entry: usize,
    memory_size: usize,
    max_cycles: u64,
    dump: (usize, usize),
    emit: bool,
    verbose: bool,
}

fn parse_arguments() -> ArgMatches<'static> {
    App::new("dreamchaser-run")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Utility for assembling and executing DREAMCHASER programs")
        .arg(Arg::with_name("source")
             .help("File containing assembly source, or bit strings if it ends in .bin")
             .value_name("SOURCE")
             .required(true)
             .index(1))
        .arg(Arg::with_name("base")
             .help("Address the program is loaded at")
             .long("base")
             .value_name("ADDRESS")
             .default_value("0"))
        .arg(Arg::with_name("entry")
             .help("Address the execution starts from [default: the base address]")
             .long("entry")
             .value_name("ADDRESS"))
        .arg(Arg::with_name("memory-size")
             .help("Number of words in the memory")
             .long("memory-size")
             .value_name("WORDS"))
        .arg(Arg::with_name("max-cycles")
             .help("Number of instructions executed before giving up")
             .long("max-cycles")
             .value_name("CYCLES")
             .default_value("1000000"))
        .arg(Arg::with_name("dump")
             .help("Memory window printed after the execution [default: BASE:16]")
             .long("dump")
             .value_name("START:LEN"))
        .arg(Arg::with_name("emit")
             .help("Print the assembled program as bit strings instead of running it")
             .long("emit"))
        .arg(Arg::with_name("verbose")
             .help("Log every executed instruction to the terminal")
             .short("v")
             .long("verbose"))
        .get_matches()
}

fn number<T: std::str::FromStr>(args: &ArgMatches, name: &str) -> Result<Option<T>, Error> {
    match args.value_of(name) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| Error::Arguments(format!("invalid value '{}' for --{}", value, name))),
    }
}

fn options<'a>(args: &'a ArgMatches) -> Result<Options<'a>, Error> {
    let base: usize = number(args, "base")?.unwrap_or(0);

    let dump = match args.value_of("dump") {
        None => (base, 16),
        Some(window) => {
            let mut parts = window.splitn(2, ':').map(str::parse::<usize>);

            match (parts.next(), parts.next()) {
                (Some(Ok(start)), Some(Ok(len))) => (start, len),
                _ => return Err(Error::Arguments(format!("invalid memory window '{}'", window))),
            }
        }
    };

    Ok(Options {
        source: args.value_of("source").unwrap_or_default(),
        base,
        entry: number(args, "entry")?.unwrap_or(base),
        memory_size: number(args, "memory-size")?.unwrap_or(DEFAULT_MEMORY_SIZE),
        max_cycles: number(args, "max-cycles")?.unwrap_or(1_000_000),
        dump,
        emit: args.is_present("emit"),
        verbose: args.is_present("verbose"),
    })
}

fn main() {
    let args = parse_arguments();

    let result = options(&args).and_then(|options| run(&options));

    let message = match result {
        Ok(()) => return,
        Err(Error::Arguments(msg)) => msg,
        Err(Error::IO(io)) => format!("IO error: {}", io),
        Err(Error::Parse(err)) => format!("Parse error {}", err),
        Err(Error::Assembly(err)) => format!("Assembly errors:\n{}", err),
        Err(Error::Load(err)) => format!("Load error: {}", err),
        Err(Error::Execution(err)) => format!("Execution error: {}", err),
    };

    eprintln!("{}", message);
    std::process::exit(1);
}

fn run(options: &Options) -> Result<(), Error> {
    let logger = if options.verbose {
        let decorator = TermDecorator::new().build();
        let drain = FullFormat::new(decorator).build().fuse();
        let drain = slog_async::Async::new(drain).build().fuse();
        Logger::root(drain, o!())
    } else {
        Logger::root(Discard, o!())
    };

    let file = std::fs::read_to_string(options.source)?;

    let program = if options.source.ends_with(".bin") {
        Program::parse(&file).map_err(|err: bytecode::ParseError| {
            Error::Parse(err.verbose(&file).to_string())
        })?
    } else {
        assemble_with_logger(&file, logger.clone())?
    };

    if options.emit {
        print!("{}", program);
        return Ok(());
    }

    let mut emulator = Emulator::with_logger(FixedMemory::new(options.memory_size), logger);
    emulator.set_cycle_limit(Some(options.max_cycles));

    emulator.load(&program, options.base)?;

    let result = emulator.run(options.entry);

    let (start, len) = options.dump;
    match emulator.dump(start, len) {
        Ok(dump) => print!("{}", dump),
        Err(err) => eprintln!("Could not dump the memory: {}", err),
    }

    for fault in &emulator.faults {
        eprintln!("Fault {}", fault);
    }

    result?;

    Ok(())
}
