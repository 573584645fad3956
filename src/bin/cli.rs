//! xbdm CLI Client
//!
//! Command-line interface for talking to a debug target.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use xbdm_rpc::{Argument, CallOptions, Config, ReturnKind, ReturnValue, Session, ThreadType};

/// xbdm CLI
#[derive(Parser, Debug)]
#[command(name = "xbdm-cli")]
#[command(about = "Talk to an XBDM debug target")]
#[command(version)]
struct Args {
    /// Console host name or IP address
    #[arg(short, long, default_value = "127.0.0.1")]
    console: String,

    /// Debug monitor port
    #[arg(short, long, default_value_t = xbdm_rpc::DEFAULT_PORT)]
    port: u16,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a raw command line and print the response
    Exec {
        /// The command line
        line: String,
    },

    /// Dump target memory as hex
    Getmem {
        /// Start address (hex with 0x, or decimal)
        #[arg(value_parser = parse_u32)]
        address: u32,

        /// Number of bytes
        length: u32,
    },

    /// Write hex bytes to target memory
    Setmem {
        #[arg(value_parser = parse_u32)]
        address: u32,

        /// Bytes as hex, e.g. 60000000
        data: String,
    },

    /// Look up a module export
    Resolve {
        module: String,
        ordinal: u32,
    },

    /// Invoke a remote function
    Call {
        /// Function address
        #[arg(short, long, value_parser = parse_u32, conflicts_with = "module")]
        address: Option<u32>,

        /// Module exporting the function
        #[arg(short, long, requires = "ordinal")]
        module: Option<String>,

        /// Export ordinal within the module
        #[arg(short, long)]
        ordinal: Option<u32>,

        /// Declared return kind
        #[arg(short, long, default_value = "uint64")]
        returns: ReturnKind,

        /// Element count for array return kinds
        #[arg(long, default_value_t = 0)]
        array_size: u32,

        /// Expand array arguments into scalars
        #[arg(long)]
        vm: bool,

        /// Run on a title thread instead of a system thread
        #[arg(long)]
        title: bool,

        /// Arguments as <type>:<value>, e.g. int:5 str:hello floats:1.5,2
        args: Vec<String>,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,xbdm_rpc=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::builder()
        .host(&args.console)
        .port(args.port)
        .build();
    let session = Session::new(config)?;

    tracing::debug!("xbdm-cli v{} -> {}:{}", xbdm_rpc::VERSION, args.console, args.port);

    match args.command {
        Commands::Exec { line } => println!("{}", session.exec(&line)?),
        Commands::Getmem { address, length } => {
            let data = session.read_memory(address, length)?;
            println!("{}", hex::encode_upper(data));
        }
        Commands::Setmem { address, data } => {
            let bytes = hex::decode(data.trim())?;
            let n = session.write_memory(address, &bytes)?;
            println!("wrote {} bytes", n);
        }
        Commands::Resolve { module, ordinal } => {
            println!("0x{:08X}", session.resolve_function(&module, ordinal)?);
        }
        Commands::Call {
            address,
            module,
            ordinal,
            returns,
            array_size,
            vm,
            title,
            args: raw_args,
        } => {
            let mut options = match (address, module, ordinal) {
                (Some(address), None, _) => CallOptions::address(address),
                (None, Some(module), Some(ordinal)) => CallOptions::ordinal(module, ordinal),
                _ => return Err("call needs --address or --module with --ordinal".into()),
            };
            if returns.is_array() && array_size == 0 {
                tracing::warn!("{} result with --array-size 0 accepts only an empty list", returns);
            }
            options = options.returns_array(returns, array_size);
            if vm {
                options = options.vm();
            }
            if title {
                options = options.thread(ThreadType::Title);
            }

            let call_args = raw_args
                .iter()
                .map(|a| parse_argument(a))
                .collect::<Result<Vec<_>, _>>()?;

            print_value(&session.call(&options, &call_args)?);
        }
    }

    Ok(())
}

fn print_value(value: &ReturnValue) {
    match value {
        ReturnValue::Void => {}
        ReturnValue::Int(v) => println!("0x{:08X} ({})", *v as u32, v),
        ReturnValue::UInt64(v) => println!("0x{:016X} ({})", v, v),
        ReturnValue::Byte(v) => println!("0x{:02X}", v),
        ReturnValue::Float(v) => println!("{}", v),
        ReturnValue::String(s) => println!("{}", s),
        ReturnValue::ByteArray(v) => println!("{}", hex::encode_upper(v)),
        ReturnValue::IntArray(v) => println!("{:?}", v),
        ReturnValue::FloatArray(v) => println!("{:?}", v),
        ReturnValue::UInt64Array(v) => println!("{:?}", v),
    }
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(digits) => u32::from_str_radix(digits, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("bad number {:?}: {}", s, e))
}

/// Parse `<type>:<value>` into an argument
fn parse_argument(raw: &str) -> Result<Argument, String> {
    let (ty, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("argument {:?} is not <type>:<value>", raw))?;

    fn list<T: std::str::FromStr>(value: &str) -> Result<Vec<T>, T::Err> {
        value.split(',').map(|v| v.trim().parse()).collect()
    }

    let arg = match ty {
        "int" => Argument::Int(value.parse().map_err(|e| bad(ty, value, e))?),
        "uint" | "ptr" => Argument::from(parse_u32(value)?),
        "long" => Argument::Long(value.parse().map_err(|e| bad(ty, value, e))?),
        "u64" => Argument::UInt64(value.parse().map_err(|e| bad(ty, value, e))?),
        "bool" => Argument::Bool(value.parse().map_err(|e| bad(ty, value, e))?),
        "byte" => Argument::Byte(value.parse().map_err(|e| bad(ty, value, e))?),
        "short" => Argument::Short(value.parse().map_err(|e| bad(ty, value, e))?),
        "float" => Argument::Float(value.parse().map_err(|e| bad(ty, value, e))?),
        "double" => Argument::Double(value.parse().map_err(|e| bad(ty, value, e))?),
        "str" => Argument::Str(value.to_string()),
        "bytes" => Argument::Bytes(hex::decode(value).map_err(|e| bad(ty, value, e))?),
        "ints" => Argument::IntArray(list(value).map_err(|e| bad(ty, value, e))?),
        "longs" => Argument::LongArray(list(value).map_err(|e| bad(ty, value, e))?),
        "floats" => Argument::FloatArray(list(value).map_err(|e| bad(ty, value, e))?),
        other => return Err(format!("unknown argument type {:?}", other)),
    };
    Ok(arg)
}

fn bad(ty: &str, value: &str, e: impl std::fmt::Display) -> String {
    format!("bad {} argument {:?}: {}", ty, value, e)
}
