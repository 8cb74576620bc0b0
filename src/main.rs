use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use secucode_puf::code::constants::{FIELD_DEGREE, GENERATOR, LENGTH, PRIMITIVE_POLY};
use secucode_puf::{
    expand_response, BlockStatus, CyclotomicCosets, GaloisField, GeneratorPolynomial, Key,
    KeyAssembler,
};

#[derive(Parser, Debug)]
#[command(name = "secucode-puf", about = "BCH fuzzy extractor tooling for PUF key derivation")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize a BCH generator polynomial from cyclotomic cosets.
    Generator {
        /// Code length n (2^(m-1) <= n <= 2^m - 1).
        #[arg(long, default_value_t = LENGTH)]
        length: usize,
        /// Error-correcting capability t.
        #[arg(short = 't', long = "capability", default_value_t = 3)]
        capability: usize,
        /// Primitive polynomial as 0b..., 0x... or decimal.
        #[arg(long, default_value_t = format!("{PRIMITIVE_POLY:#b}"))]
        poly: String,
        /// Field degree m.
        #[arg(long, default_value_t = FIELD_DEGREE)]
        degree: u32,
    },
    /// Enroll a packed 32-byte response and print its helper data.
    Enroll {
        /// Packed response as hex; whitespace between bytes is ignored.
        #[arg(long)]
        response: String,
        /// Print the key itself instead of only its fingerprint.
        #[arg(long)]
        reveal_key: bool,
    },
    /// Rebuild a key from helper data and a fresh reading.
    #[command(group(ArgGroup::new("reading").required(true).args(["record", "response"])))]
    Reconstruct {
        /// Stored helper data as hex (16 bytes).
        #[arg(long)]
        helper: String,
        /// Raw enrollment record file, one bit per byte (256 bytes).
        #[arg(long)]
        record: Option<PathBuf>,
        /// Packed response as hex, expanded to the record layout.
        #[arg(long)]
        response: Option<String>,
        /// Print the key itself instead of only its fingerprint.
        #[arg(long)]
        reveal_key: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Generator {
            length,
            capability,
            poly,
            degree,
        } => run_generator(&mut out, length, capability, &poly, degree)?,
        Commands::Enroll {
            response,
            reveal_key,
        } => run_enroll(&mut out, &response, reveal_key)?,
        Commands::Reconstruct {
            helper,
            record,
            response,
            reveal_key,
        } => run_reconstruct(&mut out, &helper, record, response, reveal_key)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_generator(
    out: &mut impl Write,
    length: usize,
    capability: usize,
    poly: &str,
    degree: u32,
) -> Result<()> {
    let poly = parse_poly(poly)?;
    let field = GaloisField::build(poly, degree)
        .with_context(|| format!("failed to build GF(2^{degree}) from {poly:#b}"))?;
    let generator = GeneratorPolynomial::synthesize(&field, length, capability)
        .context("generator synthesis failed")?;

    writeln!(out, "cyclotomic cosets mod {}:", field.order())?;
    for coset in CyclotomicCosets::modulo(field.order()).iter() {
        writeln!(out, "  {coset:?}")?;
    }
    writeln!(out, "zeros: {:?}", generator.zeros())?;
    writeln!(out, "g(x) = {:?}", generator.coefficients())?;
    writeln!(
        out,
        "({}, {}, {}) BCH code",
        generator.length(),
        generator.dimension(),
        generator.designed_distance()
    )?;

    if generator.coefficients() == GENERATOR.as_slice() {
        writeln!(out, "matches the device generator")?;
    } else {
        debug!(device = ?GENERATOR, "synthesized generator differs");
        writeln!(out, "differs from the device generator {GENERATOR:?}")?;
    }
    Ok(())
}

fn run_enroll(out: &mut impl Write, response: &str, reveal_key: bool) -> Result<()> {
    let response = parse_hex(response).context("invalid --response")?;
    let assembler = KeyAssembler::new()?;
    let enrollment = assembler.enroll(&response).context("enrollment failed")?;

    writeln!(out, "helper data: {}", enrollment.helper())?;
    print_key(out, enrollment.key(), reveal_key)
}

fn run_reconstruct(
    out: &mut impl Write,
    helper: &str,
    record: Option<PathBuf>,
    response: Option<String>,
    reveal_key: bool,
) -> Result<()> {
    let helper = parse_hex(helper).context("invalid --helper")?;
    let record = match (record, response) {
        (Some(path), _) => std::fs::read(&path)
            .with_context(|| format!("failed to read record from {}", path.display()))?,
        (None, Some(response)) => {
            expand_response(&parse_hex(&response).context("invalid --response")?)
        }
        (None, None) => bail!("either --record or --response is required"),
    };

    let assembler = KeyAssembler::new()?;
    let reconstruction = assembler
        .reconstruct(&record, &helper)
        .context("reconstruction failed")?;

    for (block, status) in reconstruction.statuses().iter().enumerate() {
        let status = match status {
            BlockStatus::Clean => "clean".to_string(),
            BlockStatus::Corrected(errors) => format!("corrected {errors}"),
            BlockStatus::Uncorrectable => "UNCORRECTABLE".to_string(),
        };
        writeln!(out, "block {block}\t{status}")?;
    }
    writeln!(out, "total errors: {}", reconstruction.total_errors())?;
    if !reconstruction.is_verified() {
        writeln!(out, "warning: key is unverified")?;
    }
    print_key(out, reconstruction.key(), reveal_key)
}

fn print_key(out: &mut impl Write, key: &Key, reveal: bool) -> Result<()> {
    if reveal {
        writeln!(out, "key: {}", key.to_hex())?;
    }
    writeln!(out, "key fingerprint: {}", key.fingerprint())?;
    Ok(())
}

/// Hex bytes with optional whitespace between them, e.g. `3A 32 55`
fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = input
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if let Some(&bad) = digits.iter().find(|b| !b.is_ascii_hexdigit()) {
        bail!("invalid hex digit '{}'", bad as char);
    }
    if digits.len() % 2 != 0 {
        bail!("odd number of hex digits");
    }

    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).context("non-ASCII input")?;
            u8::from_str_radix(pair, 16).with_context(|| format!("invalid hex byte '{pair}'"))
        })
        .collect()
}

fn parse_poly(input: &str) -> Result<u32> {
    let input = input.trim();
    let parsed = if let Some(bits) = input.strip_prefix("0b") {
        u32::from_str_radix(bits, 2)
    } else if let Some(hex) = input.strip_prefix("0x") {
        u32::from_str_radix(hex, 16)
    } else {
        input.parse()
    };
    parsed.with_context(|| format!("invalid polynomial '{input}'"))
}
