// SPDX-License-Identifier: AGPL-3.0-only

//! `mac-test` — diagnostic runner for the MAC accelerator.
//!
//! ```text
//! USAGE:
//!   mac-test [run]                   Run the bring-up vectors (default)
//!   mac-test vector <A> <B> <C>      Run one operand triple
//!   mac-test regs                    Print the register map
//!
//! DEVICE OPTIONS (any subcommand):
//!   --backend software|devmem        Simulated block or /dev/mem mapping
//!   --base 0x20001000                Physical base of the register block
//!   --mem-device /dev/mem            Node mapped by the devmem backend
//!   --max-polls N                    Bound the DONE spin (default: unbounded)
//!   --latency N / --fault-xor MASK / --never-complete   Software model knobs
//! ```
//!
//! The process exits 0 whatever the verdicts, unless `--strict` is given.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mac_chip::{map, Register};
use mac_driver::{
    BackendSelection, Fault, HarnessConfig, MacAccelerator, SuiteSummary,
    TestRunner, TestVector, DEFAULT_MEM_DEVICE, DEFAULT_SIM_LATENCY, DEFAULT_VECTORS,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mac-test", about = "MAC accelerator test suite", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Cmd>,

    #[command(flatten)]
    device: DeviceArgs,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run the bring-up vectors (5,3,2), (7,4,1), (-3,6,10).
    Run {
        /// Exit non-zero if any vector fails.
        #[arg(long)]
        strict: bool,
    },
    /// Run a single operand triple.
    Vector {
        /// Multiplicand.
        #[arg(allow_negative_numbers = true)]
        a: i32,
        /// Multiplier.
        #[arg(allow_negative_numbers = true)]
        b: i32,
        /// Addend.
        #[arg(allow_negative_numbers = true)]
        c: i32,
        /// Exit non-zero if the vector fails.
        #[arg(long)]
        strict: bool,
    },
    /// Print the register map at the configured base.
    Regs,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    /// In-memory model of the accelerator.
    Software,
    /// Physical window mapped through the memory device node.
    Devmem,
}

impl From<BackendArg> for BackendSelection {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Software => Self::Software,
            BackendArg::Devmem => Self::DevMem,
        }
    }
}

#[derive(Args)]
struct DeviceArgs {
    /// Register block backend.
    #[arg(long, value_enum, default_value = "software", global = true)]
    backend: BackendArg,

    /// Physical base address of the register block (hex with 0x, or decimal).
    #[arg(long, value_parser = parse_u64, default_value_t = map::DEFAULT_BASE, global = true)]
    base: u64,

    /// Memory device node for the devmem backend.
    #[arg(long, default_value = DEFAULT_MEM_DEVICE, global = true)]
    mem_device: PathBuf,

    /// Give up after this many status polls instead of spinning forever.
    #[arg(long, global = true)]
    max_polls: Option<u64>,

    /// Software model: not-done status reads after each START.
    #[arg(long, default_value_t = DEFAULT_SIM_LATENCY, global = true)]
    latency: u32,

    /// Software model: flip these result bits (hex with 0x, or decimal).
    #[arg(long, value_parser = parse_u32, global = true)]
    fault_xor: Option<u32>,

    /// Software model: never raise DONE.
    #[arg(long, global = true, conflicts_with = "fault_xor")]
    never_complete: bool,
}

impl DeviceArgs {
    fn config(&self) -> HarnessConfig {
        let fault = if self.never_complete {
            Fault::NeverComplete
        } else if let Some(xor) = self.fault_xor {
            Fault::CorruptResult { xor }
        } else {
            Fault::None
        };

        HarnessConfig::default()
            .with_backend(self.backend.into())
            .with_base(self.base)
            .with_mem_device(&self.mem_device)
            .with_max_polls(self.max_polls)
            .with_sim_latency(self.latency)
            .with_sim_fault(fault)
    }
}

fn parse_u64(s: &str) -> Result<u64, String> {
    let s = s.replace('_', "");
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    }
    .map_err(|e| format!("invalid number '{s}': {e}"))
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let value = parse_u64(s)?;
    u32::try_from(value).map_err(|_| format!("{s} does not fit in 32 bits"))
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.device.config();

    let code = match cli.command.unwrap_or(Cmd::Run { strict: false }) {
        Cmd::Run { strict } => cmd_run(&config, &DEFAULT_VECTORS, strict)?,
        Cmd::Vector { a, b, c, strict } => cmd_run(&config, &[TestVector::new(a, b, c)], strict)?,
        Cmd::Regs => cmd_regs(&config),
    };

    Ok(code)
}

fn cmd_run(config: &HarnessConfig, vectors: &[TestVector], strict: bool) -> Result<ExitCode> {
    let accel = MacAccelerator::from_config(config).context("Cannot open MAC register block")?;
    tracing::info!(
        "Running {} vector(s) on {}",
        vectors.len(),
        accel.registers().backend_type()
    );

    let mut runner = TestRunner::new(accel, std::io::stdout().lock());
    let summary = runner.run_suite(vectors)?;

    Ok(if fails_run(&summary, strict) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// FAIL verdicts only affect the exit status under `--strict`.
fn fails_run(summary: &SuiteSummary, strict: bool) -> bool {
    strict && !summary.all_passed()
}

fn cmd_regs(config: &HarnessConfig) -> ExitCode {
    println!("MAC register block @ {:#010x}", config.base);
    println!();
    for reg in Register::ALL {
        let access = match reg.access() {
            mac_chip::Access::WriteOnly => "W",
            mac_chip::Access::ReadOnly => "R",
        };
        println!(
            "  +{:#04x}  {:#010x}  {:<10} {}",
            reg.offset(),
            config.base + reg.offset() as u64,
            reg.name(),
            access
        );
    }
    ExitCode::SUCCESS
}
