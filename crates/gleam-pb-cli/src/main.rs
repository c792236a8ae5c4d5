//! protoc-gen-gleam - Gleam code generator for protobuf
//!
//! Modes:
//! - `protoc-gen-gleam` (or `protoc-gen-gleam plugin`) - protoc plugin on stdin/stdout
//! - `protoc-gen-gleam generate` - generate from a serialized FileDescriptorSet
//!
//! The exit status is the `error_code()` of the failing `GenError`, or 1 for
//! anything else.

use clap::{Parser, Subcommand};
use gleam_pb_core::GenError;
use std::process::ExitCode;

mod generate;
mod gpb;
mod logging;
mod plugin;

#[derive(Parser)]
#[command(name = "protoc-gen-gleam")]
#[command(author, version, about = "Generate Gleam types and gpb bridges from protobuf", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as a protoc plugin (the default when no command is given)
    Plugin,

    /// Generate from a FileDescriptorSet without going through protoc
    Generate(generate::GenerateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Plugin) {
        Commands::Plugin => plugin::run(),
        Commands::Generate(args) => generate::run(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("protoc-gen-gleam: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<GenError>())
        .map_or(1, GenError::error_code)
}
