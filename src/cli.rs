//! Command line interface for the `qrtransit` binary.
//!
//! Kept free of library types so `build.rs` can include it to render the
//! man page.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command line arguments for the `qrtransit` binary.
#[derive(Debug, Parser)]
#[command(
    name = "qrtransit",
    version,
    about = "Split files into QR-sized text symbols and rebuild them"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encode a file into a directory of symbol artifacts.
    Encode(EncodeArgs),
    /// Rebuild a file from a directory of symbol artifacts.
    Decode(DecodeArgs),
    /// Show the manifest and report missing or unexpected artifacts.
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
pub struct EncodeArgs {
    /// File to encode.
    pub input: PathBuf,
    /// Directory in which to create the artifact directory.
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,
    /// Maximum transformed-text characters per fragment.
    #[arg(short, long, default_value_t = 2000)]
    pub bound: usize,
    /// Maximum characters one symbol can hold, framing included.
    #[arg(long, default_value_t = 2331)]
    pub capacity: usize,
    /// Text-safe transform applied to the payload.
    #[arg(long, value_enum, default_value_t = TransformArg::Base64)]
    pub transform: TransformArg,
    /// How fragment text is laid out inside each symbol.
    #[arg(long, value_enum, default_value_t = FramingArg::Tagged)]
    pub framing: FramingArg,
    /// Symbol artifact format.
    #[arg(long, value_enum, default_value_t = SymbolArg::Text)]
    pub symbol: SymbolArg,
    /// Delete the input file after a successful encode.
    #[arg(long)]
    pub remove_source: bool,
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Artifact directory holding the manifest.
    pub dir: PathBuf,
    /// Directory receiving the reconstructed file.
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,
    /// Symbol artifact format.
    #[arg(long, value_enum, default_value_t = SymbolArg::Text)]
    pub symbol: SymbolArg,
    /// Delete the artifact directory after a successful decode.
    #[arg(long)]
    pub remove_artifacts: bool,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Artifact directory holding the manifest.
    pub dir: PathBuf,
    /// Symbol artifact format.
    #[arg(long, value_enum, default_value_t = SymbolArg::Text)]
    pub symbol: SymbolArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TransformArg {
    Base64,
    Hex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FramingArg {
    Raw,
    Tagged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SymbolArg {
    /// Plain `.txt` files.
    Text,
    /// Version-40 QR codes as `.png` files (needs the `qr` feature).
    Qr,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn encode_defaults_match_library_defaults() {
        let cli = Cli::parse_from(["qrtransit", "encode", "clip.mp4"]);
        let Command::Encode(args) = cli.command else {
            panic!("expected encode command");
        };
        assert_eq!(args.input, PathBuf::from("clip.mp4"));
        assert_eq!(args.bound, 2000);
        assert_eq!(args.capacity, 2331);
        assert_eq!(args.transform, TransformArg::Base64);
        assert_eq!(args.framing, FramingArg::Tagged);
        assert!(!args.remove_source);
    }

    #[test]
    fn parses_decode_options() {
        let cli = Cli::parse_from([
            "qrtransit",
            "decode",
            "clip",
            "--output-dir",
            "restored",
            "--remove-artifacts",
        ]);
        let Command::Decode(args) = cli.command else {
            panic!("expected decode command");
        };
        assert_eq!(args.dir, PathBuf::from("clip"));
        assert_eq!(args.output_dir, PathBuf::from("restored"));
        assert!(args.remove_artifacts);
    }

    #[test]
    fn rejects_unknown_transform() {
        let result = Cli::try_parse_from(["qrtransit", "encode", "a", "--transform", "rot13"]);
        assert!(result.is_err());
    }
}
