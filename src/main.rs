//! `qrtransit` binary: encode files to symbol artifacts and back.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Command, DecodeArgs, EncodeArgs, FramingArg, InspectArgs, SymbolArg, TransformArg};
use qrtransit::{
    CodecConfig,
    Framing,
    SymbolReader,
    SymbolWriter,
    TextSymbolCodec,
    TextTransform,
    decode_dir,
    encode_file,
    inspect_dir,
};

/// Writer and reader pair for one artifact format.
trait SymbolCodec {
    fn as_writer(&self) -> &dyn SymbolWriter;
    fn as_reader(&self) -> &dyn SymbolReader;
}

impl<T: SymbolWriter + SymbolReader> SymbolCodec for T {
    fn as_writer(&self) -> &dyn SymbolWriter { self }

    fn as_reader(&self) -> &dyn SymbolReader { self }
}

fn symbol_codec(format: SymbolArg, capacity: usize) -> Result<Box<dyn SymbolCodec>, String> {
    match format {
        SymbolArg::Text => Ok(Box::new(TextSymbolCodec::new(capacity))),
        #[cfg(feature = "qr")]
        SymbolArg::Qr => Ok(Box::new(qrtransit::QrSymbolCodec::default())),
        #[cfg(not(feature = "qr"))]
        SymbolArg::Qr => Err("QR symbols require building with the `qr` feature".to_owned()),
    }
}

fn encode(args: EncodeArgs) -> Result<(), String> {
    let config = CodecConfig::DEFAULT
        .with_fragment_size_bound(args.bound)
        .with_symbol_capacity(args.capacity)
        .with_transform(match args.transform {
            TransformArg::Base64 => TextTransform::Base64,
            TransformArg::Hex => TextTransform::Hex,
        })
        .with_framing(match args.framing {
            FramingArg::Raw => Framing::Raw,
            FramingArg::Tagged => Framing::Tagged,
        });
    let codec = symbol_codec(args.symbol, args.capacity)?;
    let report = encode_file(
        &args.input,
        &args.out_dir,
        &config,
        codec.as_writer(),
        args.remove_source,
    )
    .map_err(|err| err.to_string())?;
    println!(
        "Encoded {} into {} symbols in {}",
        report.manifest.logical_name(),
        report.artifacts.len(),
        report.dir.display()
    );
    Ok(())
}

fn decode(args: DecodeArgs) -> Result<(), String> {
    let codec = symbol_codec(args.symbol, usize::MAX)?;
    let report = decode_dir(
        &args.dir,
        &args.output_dir,
        codec.as_reader(),
        args.remove_artifacts,
    )
    .map_err(|err| err.to_string())?;
    println!("Reconstructed {} bytes at {}", report.bytes, report.output.display());
    Ok(())
}

fn inspect(args: InspectArgs) -> Result<(), String> {
    let codec = symbol_codec(args.symbol, usize::MAX)?;
    let inspection = inspect_dir(&args.dir, codec.as_reader().extension())
        .map_err(|err| err.to_string())?;
    let manifest = &inspection.manifest;
    println!("name:      {}", manifest.logical_name());
    println!("fragments: {}", manifest.fragment_count());
    println!("bound:     {}", manifest.fragment_size_bound());
    println!("transform: {}", manifest.transform());
    println!("framing:   {}", manifest.framing());
    if let Some(len) = manifest.payload_len() {
        println!("bytes:     {len}");
    }
    for index in &inspection.missing {
        println!("missing:   {index}");
    }
    let unlisted = inspection.missing_count as usize - inspection.missing.len();
    if unlisted > 0 {
        println!("missing:   ... and {unlisted} more");
    }
    for index in &inspection.unexpected {
        println!("unexpected: {index}");
    }
    if inspection.is_complete() {
        Ok(())
    } else {
        Err(format!(
            "{} missing and {} unexpected artifacts",
            inspection.missing_count,
            inspection.unexpected.len()
        ))
    }
}

fn main() -> ExitCode {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Encode(args) => encode(args),
        Command::Decode(args) => decode(args),
        Command::Inspect(args) => inspect(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
