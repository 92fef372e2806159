//! ARF compressor CLI - Encode frame sequences from a manifest.

use std::fs;
use std::path::{Path, PathBuf};

use arf_codec::{
    codec::{ArfReader, Payload},
    sequence::{SequenceConfig, encode_sequence},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && args[1] == "--example" {
        print_example_config();
        return;
    }

    if args.len() > 2 && args[1] == "inspect" {
        inspect(Path::new(&args[2]));
        return;
    }

    if args.len() < 3 {
        eprintln!("Usage: {} <setup.txt|manifest.json> <out_dir> [1|2]", args[0]);
        eprintln!("       {} inspect <file.arf>", args[0]);
        eprintln!();
        eprintln!("Encode frame-to-frame deltas as ARF streams.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  manifest  Setup text (path/direction line pairs) or JSON manifest");
        eprintln!("  out_dir   Directory receiving the .arf files");
        eprintln!("  encoding  1 = sparse, 2 = run-length (overrides the manifest)");
        eprintln!();
        eprintln!("Example manifest is generated with --example flag.");
        std::process::exit(1);
    }

    let manifest_path = PathBuf::from(&args[1]);
    let output_dir = PathBuf::from(&args[2]);

    let mut config = SequenceConfig::load(&manifest_path).unwrap_or_else(|e| {
        eprintln!("Error loading manifest: {}", e);
        std::process::exit(1);
    });

    if let Some(arg) = args.get(3) {
        config.encoding = arg.parse().unwrap_or_else(|e| {
            eprintln!("Error parsing encoding: {}", e);
            std::process::exit(1);
        });
    }

    let base_dir = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    println!("ARF Compressor");
    println!("==============");
    println!("Frames: {}", config.frames.len());
    println!("Encoding: {}", config.encoding);
    println!("Loop back: {}", config.loop_back);
    println!("Output: {}", output_dir.display());
    println!();

    let report = encode_sequence(&config, &base_dir, &output_dir).unwrap_or_else(|e| {
        eprintln!("Error encoding sequence: {}", e);
        std::process::exit(1);
    });

    for pair in &report.pairs {
        println!(
            "  {}: {} {} entries, {} bytes",
            pair.output.display(),
            pair.direction,
            pair.entry_count,
            pair.bytes
        );
    }
    println!();
    println!("{}", report);
}

fn inspect(path: &Path) {
    let bytes = fs::read(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path.display(), e);
        std::process::exit(1);
    });

    let reader = ArfReader::open(&bytes).unwrap_or_else(|e| {
        eprintln!("Error reading header: {}", e);
        std::process::exit(1);
    });

    println!("File: {}", path.display());
    println!("Size: {} bytes", bytes.len());
    println!("Direction: {}", reader.direction());
    println!("Encoding: {}", reader.encoding());
    println!("Entries: {}", reader.entry_count());

    match reader.decode() {
        Ok(payload) => {
            if let Payload::RunLength(lines) = &payload {
                let runs: usize = lines.iter().map(|l| l.runs.len()).sum();
                println!("Runs: {}", runs);
            }
            println!("Pixels: {}", payload.pixel_count());
        }
        Err(e) => {
            eprintln!("Error decoding payload: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_example_config() {
    let config = SequenceConfig::default();

    println!("Example manifest (manifest.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing example: {}", e),
    }
}
