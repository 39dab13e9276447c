use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use warp_codecs::codec_by_name;
use warp_core::{decode, encode, scan_index, Codec};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "warp",
    about = "Blocked parallel compression — compress, decompress, and inspect warp streams",
    version
)]
struct Cli {
    /// Worker threads for the parallel phases (default: all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into a warp stream
    Compress {
        /// Source file to compress ("-" reads stdin)
        input: PathBuf,
        /// Destination stream file
        output: PathBuf,
        /// Codec to use: lz4 | zstd | passthrough
        ///
        /// The stream does not record the codec; decompress with the same one.
        #[arg(short, long, default_value = "lz4")]
        codec: String,
        /// Zstd compression level (1–22, only used with --codec zstd)
        #[arg(long, default_value_t = 3)]
        zstd_level: i32,
        /// Raw bytes per block (default: min(1 MiB, input size))
        #[arg(short, long)]
        block_size: Option<usize>,
    },
    /// Decompress a warp stream back to raw bytes
    Decompress {
        /// Source stream file
        input: PathBuf,
        /// Destination file ("-" writes to stdout)
        output: PathBuf,
        /// Codec the stream was compressed with: lz4 | zstd | passthrough
        #[arg(short, long, default_value = "lz4")]
        codec: String,
    },
    /// Scan a stream's frame headers and print block statistics
    Inspect {
        /// Stream file to inspect
        file: PathBuf,
        /// Print per-block details
        #[arg(long)]
        blocks: bool,
    },
    /// Benchmark encode/decode throughput on a file, in memory
    Bench {
        /// Source file to compress repeatedly
        file: PathBuf,
        /// Codec to benchmark: lz4 | zstd | passthrough
        #[arg(short, long, default_value = "lz4")]
        codec: String,
        /// Zstd compression level (only used with --codec zstd)
        #[arg(long, default_value_t = 3)]
        zstd_level: i32,
        /// Raw bytes per block (default: min(1 MiB, input size))
        #[arg(short, long)]
        block_size: Option<usize>,
        /// Number of timed iterations
        #[arg(short, long, default_value_t = 3)]
        iterations: u32,
    },
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

fn read_input(path: &PathBuf) -> anyhow::Result<Vec<u8>> {
    if path.to_str() == Some("-") {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(path).with_context(|| format!("reading input file {:?}", path))
    }
}

fn write_output(path: &PathBuf, bytes: &[u8]) -> anyhow::Result<()> {
    if path.to_str() == Some("-") {
        io::stdout().lock().write_all(bytes)?;
        Ok(())
    } else {
        fs::write(path, bytes).with_context(|| format!("writing output file {:?}", path))
    }
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_compress(
    input: PathBuf,
    output: PathBuf,
    codec: Box<dyn Codec>,
    block_size: Option<usize>,
) -> anyhow::Result<()> {
    let raw = read_input(&input)?;

    let t0 = Instant::now();
    let stream = encode(&raw, codec.as_ref(), block_size)?;
    let elapsed = t0.elapsed();

    write_output(&output, &stream)?;

    let index = scan_index(&stream)?;
    let ratio = raw.len() as f64 / stream.len().max(1) as f64;
    eprintln!("  codec       : {}", codec.name());
    eprintln!("  blocks      : {}", index.block_count());
    eprintln!("  stored raw  : {}", index.stored_blocks());
    eprintln!("  raw size    : {}", human_bytes(raw.len() as u64));
    eprintln!("  compressed  : {}", human_bytes(stream.len() as u64));
    eprintln!("  ratio       : {:.2}x", ratio);
    eprintln!(
        "  throughput  : {}/s",
        human_bytes((raw.len() as f64 / elapsed.as_secs_f64()) as u64)
    );
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_decompress(input: PathBuf, output: PathBuf, codec: Box<dyn Codec>) -> anyhow::Result<()> {
    let stream = read_input(&input)?;

    let t0 = Instant::now();
    let raw = decode(&stream, codec.as_ref())
        .with_context(|| format!("decompressing {:?} with codec {}", input, codec.name()))?;
    let elapsed = t0.elapsed();

    write_output(&output, &raw)?;

    eprintln!("  raw size    : {}", human_bytes(raw.len() as u64));
    eprintln!(
        "  throughput  : {}/s",
        human_bytes((raw.len() as f64 / elapsed.as_secs_f64()) as u64)
    );
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_inspect(file: PathBuf, show_blocks: bool) -> anyhow::Result<()> {
    let stream = read_input(&file)?;
    let index = scan_index(&stream).with_context(|| format!("scanning {:?}", file))?;

    println!("=== warp stream: {:?} ===", file);
    println!();
    println!("  stream size    : {}", human_bytes(stream.len() as u64));
    println!("  block count    : {}", index.block_count());
    println!("  stored raw     : {}", index.stored_blocks());
    println!("  raw size       : {}", human_bytes(index.raw_size as u64));
    println!(
        "  payload bytes  : {}",
        human_bytes(index.compressed_size() as u64)
    );
    println!("  ratio          : {:.2}x", index.ratio());

    if show_blocks {
        println!();
        println!("  {:>6}  {:>12}  {:>12}  {:>12}  {}", "block", "in_offset", "orig", "comp", "mode");
        for (i, entry) in index.entries.iter().enumerate() {
            println!(
                "  {:>6}  {:>12}  {:>12}  {:>12}  {}",
                i,
                entry.in_offset,
                entry.orig_size,
                entry.comp_size,
                if entry.is_stored() { "stored" } else { "compressed" }
            );
        }
    }
    Ok(())
}

fn run_bench(
    file: PathBuf,
    codec: Box<dyn Codec>,
    block_size: Option<usize>,
    iterations: u32,
) -> anyhow::Result<()> {
    let raw = read_input(&file)?;
    anyhow::ensure!(!raw.is_empty(), "bench input {:?} is empty", file);

    // Warm-up pass also gives us the stream for the decode timings.
    let stream = encode(&raw, codec.as_ref(), block_size)?;
    let roundtrip = decode(&stream, codec.as_ref())?;
    anyhow::ensure!(roundtrip == raw, "round-trip mismatch during warm-up");

    let mut enc_best = f64::MAX;
    let mut dec_best = f64::MAX;
    for _ in 0..iterations {
        let t0 = Instant::now();
        let s = encode(&raw, codec.as_ref(), block_size)?;
        enc_best = enc_best.min(t0.elapsed().as_secs_f64());

        let t1 = Instant::now();
        let _ = decode(&s, codec.as_ref())?;
        dec_best = dec_best.min(t1.elapsed().as_secs_f64());
    }

    println!("=== warp bench: {:?} ({}) ===", file, codec.name());
    println!("  raw size    : {}", human_bytes(raw.len() as u64));
    println!("  compressed  : {}", human_bytes(stream.len() as u64));
    println!("  ratio       : {:.2}x", raw.len() as f64 / stream.len() as f64);
    println!(
        "  encode      : {}/s (best of {})",
        human_bytes((raw.len() as f64 / enc_best) as u64),
        iterations
    );
    println!(
        "  decode      : {}/s (best of {})",
        human_bytes((raw.len() as f64 / dec_best) as u64),
        iterations
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(n) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("configuring worker thread pool")?;
    }

    match cli.command {
        Commands::Compress {
            input,
            output,
            codec,
            zstd_level,
            block_size,
        } => run_compress(input, output, codec_by_name(&codec, zstd_level)?, block_size),
        Commands::Decompress {
            input,
            output,
            codec,
        } => run_decompress(input, output, codec_by_name(&codec, 3)?),
        Commands::Inspect { file, blocks } => run_inspect(file, blocks),
        Commands::Bench {
            file,
            codec,
            zstd_level,
            block_size,
            iterations,
        } => run_bench(file, codec_by_name(&codec, zstd_level)?, block_size, iterations),
    }
}
