use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};

use skycorr_core::Source;
use skycorr_index::{JackknifeTree, SkyBounds, SkyQuadTree, TreeConfig};
use skycorr_pairs::{count_pairs, read_sources, write_precomputed, LogBins, PairCounts};

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Parser)]
#[command(name = "skycorr")]
#[command(about = "Angular pair counting over sky catalogs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Precompute trig columns into a gzip'd catalog
    Precompute {
        /// Input text catalog (ra/dec columns, # comments, .gz accepted)
        input: PathBuf,
        /// Output path; a .gz suffix is added if missing
        output: PathBuf,
        /// Right ascension column index
        #[arg(long, default_value_t = 0)]
        ra_col: usize,
        /// Declination column index
        #[arg(long, default_value_t = 1)]
        dec_col: usize,
    },
    /// Count pairs into logarithmic separation bins
    Count {
        input: PathBuf,
        /// Tree depth (4^depth leaves)
        #[arg(long, default_value_t = 4)]
        depth: u32,
        /// Smallest binned separation in degrees
        #[arg(long, default_value_t = 2.0 / 3600.0)]
        min_sep: f64,
        /// Largest binned separation in degrees
        #[arg(long, default_value_t = 1.0)]
        max_sep: f64,
        /// Number of separation bins
        #[arg(long, default_value_t = 16)]
        bins: usize,
        /// RA origin shift in degrees (workaround for boxes near 0/360)
        #[arg(long, default_value_t = 0.0)]
        ra_offset: f64,
        #[arg(long, default_value_t = 0)]
        ra_col: usize,
        #[arg(long, default_value_t = 1)]
        dec_col: usize,
        /// Print counting time to stderr
        #[arg(long)]
        timing: bool,
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Assign jackknife resampling regions
    Jackknife {
        input: PathBuf,
        /// BSP level (2^level regions)
        #[arg(long, default_value_t = 3)]
        level: u32,
        #[arg(long, default_value_t = 0)]
        ra_col: usize,
        #[arg(long, default_value_t = 1)]
        dec_col: usize,
    },
    /// Print the aggregated tree hierarchy for a catalog
    Info {
        input: PathBuf,
        #[arg(long, default_value_t = 2)]
        depth: u32,
        #[arg(long, default_value_t = 0)]
        ra_col: usize,
        #[arg(long, default_value_t = 1)]
        dec_col: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Precompute {
            input,
            output,
            ra_col,
            dec_col,
        } => {
            let sources = read_sources(&input, ra_col, dec_col)?;
            let written = write_precomputed(&output, &sources)?;
            println!("{} sources written to {:?}", sources.len(), written);
        }
        Commands::Count {
            input,
            depth,
            min_sep,
            max_sep,
            bins,
            ra_offset,
            ra_col,
            dec_col,
            timing,
            format,
        } => {
            let sources = read_sources(&input, ra_col, dec_col)?;
            let tree = build_tree(&sources, depth, ra_offset)?;
            let bins = LogBins::new(min_sep, max_sep, bins)?;

            let start = if timing { Some(Instant::now()) } else { None };
            let counts = count_pairs(&tree, &sources, &bins)?;
            if let Some(start_time) = start {
                let elapsed = start_time.elapsed();
                eprintln!(
                    "Counted {} pairs in {:.2} ms",
                    counts.total(),
                    elapsed.as_secs_f64() * 1000.0
                );
            }

            match format {
                OutputFormat::Table => print_table(&bins, &counts),
                OutputFormat::Json => print_json(&bins, &counts)?,
                OutputFormat::Csv => print_csv(&bins, &counts),
            }
        }
        Commands::Jackknife {
            input,
            level,
            ra_col,
            dec_col,
        } => {
            let sources = read_sources(&input, ra_col, dec_col)?;
            let tree = JackknifeTree::build(level, &sources)?;
            for source in &sources {
                println!(
                    "{:13.10} {:13.10} {}",
                    source.ra,
                    source.dec,
                    tree.region(source)
                );
            }
        }
        Commands::Info {
            input,
            depth,
            ra_col,
            dec_col,
        } => {
            let sources = read_sources(&input, ra_col, dec_col)?;
            let tree = build_tree(&sources, depth, 0.0)?;
            println!(
                "{} sources, depth {}, {} leaves, {:.4} deg² indexed",
                tree.len(),
                tree.depth(),
                tree.leaf_count(),
                tree.area()
            );
            print!("{}", tree);
        }
    }

    Ok(())
}

/// Builds and aggregates a tree over the catalog's own extents.
fn build_tree(sources: &[Source], depth: u32, ra_offset: f64) -> Result<SkyQuadTree> {
    if sources.is_empty() {
        bail!("catalog is empty");
    }

    let mut min_ra = f64::INFINITY;
    let mut max_ra = f64::NEG_INFINITY;
    let mut min_dec = f64::INFINITY;
    let mut max_dec = f64::NEG_INFINITY;
    for source in sources {
        min_ra = min_ra.min(source.ra);
        max_ra = max_ra.max(source.ra);
        min_dec = min_dec.min(source.dec);
        max_dec = max_dec.max(source.dec);
    }

    let bounds = SkyBounds::new(min_ra, max_ra, min_dec, max_dec)?;
    let config = TreeConfig::new(depth, bounds).with_ra_offset(ra_offset);
    let mut tree = SkyQuadTree::new(config)?;
    tree.extend(sources.iter().copied());
    tree.aggregate();
    Ok(tree)
}

fn print_table(bins: &LogBins, counts: &PairCounts) {
    let edges = bins.edges();
    for (i, count) in counts.counts().iter().enumerate() {
        println!(
            "{:12.6} {:12.6} {:10}",
            edges[i],
            edges[i + 1],
            count
        );
    }
    println!("\nTotal pairs: {}", counts.total());
}

fn print_csv(bins: &LogBins, counts: &PairCounts) {
    println!("sep_lo_deg,sep_hi_deg,pairs");
    let edges = bins.edges();
    for (i, count) in counts.counts().iter().enumerate() {
        println!("{},{},{}", edges[i], edges[i + 1], count);
    }
}

#[derive(serde::Serialize)]
struct JsonBin {
    sep_lo_deg: f64,
    sep_hi_deg: f64,
    pairs: u64,
}

fn print_json(bins: &LogBins, counts: &PairCounts) -> Result<()> {
    let edges = bins.edges();
    let rows: Vec<JsonBin> = counts
        .counts()
        .iter()
        .enumerate()
        .map(|(i, &pairs)| JsonBin {
            sep_lo_deg: edges[i],
            sep_hi_deg: edges[i + 1],
            pairs,
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
