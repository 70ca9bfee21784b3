use clap::Parser;
use gridbloom::utils::optimal_hash_count;
use gridbloom::{GroundTruthSet, ScanObserver, ScanReport, ScanSession, SimulationConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Scan a grid against a Bloom filter and measure its false positives
#[derive(Parser, Debug)]
#[command(name = "gridbloom", version, about)]
struct Args {
    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Probe indices per key
    #[arg(short = 'k', long)]
    hashes: Option<u32>,

    /// Cells inserted into the filter
    #[arg(short = 'n', long)]
    items: Option<usize>,

    /// Filter size in bits
    #[arg(short = 'm', long)]
    bits: Option<usize>,

    /// Cells scanned per tick
    #[arg(short = 'b', long)]
    batch: Option<usize>,

    /// Grid side
    #[arg(long)]
    side: Option<u32>,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Draw the grid after the scan
    #[arg(long)]
    grid: bool,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,

    /// Only print the final report
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn into_config(self) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::parse_json(&std::fs::read_to_string(path)?)?,
            None => SimulationConfig::default(),
        };
        if let Some(k) = self.hashes {
            config.hash_count = k;
        }
        if let Some(n) = self.items {
            config.item_count = n;
        }
        if let Some(m) = self.bits {
            config.filter_bits = m;
        }
        if let Some(b) = self.batch {
            config.batch_size = b;
        }
        if let Some(side) = self.side {
            config.grid_side = side;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Text presentation layer: one progress line per batch plus an ASCII grid
struct TextRenderer {
    side: usize,
    cells: Vec<u8>,
    quiet: bool,
}

impl TextRenderer {
    const EMPTY: u8 = b'.';
    const ADDED: u8 = b'#';
    const HIT: u8 = b'+';
    const MISS: u8 = b'x';

    fn new(side: u32, quiet: bool) -> Self {
        let side = side as usize;
        TextRenderer {
            side,
            cells: vec![Self::EMPTY; side * side],
            quiet,
        }
    }

    fn mark(&mut self, x: u32, y: u32, glyph: u8) {
        self.cells[y as usize * self.side + x as usize] = glyph;
    }

    fn render(&self) -> String {
        self.cells
            .chunks(self.side)
            .map(|row| String::from_utf8_lossy(row).into_owned())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl ScanObserver for TextRenderer {
    fn on_cells_added(&mut self, keys: &GroundTruthSet) {
        for key in keys.iter() {
            self.mark(key.x, key.y, Self::ADDED);
        }
    }

    fn on_hit(&mut self, x: u32, y: u32) {
        self.mark(x, y, Self::HIT);
    }

    fn on_miss(&mut self, x: u32, y: u32) {
        self.mark(x, y, Self::MISS);
    }

    fn on_progress(&mut self, report: &ScanReport) {
        if !self.quiet {
            println!("{}", report);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args = Args::parse();
    let (draw_grid, json, quiet) = (args.grid, args.json, args.quiet);
    let config = args.into_config()?;

    let mut renderer = TextRenderer::new(config.grid_side, quiet);
    let mut session = ScanSession::new();
    session.start(&config, &mut renderer)?;
    while session.tick(&mut renderer).is_some() {}

    let Some(driver) = session.driver() else {
        return Ok(());
    };
    let report = driver.report();

    if draw_grid {
        println!("{}", renderer.render());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", report);
    println!("expected false positive rate: {:.2}%", report.expected_rate);
    println!("{}", driver.engine().filter().stats());
    println!(
        "suggested hash count for {} items: {}",
        config.item_count,
        optimal_hash_count(config.filter_bits, config.item_count)
    );

    Ok(())
}
