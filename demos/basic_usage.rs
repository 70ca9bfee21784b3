//! Basic usage examples for gridbloom

use gridbloom::{BloomFilter, GridKey, ScanDriver, ScanObserver, ScanReport, SimulationConfig};

struct ProgressPrinter {
    batches: usize,
}

impl ScanObserver for ProgressPrinter {
    fn on_progress(&mut self, report: &ScanReport) {
        self.batches += 1;
        if self.batches % 10 == 0 {
            println!("  batch {}: {}", self.batches, report);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Gridbloom Examples ===\n");

    // Example 1: Basic Bloom Filter
    println!("1. Basic Bloom Filter:");
    let mut bloom = BloomFilter::with_size(4096, 2)?;

    let added = ["0,0", "12,34", "149,149", "75,3"];
    for key in &added {
        bloom.add(key)?;
    }

    for key in &added {
        println!("  {} likely: {}", key, bloom.likely(key)?);
    }
    for key in &["1,1", "2,2", "3,3"] {
        println!("  {} definitely absent: {}", key, bloom.not_in_set(key)?);
    }

    // Non-canonical keys are rejected, not coerced
    match bloom.add("12, 34") {
        Ok(()) => println!("  unexpected: accepted a non-canonical key"),
        Err(e) => println!("  rejected: {}", e),
    }

    println!("  {}", bloom.stats());
    println!();

    // Example 2: Typed keys
    println!("2. Typed keys:");
    let key = GridKey::new(42, 7);
    bloom.insert(&key);
    println!("  {} -> contains: {}", key, bloom.contains(&key));
    println!();

    // Example 3: Full scan
    println!("3. Full scan of the 150 x 150 grid:");
    let config = SimulationConfig {
        item_count: 1_000,
        batch_size: 250,
        seed: Some(2024),
        ..SimulationConfig::default()
    };
    let mut printer = ProgressPrinter { batches: 0 };
    let mut driver = ScanDriver::start(&config, &mut printer)?;
    let report = driver.run_to_completion(&mut printer);

    println!("  final: {}", report);
    println!("  expected rate: {:.2}%", report.expected_rate);
    println!("  {}", driver.engine().filter().stats());

    Ok(())
}
