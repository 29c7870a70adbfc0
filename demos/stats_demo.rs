use clap::Parser;
use shift_hash::HashOrderMixing;
use shift_hash::HashTable;
use shift_hash::ValueEquality;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    #[arg(short = 'l', long = "load_factor", default_value_t = 0.75)]
    load_factor: f64,

    /// Fixed mixing seed; a random one is used when omitted.
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Fraction of entries removed after filling, to exercise backward shift.
    #[arg(short = 'r', long = "remove_fraction", default_value_t = 0.25)]
    remove_fraction: f64,
}

fn print_histogram(hist: &[usize]) {
    let total: usize = hist.iter().sum();
    println!("=== Probe Length Histogram ===");
    for (distance, &count) in hist.iter().enumerate() {
        if count == 0 {
            continue;
        }
        println!(
            "{distance:>4}: {count:>8} ({:>6.2}%)",
            count as f64 / total.max(1) as f64 * 100.0
        );
    }
}

fn main() {
    let args = Args::parse();
    let mixing = args.seed.map_or(HashOrderMixing::Randomized, HashOrderMixing::Fixed);

    println!(
        "Creating HashTable with target capacity {} at load factor {}",
        args.target_capacity, args.load_factor
    );

    let mut table: HashTable<u64, u64> = match HashTable::try_with_capacity_and_policy(
        args.target_capacity,
        args.load_factor,
        mixing,
        ValueEquality::default(),
    ) {
        Ok(table) => table,
        Err(error) => {
            eprintln!("cannot create table: {error}");
            std::process::exit(1);
        }
    };

    println!(
        "Buffer length: {}, capacity: {}, seed: {:#018x}",
        table.buffer_len(),
        table.capacity(),
        table.mixing_seed()
    );

    let num_values = table.capacity() as u64;
    for value in 0..num_values {
        table.insert(value, value);
    }
    println!("Inserted {} values into table", table.len());
    println!("{}", table.visualize_key_distribution(64));
    print_histogram(&table.probe_histogram());
    table.debug_stats().print();

    let stride = (1.0 / args.remove_fraction.clamp(0.01, 1.0)).round() as u64;
    let mut removed = 0;
    for value in (0..num_values).step_by(stride.max(1) as usize) {
        if table.remove(&value).is_some() {
            removed += 1;
        }
    }

    println!();
    println!("Removed {removed} values");
    println!("{}", table.visualize_key_distribution(64));
    print_histogram(&table.probe_histogram());
    table.debug_stats().print();
}
