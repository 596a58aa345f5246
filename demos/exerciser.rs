use clap::Parser;
use fixed_slot_map::Error;
use fixed_slot_map::FixedHashMap;
use hashbrown::HashMap;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Fills a fixed map with random lowercase keys, overflows it, then pops half
/// of it and reports how much probing that took.
#[derive(Parser, Debug)]
struct Args {
    /// Number of slots in the table.
    #[arg(short = 's', long = "capacity", default_value_t = 32)]
    capacity: usize,

    /// Number of random keys to insert.
    #[arg(short = 'c', long = "count", default_value_t = 32)]
    count: usize,

    /// Width of every key and value in bytes.
    #[arg(short = 'w', long = "width", default_value_t = 4)]
    width: usize,

    /// Seed for the key generator. Random if omitted.
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Mirror every operation in a `hashbrown::HashMap` and check agreement.
    #[arg(long = "verify", default_value_t = false)]
    verify: bool,
}

fn make(rng: &mut SmallRng, width: usize) -> Vec<u8> {
    (0..width)
        .map(|_| LETTERS[rng.random_range(0..LETTERS.len())])
        .collect()
}

struct Mirror {
    entries: Option<HashMap<Vec<u8>, Vec<u8>>>,
    capacity: usize,
}

impl Mirror {
    fn set(&mut self, key: &[u8], value: &[u8], result: Result<bool, Error>) {
        let Some(entries) = self.entries.as_mut() else {
            return;
        };

        if entries.len() == self.capacity && !entries.contains_key(key) {
            assert_eq!(result, Err(Error::TableFull), "expected overflow for {key:?}");
            return;
        }

        let fresh = entries.insert(key.to_vec(), value.to_vec()).is_none();
        assert_eq!(result, Ok(fresh), "set disagreed for {key:?}");
    }

    fn pop(&mut self, key: &[u8], value: &[u8]) {
        if let Some(entries) = self.entries.as_mut() {
            assert_eq!(
                entries.remove(key).as_deref(),
                Some(value),
                "popped entry missing from mirror"
            );
        }
    }

    fn check(&self, map: &FixedHashMap<fixed_slot_map::DefaultHashBuilder>) {
        let Some(entries) = self.entries.as_ref() else {
            return;
        };

        assert_eq!(entries.len(), map.len());
        for (key, value) in entries {
            assert_eq!(map.get(key), Ok(value.as_slice()), "lookup disagreed for {key:?}");
        }
    }
}

fn main() {
    env_logger::Builder::from_default_env().init();

    let args = Args::parse();
    let seed = args
        .seed
        .unwrap_or_else(|| OsRng.try_next_u64().unwrap_or_default());
    let mut rng = SmallRng::seed_from_u64(seed);

    println!(
        "Creating fixed map: {} slots, {}-byte keys and values (seed {seed})",
        args.capacity, args.width
    );

    let mut map = FixedHashMap::new(args.width, args.width, args.capacity);
    let mut mirror = Mirror {
        entries: args.verify.then(HashMap::new),
        capacity: args.capacity,
    };

    let mut rejected = 0;
    for _ in 0..args.count {
        let key = make(&mut rng, args.width);
        for _ in 0..2 {
            let value = make(&mut rng, args.width);
            let result = map.set(&key, &value);
            if result == Err(Error::TableFull) {
                rejected += 1;
            }
            mirror.set(&key, &value, result);
        }
    }
    mirror.check(&map);

    println!("Inserted {} keys ({} inserts rejected)", map.len(), rejected);

    let key = make(&mut rng, args.width);
    let value = make(&mut rng, args.width);
    let overflow = map.set(&key, &value);
    match overflow {
        Err(Error::TableFull) => println!("Overflow insert rejected: table full"),
        Ok(_) => println!("Overflow insert accepted: table was not full"),
        Err(err) => println!("Overflow insert failed: {err}"),
    }
    mirror.set(&key, &value, overflow);

    for _ in 0..args.count / 2 {
        let Some((key, value)) = map.pop() else {
            break;
        };
        mirror.pop(&key, &value);
    }
    mirror.check(&map);

    println!(
        "After popping {}: {} entries, {} tombstones",
        args.count / 2,
        map.len(),
        map.tombstones()
    );

    map.probe_histogram().print();
    map.debug_stats().print();
    println!("Probe count: {}", map.probe_count());

    if args.verify {
        println!("Mirror check passed");
    }
}
