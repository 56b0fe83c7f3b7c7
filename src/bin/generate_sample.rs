use chrono::{Datelike, Months, NaiveDate};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Monthly registration count: base level with a mild upward trend,
/// festive-season bump around October/November, and noise.
fn monthly_count(base: f64, month_index: u32, month: u32, rng: &mut SimpleRng) -> u64 {
    let trend = 1.0 + 0.015 * month_index as f64;
    let season = if month == 10 || month == 11 { 1.25 } else { 1.0 };
    let noisy = base * trend * season + rng.gauss(0.0, base * 0.05);
    noisy.max(0.0).round() as u64
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // (category, manufacturer, base monthly registrations)
    let fleet: Vec<(&str, &str, f64)> = vec![
        ("2W", "Hero", 42_000.0),
        ("2W", "Honda", 38_000.0),
        ("2W", "TVS", 24_000.0),
        ("2W", "Bajaj", 21_000.0),
        ("3W", "Bajaj", 6_500.0),
        ("3W", "Piaggio", 3_200.0),
        ("3W", "Mahindra", 2_100.0),
        ("4W", "Maruti", 28_000.0),
        ("4W", "Hyundai", 15_000.0),
        ("4W", "Tata", 13_500.0),
        ("4W", "Mahindra", 9_800.0),
    ];

    let start = NaiveDate::from_ymd_opt(2022, 1, 1).expect("valid start date");
    let n_months = 36u32;

    let output_path = "sample_registrations.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");
    writer
        .write_record(["date", "category", "manufacturer", "registrations"])
        .expect("Failed to write header");

    let mut n_rows = 0usize;
    for m in 0..n_months {
        let date = start
            .checked_add_months(Months::new(m))
            .expect("date in range");
        for &(category, manufacturer, base) in &fleet {
            let registrations = monthly_count(base, m, date.month(), &mut rng);
            writer
                .write_record([
                    date.format("%Y-%m-%d").to_string(),
                    category.to_string(),
                    manufacturer.to_string(),
                    registrations.to_string(),
                ])
                .expect("Failed to write row");
            n_rows += 1;
        }
    }

    writer.flush().expect("Failed to flush CSV");
    println!("Wrote {n_rows} rows ({n_months} months) to {output_path}");
}
