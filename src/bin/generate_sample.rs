//! Writes a sample ridership CSV in EUC-KR with comma thousands separators,
//! for exercising the loader's encoding fallback by hand.

use anyhow::{Context, Result};

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

    /// Uniform integer in `[lo, hi)`.
    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo)
    }
}

/// Format with comma thousands separators, as government exports do.
fn group_digits(mut n: u64) -> String {
    let mut parts = Vec::new();
    loop {
        if n < 1000 {
            parts.push(n.to_string());
            break;
        }
        parts.push(format!("{:03}", n % 1000));
        n /= 1000;
    }
    parts.reverse();
    parts.join(",")
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);

    let lines = [
        ("1호선", vec!["서울역", "시청", "종각", "동대문"]),
        ("2호선", vec!["강남", "홍대입구", "잠실", "신촌"]),
        ("3호선", vec!["경복궁", "안국", "교대"]),
    ];
    // First day written as a 7-digit number to exercise zero-padding.
    let dates = ["2025101", "20251002", "20251003"];

    let mut text = String::from("사용일자,노선명,역명,승차총승객수,하차총승객수\n");
    let mut rows = 0;
    for date in &dates {
        for (line, stations) in &lines {
            for station in stations {
                let on = rng.range(5_000, 120_000);
                let off = rng.range(5_000, 120_000);
                text.push_str(&format!(
                    "{date},{line},{station},\"{}\",\"{}\"\n",
                    group_digits(on),
                    group_digits(off)
                ));
                rows += 1;
            }
        }
    }

    let (bytes, _, _) = encoding_rs::EUC_KR.encode(&text);
    let output_path = "sample_subway.csv";
    std::fs::write(output_path, &bytes)
        .with_context(|| format!("writing {output_path}"))?;

    println!("Wrote {rows} rows to {output_path} (EUC-KR)");
    Ok(())
}
