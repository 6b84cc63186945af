use std::io::Write;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use hemaview::histogram::curve::geometric_axis;
use hemaview::histogram::ReconstructionConfig;

const BIN_COUNT: usize = 64;
const FRAGMENTS: usize = 3;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// PLT counts per bin: log-normal body around the MPV plus counting noise.
fn generate_bins(volumes: &[f64], mpv: f64, rng: &mut SimpleRng) -> Vec<f32> {
    volumes
        .iter()
        .map(|&v| {
            let body = gaussian(v.ln(), mpv.ln(), 0.35, 180.0);
            (body + rng.gauss(0.0, 2.0)).max(0.0).round() as f32
        })
        .collect()
}

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

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let config = ReconstructionConfig::default();
    let volumes = geometric_axis(config.min_volume, config.max_volume, BIN_COUNT);
    let bins = generate_bins(&volumes, 7.8, &mut rng);

    // <f4 samples → raw deflate → unpadded base64
    let raw: Vec<u8> = bins.iter().flat_map(|b| b.to_le_bytes()).collect();
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw).context("compressing bins")?;
    let compressed = encoder.finish().context("finishing deflate stream")?;

    // Split on byte boundaries divisible by 3 so every piece encodes alone.
    let chunk = compressed.len().div_ceil(FRAGMENTS).div_ceil(3) * 3;
    let fragments: Vec<String> = compressed
        .chunks(chunk.max(3))
        .map(|c| STANDARD_NO_PAD.encode(c))
        .collect();

    let results = [
        ("WBC", "6.4"),
        ("RBC", "4.71"),
        ("HGB", "14.2"),
        ("MCV", "87.9"),
        ("RDW-CV", "13.2"),
        ("PLT", "231"),
        ("MPV", "7.8"),
        ("PDW", "9.2"),
        ("NEU%", "58.3"),
        ("LYM%", "31.6"),
        ("MON%", "6.9"),
        ("EOS%", "2.6"),
        ("BAS%", "0.6"),
    ];

    let mut record = String::from("H|\\^&|||HEMAVIEW^SAMPLE|||||||P|1\r\n");
    record.push_str("P|1||SAMPLE-0001\r\n");
    for (i, (name, value)) in results.iter().enumerate() {
        record.push_str(&format!("R|{}|^^^{name}|{value}|||N\r\n", i + 1));
    }
    for (i, text) in fragments.iter().enumerate() {
        record.push_str(&format!("OBX|{}|ED|PLT_HIST||base64^{text}|\r\n", i + 1));
    }
    record.push_str("L|1|N\r\n");

    let output_path = "sample_record.txt";
    std::fs::write(output_path, &record)
        .with_context(|| format!("writing {output_path}"))?;

    println!(
        "Wrote {BIN_COUNT} bins ({} compressed bytes in {} fragments) to {output_path}",
        compressed.len(),
        fragments.len()
    );
    Ok(())
}
