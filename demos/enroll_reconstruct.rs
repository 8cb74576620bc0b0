//! Enroll a PUF response, then rebuild the key from progressively noisier readings.

use std::convert::Infallible;

use secucode_puf::{expand_response, Challenge, KeyAssembler, PufSource};

const RESPONSE: [u8; 32] = [
    0x53, 0x65, 0xEF, 0xB4, 0x63, 0x75, 0xA9, 0x78, 0x43, 0x6F, 0xBC, 0x10, 0x64, 0x65, 0xD0,
    0x92, 0x20, 0x50, 0x8D, 0x36, 0x55, 0x46, 0x3A, 0xD0, 0x20, 0x6B, 0xE9, 0x0E, 0x65, 0x79,
    0x63, 0xBE,
];

/// Replays one response, flipping `flips_per_block` bits of every sub-block
struct NoisyPuf {
    flips_per_block: usize,
}

impl PufSource for NoisyPuf {
    type Error = Infallible;

    fn response(&mut self, _challenge: Challenge) -> Result<[u8; 32], Self::Error> {
        Ok(RESPONSE)
    }

    fn enrollment_record(&mut self, challenge: Challenge) -> Result<[u8; 256], Self::Error> {
        let mut record = [0u8; 256];
        record.copy_from_slice(&expand_response(&RESPONSE));
        for block in 0..8 {
            for flip in 0..self.flips_per_block {
                let position = (block * 5 + flip * 11 + usize::from(challenge)) % 31;
                record[block * 32 + position] ^= 1;
            }
        }
        Ok(record)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let assembler = KeyAssembler::new()?;
    let mut puf = NoisyPuf { flips_per_block: 0 };
    let enrollment = assembler.enroll_from(&mut puf, 0)?;
    println!("helper data: {}", enrollment.helper());

    for flips in 0..=4 {
        puf.flips_per_block = flips;
        let rebuilt = assembler.reconstruct_from(&mut puf, 0, enrollment.helper().as_bytes())?;
        println!(
            "{flips} flips/block: total_errors={} verified={} matches={}",
            rebuilt.total_errors(),
            rebuilt.is_verified(),
            rebuilt.key() == enrollment.key()
        );
    }

    Ok(())
}
