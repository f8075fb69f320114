//! Mine blocks back to back and report how the difficulty settles.
//!
//! Usage: `average_work [BLOCKS]` (default 1000).

use cryptochain::{BlockData, Blockchain};
use std::env;

fn main() {
    env_logger::init();

    let blocks: usize = env::args()
        .nth(1)
        .and_then(|v| v.parse().ok())
        .unwrap_or(1000);

    let mut bc = Blockchain::new();
    bc.add_block(BlockData::from("initial"));
    println!("first block: {:?}", bc.last_block());

    let mut times: Vec<i64> = Vec::with_capacity(blocks);
    for i in 0..blocks {
        let prev_timestamp = bc.last_block().timestamp;
        let next = bc.add_block(BlockData::from(i.to_string().as_str()));
        let time_diff = next.timestamp - prev_timestamp;
        let difficulty = next.difficulty;
        times.push(time_diff);

        let average = times.iter().sum::<i64>() as f64 / times.len() as f64;
        println!(
            "Time to mine block: {time_diff}ms. Difficulty: {difficulty}. Average time: {average:.2}ms."
        );
    }
}
