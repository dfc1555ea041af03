use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};

const ORDER_NUMBER_PREFIX: &str = "ORD";
const RANDOM_SUFFIX_LEN: usize = 10;

/// Generates a fresh order number: `ORD` + UTC timestamp + a random uppercase-alphanumeric suffix.
///
/// The number doubles as the payment gateway's transaction identifier, so it must stay unique for
/// the lifetime of the system and contain nothing but alphanumerics. The 10-character suffix is
/// drawn from a CSPRNG (`thread_rng`), giving ~51 bits of entropy on top of the second-resolution
/// timestamp.
pub fn new_order_number() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();
    format!("{ORDER_NUMBER_PREFIX}{}{suffix}", Utc::now().format("%Y%m%d%H%M%S"))
}
