pub mod op;
mod rupiah;
mod secret;

pub use rupiah::{Rupiah, RupiahConversionError, IDR_CURRENCY_CODE, IDR_CURRENCY_CODE_LOWER};
pub use secret::Secret;
