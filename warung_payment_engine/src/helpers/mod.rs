mod order_number;
mod phone;

pub use order_number::new_order_number;
pub use phone::is_valid_phone;
