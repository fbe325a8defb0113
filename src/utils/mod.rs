//! Small conversion and formatting helpers

pub mod helper;

pub use helper::{
    abi_encode_address, base_units_to_amount, escape_label_value, hex_to_u128, truncate_string,
    BASE_UNITS_PER_TOKEN,
};
