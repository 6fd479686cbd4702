mod handler;

pub use handler::get_eth_price;
