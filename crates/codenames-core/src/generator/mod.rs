//! Board seeding

mod board_generator;

pub use board_generator::generate_board;
