//! Complete effects from creation to disposal

mod attached_effect;
mod fountain;
mod save_game;
