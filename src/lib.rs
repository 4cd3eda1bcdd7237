pub mod audio;
pub mod compute;
pub mod config;
pub mod context;
pub mod design;
pub mod display;
pub mod entities;
pub mod overlay;
pub mod player;
pub mod producers;
pub mod progression;
pub mod registry;
pub mod session;
pub mod weapon;
