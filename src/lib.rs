pub mod config;
pub mod control;
pub mod dom;
pub mod engine;
pub mod messaging;
pub mod nav;
pub mod net;
pub mod overlay;
pub mod settings;
