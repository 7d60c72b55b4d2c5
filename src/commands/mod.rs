pub mod assets;
pub mod db;
pub mod settings;
