pub mod list;
pub mod serve;
pub mod settings;
pub mod sync;
