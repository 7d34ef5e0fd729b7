pub mod cleaning;

pub use cleaning::CleaningService;
