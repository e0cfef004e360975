pub mod results;

pub use results::ResultWriter;
