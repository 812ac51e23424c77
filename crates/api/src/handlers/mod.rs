pub mod creatives;
pub mod runs;
pub mod tasks;
