//! One module per pipeline step. Stages only talk to models and object
//! storage; run bookkeeping lives in the orchestrator.

pub mod brief;
pub mod ingestion;
pub mod style;
pub mod usp;
pub mod video;

pub use brief::generate_brief;
pub use ingestion::{load_product_input, ProductInput};
pub use style::analyze_brand_style;
pub use usp::extract_usps;
pub use video::generate_video;
