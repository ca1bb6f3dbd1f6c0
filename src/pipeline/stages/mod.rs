pub mod chunk;
pub mod embed;
pub mod enrichment;
pub mod extract;
pub mod insights;
