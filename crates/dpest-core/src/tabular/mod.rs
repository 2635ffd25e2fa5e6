//! Schema-less parsers for the DSSAT text-file families: genotype
//! coefficient files, daily output files, overview files and measured-data
//! T files.

pub mod genotype;
pub mod output;
pub mod overview;
pub mod tfile;
