//! Generator modules, one per DSSAT file family plus the control-file
//! assembler.

pub mod extend;
pub mod genotype;
pub mod helpers;
pub mod overview;
pub mod pst;
pub mod serialization;
pub mod species;
pub mod timeseries;

pub use extend::{ExtendReport, ExtendRequest, extend};
pub use genotype::{GenotypeRequest, cul, eco};
pub use overview::{OverviewRequest, overview};
pub use pst::{ControlFileRequest, pst};
pub use species::{SpeciesRequest, spe};
pub use timeseries::{TimeSeriesRequest, ts};
