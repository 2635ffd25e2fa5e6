//! dpest-core generates PEST calibration artifacts from DSSAT crop-model
//! files: template files (.TPL) for cultivar, ecotype and species
//! parameters, instruction files (.INS) for overview and time-series
//! outputs, and the PEST control file (.PST) tying them together.
//!
//! The load-bearing piece is the positional text-field engine in [`layout`]:
//! DSSAT files carry no declared schema, so every replaceable cell is
//! resolved to an exact character span and rewritten in place with its
//! alignment preserved. A misaligned template silently corrupts a whole
//! calibration run, which is why the generators validate eagerly and never
//! write partial output.

pub mod common;
pub mod domain;
pub mod layout;
pub mod modules;
pub mod tabular;

pub use common::GeneratorConfig;
pub use domain::{
    DpestError, DpestResult, ErrorCategory, GeneratedParameterSet, InstructionArtifact,
    MarkerPair, ObservationRecord, ObservationTable, ParameterSpec, Suffix, TemplateArtifact,
};
pub use modules::{
    ControlFileRequest, ExtendReport, ExtendRequest, GenotypeRequest, OverviewRequest,
    SpeciesRequest, TimeSeriesRequest, cul, eco, extend, overview, pst, spe, ts,
};
