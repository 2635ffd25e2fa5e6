//! Embedded default tables for the generator configuration: first-line
//! tokens, file-extension conventions, variable classifications, genotype
//! parameter bounds and the crop-code table used to derive T-file names.

pub const TEMPLATE_FIRST_LINE: &str = "ptf";
pub const INSTRUCTION_FIRST_LINE: &str = "pif";
pub const TEMPLATE_EXTENSION: &str = "TPL";
pub const INSTRUCTION_EXTENSION: &str = "ins";

pub const CULTIVAR_EXTENSION: &str = "CUL";
pub const ECOTYPE_EXTENSION: &str = "ECO";
pub const SPECIES_EXTENSION: &str = "SPE";
pub const OUTPUT_EXTENSION: &str = "OUT";

/// PEST caps observation names at 20 characters.
pub const MAX_OBSERVATION_NAME: usize = 20;

/// Identifier padding for cultivar/ecotype templates.
pub const GENOTYPE_FILL: char = 'X';
/// Identifier padding for species templates.
pub const SPECIES_FILL: char = '-';

/// Calibration bound defaults per genotype parameter, CERES-Wheat cultivar
/// coefficients first, ecotype coefficients after.
pub const GENOTYPE_BOUNDS: &[(&str, f64, f64)] = &[
    ("P1V", 0.0, 60.0),
    ("P1D", 0.0, 200.0),
    ("P5", 100.0, 999.0),
    ("G1", 10.0, 50.0),
    ("G2", 10.0, 80.0),
    ("G3", 0.5, 8.0),
    ("PHINT", 30.0, 150.0),
    ("P1", 100.0, 500.0),
    ("P2FR1", 0.05, 1.0),
    ("P2", 0.05, 1.0),
    ("P3", 100.0, 300.0),
    ("P4FR1", 0.05, 1.0),
    ("P4FR2", 0.05, 0.5),
    ("P4", 50.0, 500.0),
    ("VEFF", 0.0, 1.0),
];

/// Default cultivar parameter grouping used when a caller supplies none.
pub const CULTIVAR_GROUPS: &[(&str, &[&str])] = &[
    ("P", &["P1V", "P1D", "P5"]),
    ("G", &["G1", "G2", "G3"]),
    ("PHINT", &["PHINT"]),
];

/// Default ecotype parameter grouping used when a caller supplies none.
pub const ECOTYPE_GROUPS: &[(&str, &[&str])] = &[
    ("PHEN", &["P1", "P2FR1", "P2", "P3", "P4FR1", "P4FR2", "P4"]),
    ("VERN", &["VEFF"]),
];

/// Observation groups for the end-of-season overview variables.
pub const OVERVIEW_CLASSIFICATION: &[(&str, &str)] = &[
    ("Emergence (DAP)", "phenology"),
    ("Anthesis (DAP)", "phenology"),
    ("Maturity (DAP)", "phenology"),
    ("Product wt (kg dm/ha;no loss)", "yield"),
    ("Product unit weight (g dm)", "yield"),
    ("Product number (no/m2)", "yield"),
    ("Product harvest index (ratio)", "yield"),
    ("Maximum leaf area index", "lai"),
    ("Canopy (tops) wt (kg dm/ha)", "biomass"),
    ("Vegetative wt (kg dm/ha)", "biomass"),
    ("Above-ground N (kg/ha)", "nitrogen"),
    ("N uptake (kg/ha)", "nitrogen"),
    ("Grain N (kg/ha)", "nitrogen"),
];

/// Observation groups for daily time-series variables.
pub const TIMESERIES_CLASSIFICATION: &[(&str, &str)] = &[
    ("LAID", "lai"),
    ("CWAD", "biomass"),
    ("LWAD", "biomass"),
    ("SWAD", "biomass"),
    ("RWAD", "biomass"),
    ("GWAD", "yield"),
    ("HIAD", "yield"),
    ("PWAD", "yield"),
    ("T#AD", "plant_struc"),
    ("L#SD", "plant_struc"),
    ("NWAD", "nitrogen"),
    ("SW1D", "soil_water"),
    ("SW2D", "soil_water"),
    ("SW3D", "soil_water"),
];

/// Crop names (lower case, as printed in .OUT MODEL lines) to the two-letter
/// DSSAT crop codes used in T-file names (`<EXPCODE>.<CROPCODE>T`).
pub const CROP_CODES: &[(&str, &str)] = &[
    ("wheat", "WH"),
    ("barley", "BA"),
    ("maize", "MZ"),
    ("soybean", "SB"),
    ("rice", "RI"),
    ("sorghum", "SG"),
    ("millet", "ML"),
    ("potato", "PT"),
    ("tomato", "TM"),
    ("peanut", "PN"),
    ("cotton", "CO"),
    ("cassava", "CS"),
];
