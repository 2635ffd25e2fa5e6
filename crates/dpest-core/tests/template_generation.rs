//! End-to-end template generation against staged DSSAT genotype files.

use dpest_core::{GeneratorConfig, GenotypeRequest, ParameterSpec, SpeciesRequest, cul, spe};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CUL_FIXTURE: &str = "\
*WHEAT CULTIVAR COEFFICIENTS: WHCER048 MODEL

! Coefficients used in the Cropsim-Ceres model
@VAR#  VAR-NAME........  EXP#   ECO#   P1V   P1D    P5    G1    G2    G3 PHINT
IB0488 NEWTON               . CAWH01     5    75   450    30    35   1.3    95
IB1500 MANITOU              . CAWH01   1.5   3.6   450    25    30   1.0    86
";

const SPE_FIXTURE: &str = "\
*WHEAT SPECIES COEFFICIENTS: WHCER048 MODEL

*PHASE DURATIONS
  86.0   10.0    2.0   -5.0
*GRAIN GROWTH
   0.5   21.0    3.1
";

fn stage(temp: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = temp.path().join(name);
    fs::write(&path, content).expect("fixture should be staged");
    path
}

#[test]
fn cultivar_template_round_trip_preserves_every_untouched_byte() {
    let temp = TempDir::new().expect("tempdir should be created");
    let cul_path = stage(&temp, "WHCER048.CUL", CUL_FIXTURE);
    let output_dir = temp.path().join("out");
    fs::create_dir_all(&output_dir).expect("output dir should be created");

    let config = GeneratorConfig::default();
    let mut request = GenotypeRequest::new(&cul_path, "MANITOU");
    request.output_dir = Some(output_dir.clone());
    let artifact = cul(&config, &request).expect("template should generate");

    let written = fs::read_to_string(&artifact.output_path).expect("template should exist");
    let template_lines: Vec<&str> = written.lines().collect();
    let source_lines: Vec<&str> = CUL_FIXTURE.lines().collect();

    assert_eq!(template_lines[0], "ptf ~");
    assert_eq!(template_lines.len(), source_lines.len() + 1);
    for (template_line, source_line) in template_lines[1..].iter().zip(&source_lines) {
        assert_eq!(
            template_line.chars().count(),
            source_line.chars().count(),
            "every line must keep its width"
        );
        if !source_line.contains("MANITOU") {
            assert_eq!(template_line, source_line, "unmarked lines must be untouched");
        }
    }

    let marked = template_lines
        .iter()
        .find(|line| line.contains("MANITOU"))
        .expect("the cultivar row must survive");
    assert_eq!(marked.matches('~').count(), 14, "7 parameters, 2 delimiters each");

    // The parameter bundle captures the replaced values verbatim.
    let values: Vec<&str> = artifact
        .parameters
        .entries()
        .iter()
        .map(|entry| entry.value.as_str())
        .collect();
    assert_eq!(values, vec!["1.5", "3.6", "450", "25", "30", "1.0", "86"]);
}

#[test]
fn species_template_marks_positional_parameters() {
    let temp = TempDir::new().expect("tempdir should be created");
    let spe_path = stage(&temp, "WHCER048.SPE", SPE_FIXTURE);

    let config = GeneratorConfig::default();
    let request = SpeciesRequest::new(
        &spe_path,
        vec![
            ParameterSpec::new("PGERM", 4, 1, 0.0, 20.0, Some("Phase_dur".into())).unwrap(),
            ParameterSpec::new("P0", 4, 3, -5.0, 5.0, Some("Phase_dur".into())).unwrap(),
            ParameterSpec::new("LWLOS", 6, 2, 0.0, 30.0, Some("Grain".into())).unwrap(),
        ],
    );
    let artifact = spe(&config, &request).expect("template should generate");

    assert_eq!(
        artifact.output_path.file_name().unwrap().to_str().unwrap(),
        "WHCER048_SPE.TPL"
    );
    let written = fs::read_to_string(&artifact.output_path).expect("template should exist");
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], "ptf ~");
    assert_eq!(lines[4], " ~PGE~   10.0 ~P0--~   -5.0");
    assert_eq!(lines[6], "   0.5 ~LWL-~    3.1");

    assert_eq!(artifact.parameters.value("PGE"), Some("86.0"));
    assert_eq!(artifact.parameters.value("P0--"), Some("2.0"));
    assert_eq!(artifact.parameters.value("LWL-"), Some("21.0"));
    assert_eq!(
        artifact.parameters.grouped(),
        vec![
            ("Phase_dur".to_string(), "PGE, P0--".to_string()),
            ("Grain".to_string(), "LWL-".to_string()),
        ]
    );
}

#[test]
fn custom_delimiters_flow_through_to_the_template() {
    let temp = TempDir::new().expect("tempdir should be created");
    let spe_path = stage(&temp, "WHCER048.SPE", SPE_FIXTURE);

    let config = GeneratorConfig::default();
    let mut request = SpeciesRequest::new(
        &spe_path,
        vec![ParameterSpec::new("PGERM", 4, 1, 0.0, 20.0, None).unwrap()],
    );
    request.markers = dpest_core::MarkerPair::new('%', '!').expect("markers should validate");
    let artifact = spe(&config, &request).expect("template should generate");

    let written = fs::read_to_string(&artifact.output_path).expect("template should exist");
    assert!(written.starts_with("ptf %\n"));
    assert!(written.contains("%PGE%"));
}
