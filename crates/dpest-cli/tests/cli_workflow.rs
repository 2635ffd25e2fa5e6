use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const CUL_FIXTURE: &str = "\
*WHEAT CULTIVAR COEFFICIENTS: WHCER048 MODEL

@VAR#  VAR-NAME........  EXP#   ECO#   P1V   P1D    P5    G1    G2    G3 PHINT
IB1500 MANITOU              . CAWH01   1.5   3.6   450    25    30   1.0    86
";

const OVERVIEW_FIXTURE: &str = "\
*SIMULATION OVERVIEW FILE

*RUN   1        : 164.0 KG N/HA IRRIG
 MODEL          : WHCER048 - CERES-Wheat
 EXPERIMENT     : SWSW7501 WH N RESPONSE,SWIFT CURRENT
 TREATMENT  1   : 164.0 KG N/HA IRRIG

*MAIN GROWTH AND DEVELOPMENT VARIABLES

@     VARIABLE                                         SIMULATED     MEASURED
      Emergence (DAP)                                          8            7
      Maturity (DAP)                                         103          105
";

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_dpest"))
}

fn stage(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("fixture should be staged");
    path
}

#[test]
fn cul_overview_and_pst_commands_compose_into_a_control_file() {
    let temp = TempDir::new().expect("tempdir should be created");
    let cul_path = stage(temp.path(), "WHCER048.CUL", CUL_FIXTURE);
    let overview_path = stage(temp.path(), "OVERVIEW.OUT", OVERVIEW_FIXTURE);
    let parameters_bundle = temp.path().join("cultivar.json");
    let observations_bundle = temp.path().join("overview.json");

    let cul_output = binary()
        .arg("cul")
        .arg(&cul_path)
        .args(["--cultivar", "MANITOU"])
        .args(["--group", "P=P1D,P5"])
        .arg("--bundle")
        .arg(&parameters_bundle)
        .output()
        .expect("cul command should run");
    assert!(
        cul_output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&cul_output.stderr)
    );
    assert!(temp.path().join("WHCER048_CUL.TPL").exists());
    assert!(parameters_bundle.exists());

    let overview_output = binary()
        .arg("overview")
        .arg(&overview_path)
        .args(["--treatment", "164.0 KG N/HA IRRIG"])
        .arg("--bundle")
        .arg(&observations_bundle)
        .output()
        .expect("overview command should run");
    assert!(
        overview_output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&overview_output.stderr)
    );
    let ins_path = temp.path().join("OVERVIEW.ins");
    assert!(ins_path.exists());
    let ins_content = fs::read_to_string(&ins_path).expect("instruction file should exist");
    assert!(ins_content.starts_with("pif ~\n~164.0 KG N/HA IRRIG~\n"));

    let pst_output = binary()
        .arg("pst")
        .arg("--parameters")
        .arg(&parameters_bundle)
        .arg("--observations")
        .arg(&observations_bundle)
        .args([
            "--pair",
            "WHCER048_CUL.TPL:WHCER048.CUL",
            "--pair",
            "OVERVIEW.ins:OVERVIEW.OUT",
            "--command",
            "py run_dssat.py",
        ])
        .arg("--output-dir")
        .arg(temp.path())
        .output()
        .expect("pst command should run");
    assert!(
        pst_output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&pst_output.stderr)
    );

    let control = fs::read_to_string(temp.path().join("PEST_CONTROL.pst"))
        .expect("control file should exist");
    assert!(control.starts_with("pcf\n* control data\n"));
    // 2 parameters (P1D, P5), 2 observations.
    assert!(control.lines().nth(3).unwrap().starts_with("2 2"));
}

#[test]
fn unknown_cultivars_exit_with_the_not_found_code() {
    let temp = TempDir::new().expect("tempdir should be created");
    let cul_path = stage(temp.path(), "WHCER048.CUL", CUL_FIXTURE);

    let output = binary()
        .arg("cul")
        .arg(&cul_path)
        .args(["--cultivar", "INVALID"])
        .output()
        .expect("cul command should run");

    assert_eq!(output.status.code(), Some(4), "NotFound maps to exit 4");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("INVALID"), "stderr: {stderr}");
}

#[test]
fn invalid_marker_delimiters_exit_with_the_validation_code() {
    let temp = TempDir::new().expect("tempdir should be created");
    let cul_path = stage(temp.path(), "WHCER048.CUL", CUL_FIXTURE);

    let output = binary()
        .arg("cul")
        .arg(&cul_path)
        .args(["--cultivar", "MANITOU", "--mrk", "a"])
        .output()
        .expect("cul command should run");

    assert_eq!(output.status.code(), Some(2), "Validation maps to exit 2");
}
