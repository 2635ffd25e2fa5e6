use super::CliError;
use dpest_core::{DpestError, GeneratorConfig, MarkerPair, ParameterSpec, Suffix};
use std::path::PathBuf;

pub(super) fn load_config(overlay: Option<&PathBuf>) -> Result<GeneratorConfig, CliError> {
    match overlay {
        Some(path) => Ok(GeneratorConfig::from_overlay(path)?),
        None => Ok(GeneratorConfig::default()),
    }
}

pub(super) fn marker_pair(mrk: char, smk: char) -> Result<MarkerPair, CliError> {
    Ok(MarkerPair::new(mrk, smk)?)
}

pub(super) fn parse_suffix(raw: Option<&str>) -> Result<Option<Suffix>, CliError> {
    raw.map(Suffix::new).transpose().map_err(CliError::from)
}

/// `GROUP=NAME,NAME,...` definitions, e.g. `P=P1V,P1D,P5`.
pub(super) fn parse_group(raw: &str) -> Result<(String, Vec<String>), CliError> {
    let (group, members) = raw.split_once('=').ok_or_else(|| {
        usage(format!(
            "group '{raw}' must have the form GROUP=NAME[,NAME...], e.g. P=P1V,P1D,P5"
        ))
    })?;
    let members: Vec<String> = members
        .split(',')
        .map(str::trim)
        .filter(|member| !member.is_empty())
        .map(str::to_string)
        .collect();
    if group.trim().is_empty() || members.is_empty() {
        return Err(usage(format!(
            "group '{raw}' must name a group and at least one parameter"
        )));
    }
    Ok((group.trim().to_string(), members))
}

/// `NAME=line,column,min,max[,group]` species parameter locations,
/// e.g. `PGERM=15,1,0.0,20.0,Phase_dur`.
pub(super) fn parse_parameter_spec(raw: &str) -> Result<ParameterSpec, CliError> {
    let (name, location) = raw.split_once('=').ok_or_else(|| {
        usage(format!(
            "parameter '{raw}' must have the form NAME=line,column,min,max[,group]"
        ))
    })?;
    let parts: Vec<&str> = location.split(',').map(str::trim).collect();
    if parts.len() < 4 || parts.len() > 5 {
        return Err(usage(format!(
            "parameter '{raw}' must carry line, column, min and max (plus an optional group)"
        )));
    }

    let line = parse_number::<usize>(parts[0], raw, "line")?;
    let column = parse_number::<usize>(parts[1], raw, "column")?;
    let min = parse_number::<f64>(parts[2], raw, "min")?;
    let max = parse_number::<f64>(parts[3], raw, "max")?;
    let group = parts.get(4).map(|group| group.to_string());

    Ok(ParameterSpec::new(name, line, column, min, max, group)?)
}

fn parse_number<T: std::str::FromStr>(
    token: &str,
    raw: &str,
    field: &str,
) -> Result<T, CliError> {
    token
        .parse()
        .map_err(|_| usage(format!("parameter '{raw}': '{token}' is not a valid {field}")))
}

fn usage(message: String) -> CliError {
    CliError::Generate(DpestError::validation("INPUT.CLI_USAGE", message))
}

#[cfg(test)]
mod tests {
    use super::{parse_group, parse_parameter_spec};

    #[test]
    fn groups_split_into_trimmed_member_lists() {
        let (group, members) = parse_group("P=P1V, P1D,P5").expect("group should parse");
        assert_eq!(group, "P");
        assert_eq!(members, vec!["P1V", "P1D", "P5"]);

        assert!(parse_group("P1V,P1D").is_err());
        assert!(parse_group("P=").is_err());
    }

    #[test]
    fn parameter_specs_accept_optional_groups() {
        let spec = parse_parameter_spec("PGERM=15,1,0.0,20.0,Phase_dur")
            .expect("spec should parse");
        assert_eq!(spec.name, "PGERM");
        assert_eq!(spec.line, 15);
        assert_eq!(spec.column, 1);
        assert_eq!(spec.group, "Phase_dur");

        let defaulted = parse_parameter_spec("P0=15,3,-5.0,5.0").expect("spec should parse");
        assert_eq!(defaulted.group, "P0");

        assert!(parse_parameter_spec("P0=15,3").is_err());
        assert!(parse_parameter_spec("P0=a,b,c,d").is_err());
    }
}
