//! Directory-based grid loader.
//!
//! Reads the four tables from one directory and assembles a validated
//! [`GridModel`]. Failures are phased: a file that cannot be read or a row
//! that cannot be parsed is fatal, as is a line referencing a bus or
//! conductor that does not exist. Per-row gaps that have a safe default
//! (no nominal flow, no reactance) are taken with a diagnostic instead.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use csv::ReaderBuilder;
use serde::de::DeserializeOwned;

use dlr_core::diagnostics::{Diagnostics, ImportDiagnostics};
use dlr_core::units::{Celsius, Kilovolts, Megawatts};
use dlr_core::{Bus, ConductorSpec, DlrError, DlrResult, GridModel, TransmissionLine};

use crate::tables::{BusRow, ConductorRow, FlowRow, LineRow};

pub const BUSES_FILE: &str = "buses.csv";
pub const LINES_FILE: &str = "lines.csv";
pub const CONDUCTORS_FILE: &str = "conductors.csv";
pub const FLOWS_FILE: &str = "flows.csv";

/// Load a grid and its import diagnostics from `dir`.
///
/// The returned diagnostics also carry the model's own soft validation
/// findings (isolated buses, suspicious limits), so callers get one
/// consolidated report per import.
pub fn load_grid(dir: impl AsRef<Path>) -> DlrResult<(GridModel, ImportDiagnostics)> {
    let dir = dir.as_ref();
    let mut diagnostics = ImportDiagnostics::new();

    let conductor_rows: Vec<ConductorRow> = read_rows(&dir.join(CONDUCTORS_FILE))?;
    let bus_rows: Vec<BusRow> = read_rows(&dir.join(BUSES_FILE))?;
    let line_rows: Vec<LineRow> = read_rows(&dir.join(LINES_FILE))?;
    let flow_rows: Vec<FlowRow> = read_rows(&dir.join(FLOWS_FILE))?;

    diagnostics.stats.conductors = conductor_rows.len();
    diagnostics.stats.buses = bus_rows.len();
    diagnostics.stats.lines = line_rows.len();
    diagnostics.stats.flows = flow_rows.len();

    let mut conductors = Vec::with_capacity(conductor_rows.len());
    for row in conductor_rows {
        conductors.push(ConductorSpec::new(
            row.name,
            row.resistance_25c,
            row.resistance_50c,
            row.core_radius,
        )?);
    }

    let buses: Vec<Bus> = bus_rows
        .iter()
        .map(|row| Bus::new(row.name.as_str(), Kilovolts(row.v_nom)))
        .collect();

    let flows = collapse_flows(flow_rows, &mut diagnostics);

    let mut lines = Vec::with_capacity(line_rows.len());
    for (idx, row) in line_rows.into_iter().enumerate() {
        // header occupies the first line of the file
        let record_line = idx + 2;
        let branch_name = row.branch_name.unwrap_or_else(|| row.name.clone());
        let mut line = TransmissionLine::new(
            row.name.clone(),
            branch_name,
            row.bus0,
            row.bus1,
            row.conductor,
            Celsius(row.max_operating_temp),
        );
        match row.x {
            Some(x) => line = line.with_reactance(x),
            None => diagnostics.add_warning_at_line(
                "parse",
                &format!(
                    "line '{}': no reactance, using the default of {}",
                    row.name, line.reactance
                ),
                record_line,
            ),
        }
        match flows.get(&row.name) {
            Some(&p0) => line = line.with_nominal_flow(Megawatts(p0)),
            None => {
                diagnostics.add_warning_with_entity(
                    "parse",
                    "no nominal flow record, defaulting to 0 MW",
                    &format!("Line {}", row.name),
                );
                diagnostics.stats.defaulted_values += 1;
            }
        }
        lines.push(line);
    }

    let line_names: HashSet<&str> = lines.iter().map(|l| l.id.as_str()).collect();
    let mut orphaned: Vec<&String> = flows
        .keys()
        .filter(|name| !line_names.contains(name.as_str()))
        .collect();
    orphaned.sort();
    for name in orphaned {
        diagnostics.add_warning_with_entity(
            "reference",
            "nominal flow record for a line not present in lines.csv",
            &format!("Line {}", name),
        );
    }

    let grid = GridModel::new(buses, lines, conductors)?;

    let mut model_checks = Diagnostics::new();
    grid.validate_into(&mut model_checks);
    diagnostics.issues.extend(model_checks.issues);

    Ok((grid, diagnostics))
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> DlrResult<Vec<T>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| DlrError::Parse(format!("opening {}: {}", path.display(), e)))?;
    let mut rows = Vec::new();
    for (idx, result) in rdr.deserialize().enumerate() {
        let row: T = result.map_err(|e| {
            DlrError::Parse(format!("{} record {}: {}", path.display(), idx + 1, e))
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Fold flow rows into a name-to-MW map, last record winning on
/// duplicates.
fn collapse_flows(rows: Vec<FlowRow>, diagnostics: &mut ImportDiagnostics) -> HashMap<String, f64> {
    let mut flows = HashMap::with_capacity(rows.len());
    for row in rows {
        if flows.insert(row.name.clone(), row.p0_nominal).is_some() {
            diagnostics.add_warning_with_entity(
                "parse",
                "duplicate nominal flow record, keeping the last value",
                &format!("Line {}", row.name),
            );
        }
    }
    flows
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlr_core::LineId;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const CONDUCTOR_HEADER: &str = "ConductorName,RES_25C,RES_50C,CDRAD_in";
    const PIGEON_ROW: &str = "3/0 ACSR 6/1 PIGEON,0.560,0.616,0.251";

    fn write_standard_fixture(dir: &Path) {
        fs::write(
            dir.join(BUSES_FILE),
            "name,v_nom\nALPHA138,138.0\nBRAVO138,138.0\n",
        )
        .unwrap();
        fs::write(
            dir.join(CONDUCTORS_FILE),
            format!("{CONDUCTOR_HEADER}\n{PIGEON_ROW}\n"),
        )
        .unwrap();
        fs::write(
            dir.join(LINES_FILE),
            "name,branch_name,bus0,bus1,conductor,MOT,x\n\
             L1,Alpha - Bravo ckt 1,ALPHA138,BRAVO138,3/0 ACSR 6/1 PIGEON,75,0.04\n\
             L2,,ALPHA138,BRAVO138,3/0 ACSR 6/1 PIGEON,75,\n",
        )
        .unwrap();
        fs::write(dir.join(FLOWS_FILE), "name,p0_nominal\nL1,42.5\n").unwrap();
    }

    #[test]
    fn test_load_standard_fixture() {
        let tmp = TempDir::new().unwrap();
        write_standard_fixture(tmp.path());

        let (grid, diagnostics) = load_grid(tmp.path()).unwrap();

        assert_eq!(grid.bus_count(), 2);
        assert_eq!(grid.line_count(), 2);
        assert_eq!(diagnostics.stats.buses, 2);
        assert_eq!(diagnostics.stats.lines, 2);
        assert_eq!(diagnostics.stats.conductors, 1);
        assert_eq!(diagnostics.stats.flows, 1);

        let l1 = grid.line(&LineId::new("L1")).unwrap();
        assert_eq!(l1.branch_name, "Alpha - Bravo ckt 1");
        assert_eq!(l1.nominal_flow, Megawatts(42.5));
        assert_eq!(l1.reactance, 0.04);

        // L2 had no branch name, reactance, or flow record
        let l2 = grid.line(&LineId::new("L2")).unwrap();
        assert_eq!(l2.branch_name, "L2");
        assert_eq!(l2.nominal_flow, Megawatts(0.0));
        assert_eq!(l2.reactance, dlr_core::DEFAULT_REACTANCE_PU);
        assert_eq!(diagnostics.stats.defaulted_values, 2);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn test_missing_table_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let err = load_grid(tmp.path()).unwrap_err();
        match err {
            DlrError::Parse(msg) => assert!(msg.contains("conductors.csv")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_numeric_is_fatal() {
        let tmp = TempDir::new().unwrap();
        write_standard_fixture(tmp.path());
        fs::write(
            tmp.path().join(LINES_FILE),
            "name,branch_name,bus0,bus1,conductor,MOT,x\n\
             L1,ckt 1,ALPHA138,BRAVO138,3/0 ACSR 6/1 PIGEON,hot,0.04\n",
        )
        .unwrap();

        let err = load_grid(tmp.path()).unwrap_err();
        match err {
            DlrError::Parse(msg) => assert!(msg.contains("record 1")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_bus_is_fatal() {
        let tmp = TempDir::new().unwrap();
        write_standard_fixture(tmp.path());
        fs::write(
            tmp.path().join(LINES_FILE),
            "name,branch_name,bus0,bus1,conductor,MOT,x\n\
             L1,ckt 1,ALPHA138,GAMMA500,3/0 ACSR 6/1 PIGEON,75,0.04\n",
        )
        .unwrap();

        let err = load_grid(tmp.path()).unwrap_err();
        match err {
            DlrError::Network(msg) => assert!(msg.contains("GAMMA500")),
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_conductor_is_fatal() {
        let tmp = TempDir::new().unwrap();
        write_standard_fixture(tmp.path());
        fs::write(
            tmp.path().join(LINES_FILE),
            "name,branch_name,bus0,bus1,conductor,MOT,x\n\
             L1,ckt 1,ALPHA138,BRAVO138,795 ACSR 26/7 DRAKE,75,0.04\n",
        )
        .unwrap();

        let err = load_grid(tmp.path()).unwrap_err();
        match err {
            DlrError::Network(msg) => assert!(msg.contains("DRAKE")),
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[test]
    fn test_inverted_resistances_are_fatal() {
        let tmp = TempDir::new().unwrap();
        write_standard_fixture(tmp.path());
        fs::write(
            tmp.path().join(CONDUCTORS_FILE),
            format!("{CONDUCTOR_HEADER}\n3/0 ACSR 6/1 PIGEON,0.616,0.560,0.251\n"),
        )
        .unwrap();

        assert!(matches!(
            load_grid(tmp.path()),
            Err(DlrError::Validation(_))
        ));
    }

    #[test]
    fn test_duplicate_flow_record_keeps_last() {
        let tmp = TempDir::new().unwrap();
        write_standard_fixture(tmp.path());
        fs::write(
            tmp.path().join(FLOWS_FILE),
            "name,p0_nominal\nL1,10.0\nL1,20.0\n",
        )
        .unwrap();

        let (grid, diagnostics) = load_grid(tmp.path()).unwrap();
        let l1 = grid.line(&LineId::new("L1")).unwrap();
        assert_eq!(l1.nominal_flow, Megawatts(20.0));
        assert!(diagnostics
            .warnings()
            .any(|w| w.message.contains("duplicate")));
    }

    #[test]
    fn test_flow_for_unknown_line_warns() {
        let tmp = TempDir::new().unwrap();
        write_standard_fixture(tmp.path());
        fs::write(
            tmp.path().join(FLOWS_FILE),
            "name,p0_nominal\nL1,42.5\nL99,7.0\n",
        )
        .unwrap();

        let (grid, diagnostics) = load_grid(tmp.path()).unwrap();
        assert_eq!(grid.line_count(), 2);
        let orphan = diagnostics
            .warnings()
            .find(|w| w.message.contains("not present"))
            .unwrap();
        assert_eq!(orphan.entity.as_deref(), Some("Line L99"));
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let tmp = TempDir::new().unwrap();
        write_standard_fixture(tmp.path());
        fs::write(
            tmp.path().join(BUSES_FILE),
            "name,v_nom,carrier,country\nALPHA138,138.0,AC,US\nBRAVO138,138.0,AC,US\n",
        )
        .unwrap();

        let (grid, _) = load_grid(tmp.path()).unwrap();
        assert_eq!(grid.bus_count(), 2);
    }
}
