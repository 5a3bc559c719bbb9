//! Tabular export of replication results.  For each station, a
//! `Server_<k>` row is followed, for every replication, by a row of
//! waiting times and a row of job ids, each truncated to the requested
//! prefix length.

use std::io::Write;

use super::StationTrace;
use crate::utils::errors::SimulationError;

/// Conventional output file name for a run of `runs` replications over
/// `stations` stations.
pub fn file_name(stations: usize, runs: usize) -> String {
    format!["Queue_Network_{}_Nodes_{}_Runs.csv", stations, runs]
}

fn write_row<W: Write, T: ToString>(
    writer: &mut W,
    label: &str,
    values: &[T],
) -> Result<(), SimulationError> {
    let mut row = String::from(label);
    values.iter().for_each(|value| {
        row.push(',');
        row.push_str(&value.to_string());
    });
    writeln!(writer, "{}", row)?;
    Ok(())
}

/// Write `replications[run][station]` traces as comma separated rows.
pub fn write_csv<W: Write>(
    writer: &mut W,
    replications: &[Vec<StationTrace>],
    prefix_len: usize,
) -> Result<(), SimulationError> {
    let stations = replications.first().map(Vec::len).unwrap_or(0);
    if let Some(traces) = replications.iter().find(|traces| traces.len() != stations) {
        return Err(SimulationError::DimensionMismatch {
            name: "replication traces",
            expected: stations,
            actual: traces.len(),
        });
    }
    for station in 0..stations {
        writeln!(writer, "Server_{}", station)?;
        for (run, traces) in replications.iter().enumerate() {
            let trace = traces[station].truncated(prefix_len);
            write_row(
                writer,
                &format!["waiting_times_{}", run],
                &trace.waiting_times,
            )?;
            write_row(writer, &format!["job_ids_{}", run], &trace.job_ids)?;
        }
    }
    writer.flush()?;
    Ok(())
}
