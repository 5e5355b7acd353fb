//! Display-ready projection of a [`SystemSnapshot`].
//!
//! Everything here is a pure function of the snapshot: projecting the same
//! snapshot twice yields identical output, and the snapshot is never mutated.

use std::fmt;

use crate::format::{format_megabytes, format_percent, truncate_unicode};
use crate::stream::snapshot::{ProcessSample, SystemSnapshot};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewModel {
    pub cpu: String,
    pub memory: String,
    pub disk: String,
    pub network: String,
    pub processes: Vec<ProcessRow>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessRow {
    pub pid: u32,
    pub name: String,
    pub cpu: String,
    pub memory: String,
}

impl ProcessRow {
    fn from_sample(sample: &ProcessSample) -> Self {
        ProcessRow {
            pid: sample.pid,
            name: sample.name.clone(),
            cpu: format_percent(sample.cpu_percent),
            memory: format_megabytes(sample.memory_usage),
        }
    }
}

pub fn project(snapshot: &SystemSnapshot) -> ViewModel {
    ViewModel {
        cpu: format_percent(snapshot.cpu_usage),
        memory: format_percent(snapshot.mem_usage),
        disk: format_percent(snapshot.disk_usage),
        network: format_megabytes(snapshot.net_traffic),
        processes: rank_processes(&snapshot.processes)
            .into_iter()
            .map(ProcessRow::from_sample)
            .collect(),
    }
}

/// Processes ordered by CPU descending. The sort is stable, so processes with
/// equal CPU keep their snapshot order.
pub fn rank_processes(processes: &[ProcessSample]) -> Vec<&ProcessSample> {
    let mut ranked: Vec<&ProcessSample> = processes.iter().collect();
    ranked.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
    ranked
}

const LABEL_WIDTH: usize = 16;
const NAME_WIDTH: usize = 24;

/// Plain-text rendering used by the headless `--once` mode.
impl fmt::Display for ViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in [
            ("CPU Usage", &self.cpu),
            ("Memory Usage", &self.memory),
            ("Disk Usage", &self.disk),
            ("Network Traffic", &self.network),
        ] {
            writeln!(f, "{label:<LABEL_WIDTH$}{value}")?;
        }
        writeln!(f)?;
        write!(
            f,
            "{:>7}  {:<NAME_WIDTH$}  {:>8}  {:>12}",
            "PID", "Name", "CPU %", "Memory (MB)"
        )?;
        for row in &self.processes {
            write!(
                f,
                "\n{:>7}  {:<NAME_WIDTH$}  {:>8}  {:>12}",
                row.pid,
                truncate_unicode(&row.name, NAME_WIDTH),
                row.cpu,
                row.memory
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pid: u32, name: &str, cpu: f64, memory: f64) -> ProcessSample {
        ProcessSample {
            pid,
            name: name.to_string(),
            cpu_percent: cpu,
            memory_usage: memory,
        }
    }

    fn scenario() -> SystemSnapshot {
        SystemSnapshot {
            cpu_usage: 42.05,
            mem_usage: 10.0,
            disk_usage: 5.0,
            net_traffic: 5_242_880.0,
            processes: vec![
                sample(1, "a", 5.0, 1_048_576.0),
                sample(2, "b", 50.0, 2_097_152.0),
            ],
        }
    }

    #[test]
    fn projects_scenario() {
        let view = project(&scenario());
        assert_eq!(view.network, "5.00 MB");
        assert_eq!(view.memory, "10.0%");
        assert_eq!(view.disk, "5.0%");
        assert_eq!(
            view.processes,
            vec![
                ProcessRow {
                    pid: 2,
                    name: "b".to_string(),
                    cpu: "50.0%".to_string(),
                    memory: "2.00 MB".to_string(),
                },
                ProcessRow {
                    pid: 1,
                    name: "a".to_string(),
                    cpu: "5.0%".to_string(),
                    memory: "1.00 MB".to_string(),
                },
            ]
        );
    }

    #[test]
    fn empty_process_list_projects_to_empty_rows() {
        let mut snapshot = scenario();
        snapshot.processes.clear();
        assert!(project(&snapshot).processes.is_empty());
    }

    #[test]
    fn default_snapshot_projects_to_zeroes() {
        let view = project(&SystemSnapshot::default());
        assert_eq!(view.cpu, "0.0%");
        assert_eq!(view.network, "0.00 MB");
    }

    #[test]
    fn ties_keep_input_order() {
        let processes = vec![
            sample(10, "x", 1.0, 0.0),
            sample(11, "y", 3.0, 0.0),
            sample(12, "z", 1.0, 0.0),
            sample(13, "w", 1.0, 0.0),
        ];
        let pids: Vec<u32> = rank_processes(&processes).iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![11, 10, 12, 13]);
    }

    #[test]
    fn projection_does_not_mutate_snapshot() {
        let snapshot = scenario();
        let before = snapshot.clone();
        let _ = project(&snapshot);
        assert_eq!(snapshot, before);
    }

    #[test]
    fn projection_is_repeatable() {
        let snapshot = scenario();
        assert_eq!(project(&snapshot), project(&snapshot));
    }

    #[test]
    fn text_rendering() {
        insta::assert_snapshot!(project(&scenario()).to_string(), @r"
        CPU Usage       42.0%
        Memory Usage    10.0%
        Disk Usage      5.0%
        Network Traffic 5.00 MB

            PID  Name                         CPU %   Memory (MB)
              2  b                            50.0%       2.00 MB
              1  a                             5.0%       1.00 MB
        ");
    }
}
