use proptest::prelude::*;
use sysdash::stream::{ProcessSample, SystemSnapshot};
use sysdash::view::project;

fn make_snapshot(samples: &[(f64, f64)]) -> SystemSnapshot {
    SystemSnapshot {
        cpu_usage: 12.5,
        mem_usage: 50.0,
        disk_usage: 75.25,
        net_traffic: 3_145_728.0,
        processes: samples
            .iter()
            .enumerate()
            .map(|(i, &(cpu, memory))| ProcessSample {
                pid: i as u32,
                name: format!("p{}", i),
                cpu_percent: cpu,
                memory_usage: memory,
            })
            .collect(),
    }
}

fn decimals(s: &str, suffix: &str) -> Option<usize> {
    let number = s.strip_suffix(suffix)?;
    let (_, frac) = number.split_once('.')?;
    frac.chars().all(|c| c.is_ascii_digit()).then_some(frac.len())
}

fn sample_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
    // Coarse CPU steps so ties are common.
    prop::collection::vec(
        ((0u32..20).prop_map(|c| f64::from(c) * 2.5), 0.0f64..1.0e10),
        0..200,
    )
}

proptest! {
    #[test]
    fn rows_are_ranked_by_cpu_descending(samples in sample_strategy()) {
        let snapshot = make_snapshot(&samples);
        let view = project(&snapshot);

        prop_assert_eq!(view.processes.len(), samples.len());
        for pair in view.processes.windows(2) {
            let a = samples[pair[0].pid as usize].0;
            let b = samples[pair[1].pid as usize].0;
            prop_assert!(a >= b, "pid {} ({}) ranked above pid {} ({})", pair[0].pid, a, pair[1].pid, b);
            if a == b {
                prop_assert!(pair[0].pid < pair[1].pid, "tie reordered: {} before {}", pair[0].pid, pair[1].pid);
            }
        }
    }

    #[test]
    fn every_process_appears_exactly_once(samples in sample_strategy()) {
        let view = project(&make_snapshot(&samples));
        let mut pids: Vec<u32> = view.processes.iter().map(|r| r.pid).collect();
        pids.sort_unstable();
        let expected: Vec<u32> = (0..samples.len() as u32).collect();
        prop_assert_eq!(pids, expected);
    }

    #[test]
    fn projection_is_pure(samples in sample_strategy()) {
        let snapshot = make_snapshot(&samples);
        let before = snapshot.clone();
        let first = project(&snapshot);
        let second = project(&snapshot);
        prop_assert_eq!(first, second);
        prop_assert_eq!(snapshot, before);
    }

    #[test]
    fn formatted_values_have_fixed_precision(
        usage in 0.0f64..1000.0,
        bytes in 0.0f64..1.0e12,
    ) {
        let mut snapshot = make_snapshot(&[(usage, bytes)]);
        snapshot.cpu_usage = usage;
        snapshot.net_traffic = bytes;
        let view = project(&snapshot);

        prop_assert_eq!(decimals(&view.cpu, "%"), Some(1));
        prop_assert_eq!(decimals(&view.network, " MB"), Some(2));
        prop_assert_eq!(decimals(&view.processes[0].cpu, "%"), Some(1));
        prop_assert_eq!(decimals(&view.processes[0].memory, " MB"), Some(2));
    }
}

#[test]
fn decoded_payload_projects_with_duplicate_pids_intact() {
    let payload = r#"{
        "cpuUsage": 12.5,
        "memUsage": 61.0,
        "diskUsage": 80.0,
        "netTraffic": 0,
        "processes": [
            {"pid": 7, "name": "dup", "cpuPercent": 3, "memoryUsage": 524288},
            {"pid": 7, "name": "dup", "cpuPercent": 9, "memoryUsage": 0}
        ]
    }"#;
    let snapshot = SystemSnapshot::from_json(payload).unwrap();

    insta::assert_debug_snapshot!(project(&snapshot), @r#"
    ViewModel {
        cpu: "12.5%",
        memory: "61.0%",
        disk: "80.0%",
        network: "0.00 MB",
        processes: [
            ProcessRow {
                pid: 7,
                name: "dup",
                cpu: "9.0%",
                memory: "0.00 MB",
            },
            ProcessRow {
                pid: 7,
                name: "dup",
                cpu: "3.0%",
                memory: "0.50 MB",
            },
        ],
    }
    "#);
}

#[test]
fn empty_snapshot_renders_headers_only() {
    let text = project(&SystemSnapshot::default()).to_string();
    let last = text.lines().last().unwrap();
    assert!(last.contains("PID"));
    assert!(last.contains("Memory (MB)"));
}
