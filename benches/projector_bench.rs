use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use std::hint::black_box;
use sysdash::app::App;
use sysdash::config::Config;
use sysdash::stream::{ConnectionState, ProcessSample, StreamEvent, SystemSnapshot};
use sysdash::ui;
use sysdash::view::{project, rank_processes};

fn make_snapshot(n: usize) -> SystemSnapshot {
    SystemSnapshot {
        cpu_usage: 37.5,
        mem_usage: 64.2,
        disk_usage: 81.0,
        net_traffic: 12_582_912.0,
        processes: (0..n)
            .map(|i| ProcessSample {
                pid: i as u32 + 1,
                name: format!("proc_{i}"),
                cpu_percent: (i % 100) as f64 * 0.75,
                memory_usage: ((n - i) as f64 + 1.0) * 4096.0,
            })
            .collect(),
    }
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_processes_500_1000_2000");

    for size in [500usize, 1000, 2000] {
        let snapshot = make_snapshot(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &snapshot, |b, snapshot| {
            b.iter(|| {
                let ranked = rank_processes(black_box(&snapshot.processes));
                black_box(ranked);
            })
        });
    }

    group.finish();
}

fn bench_project(c: &mut Criterion) {
    let mut group = c.benchmark_group("project_500_1000_2000");

    for size in [500usize, 1000, 2000] {
        let snapshot = make_snapshot(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &snapshot, |b, snapshot| {
            b.iter(|| {
                let view = project(black_box(snapshot));
                black_box(view);
            })
        });
    }

    group.finish();
}

fn bench_dashboard_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("dashboard_render_500_1000_2000");

    for size in [500usize, 1000, 2000] {
        let mut app = App::new(&Config::default());
        app.on_stream_event(StreamEvent::State(ConnectionState::Streaming));
        app.on_stream_event(StreamEvent::Snapshot(make_snapshot(size)));

        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| {
                let backend = TestBackend::new(160, 50);
                let mut terminal = Terminal::new(backend).expect("bench terminal init failed");
                terminal
                    .draw(|frame| ui::draw(frame, &mut app))
                    .expect("bench draw failed");
                black_box(terminal.backend());
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rank, bench_project, bench_dashboard_render);
criterion_main!(benches);
