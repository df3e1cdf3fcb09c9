//! 统计会话端到端测试
//!
//! 使用仿真主控板和虚拟时钟，验证会话循环的计数、采样、关闭和结束原因。

use masterboard_sdk::client::{Clock, FakeClock, LoopConfig, MonotonicClock, run_session};
use masterboard_sdk::driver::{
    DriverError, MasterBoard, MasterBoardBuilder, SimConfig, SimMasterBoard,
};
use masterboard_sdk::protocol::{
    DriverCommand, HISTOGRAM_BUCKETS, LinkStats, LossHistogram, SensorData,
};
use masterboard_sdk::tools::{RunOutcome, RunRecord};
use masterboard_sdk::ClientError;
use std::io::sink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn run(board: &mut SimMasterBoard, config: &LoopConfig) -> RunRecord {
    run_session(
        board,
        &FakeClock::new(),
        config,
        &AtomicBool::new(false),
        &mut sink(),
    )
    .unwrap()
}

fn assert_ratios_exact(record: &RunRecord) {
    let samples = &record.samples;
    let len = samples.len();
    assert_eq!(samples.time().len(), len);
    assert_eq!(samples.cmd_lost().len(), len);
    assert_eq!(samples.sensor_lost().len(), len);
    assert_eq!(samples.cmd_ratio().len(), len);
    assert_eq!(samples.sensor_ratio().len(), len);
    for k in 0..len {
        assert_eq!(
            samples.cmd_ratio()[k],
            100.0 * samples.cmd_lost()[k] as f64 / samples.cmd_sent()[k] as f64
        );
        assert_eq!(
            samples.sensor_ratio()[k],
            100.0 * samples.sensor_lost()[k] as f64 / samples.sensor_sent()[k] as f64
        );
    }
}

fn weighted(buckets: &[u32; HISTOGRAM_BUCKETS]) -> u64 {
    buckets
        .iter()
        .enumerate()
        .map(|(i, &count)| (i as u64 + 1) * count as u64)
        .sum()
}

#[test]
fn test_twenty_second_session_on_fake_clock() {
    let mut board = SimMasterBoard::new("sim", SimConfig::default());
    let record = run(&mut board, &LoopConfig::default());

    assert_eq!(record.outcome, RunOutcome::Completed);
    assert_eq!(record.ticks, 20_000);
    assert_eq!(record.samples.len(), 200);
    assert_eq!(record.overruns, 0);
    assert_eq!(record.interface, "sim");
    assert_eq!(record.ready_tick, Some(101));
    assert_eq!(record.histogram_cmd.len(), HISTOGRAM_BUCKETS);
    assert_eq!(record.histogram_sensor.len(), HISTOGRAM_BUCKETS);
    assert!(record.histogram_cmd.iter().all(|&count| count == 0));

    assert_eq!(board.stop_count(), 1);
    assert_eq!(board.commands_sent(), 20_000);
    assert!(board.is_stopped());

    assert_ratios_exact(&record);
    let last = record.samples.last().unwrap();
    assert!((last.time - 20.0).abs() < 1e-9);
    assert_eq!(last.cmd, LinkStats { sent: 19_999, lost: 0 });
}

#[test]
fn test_lossy_session_accounting() {
    let mut board = SimMasterBoard::new(
        "sim:lossy",
        SimConfig {
            cmd_loss_rate: 0.05,
            sensor_loss_rate: 0.02,
            seed: 3,
            ..SimConfig::default()
        },
    );
    let config = LoopConfig {
        duration_ms: 5_000,
        ..LoopConfig::default()
    };
    let record = run(&mut board, &config);

    assert_eq!(record.outcome, RunOutcome::Completed);
    assert_eq!(record.samples.len(), 50);
    assert_ratios_exact(&record);

    let cmd = board.cmd_stats();
    assert!(cmd.lost > 0 && cmd.lost <= cmd.sent);
    // 累计丢包数单调不减
    assert!(record.samples.cmd_lost().windows(2).all(|w| w[0] <= w[1]));
    assert!(record.samples.sensor_lost().windows(2).all(|w| w[0] <= w[1]));

    if record.histogram_cmd[HISTOGRAM_BUCKETS - 1] == 0 {
        assert_eq!(weighted(&record.histogram_cmd), cmd.lost);
    }
    if record.histogram_sensor[HISTOGRAM_BUCKETS - 1] == 0 {
        assert_eq!(weighted(&record.histogram_sensor), board.sensor_stats().lost);
    }
    assert_eq!(board.stop_count(), 1);
}

#[test]
fn test_ack_timeout_does_not_stop_board() {
    let mut board = SimMasterBoard::new(
        "sim",
        SimConfig {
            ack_after_inits: None,
            handshake_timeout_ms: 200,
            ..SimConfig::default()
        },
    );
    let record = run(&mut board, &LoopConfig::default());

    assert_eq!(record.outcome, RunOutcome::AckTimeout);
    assert_eq!(record.ticks, 0);
    assert!(record.samples.is_empty());
    assert_eq!(record.histogram_sensor.len(), HISTOGRAM_BUCKETS);
    assert!(board.is_timeout());
    assert_eq!(board.stop_count(), 0);
    assert_eq!(board.inits_sent(), 200);
}

#[test]
fn test_board_timeout_does_not_stop_board() {
    let mut board = SimMasterBoard::new(
        "sim",
        SimConfig {
            disconnect_after_ticks: Some(500),
            ..SimConfig::default()
        },
    );
    let record = run(&mut board, &LoopConfig::default());

    assert_eq!(record.outcome, RunOutcome::BoardTimeout);
    assert!(record.ticks > 500 && record.ticks < 700, "ticks = {}", record.ticks);
    assert_eq!(board.stop_count(), 0);
    assert!(board.is_timeout());
    // 断开后的连续丢包段超过 20，计入最后一个桶
    assert_eq!(record.histogram_sensor[HISTOGRAM_BUCKETS - 1], 1);
    assert_ratios_exact(&record);
}

/// 到达 `trigger` 时置位中断标志的虚拟时钟
struct InterruptingClock<'a> {
    inner: FakeClock,
    trigger: Duration,
    flag: &'a AtomicBool,
}

impl Clock for InterruptingClock<'_> {
    fn now(&self) -> Duration {
        self.inner.now()
    }

    fn sleep_until(&self, deadline: Duration) {
        self.inner.sleep_until(deadline);
        if self.inner.now() >= self.trigger {
            self.flag.store(true, Ordering::SeqCst);
        }
    }
}

#[test]
fn test_interrupt_stops_board_once() {
    let interrupt = AtomicBool::new(false);
    let clock = InterruptingClock {
        inner: FakeClock::new(),
        trigger: Duration::from_millis(250),
        flag: &interrupt,
    };
    let mut board = SimMasterBoard::new("sim", SimConfig::default());
    let record = run_session(
        &mut board,
        &clock,
        &LoopConfig::default(),
        &interrupt,
        &mut sink(),
    )
    .unwrap();

    assert_eq!(record.outcome, RunOutcome::Interrupted);
    assert_eq!(record.ticks, 250);
    assert_eq!(record.samples.len(), 2);
    assert_eq!(board.stop_count(), 1);
}

#[test]
fn test_interrupt_during_handshake() {
    let interrupt = AtomicBool::new(false);
    let clock = InterruptingClock {
        inner: FakeClock::new(),
        trigger: Duration::from_millis(5),
        flag: &interrupt,
    };
    let mut board = SimMasterBoard::new(
        "sim",
        SimConfig {
            ack_after_inits: None,
            ..SimConfig::default()
        },
    );
    let record = run_session(
        &mut board,
        &clock,
        &LoopConfig::default(),
        &interrupt,
        &mut sink(),
    )
    .unwrap();

    assert_eq!(record.outcome, RunOutcome::Interrupted);
    assert_eq!(record.ticks, 0);
    assert_eq!(board.inits_sent(), 5);
    assert_eq!(board.stop_count(), 1);
}

/// 第 `fail_after` 次 `send_command()` 起返回错误的主控板
struct FailingBoard {
    inner: SimMasterBoard,
    fail_after: u64,
}

impl MasterBoard for FailingBoard {
    fn interface(&self) -> &str {
        self.inner.interface()
    }

    fn init(&mut self) -> Result<(), DriverError> {
        self.inner.init()
    }

    fn send_init(&mut self) -> Result<(), DriverError> {
        self.inner.send_init()
    }

    fn is_ack_received(&self) -> bool {
        self.inner.is_ack_received()
    }

    fn is_timeout(&self) -> bool {
        self.inner.is_timeout()
    }

    fn driver_command(&mut self, index: usize) -> Result<&mut DriverCommand, DriverError> {
        self.inner.driver_command(index)
    }

    fn parse_sensor_data(&mut self) -> Result<(), DriverError> {
        self.inner.parse_sensor_data()
    }

    fn send_command(&mut self) -> Result<(), DriverError> {
        if self.inner.commands_sent() >= self.fail_after {
            return Err(DriverError::Io(std::io::Error::other("link reset")));
        }
        self.inner.send_command()
    }

    fn sensor_data(&self) -> &SensorData {
        self.inner.sensor_data()
    }

    fn cmd_stats(&self) -> LinkStats {
        self.inner.cmd_stats()
    }

    fn sensor_stats(&self) -> LinkStats {
        self.inner.sensor_stats()
    }

    fn cmd_histogram(&self) -> LossHistogram {
        self.inner.cmd_histogram()
    }

    fn sensor_histogram(&self) -> LossHistogram {
        self.inner.sensor_histogram()
    }

    fn stop(&mut self) -> Result<(), DriverError> {
        self.inner.stop()
    }
}

#[test]
fn test_interface_error_still_stops_board() {
    let mut board = FailingBoard {
        inner: SimMasterBoard::new("sim", SimConfig::default()),
        fail_after: 42,
    };
    let result = run_session(
        &mut board,
        &FakeClock::new(),
        &LoopConfig::default(),
        &AtomicBool::new(false),
        &mut sink(),
    );

    assert!(matches!(
        result,
        Err(ClientError::Driver(DriverError::Io(_)))
    ));
    assert_eq!(board.inner.commands_sent(), 42);
    assert_eq!(board.inner.stop_count(), 1);
}

#[test]
fn test_readiness_latch_with_two_drivers() {
    let mut board = SimMasterBoard::new(
        "sim",
        SimConfig {
            ready_after_ticks: 50,
            ..SimConfig::default()
        },
    );
    let config = LoopConfig {
        duration_ms: 500,
        controlled_drivers: 2,
        ..LoopConfig::default()
    };
    let record = run(&mut board, &config);

    assert_eq!(record.ready_tick, Some(51));
    for motor in 0..4 {
        let state = board.motor(motor).unwrap();
        assert!(state.enabled && state.ready, "motor {} not ready", motor);
    }
    // 第三个驱动器未受控
    assert!(!board.motor(4).unwrap().enabled);
}

#[test]
fn test_never_ready_leaves_gate_open() {
    let mut board = SimMasterBoard::new(
        "sim",
        SimConfig {
            ready_after_ticks: u32::MAX,
            ..SimConfig::default()
        },
    );
    let config = LoopConfig {
        duration_ms: 300,
        ..LoopConfig::default()
    };
    let record = run(&mut board, &config);
    assert_eq!(record.ready_tick, None);
    assert_eq!(record.outcome, RunOutcome::Completed);
}

#[test]
fn test_session_through_builder_on_monotonic_clock() {
    let mut board = MasterBoardBuilder::new()
        .interface("sim:bench")
        .sim_config(SimConfig::default())
        .build()
        .unwrap();
    let config = LoopConfig {
        duration_ms: 30,
        report_every: 10,
        ..LoopConfig::default()
    };
    let record = run_session(
        board.as_mut(),
        &MonotonicClock::new(),
        &config,
        &AtomicBool::new(false),
        &mut sink(),
    )
    .unwrap();

    assert_eq!(record.outcome, RunOutcome::Completed);
    assert_eq!(record.interface, "sim:bench");
    assert!(record.ticks > 0 && record.ticks <= 30, "ticks = {}", record.ticks);
    assert_ratios_exact(&record);
    assert!(matches!(board.send_command(), Err(DriverError::Stopped)));
}

#[test]
fn test_record_exports_json() {
    let mut board = SimMasterBoard::new("sim", SimConfig::default());
    let config = LoopConfig {
        duration_ms: 1_000,
        ..LoopConfig::default()
    };
    let record = run(&mut board, &config);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("record.json");
    record.save_json(&path).unwrap();
    assert_eq!(RunRecord::load_json(&path).unwrap(), record);
}
