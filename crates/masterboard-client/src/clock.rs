//! 时钟抽象
//!
//! 会话循环只通过 [`Clock`] 读取时间和休眠：
//! - [`MonotonicClock`]: 基于 `Instant` 的单调时钟，使用 `spin_sleep` 低抖动休眠
//! - [`FakeClock`]: 测试用的虚拟时钟，休眠即时间跳到截止点
//!
//! 时间以"自时钟创建以来的 `Duration`"表示。

use spin_sleep::SpinSleeper;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 单调时钟
pub trait Clock {
    /// 当前时间（自时钟起点）
    fn now(&self) -> Duration;

    /// 休眠到 `deadline`（已过期则立即返回）
    fn sleep_until(&self, deadline: Duration);
}

/// 系统单调时钟
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
    sleeper: SpinSleeper,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            sleeper: SpinSleeper::default(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep_until(&self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            self.sleeper.sleep(deadline - now);
        }
    }
}

/// 虚拟时钟
///
/// 纳秒精度，只会向前走：`sleep_until` 把时间推进到截止点，
/// [`advance`](FakeClock::advance) 模拟耗时的工作。
///
/// # Example
///
/// ```
/// use masterboard_client::{Clock, FakeClock};
/// use std::time::Duration;
///
/// let clock = FakeClock::new();
/// clock.sleep_until(Duration::from_millis(5));
/// assert_eq!(clock.now(), Duration::from_millis(5));
///
/// // 过期的截止点不会让时间倒退
/// clock.sleep_until(Duration::from_millis(1));
/// assert_eq!(clock.now(), Duration::from_millis(5));
/// ```
#[derive(Debug, Default)]
pub struct FakeClock {
    nanos: AtomicU64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 `start` 开始的虚拟时钟
    pub fn starting_at(start: Duration) -> Self {
        Self {
            nanos: AtomicU64::new(start.as_nanos() as u64),
        }
    }

    /// 时间前进 `delta`
    pub fn advance(&self, delta: Duration) {
        self.nanos
            .fetch_add(delta.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }

    fn sleep_until(&self, deadline: Duration) {
        self.nanos
            .fetch_max(deadline.as_nanos() as u64, Ordering::SeqCst);
    }
}
