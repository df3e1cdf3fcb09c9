//! 固定周期调度
//!
//! 截止时间每次前进一个周期；某个 tick 醒来时已经晚于截止点超过一个周期，
//! 则以当前时间重新锚定并计一次超时（overrun），不追补错过的 tick。

use crate::clock::Clock;
use std::time::Duration;
use tracing::{debug, warn};

/// 固定周期调度器
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next: Duration,
    overruns: u64,
}

impl Ticker {
    /// 从 `start` 起，第一个截止点为 `start + period`
    pub fn new(period: Duration, start: Duration) -> Self {
        Self {
            period,
            next: start + period,
            overruns: 0,
        }
    }

    /// 休眠到下一个截止点，返回醒来时的时间
    pub fn wait<C: Clock + ?Sized>(&mut self, clock: &C) -> Duration {
        clock.sleep_until(self.next);
        let now = clock.now();
        let lateness = now.saturating_sub(self.next);
        if lateness > self.period {
            self.overruns += 1;
            if self.overruns == 1 {
                warn!(
                    "Control tick overrun: woke {:?} after deadline (period {:?})",
                    lateness, self.period
                );
            } else {
                debug!("Control tick overrun #{}: {:?} late", self.overruns, lateness);
            }
            self.next = now + self.period;
        } else {
            self.next += self.period;
        }
        now
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// 下一个截止点
    pub fn next_deadline(&self) -> Duration {
        self.next
    }

    /// 重新锚定的次数
    pub fn overruns(&self) -> u64 {
        self.overruns
    }
}
