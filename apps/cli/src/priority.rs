//! 进程优先级

use thread_priority::{ThreadPriority, set_current_thread_priority};
use tracing::{info, warn};

/// 把当前线程提升到最高优先级（失败只记录，不中断会话）
pub fn raise_current_thread() {
    match set_current_thread_priority(ThreadPriority::Max) {
        Ok(()) => info!("Session thread priority set to MAX"),
        Err(e) => warn!(
            "Failed to raise session thread priority: {:?}. \
             On Linux, you may need to run with CAP_SYS_NICE.",
            e
        ),
    }
}
