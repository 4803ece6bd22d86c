//! 取消令牌
//!
//! 收敛等待与传感轮询里的每一次睡眠都走 `CancelToken::sleep`，
//! 因此一个本可能无限阻塞的电机等待可以被外部（如 Ctrl-C 处理
//! 线程）及时打断，而不是只能杀进程。
//!
//! 实现：`AtomicBool` 记录取消状态 + 容量 1 的 crossbeam channel
//! 做睡眠唤醒。`cancel()` 置位后 `try_send` 唤醒当前正在睡眠的
//! 等待者（本 rig 全程单线程顺序执行，同一时刻至多一个）。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};

/// 触发端：交给外部（信号处理、看门狗线程）
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
    tx: Sender<()>,
}

impl CancelHandle {
    /// 置位取消状态并唤醒正在睡眠的等待者
    ///
    /// 幂等，可在信号处理器里重复调用。
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let _ = self.tx.try_send(());
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        // 触发端丢失即视为取消，避免等待者在断开的 channel 上空转
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// 等待端：注入到每个会阻塞的组件
#[derive(Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    rx: Receiver<()>,
    /// `never()` 令牌自持发送端，使 channel 永不断开
    _keep_alive: Option<Sender<()>>,
}

impl CancelToken {
    /// 永不取消的令牌（调用方不关心取消时使用）
    pub fn never() -> Self {
        let (tx, rx) = bounded(1);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            rx,
            _keep_alive: Some(tx),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// 睡眠 `interval`，或在取消时提前醒来
    ///
    /// 返回 `true` 表示已取消。
    pub fn sleep(&self, interval: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        match self.rx.recv_timeout(interval) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => self.is_cancelled(),
        }
    }
}

/// 创建一对取消端点
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let cancelled = Arc::new(AtomicBool::new(false));
    let (tx, rx) = bounded(1);
    (
        CancelHandle {
            cancelled: cancelled.clone(),
            tx,
        },
        CancelToken {
            cancelled,
            rx,
            _keep_alive: None,
        },
    )
}
