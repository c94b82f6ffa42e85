//! 命令定义和实现

pub mod config;
pub mod stop;
pub mod teleop;
pub mod trajectory;

pub use config::ConfigCommand;
pub use stop::StopCommand;
pub use teleop::TeleopCommand;
pub use trajectory::TrajectoryCommand;

use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 安装 Ctrl-C 处理器，触发时调用 `on_interrupt`
///
/// 返回的标志在收到信号后变为 true。
pub(crate) fn install_interrupt_handler<F>(on_interrupt: F) -> Result<Arc<AtomicBool>>
where
    F: Fn() + Send + 'static,
{
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        eprintln!("\nReceived interrupt signal, stopping...");
        on_interrupt();
    })?;
    Ok(interrupted)
}
