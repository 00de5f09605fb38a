//! 종료 시그널 대기.

use std::fmt;

use tracing::{error, warn};

/// 종료 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Interrupt,
    Terminate,
    /// 시그널 대기 자체가 실패
    SignalError,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
            Self::SignalError => "signal-error",
        };
        f.write_str(label)
    }
}

/// SIGINT/SIGTERM(비유닉스는 Ctrl+C) 중 먼저 오는 것을 기다린다.
///
/// 유닉스 핸들러 등록에 실패하면 Ctrl+C 대기로 물러선다.
pub async fn wait_for_shutdown() -> ShutdownReason {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                return tokio::select! {
                    _ = sigint.recv() => ShutdownReason::Interrupt,
                    _ = sigterm.recv() => ShutdownReason::Terminate,
                };
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("시그널 핸들러 등록 실패, Ctrl+C 대기로 전환: {e}");
            }
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => ShutdownReason::Interrupt,
        Err(e) => {
            error!("Ctrl+C 대기 실패: {e}");
            ShutdownReason::SignalError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_display_signal_names() {
        assert_eq!(ShutdownReason::Interrupt.to_string(), "SIGINT");
        assert_eq!(ShutdownReason::Terminate.to_string(), "SIGTERM");
        assert_eq!(ShutdownReason::SignalError.to_string(), "signal-error");
    }

    #[tokio::test]
    async fn wait_is_cancellable() {
        let waited = tokio::time::timeout(std::time::Duration::from_millis(20), wait_for_shutdown()).await;
        assert!(waited.is_err());
    }
}
