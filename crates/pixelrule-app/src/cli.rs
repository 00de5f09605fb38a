//! 명령행 인자.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// 화면 영역 규칙 기반 자동화 도구
///
/// 프로필에 정의된 영역을 주기적으로 캡처해 조건을 평가하고 액션을 실행한다.
#[derive(Parser, Debug)]
#[command(name = "pixelrule")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 로그 레벨 (trace, debug, info, warn, error). 미지정 시 설정 파일 값
    #[arg(long, short = 'l', global = true)]
    pub log_level: Option<String>,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 모니터링 실행 (SIGINT/SIGTERM까지)
    Run {
        /// 프로필 JSON 경로
        profile: PathBuf,

        /// 모니터링 주기 (초). 프로필 설정보다 우선
        #[arg(long, short = 'i')]
        interval: Option<f64>,

        /// 입력을 실행하지 않고 로그만 남김
        #[arg(long)]
        dry_run: bool,
    },

    /// 프로필 검증 후 영역별 분석 요구사항 출력
    Check {
        /// 프로필 JSON 경로
        profile: PathBuf,
    },
}
