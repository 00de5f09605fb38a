//! enigo 기반 실제 마우스/키보드 입력 백엔드.
//!
//! macOS: Accessibility 권한 필요
//! Windows: UIAccess 또는 관리자 권한 필요
//! Linux: X11 또는 Wayland + uinput 권한 필요

use async_trait::async_trait;
use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use tracing::debug;

use pixelrule_core::error::CoreError;
use pixelrule_core::models::action::{ActionRequest, MouseButton, ResolvedAction};
use pixelrule_core::ports::action_backend::ActionBackend;

use crate::support::{emit_log_message, pause_before, step_interval};

/// enigo 입력 백엔드
pub struct EnigoBackend {
    /// Send지만 !Sync → tokio::sync::Mutex
    enigo: tokio::sync::Mutex<Enigo>,
}

impl EnigoBackend {
    pub fn new() -> Result<Self, CoreError> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| CoreError::Internal(format!("입력 드라이버 초기화 실패: {e}")))?;
        Ok(Self {
            enigo: tokio::sync::Mutex::new(enigo),
        })
    }

    /// 키 이름 → enigo 키. 알 수 없는 이름은 `None`
    pub fn parse_key(key: &str) -> Option<Key> {
        let key = match key.trim().to_lowercase().as_str() {
            "enter" | "return" => Key::Return,
            "tab" => Key::Tab,
            "escape" | "esc" => Key::Escape,
            "backspace" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "space" => Key::Space,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" | "pgup" => Key::PageUp,
            "pagedown" | "pgdn" => Key::PageDown,
            "up" | "uparrow" => Key::UpArrow,
            "down" | "downarrow" => Key::DownArrow,
            "left" | "leftarrow" => Key::LeftArrow,
            "right" | "rightarrow" => Key::RightArrow,
            "ctrl" | "control" => Key::Control,
            "shift" => Key::Shift,
            "alt" | "option" => Key::Alt,
            "meta" | "command" | "cmd" | "super" | "win" => Key::Meta,
            "capslock" => Key::CapsLock,
            "f1" => Key::F1,
            "f2" => Key::F2,
            "f3" => Key::F3,
            "f4" => Key::F4,
            "f5" => Key::F5,
            "f6" => Key::F6,
            "f7" => Key::F7,
            "f8" => Key::F8,
            "f9" => Key::F9,
            "f10" => Key::F10,
            "f11" => Key::F11,
            "f12" => Key::F12,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Key::Unicode(ch),
                    _ => return None,
                }
            }
        };
        Some(key)
    }

    fn key_or_err(name: &str) -> Result<Key, CoreError> {
        Self::parse_key(name)
            .ok_or_else(|| CoreError::InvalidArguments(format!("알 수 없는 키: {name}")))
    }
}

fn to_enigo_button(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
        MouseButton::Middle => Button::Middle,
    }
}

fn dispatch_err(what: &str, e: impl std::fmt::Display) -> CoreError {
    CoreError::ActionDispatch(format!("{what} 실패: {e}"))
}

#[async_trait]
impl ActionBackend for EnigoBackend {
    async fn execute(&self, request: &ActionRequest) -> Result<(), CoreError> {
        pause_before(request).await;

        let rule = request.rule_name.as_str();
        match &request.action {
            ResolvedAction::Click {
                x,
                y,
                button,
                clicks,
                interval_secs,
            } => {
                debug!(rule, x, y, %button, clicks, "[Enigo] 마우스 클릭");
                let mut enigo = self.enigo.lock().await;
                enigo
                    .move_mouse(*x, *y, Coordinate::Abs)
                    .map_err(|e| dispatch_err("마우스 이동", e))?;
                let btn = to_enigo_button(*button);
                let pause = step_interval(rule, *interval_secs);
                for i in 0..*clicks {
                    if let Some(pause) = pause.filter(|_| i > 0) {
                        tokio::time::sleep(pause).await;
                    }
                    enigo
                        .button(btn, Direction::Click)
                        .map_err(|e| dispatch_err("마우스 클릭", e))?;
                }
            }

            ResolvedAction::TypeText { text, interval_secs } => {
                debug!(rule, text_len = text.chars().count(), "[Enigo] 텍스트 입력");
                let mut enigo = self.enigo.lock().await;
                if let Some(pause) = step_interval(rule, *interval_secs) {
                    let mut buf = [0u8; 4];
                    for ch in text.chars() {
                        enigo
                            .text(ch.encode_utf8(&mut buf))
                            .map_err(|e| dispatch_err("텍스트 입력", e))?;
                        tokio::time::sleep(pause).await;
                    }
                } else {
                    enigo.text(text).map_err(|e| dispatch_err("텍스트 입력", e))?;
                }
            }

            ResolvedAction::PressKey { key } => {
                debug!(rule, key = %key, "[Enigo] 키 입력");
                let parsed = Self::key_or_err(key)?;
                let mut enigo = self.enigo.lock().await;
                enigo
                    .key(parsed, Direction::Click)
                    .map_err(|e| dispatch_err("키 입력", e))?;
            }

            ResolvedAction::Hotkey { keys } => {
                debug!(rule, ?keys, "[Enigo] 단축키 실행");
                let parsed = keys
                    .iter()
                    .map(|k| Self::key_or_err(k))
                    .collect::<Result<Vec<_>, _>>()?;
                let mut enigo = self.enigo.lock().await;
                // 순서대로 Press → 역순 Release
                for key in &parsed {
                    enigo
                        .key(*key, Direction::Press)
                        .map_err(|e| dispatch_err("단축키 Press", e))?;
                }
                for key in parsed.iter().rev() {
                    enigo
                        .key(*key, Direction::Release)
                        .map_err(|e| dispatch_err("단축키 Release", e))?;
                }
            }

            ResolvedAction::LogMessage { level, message } => {
                emit_log_message(rule, *level, message);
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "enigo"
    }
}
