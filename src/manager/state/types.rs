use crate::constants::gui::*;
use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonStatus {
    Starting,
    Running,
    Stopped,
    Crashed(Option<i32>),
}

impl DaemonStatus {
    pub fn color(&self) -> egui::Color32 {
        match self {
            DaemonStatus::Running => STATUS_RUNNING,
            DaemonStatus::Starting => STATUS_STARTING,
            _ => STATUS_STOPPED,
        }
    }

    pub fn label(&self) -> String {
        match self {
            DaemonStatus::Running => "Overlay running".to_string(),
            DaemonStatus::Starting => "Overlay starting...".to_string(),
            DaemonStatus::Stopped => "Overlay stopped".to_string(),
            DaemonStatus::Crashed(code) => match code {
                Some(code) => format!("Overlay crashed (exit {code})"),
                None => "Overlay crashed".to_string(),
            },
        }
    }

    /// Whether the user can bring the overlay back with the restart button
    pub fn is_down(&self) -> bool {
        matches!(self, DaemonStatus::Stopped | DaemonStatus::Crashed(_))
    }
}

pub struct StatusMessage {
    pub text: String,
    pub color: egui::Color32,
}

impl StatusMessage {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: COLOR_ERROR,
        }
    }
}
