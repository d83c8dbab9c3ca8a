use eframe::egui;

use crate::core::ThresholdConfig;
use crate::playback::{PlaybackPhase, SlotStatus, Transition, PlayStart};
use crate::playback::visibility::Bounds;
use crate::video::PreloadHint;

pub struct SlotRenderer;

impl SlotRenderer {
    /// Paints one feed slot: a tinted card with its state and a visibility
    /// bar along the bottom edge.
    pub fn paint(ui: &egui::Ui, rect: egui::Rect, title: &str, status: &SlotStatus, thresholds: &ThresholdConfig, hovered: bool) {
        if !ui.is_rect_visible(rect) {
            return;
        }
        let painter = ui.painter();

        painter.rect_filled(rect, egui::Rounding::same(6.0), Self::slot_color(status));
        if hovered {
            painter.rect_stroke(rect, egui::Rounding::same(6.0), ui.visuals().selection.stroke);
        }

        painter.text(
            rect.min + egui::Vec2::new(16.0, 16.0),
            egui::Align2::LEFT_TOP,
            title,
            egui::FontId::proportional(20.0),
            egui::Color32::WHITE,
        );

        let lines = Self::status_lines(status);
        for (i, line) in lines.iter().enumerate() {
            painter.text(
                rect.min + egui::Vec2::new(16.0, 52.0 + i as f32 * 18.0),
                egui::Align2::LEFT_TOP,
                line,
                egui::FontId::monospace(13.0),
                egui::Color32::from_gray(220),
            );
        }

        // Big glyph in the middle, like a player overlay
        let glyph = match status.phase {
            PlaybackPhase::Playing => "⏸",
            PlaybackPhase::AttemptingPlay => "⏳",
            PlaybackPhase::Paused => "▶",
        };
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            glyph,
            egui::FontId::proportional(48.0),
            egui::Color32::from_white_alpha(180),
        );

        Self::paint_visibility_bar(painter, rect, status.ratio, thresholds);
    }

    fn paint_visibility_bar(painter: &egui::Painter, rect: egui::Rect, ratio: f64, thresholds: &ThresholdConfig) {
        let track = egui::Rect::from_min_size(
            egui::Pos2::new(rect.min.x + 16.0, rect.max.y - 24.0),
            egui::Vec2::new(rect.width() - 32.0, 8.0),
        );
        painter.rect_filled(track, egui::Rounding::same(2.0), egui::Color32::from_gray(40));

        let filled = egui::Rect::from_min_size(track.min, egui::Vec2::new(track.width() * ratio.clamp(0.0, 1.0) as f32, track.height()));
        painter.rect_filled(filled, egui::Rounding::same(2.0), egui::Color32::from_rgb(90, 170, 255));

        for (threshold, color) in [
            (thresholds.play_threshold, egui::Color32::from_rgb(80, 220, 120)),
            (thresholds.pause_threshold, egui::Color32::from_rgb(230, 170, 60)),
        ] {
            let x = track.min.x + track.width() * threshold as f32;
            painter.line_segment(
                [egui::Pos2::new(x, track.min.y - 4.0), egui::Pos2::new(x, track.max.y + 4.0)],
                egui::Stroke::new(2.0, color),
            );
        }
    }

    pub fn slot_color(status: &SlotStatus) -> egui::Color32 {
        if status.load_error.is_some() {
            return egui::Color32::from_rgb(110, 30, 30);
        }
        match status.phase {
            PlaybackPhase::Playing => egui::Color32::from_rgb(30, 90, 50),
            PlaybackPhase::AttemptingPlay => egui::Color32::from_rgb(100, 80, 20),
            PlaybackPhase::Paused => egui::Color32::from_gray(45),
        }
    }

    pub fn status_lines(status: &SlotStatus) -> Vec<String> {
        let mut lines = vec![
            format!("visible  {}", format_ratio(status.ratio)),
            format!("state    {}", status.phase.display_text()),
            format!("preload  {}", status.preload.as_str()),
            format!("buffer   {}", if status.ready { "ready" } else { "loading" }),
        ];
        if status.user_initiated {
            lines.push("manual   yes (scroll ignored)".to_string());
        }
        if let Some(attempt) = status.pending_attempt {
            lines.push(format!("attempt  #{} pending", attempt.0));
        }
        if let Some(ref error) = status.load_error {
            lines.push(format!("error    {}", error));
        } else if let Some(ref failure) = status.last_failure {
            lines.push(format!("last     {}", failure));
        }
        lines
    }
}

pub fn format_ratio(ratio: f64) -> String {
    format!("{:.0}%", ratio.clamp(0.0, 1.0) * 100.0)
}

/// One-line description for the activity log.
pub fn describe(transition: &Transition) -> String {
    match transition {
        Transition::PlayRequested(PlayStart::Issued(attempt)) => format!("play requested (attempt {})", attempt.0),
        Transition::PlayRequested(PlayStart::WaitingReady(attempt)) => format!("waiting for buffer (attempt {})", attempt.0),
        Transition::PlayRequested(PlayStart::AlreadyPlaying) => "already playing".to_string(),
        Transition::PlayRequested(PlayStart::AlreadyPending(attempt)) => format!("attempt {} still pending", attempt.0),
        Transition::Paused => "paused".to_string(),
        Transition::Started => "playing".to_string(),
        Transition::Failed(error) => format!("play failed: {}", error),
        Transition::LoadFailed(message) => format!("load failed: {}", message),
        Transition::PreloadUpgraded => format!("preload -> {}", PreloadHint::Auto.as_str()),
    }
}

pub fn to_bounds(rect: egui::Rect) -> Bounds {
    Bounds::new(rect.min.x as f64, rect.min.y as f64, rect.width() as f64, rect.height() as f64)
}
