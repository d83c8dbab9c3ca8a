use eframe::egui;
use crate::core::{AppConfig, FeedConfig};
use crate::gui::feed::{self, SlotRenderer};
use crate::playback::{AutoplayController, Bounds, BoundsObserver, Transition};
use crate::video::{SimulatedBehavior, SimulatedVideo, SlotEvent, SlotId};
use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

pub const MAX_ACTIVITY_ENTRIES: usize = 200;

pub type FeedController = AutoplayController<SimulatedVideo, BoundsObserver>;

pub struct FeedSlot {
    pub title: String,
    pub controller: FeedController,
}

#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub at: DateTime<Local>,
    pub slot: String,
    pub message: String,
}

pub struct FeedApp {
    pub config: AppConfig,
    pub slots: Vec<FeedSlot>,
    pub activity: VecDeque<ActivityEntry>,
    pub event_receiver: mpsc::UnboundedReceiver<SlotEvent>,
    pub event_sender: mpsc::UnboundedSender<SlotEvent>,
    /// Set by the first click anywhere in the feed
    pub activation: Arc<AtomicBool>,
    pub status_message: String,
    pub show_activity: bool,
    runtime: tokio::runtime::Runtime,
}

impl FeedApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> anyhow::Result<Self> {
        let mut visuals = egui::Visuals::dark();
        visuals.override_text_color = Some(egui::Color32::WHITE);
        cc.egui_ctx.set_visuals(visuals);

        let config = AppConfig::load()?;
        Self::with_config(config)
    }

    pub fn with_config(config: AppConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| anyhow::anyhow!("Failed to create media runtime: {}", e))?;
        let (event_sender, event_receiver) = mpsc::unbounded_channel();

        let mut app = Self {
            config,
            slots: Vec::new(),
            activity: VecDeque::new(),
            event_receiver,
            event_sender,
            activation: Arc::new(AtomicBool::new(false)),
            status_message: String::new(),
            show_activity: true,
            runtime,
        };
        app.rebuild_feed();
        Ok(app)
    }

    /// Tears down every slot and mounts a fresh set from the config.
    pub fn rebuild_feed(&mut self) {
        for slot in &mut self.slots {
            slot.controller.dispose();
        }
        self.slots.clear();

        let feed = &self.config.feed;
        for index in 0..feed.slot_count {
            let id = SlotId::new();
            let element = SimulatedVideo::new(
                id.clone(),
                Self::behavior_for(feed, index),
                self.runtime.handle().clone(),
                self.event_sender.clone(),
                self.activation.clone(),
            );
            let controller = AutoplayController::new(
                id,
                element,
                BoundsObserver::new(),
                &self.config.thresholds,
                self.config.intent_policy,
                self.config.ready_timeout(),
            );
            self.slots.push(FeedSlot {
                title: format!("Clip #{}", index + 1),
                controller,
            });
        }

        log::info!("Mounted {} feed slots", self.slots.len());
        self.status_message = format!("Feed ready with {} slots", self.slots.len());
    }

    pub fn behavior_for(feed: &FeedConfig, index: usize) -> SimulatedBehavior {
        SimulatedBehavior {
            load_delay: Duration::from_millis(feed.load_delay_ms),
            play_latency: Duration::from_millis(feed.play_latency_ms),
            block_autoplay: feed.block_autoplay,
            fail_load: feed.failing_slots.contains(&index),
        }
    }

    pub fn slot_index(&self, id: &SlotId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.controller.id() == id)
    }

    // =========================================================================
    // EVENT PUMP
    // =========================================================================

    /// Drains everything the media runtime posted since the last frame.
    pub fn process_media_events(&mut self) {
        while let Ok((id, event)) = self.event_receiver.try_recv() {
            match self.slot_index(&id) {
                Some(index) => {
                    let transitions = self.slots[index].controller.on_media_event(event);
                    self.record_transitions(index, transitions);
                }
                None => log::debug!("Dropping {:?} for unmounted slot {}", event, id),
            }
        }
    }

    /// Feeds fresh geometry for one slot into its observer.
    pub fn observe_slot(&mut self, index: usize, element: Bounds, viewport: Bounds, now: Instant) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        if let Some(event) = slot.controller.observer_mut().sample(element, viewport, now) {
            let transitions = slot.controller.on_visibility(event);
            self.record_transitions(index, transitions);
        }
    }

    /// Runs the per-frame decision for every slot.
    pub fn run_frame(&mut self, now: Instant) {
        for index in 0..self.slots.len() {
            let transitions = self.slots[index].controller.on_frame(now);
            self.record_transitions(index, transitions);
        }
    }

    pub fn handle_click(&mut self, index: usize, now: Instant) {
        if !self.activation.swap(true, Ordering::SeqCst) {
            log::info!("First user gesture, autoplay unblocked");
        }
        if let Some(slot) = self.slots.get_mut(index) {
            slot.controller.toggle(now);
            let message = if slot.controller.is_user_initiated() { "toggled by user" } else { "toggled" };
            self.push_activity(index, message.to_string());
        }
    }

    pub fn record_transitions(&mut self, index: usize, transitions: Vec<Transition>) {
        for transition in transitions {
            self.push_activity(index, feed::describe(&transition));
        }
    }

    fn push_activity(&mut self, index: usize, message: String) {
        let slot = self.slots.get(index).map(|s| s.title.clone()).unwrap_or_default();
        self.activity.push_front(ActivityEntry {
            at: Local::now(),
            slot,
            message,
        });
        self.activity.truncate(MAX_ACTIVITY_ENTRIES);
    }

    pub fn playing_count(&self) -> usize {
        self.slots.iter().filter(|s| s.controller.is_playing()).count()
    }

    // =========================================================================
    // PANELS
    // =========================================================================

    fn show_top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Feed Autoplay");
            ui.separator();

            if ui.button("🔄 Rebuild feed").clicked() {
                self.rebuild_feed();
            }
            if ui.button("💾 Save settings").clicked() {
                match self.config.save() {
                    Ok(()) => self.status_message = "Settings saved".to_string(),
                    Err(e) => {
                        log::error!("Failed to save config: {}", e);
                        self.status_message = format!("Save failed: {}", e);
                    }
                }
            }
            ui.checkbox(&mut self.show_activity, "Activity");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let gesture = if self.activation.load(Ordering::SeqCst) { "✅ gesture seen" } else { "🔇 no gesture yet" };
                ui.label(gesture);
                ui.separator();
                ui.label(format!("▶ {} playing", self.playing_count()));
                ui.separator();
                ui.label(self.status_message.as_str());
            });
        });
    }

    fn show_activity_panel(&self, ui: &mut egui::Ui) {
        ui.heading("Activity");
        ui.separator();
        egui::ScrollArea::vertical().show(ui, |ui| {
            for entry in &self.activity {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(entry.at.format("%H:%M:%S%.3f").to_string())
                            .monospace()
                            .color(egui::Color32::GRAY),
                    );
                    ui.label(egui::RichText::new(entry.slot.as_str()).strong());
                    ui.label(entry.message.as_str());
                });
            }
        });
    }

    fn show_feed(&mut self, ui: &mut egui::Ui, now: Instant) {
        let slot_height = self.config.feed.slot_height;
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let viewport = feed::to_bounds(ui.clip_rect());
                for index in 0..self.slots.len() {
                    let (rect, response) = ui.allocate_exact_size(
                        egui::Vec2::new(ui.available_width(), slot_height),
                        egui::Sense::click(),
                    );

                    let slot = &self.slots[index];
                    SlotRenderer::paint(ui, rect, &slot.title, &slot.controller.status(), &self.config.thresholds, response.hovered());

                    self.observe_slot(index, feed::to_bounds(rect), viewport, now);
                    if response.clicked() {
                        self.handle_click(index, now);
                    }
                    ui.add_space(12.0);
                }
            });
    }
}

impl eframe::App for FeedApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.process_media_events();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            self.show_top_bar(ui);
        });

        if self.show_activity {
            egui::SidePanel::right("activity")
                .default_width(320.0)
                .min_width(240.0)
                .show(ctx, |ui| {
                    self.show_activity_panel(ui);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_feed(ui, now);
        });

        // One decision per slot per frame, after all geometry is in
        self.run_frame(now);

        // Media events arrive off-thread, keep polling for them
        ctx.request_repaint_after(Duration::from_millis(16));
    }
}
