//! Now-playing panel progress and the next/previous widget opacity

use std::time::Duration;

use crate::model::opacity_for_progress;

use super::AppController;

const TWEEN_FRAMES: u32 = 15;

impl AppController {
    /// Derive widget opacity from panel progress off the render loop
    pub(crate) fn start_visibility_task(&self) {
        let mut progress_rx = self.progress_tx.subscribe();
        let model = self.model.clone();
        let token = self.shutdown.child_token();

        tokio::spawn(async move {
            loop {
                let progress = *progress_rx.borrow_and_update();
                let opacity = opacity_for_progress(progress);
                {
                    let model = model.lock().await;
                    model.set_panel_progress(progress).await;
                    model.set_next_prev_opacity(opacity).await;
                }

                tokio::select! {
                    _ = token.cancelled() => break,
                    changed = progress_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Visibility task stopped");
        });
    }

    pub fn set_panel_progress(&self, progress: f32) {
        let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 100.0) };
        self.progress_tx.send_replace(progress);
    }

    pub fn panel_progress(&self) -> f32 {
        *self.progress_tx.borrow()
    }

    /// Manual scroll; stops any running tween
    pub async fn scroll_panel(&self, expand: bool) {
        self.cancel_tween().await;
        let step = if expand { self.settings.progress_step } else { -self.settings.progress_step };
        self.set_panel_progress(self.panel_progress() + step);
    }

    /// Animate the panel fully open or fully closed, whichever is further
    pub async fn toggle_panel(&self) {
        let target = if self.panel_progress() >= 50.0 { 0.0 } else { 100.0 };
        self.animate_panel_to(target).await;
    }

    pub async fn animate_panel_to(&self, target: f32) {
        self.cancel_tween().await;

        let token = self.shutdown.child_token();
        *self.tween.lock().await = Some(token.clone());

        let controller = self.clone();
        let start = self.panel_progress();
        let frame = self.settings.tween / TWEEN_FRAMES;
        tracing::debug!(start, target, "Animating panel");

        tokio::spawn(async move {
            for i in 1..=TWEEN_FRAMES {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = tokio::time::sleep(frame.max(Duration::from_millis(1))) => {}
                }
                let t = i as f32 / TWEEN_FRAMES as f32;
                controller.set_panel_progress(start + (target - start) * t);
            }
        });
    }

    async fn cancel_tween(&self) {
        if let Some(token) = self.tween.lock().await.take() {
            token.cancel();
        }
    }
}
