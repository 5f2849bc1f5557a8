//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::ActiveSection;
use crate::voice::VoicePayload;
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = self.model.lock().await;

        // Handle error message first (blocks all other interactions)
        if model.has_error().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                model.clear_error().await;
            }
            return Ok(());
        }

        // Help panel only closes through its OK button
        if model.is_help_open().await {
            match key.code {
                KeyCode::Enter => model.confirm_help().await,
                KeyCode::Esc => {
                    if let Err(e) = model.request_help_close().await {
                        tracing::debug!(error = %e, "Refused to close help panel");
                        model.set_error(Self::format_error(&e)).await;
                    }
                }
                _ => {}
            }
            return Ok(());
        }

        let ui_state = model.get_ui_state().await;

        // Voice prompt captures typing
        if ui_state.active_section == ActiveSection::VoicePrompt {
            match key.code {
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        model.cycle_section_backward().await;
                    } else {
                        model.cycle_section_forward().await;
                    }
                    return Ok(());
                }
                KeyCode::BackTab => {
                    model.cycle_section_backward().await;
                    return Ok(());
                }
                KeyCode::Enter => {
                    let utterance = model.take_voice_input().await;
                    drop(model);
                    match VoicePayload::from_utterance(&utterance) {
                        Some(payload) => {
                            if !self.voice.send(payload) {
                                tracing::warn!(utterance, "No voice listener attached");
                            }
                        }
                        None => tracing::debug!("Empty utterance"),
                    }
                    return Ok(());
                }
                KeyCode::Esc => {
                    model.clear_voice_input().await;
                    model.set_active_section(ActiveSection::Playlists).await;
                    return Ok(());
                }
                KeyCode::Backspace => {
                    model.backspace_voice_input().await;
                    return Ok(());
                }
                KeyCode::Char(c) => {
                    if (c == 'q' || c == 'Q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        model.set_should_quit(true).await;
                        return Ok(());
                    }
                    model.append_to_voice_input(c).await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    model.cycle_section_backward().await;
                } else {
                    model.cycle_section_forward().await;
                }
            }
            KeyCode::BackTab => {
                model.cycle_section_backward().await;
            }
            KeyCode::Up => {
                if model.move_selection_up().await {
                    drop(model);
                    self.refresh_library_view().await;
                }
            }
            KeyCode::Down => {
                if model.move_selection_down().await {
                    drop(model);
                    self.refresh_library_view().await;
                }
            }
            KeyCode::Enter => match ui_state.active_section {
                ActiveSection::Playlists => {
                    model.set_active_section(ActiveSection::Tracks).await;
                }
                ActiveSection::Tracks => {
                    if let Some((track_id, playlist)) = model.get_selected_track().await {
                        drop(model);
                        self.play_selected(&track_id, playlist).await;
                    }
                }
                ActiveSection::VoicePrompt => {}
            },
            // Play/Pause toggle
            KeyCode::Char(' ') => {
                drop(model);
                self.toggle_playback().await;
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                drop(model);
                self.next_track().await;
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                drop(model);
                self.previous_track().await;
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                drop(model);
                self.toggle_shuffle().await;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                drop(model);
                self.cycle_repeat().await;
            }
            KeyCode::Char('0') => {
                drop(model);
                self.replay().await;
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.show_help().await;
            }
            // Focus the voice prompt
            KeyCode::Char('v') | KeyCode::Char('V') | KeyCode::Char('/') => {
                model.set_active_section(ActiveSection::VoicePrompt).await;
            }
            // Expand/collapse the now-playing panel
            KeyCode::Char('e') | KeyCode::Char('E') => {
                drop(model);
                self.toggle_panel().await;
            }
            KeyCode::PageUp => {
                drop(model);
                self.scroll_panel(true).await;
            }
            KeyCode::PageDown => {
                drop(model);
                self.scroll_panel(false).await;
            }
            KeyCode::F(5) => {
                drop(model);
                self.reload_library().await;
            }
            _ => {}
        }
        Ok(())
    }
}
