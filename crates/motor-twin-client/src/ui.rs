//! Control panel: mode buttons, RPM slider and sensor readouts.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use motor_twin::{MAX_SLIDER_RPM, Mode, Readouts, TwinState};

use crate::bus::BusStatus;
use crate::controller::Twin;

/// Title of the mode panel.
const TITLE: &str = "Electric Motor Digital Twin";

/// Colour of the title text.
const TITLE_COLOR: egui::Color32 = egui::Color32::from_rgb(0x00, 0xbf, 0xff);

/// Colour of readout values.
const READOUT_COLOR: egui::Color32 = egui::Color32::from_rgb(0x00, 0xff, 0x00);

/// Plugin for the control panel overlay.
pub struct ControlPanelPlugin;

impl Plugin for ControlPanelPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .add_systems(EguiPrimaryContextPass, control_panel_system);
    }
}

/// Render the control panel.
#[allow(clippy::needless_pass_by_value)]
fn control_panel_system(
    mut contexts: EguiContexts,
    mut twin: ResMut<Twin>,
    status: Res<BusStatus>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    egui::Window::new(TITLE)
        .title_bar(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_TOP, [0.0, 20.0])
        .show(ctx, |ui| render_mode_controls(ui, &mut twin, &status));

    egui::Window::new("Sensors")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::RIGHT_TOP, [-20.0, 100.0])
        .show(ctx, |ui| render_readouts(ui, twin.readouts()));

    Ok(())
}

/// Mode buttons, slider and bus status.
fn render_mode_controls(ui: &mut egui::Ui, twin: &mut TwinState, status: &BusStatus) {
    ui.vertical_centered(|ui| {
        ui.heading(egui::RichText::new(TITLE).color(TITLE_COLOR));

        ui.horizontal(|ui| {
            for mode in [Mode::Manual, Mode::BusDriven] {
                if ui
                    .selectable_label(twin.mode() == mode, mode.label())
                    .clicked()
                {
                    match mode {
                        Mode::Manual => twin.select_manual(),
                        Mode::BusDriven => twin.select_bus_driven(),
                    }
                }
            }
        });

        // Disabled sliders are greyed out and ignore input.
        let mut slider = twin.slider();
        let response = ui.add_enabled(
            twin.slider_enabled(),
            egui::Slider::new(&mut slider, 0..=MAX_SLIDER_RPM).show_value(false),
        );
        if response.changed() {
            twin.slider_input(slider);
        }
        ui.label(twin.slider_label());

        ui.separator();
        ui.small(status.label());
    });
}

/// Two-column grid of read-only sensor fields.
fn render_readouts(ui: &mut egui::Ui, readouts: &Readouts) {
    egui::Grid::new("readouts")
        .num_columns(2)
        .spacing([10.0, 10.0])
        .show(ui, |ui| {
            for (i, (channel, text)) in readouts.iter().enumerate() {
                ui.vertical(|ui| {
                    ui.label(
                        egui::RichText::new(channel.label())
                            .strong()
                            .color(egui::Color32::WHITE),
                    );
                    let mut value = text.to_string();
                    ui.add(
                        egui::TextEdit::singleline(&mut value)
                            .interactive(false)
                            .text_color(READOUT_COLOR)
                            .horizontal_align(egui::Align::Center)
                            .desired_width(100.0),
                    );
                });
                if i % 2 == 1 {
                    ui.end_row();
                }
            }
        });
}
